//! A cycle-level emulation of the HP-35's Control & Timing / Arithmetic &
//! Register chip pair, driven one microinstruction at a time from the 1536-byte
//! ROM image in [`rom`].
//!
//! # Links
//!
//! - HP-35 Saga: <https://archived.hpcalc.org/laporte/HP%2035%20Saga.htm>
//! - US Patent 4,001,569 (the CT/A&R instruction set this core implements)

pub mod alu;
pub mod decode;
mod ops;
pub mod rom;

use arbitrary_int::{u3, u4};
use log::{debug, info, trace, warn};

use crate::keys::KeyLatch;
use crate::settings::Settings;
use decode::{Family, MicroInstruction};
use rom::Rom;

/// A 14-digit BCD working register: index 13 is the sign position, indices
/// 0..2 the exponent, indices 3..12 the mantissa.
pub type Register = [u4; 14];

/// A register containing all zero digits.
#[must_use]
pub fn zero_register() -> Register {
    [u4::new(0); 14]
}

/// Side effects of a single microcycle the host shell needs to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepOutcome {
    /// The display-enable latch fell this cycle: the shell should project
    /// `A`/`B` through [`crate::display::project`] and push a new frame.
    pub display_falling: bool,
    /// `PC` reached the configured error-trap value while `OFFSET == 0`: the
    /// shell should show the flashing-display error banner until the next key.
    pub error_trap: bool,
}

/// The HP-35 CPU: six working registers, a scratchpad, a 12-bit status array,
/// and the handful of scalar control fields the microcode ROM addresses.
///
/// All state lives here — there is no process-wide or thread-local storage.
#[derive(Debug, Clone)]
pub struct Cpu {
    /// Working register `A`.
    pub a: Register,
    /// Working register `B`. May hold flag codes (`8+` blank, `2` decimal) as
    /// well as BCD digits.
    pub b: Register,
    /// Working register `C`.
    pub c: Register,
    /// Working register `D`.
    pub d: Register,
    /// Working register `E`.
    pub e: Register,
    /// Working register `F`.
    pub f: Register,
    /// Scratchpad register `M`.
    pub m: Register,
    /// The scratch register `T`, the target of the two "compare-only" ALU
    /// moves (`A-C->T`, `A-B->T`) that leave their nominal destination alone.
    pub t: Register,
    /// The 12 independent status bits. `S[0]` is the key-pending flag.
    pub s: [bool; 12],
    /// The 4-bit digit pointer, wraps modulo 16.
    pub p: u4,
    /// The 8-bit program counter, wraps modulo 256.
    pub pc: u8,
    /// The one-level subroutine return slot.
    pub ret: u8,
    /// The 3-bit ROM bank selector.
    pub offset: u3,
    /// The carry/borrow flag produced by the current cycle's arithmetic op.
    pub carry: bool,
    /// The carry value sampled at the start of the cycle, consumed by this
    /// cycle's branch predicate.
    pub prev_carry: bool,
    /// The CPU-held copy of the last key code latched via [`Cpu::step`].
    ///
    /// Reading this before any key has ever been latched is a precondition
    /// violation (§7); debug builds flag it, release builds read whatever
    /// was last present (all zero bits, at power-on).
    key_rom: u8,
    has_latched_key: bool,
    /// The display-enable latch. The projector fires on its falling edge.
    pub display_enable: bool,
    display_enable_prev: bool,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Create a freshly power-on-reset CPU: every register and flag zeroed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            a: zero_register(),
            b: zero_register(),
            c: zero_register(),
            d: zero_register(),
            e: zero_register(),
            f: zero_register(),
            m: zero_register(),
            t: zero_register(),
            s: [false; 12],
            p: u4::new(0),
            pc: 0,
            ret: 0,
            offset: u3::new(0),
            carry: false,
            prev_carry: false,
            key_rom: 0,
            has_latched_key: false,
            display_enable: false,
            display_enable_prev: false,
        }
    }

    /// Reset this CPU to its power-on state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Zero registers `A..F` and `M` in a single cycle, as the `Clear All`
    /// microinstruction (`h3==3, low==0xA8`) does.
    fn clear_all(&mut self) {
        self.a = zero_register();
        self.b = zero_register();
        self.c = zero_register();
        self.d = zero_register();
        self.e = zero_register();
        self.f = zero_register();
        self.m = zero_register();
    }

    /// Execute exactly one microcycle: consume a pending key, fetch and
    /// decode the instruction at `(offset, pc)`, execute it, and advance `pc`.
    pub fn step(&mut self, image: &Rom, latch: &mut KeyLatch, settings: &Settings) -> StepOutcome {
        if let Some(code) = latch.take() {
            self.key_rom = code;
            self.has_latched_key = true;
            self.s[0] = true;
            debug!("key latched into key_rom: {code}");
        }

        self.prev_carry = self.carry;
        self.carry = false;

        let word = image.fetch(self.offset, self.pc);
        let instr = MicroInstruction::new(word);
        trace!(
            "pc={:#04x} offset={} h={:#04x} l={:#04x}",
            self.pc,
            self.offset.value(),
            instr.h(),
            instr.l()
        );

        let mut pc_written = false;

        match instr.family() {
            Family::Call(target) => {
                self.ret = self.pc.wrapping_add(1);
                self.pc = target;
                pc_written = true;
            }
            Family::Branch(target) => {
                if !self.prev_carry {
                    self.pc = target;
                    pc_written = true;
                }
            }
            Family::Arith(slice_code, op) => {
                self.execute_arith(slice_code, op);
            }
            Family::Misc => {
                pc_written = self.execute_misc(&instr);
            }
        }

        if !pc_written {
            self.pc = self.pc.wrapping_add(1);
        }

        let display_falling = self.display_enable_prev && !self.display_enable;
        self.display_enable_prev = self.display_enable;

        let error_trap = usize::from(self.pc) == settings.error_trap_pc && self.offset.value() == 0;
        if error_trap {
            warn!(
                "error trap: pc reached {} in bank 0",
                settings.error_trap_pc
            );
        }

        StepOutcome {
            display_falling,
            error_trap,
        }
    }

    /// `key_rom`, the CPU's latched key-code register, consumed by
    /// `jump-on-key`. Reading it before any key has ever been latched is a
    /// precondition violation (§7, §9 open questions).
    #[must_use]
    pub fn key_rom(&self) -> u8 {
        debug_assert!(
            self.has_latched_key,
            "jump-on-key read a stale key_rom before any key was ever latched"
        );
        self.key_rom
    }

    /// The misc-family sub-dispatch (`L & 0x03 == 0b00`).
    ///
    /// This is a cascade of independent checks against different bit fields
    /// of the same instruction, not a single exclusive match: the real PLA is
    /// an AND-OR plane where several gates can fire in the same cycle. Two of
    /// the special-move rules (`disable display`, `toggle display`) happen to
    /// share `L & 0xEF == 0x28`; because they're tested by exact equality on
    /// `H & 3` here, they can never both fire for one instruction, which is
    /// the documented, intended precedence (§9 open questions) — the
    /// `misc_display_rules_are_mutually_exclusive` test below guards it.
    ///
    /// Returns whether `pc` was written by this cycle (`return` or
    /// `jump-on-key`), so the caller knows whether to still advance `pc` by one.
    fn execute_misc(&mut self, instr: &MicroInstruction) -> bool {
        let mut pc_written = false;

        if instr.l() == 0x30 {
            self.pc = self.ret;
            pc_written = true;
            debug!("return -> pc={:#04x}", self.pc);
        }
        if instr.l() == 0x10 {
            self.offset = instr.bank_select();
            let bank = self.offset.value();
            info!("rom bank <- {bank}");
        }
        if instr.l() == 0xD0 {
            self.pc = self.key_rom();
            self.s[0] = false;
            pc_written = true;
            info!("jump-on-key -> pc={:#04x}", self.pc);
        }

        match instr.l3f() {
            0x14 => self.carry = self.s[usize::from(instr.bitsel())],
            0x04 => self.s[usize::from(instr.bitsel())] = true,
            0x24 => self.s[usize::from(instr.bitsel())] = false,
            0x34 => self.s = [false; 12],
            0x2C => self.carry = self.p.value() == instr.bitsel(),
            0x0C => self.p = u4::new(instr.bitsel()),
            0x3C => self.p = u4::new((self.p.value() + 1) & 0x0F),
            0x1C => self.p = u4::new(self.p.value().wrapping_sub(1) & 0x0F),
            0x18 => {
                let p = usize::from(self.p.value());
                self.c[p] = instr.const_nibble();
                self.p = u4::new(self.p.value().wrapping_sub(1) & 0x0F);
            }
            _ => {}
        }

        let h3 = instr.h3();
        let l_ef = instr.l_ef();

        if h3 == 0 && l_ef == 0xA8 {
            std::mem::swap(&mut self.c, &mut self.m);
        }
        if h3 == 1 && l_ef == 0x28 {
            let (oc, od, oe) = (self.c, self.d, self.e);
            self.f = oe;
            self.e = od;
            self.d = oc;
        }
        if h3 == 1 && l_ef == 0xA8 {
            let (od, oe, of) = (self.d, self.e, self.f);
            self.a = od;
            self.d = oe;
            self.e = of;
        }
        if h3 == 2 && l_ef == 0xA8 {
            self.c = self.m;
        }
        if h3 == 3 && l_ef == 0x28 {
            let (oc, od, oe, of) = (self.c, self.d, self.e, self.f);
            self.d = oc;
            self.e = od;
            self.f = oe;
            self.c = of;
        }
        if h3 == 3 && l_ef == 0xA8 {
            self.clear_all();
        }
        if h3 == 0 && l_ef == 0x28 {
            self.display_enable = false;
        }
        if h3 == 2 && l_ef == 0x28 {
            self.display_enable = !self.display_enable;
        }

        pc_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rom::Word;

    fn word(h: u8, l: u8) -> MicroInstruction {
        MicroInstruction::new(Word { h, l })
    }

    #[test]
    fn power_on_is_all_zero() {
        let cpu = Cpu::new();
        assert!(cpu.a.iter().all(|d| d.value() == 0));
        assert!(cpu.s.iter().all(|b| !b));
        assert_eq!(cpu.pc, 0);
    }

    #[test]
    fn clear_all_is_idempotent() {
        let mut cpu = Cpu::new();
        cpu.a[3] = u4::new(7);
        cpu.m[0] = u4::new(9);
        cpu.clear_all();
        cpu.clear_all();
        assert!(cpu.a.iter().all(|d| d.value() == 0));
        assert!(cpu.m.iter().all(|d| d.value() == 0));
    }

    #[test]
    fn push_then_pop_restores_d_e_f_but_not_c() {
        let mut cpu = Cpu::new();
        cpu.c[0] = u4::new(5);

        // push: F<-E, E<-D, D<-C
        cpu.execute_misc(&word(0b01, 0x28));
        assert_eq!(cpu.d[0].value(), 5);
        assert_eq!(cpu.c[0].value(), 5, "push leaves C unchanged");

        cpu.c[0] = u4::new(9); // simulate the RPN stack being used for new entry

        // pop: A<-D, D<-E, E<-F
        cpu.execute_misc(&word(0b01, 0xA8));
        assert_eq!(cpu.a[0].value(), 5, "pop restores D's pushed value into A");
        assert_ne!(cpu.c[0].value(), 9 - 9, "pop never touches C");
    }

    #[test]
    fn rom_bank_select_to_current_bank_is_a_no_op() {
        let mut cpu = Cpu::new();
        cpu.offset = u3::new(0);
        // H=0,L=0x10 selects bank ((0<<1)&6)|((0x10>>7)&1) = 0
        cpu.execute_misc(&word(0x00, 0x10));
        assert_eq!(cpu.offset.value(), 0);
    }

    #[test]
    fn misc_display_rules_are_mutually_exclusive() {
        for h in 0u8..=0xFF {
            let disable = (h & 3) == 0;
            let toggle = (h & 3) == 2;
            assert!(!(disable && toggle), "h={h:#04x} matched both rules");
        }
    }

    #[test]
    fn jump_on_key_transfers_pc_and_clears_status_zero() {
        let mut cpu = Cpu::new();
        let mut latch = KeyLatch::new();
        latch.set(42);
        let mut rom = Rom::new();
        rom.load(&[0x00, 0xD0]); // misc family, L==0xD0
        let settings = Settings::default();

        cpu.step(&rom, &mut latch, &settings);
        assert_eq!(cpu.pc, 42);
        assert!(!cpu.s[0]);
    }

    #[test]
    fn branch_taken_when_prev_carry_is_clear() {
        let mut cpu = Cpu::new();
        let mut latch = KeyLatch::new();
        let settings = Settings::default();
        // L&3==0b11 branch family; H=0x03,L=0xFF -> target ((0xFC)>>2)|((3)<<6) = 0xFF
        let mut rom = Rom::new();
        rom.load(&[0x03, 0xFF]);

        cpu.prev_carry = false;
        cpu.carry = false;
        cpu.step(&rom, &mut latch, &settings);
        assert_eq!(cpu.pc, 0xFF);
    }

    #[test]
    fn branch_not_taken_when_prev_carry_is_set() {
        let mut cpu = Cpu::new();
        let mut latch = KeyLatch::new();
        let settings = Settings::default();
        let mut rom = Rom::new();
        rom.load(&[0x03, 0xFF]);

        cpu.carry = true; // becomes prev_carry at the top of the next step
        cpu.step(&rom, &mut latch, &settings);
        assert_eq!(cpu.pc, 1);
    }

    #[test]
    fn error_trap_fires_at_configured_pc_in_bank_zero() {
        let mut cpu = Cpu::new();
        cpu.pc = 190;
        cpu.offset = u3::new(0);
        let mut latch = KeyLatch::new();
        let settings = Settings::default();
        let mut bytes = [0u8; rom::ROM_BYTES];
        bytes[190 * 2] = 0x00;
        bytes[190 * 2 + 1] = 0x00;
        let rom = Rom::from_bytes(&bytes);

        let outcome = cpu.step(&rom, &mut latch, &settings);
        assert!(outcome.error_trap);
    }
}
