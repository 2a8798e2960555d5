#![doc = include_str!("../../README.md")]
#![forbid(missing_docs)]
#![forbid(unsafe_code)]

pub mod cpu;
pub mod display;
pub mod keypad;
pub mod keys;
pub mod script;
pub mod settings;

use cpu::{Cpu, StepOutcome};
use cpu::rom::Rom;
use display::FrameBuffer;
use keys::{Extended, KeyLatch};
use script::ScriptSequencer;
use settings::Settings;

/// The whole emulated machine: CPU, ROM image, key latch, script sequencer,
/// and host-configurable settings, advanced one microcycle per [`System::tick`].
#[derive(Debug)]
pub struct System {
    /// The CPU: registers, status, and the microinstruction executor.
    pub cpu: Cpu,
    /// The immutable 1536-byte microcode ROM image.
    pub rom: Rom,
    /// The single-slot mailbox carrying the next key to inject.
    pub latch: KeyLatch,
    /// The extended-function tape sequencer.
    pub sequencer: ScriptSequencer,
    /// Host-configurable pacing and error-trap parameters.
    pub settings: Settings,
}

impl System {
    /// Build a system around a loaded ROM image, with default settings.
    #[must_use]
    pub fn new(rom: Rom) -> Self {
        Self {
            cpu: Cpu::new(),
            rom,
            latch: KeyLatch::new(),
            sequencer: ScriptSequencer::new(),
            settings: Settings::default(),
        }
    }

    /// Deliver a canonical HP-35 key code to the CPU's input latch.
    pub fn press_key(&mut self, code: u8) {
        self.latch.set(code);
    }

    /// Arm the script sequencer to synthesize an extended function.
    ///
    /// `Extended::Hyp`/`Extended::Brightness` are shell-side display-mode
    /// toggles and never arm the sequencer (see [`ScriptSequencer::arm`]).
    pub fn press_extended(&mut self, function: Extended) {
        if self.settings.cancel_script_on_keypress {
            self.sequencer.cancel();
        }
        self.sequencer.arm(function);
    }

    /// Advance the whole system by one loop iteration: execute exactly one
    /// CPU microcycle, then let the script sequencer react to this cycle's
    /// display-falling-edge signal.
    ///
    /// Returns the frame to push to the display if this cycle's display
    /// latch fell, and whether the error trap fired.
    pub fn tick(&mut self) -> (Option<FrameBuffer>, bool) {
        let StepOutcome {
            display_falling,
            error_trap,
        } = self.cpu.step(&self.rom, &mut self.latch, &self.settings);

        self.sequencer
            .tick(&mut self.latch, display_falling, &self.settings);

        let frame = display_falling.then(|| display::project(&self.cpu.a, &self.cpu.b));
        (frame, error_trap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_system_with_an_empty_rom_never_panics_across_many_cycles() {
        let mut system = System::new(Rom::new());
        for _ in 0..10_000 {
            system.tick();
        }
    }

    #[test]
    fn pressing_a_key_makes_it_visible_to_the_next_cpu_fetch() {
        let mut system = System::new(Rom::new());
        system.press_key(keys::code::SQRT);
        assert!(system.latch.is_pending());
        system.tick();
        assert!(!system.latch.is_pending());
    }

    #[test]
    fn arming_an_extended_function_feeds_its_tape_through_the_key_latch() {
        let mut system = System::new(Rom::new());
        system.press_extended(Extended::QuadraticRoots);
        assert!(system.sequencer.is_armed());
        system.tick();
        assert!(system.latch.is_pending(), "the sequencer should have injected its first byte");
    }
}
