//! The HP-35 key code space and the single-slot key latch.
//!
//! The physical key-matrix scanner lives in the host shell (out of scope, per
//! the purpose statement); this module only defines the numbering the scanner
//! and the microcode ROM agree on, and the mailbox the shell uses to hand one
//! pending key to the CPU at a time.

use log::trace;

/// The canonical HP-35 key codes consumed by the `jump-on-key` microinstruction
/// and by the script tape (§6 of the external interface contract).
#[allow(missing_docs)]
pub mod code {
    pub const CLR: u8 = 0;
    pub const EXP: u8 = 2;
    pub const LN: u8 = 3;
    pub const LOG: u8 = 4;
    pub const POW: u8 = 6;
    pub const RCL: u8 = 8;
    pub const STO: u8 = 10;
    pub const ROT: u8 = 11;
    pub const SWAP: u8 = 12;
    pub const INV: u8 = 14;
    pub const SIX: u8 = 18;
    pub const FIVE: u8 = 19;
    pub const FOUR: u8 = 20;
    pub const ADD: u8 = 22;
    pub const THREE: u8 = 26;
    pub const TWO: u8 = 27;
    pub const ONE: u8 = 28;
    pub const MULT: u8 = 30;
    pub const PI: u8 = 34;
    pub const DOT: u8 = 35;
    pub const ZERO: u8 = 36;
    pub const DIV: u8 = 38;
    pub const TAN: u8 = 40;
    pub const COS: u8 = 42;
    pub const SIN: u8 = 43;
    pub const ARC: u8 = 44;
    pub const SQRT: u8 = 46;
    pub const NINE: u8 = 50;
    pub const EIGHT: u8 = 51;
    pub const SEVEN: u8 = 52;
    pub const SUB: u8 = 54;
    pub const CLX: u8 = 56;
    pub const EEX: u8 = 58;
    pub const CHS: u8 = 59;
    pub const ENTER: u8 = 62;
}

/// The sentinel meaning "no key pending", used both by the key latch and by
/// the script tape's terminator.
pub const NO_KEY: u8 = 0xFF;

/// Extended-function key codes. These never reach the CPU directly: the shell
/// either changes display mode (HYP, brightness) or arms the script sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Extended {
    Hyp,
    Brightness,
    RectToPolar,
    PolarToRect,
    PresentValue,
    NormalDistribution,
    LogGamma,
    QuadraticRoots,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
}

impl Extended {
    /// Decode an extended-function key code (`64..77`) into its variant.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        let variant = match code {
            64 => Self::Hyp,
            65 => Self::Brightness,
            66 => Self::RectToPolar,
            67 => Self::PolarToRect,
            68 => Self::PresentValue,
            69 => Self::NormalDistribution,
            70 => Self::LogGamma,
            71 => Self::QuadraticRoots,
            72 => Self::Sinh,
            73 => Self::Cosh,
            74 => Self::Tanh,
            75 => Self::Asinh,
            76 => Self::Acosh,
            77 => Self::Atanh,
            _ => return None,
        };
        Some(variant)
    }
}

/// A single-slot mailbox carrying at most one pending HP-35 key code.
///
/// Single-writer (the shell, on a keypress), single-reader (the CPU, once per
/// cycle). No cross-thread synchronization is needed: the whole system is
/// single-threaded cooperative (§5).
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyLatch {
    pending: Option<u8>,
}

impl KeyLatch {
    /// Create an empty latch.
    #[must_use]
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Latch a key code, overwriting whatever was previously pending.
    pub fn set(&mut self, code: u8) {
        trace!("key latch: {code}");
        self.pending = Some(code);
    }

    /// Check whether a key code is currently latched, without consuming it.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending key code, clearing the latch.
    pub fn take(&mut self) -> Option<u8> {
        self.pending.take()
    }
}
