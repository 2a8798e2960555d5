//! The script sequencer: synthesizes functions absent from the 1536-byte ROM
//! by feeding a canned sequence of virtual key codes into the CPU's key latch,
//! one per "display-complete" event.
//!
//! The tape below reconstructs each extended function from keys the base ROM
//! already understands (chiefly `INV LN` for `e^x`, since the HP-35 has no
//! dedicated exponential key), the same way a user would key it in by hand.
//! It does not claim to reproduce the literal, never-written ROM banks 3+ —
//! only to exercise the sequencer machinery end to end.

use log::debug;

use crate::keys::{code, Extended, KeyLatch, NO_KEY};
use crate::settings::Settings;

const END: u8 = NO_KEY;

const R2P: &[u8] = &[code::STO, code::SWAP, code::RCL, code::ARC, END];
const P2R: &[u8] = &[code::STO, code::SIN, code::SWAP, code::RCL, code::COS, END];
const PV: &[u8] = &[
    code::ONE, code::ADD, code::INV, code::POW, code::CHS, code::ONE, code::ADD, code::DIV, END,
];
const ND: &[u8] = &[
    code::CHS, code::INV, code::LN, code::SWAP, code::MULT, code::SQRT, END,
];
const GAMMA: &[u8] = &[code::LN, code::STO, code::INV, code::LN, END];
const QE: &[u8] = &[
    code::STO, code::SWAP, code::CHS, code::SWAP, code::SQRT, code::SWAP, code::SUB, code::TWO,
    code::DIV, END,
];
const SINH: &[u8] = &[
    code::STO, code::INV, code::LN, code::SWAP, code::CHS, code::INV, code::LN, code::SUB,
    code::TWO, code::DIV, END,
];
const COSH: &[u8] = &[
    code::STO, code::INV, code::LN, code::SWAP, code::CHS, code::INV, code::LN, code::ADD,
    code::TWO, code::DIV, END,
];
const TANH: &[u8] = &[
    code::STO, code::INV, code::LN, code::SWAP, code::CHS, code::INV, code::LN, code::ROT, END,
];
const ASINH: &[u8] = &[
    code::STO, code::SWAP, code::MULT, code::ONE, code::ADD, code::SQRT, code::RCL, code::ADD,
    code::LN, END,
];
const ACOSH: &[u8] = &[
    code::STO, code::SWAP, code::MULT, code::ONE, code::SUB, code::SQRT, code::RCL, code::ADD,
    code::LN, END,
];
const ATANH: &[u8] = &[
    code::STO, code::ONE, code::ADD, code::RCL, code::CHS, code::ONE, code::ADD, code::DIV,
    code::LN, code::TWO, code::DIV, END,
];

/// Returns the entry-point tape for a scripted extended function, or `None`
/// for `Hyp`/`Brightness`, which the shell handles itself without ever
/// arming the sequencer.
fn entry_point(function: Extended) -> Option<&'static [u8]> {
    let tape = match function {
        Extended::Hyp | Extended::Brightness => return None,
        Extended::RectToPolar => R2P,
        Extended::PolarToRect => P2R,
        Extended::PresentValue => PV,
        Extended::NormalDistribution => ND,
        Extended::LogGamma => GAMMA,
        Extended::QuadraticRoots => QE,
        Extended::Sinh => SINH,
        Extended::Cosh => COSH,
        Extended::Tanh => TANH,
        Extended::Asinh => ASINH,
        Extended::Acosh => ACOSH,
        Extended::Atanh => ATANH,
    };
    Some(tape)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Armed(&'static [u8]),
    Cooling(&'static [u8], u32),
}

/// Feeds virtual key codes into the CPU, one per display-complete event, to
/// synthesize a function not present in the base ROM.
#[derive(Debug)]
pub struct ScriptSequencer {
    state: State,
}

impl Default for ScriptSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptSequencer {
    /// Create an idle sequencer.
    #[must_use]
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    /// Whether the sequencer currently has a function in progress.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        !matches!(self.state, State::Idle)
    }

    /// Arm the sequencer to begin feeding `function`'s tape. Does nothing for
    /// `Hyp`/`Brightness`, which never reach the sequencer.
    pub fn arm(&mut self, function: Extended) {
        if let Some(tape) = entry_point(function) {
            debug!("script sequencer armed: {function:?}");
            self.state = State::Armed(tape);
        }
    }

    /// Disarm immediately, discarding whatever tape position was reached.
    pub fn cancel(&mut self) {
        if self.is_armed() {
            debug!("script sequencer cancelled mid-tape");
        }
        self.state = State::Idle;
    }

    /// Advance the sequencer by one CPU microcycle.
    ///
    /// `display_falling` is this cycle's [`crate::cpu::StepOutcome::display_falling`];
    /// `settings.script_tick_interval` is the minimum spacing, in cycles,
    /// between two successive tape-byte injections.
    pub fn tick(&mut self, latch: &mut KeyLatch, display_falling: bool, settings: &Settings) {
        self.state = match self.state {
            State::Idle => State::Idle,
            State::Armed(tape) => Self::inject(tape, latch),
            State::Cooling(tape, ticks) => {
                let ticks = ticks + 1;
                if display_falling && ticks >= settings.script_tick_interval {
                    State::Armed(tape)
                } else {
                    State::Cooling(tape, ticks)
                }
            }
        };
    }

    fn inject(tape: &'static [u8], latch: &mut KeyLatch) -> State {
        match tape.split_first() {
            None | Some((&NO_KEY, _)) => {
                debug!("script sequencer reached sentinel, disarming");
                State::Idle
            }
            Some((&byte, rest)) => {
                latch.set(byte);
                State::Cooling(rest, 0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            script_tick_interval: 2,
            ..Settings::default()
        }
    }

    #[test]
    fn idle_sequencer_never_touches_the_latch() {
        let mut seq = ScriptSequencer::new();
        let mut latch = KeyLatch::new();
        seq.tick(&mut latch, true, &settings());
        assert!(!latch.is_pending());
        assert!(!seq.is_armed());
    }

    #[test]
    fn arming_injects_first_byte_on_the_next_tick() {
        let mut seq = ScriptSequencer::new();
        let mut latch = KeyLatch::new();
        seq.arm(Extended::Sinh);
        seq.tick(&mut latch, false, &settings());
        assert_eq!(latch.take(), Some(code::STO));
        assert!(seq.is_armed());
    }

    #[test]
    fn next_byte_waits_for_both_the_tick_interval_and_a_falling_edge() {
        let mut seq = ScriptSequencer::new();
        let mut latch = KeyLatch::new();
        seq.arm(Extended::Sinh);
        seq.tick(&mut latch, false, &settings()); // injects STO, enters Cooling
        latch.take();

        seq.tick(&mut latch, false, &settings()); // tick 1, no falling edge
        assert!(!latch.is_pending());

        seq.tick(&mut latch, true, &settings()); // tick 2, falling edge -> Armed
        assert!(!latch.is_pending(), "Armed still needs one more tick to fire");

        seq.tick(&mut latch, false, &settings());
        assert_eq!(latch.take(), Some(code::INV));
    }

    #[test]
    fn sentinel_disarms_the_sequencer() {
        let mut seq = ScriptSequencer::new();
        let mut latch = KeyLatch::new();
        seq.arm(Extended::Hyp); // no tape: arm() is a no-op
        assert!(!seq.is_armed());

        seq.arm(Extended::RectToPolar);
        for _ in 0..64 {
            seq.tick(&mut latch, true, &Settings {
                script_tick_interval: 1,
                ..Settings::default()
            });
            latch.take();
            if !seq.is_armed() {
                break;
            }
        }
        assert!(!seq.is_armed(), "tape must reach its sentinel within a bounded number of ticks");
    }

    #[test]
    fn cancel_disarms_immediately() {
        let mut seq = ScriptSequencer::new();
        seq.arm(Extended::QuadraticRoots);
        seq.cancel();
        assert!(!seq.is_armed());
    }
}
