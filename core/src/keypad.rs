//! The logical key-press dispatch mechanism: function-layer cycling over a
//! 3x16 table of physical key positions.
//!
//! The physical key-matrix scanner itself — which voltages correspond to
//! which button — is the host board's concern and out of scope here (§1).
//! What belongs to the core is the *mechanism* every HP-35-shaped shell needs
//! regardless of its concrete keyboard: an `F`-key layer cycle and a lookup
//! from `(physical key, layer)` to either a canonical key code or an extended
//! function id.

use crate::keys::Extended;

/// Number of physical key positions addressed by the dispatch table.
pub const PHYSICAL_KEYS: usize = 16;

/// Number of function layers the `F` key cycles through before wrapping to
/// "screen off".
const LAYERS: usize = 3;

/// What a `(physical key, layer)` pair resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapped {
    /// A canonical HP-35 key code, to be latched directly into the CPU.
    Key(u8),
    /// An extended function, to be handled by arming the script sequencer
    /// (or, for `Hyp`/`Brightness`, by the shell's own display-mode state).
    Extended(Extended),
}

/// The current function layer, cycled by the `F` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FunctionLayer {
    /// `fg == 0`: the primary (unshifted) function of each key.
    #[default]
    Primary,
    /// `fg == 1`: the secondary (single-shifted) function.
    Secondary,
    /// `fg == 2`: the tertiary (extended-function) layer.
    Tertiary,
}

impl FunctionLayer {
    fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
            Self::Tertiary => 2,
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Tertiary,
            Self::Tertiary => Self::Primary,
        }
    }
}

/// A 3x16 dispatch table mapping physical key position and function layer to
/// a [`Mapped`] result, plus the `F`-key layer cursor and "screen off" latch.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: [[Option<Mapped>; LAYERS]; PHYSICAL_KEYS],
    layer: FunctionLayer,
    screen_off: bool,
}

impl Dispatcher {
    /// Build a dispatcher over a caller-supplied key layout.
    #[must_use]
    pub fn new(table: [[Option<Mapped>; LAYERS]; PHYSICAL_KEYS]) -> Self {
        Self {
            table,
            layer: FunctionLayer::Primary,
            screen_off: false,
        }
    }

    /// The layer currently selected.
    #[must_use]
    pub fn layer(&self) -> FunctionLayer {
        self.layer
    }

    /// Whether the third `F` press has put the shell into screen-off mode.
    #[must_use]
    pub fn is_screen_off(&self) -> bool {
        self.screen_off
    }

    /// Handle a press of the `F` key: cycles `Primary -> Secondary -> Tertiary`,
    /// and a press from `Tertiary` enters screen-off instead of wrapping.
    pub fn press_f(&mut self) {
        if self.screen_off {
            self.screen_off = false;
            self.layer = FunctionLayer::Primary;
            return;
        }
        if self.layer == FunctionLayer::Tertiary {
            self.screen_off = true;
        } else {
            self.layer = self.layer.next();
        }
    }

    /// Resolve a physical key position at the current layer, then reset the
    /// layer back to `Primary` (every real HP-35 shift key is one-shot).
    ///
    /// Returns `None` for an out-of-range position or an unmapped entry.
    pub fn press(&mut self, physical_key: usize) -> Option<Mapped> {
        let result = self
            .table
            .get(physical_key)
            .and_then(|layers| layers[self.layer.index()]);
        self.layer = FunctionLayer::Primary;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::code;

    fn single_key_table(primary: u8, secondary: u8, tertiary: Extended) -> [[Option<Mapped>; LAYERS]; PHYSICAL_KEYS] {
        let mut table = [[None; LAYERS]; PHYSICAL_KEYS];
        table[0] = [
            Some(Mapped::Key(primary)),
            Some(Mapped::Key(secondary)),
            Some(Mapped::Extended(tertiary)),
        ];
        table
    }

    #[test]
    fn press_without_f_uses_primary_layer() {
        let mut dispatcher = Dispatcher::new(single_key_table(code::ONE, code::SIN, Extended::Hyp));
        assert_eq!(dispatcher.press(0), Some(Mapped::Key(code::ONE)));
    }

    #[test]
    fn f_cycles_through_three_layers_then_enters_screen_off() {
        let mut dispatcher = Dispatcher::new(single_key_table(code::ONE, code::SIN, Extended::Hyp));
        dispatcher.press_f();
        assert_eq!(dispatcher.layer(), FunctionLayer::Secondary);
        dispatcher.press_f();
        assert_eq!(dispatcher.layer(), FunctionLayer::Tertiary);
        dispatcher.press_f();
        assert!(dispatcher.is_screen_off());
    }

    #[test]
    fn a_key_press_resets_the_layer_to_primary() {
        let mut dispatcher = Dispatcher::new(single_key_table(code::ONE, code::SIN, Extended::Hyp));
        dispatcher.press_f();
        assert_eq!(dispatcher.press(0), Some(Mapped::Key(code::SIN)));
        assert_eq!(dispatcher.layer(), FunctionLayer::Primary);
    }

    #[test]
    fn pressing_f_again_from_screen_off_wakes_back_to_primary() {
        let mut dispatcher = Dispatcher::new(single_key_table(code::ONE, code::SIN, Extended::Hyp));
        dispatcher.press_f();
        dispatcher.press_f();
        dispatcher.press_f();
        assert!(dispatcher.is_screen_off());
        dispatcher.press_f();
        assert!(!dispatcher.is_screen_off());
        assert_eq!(dispatcher.layer(), FunctionLayer::Primary);
    }

    #[test]
    fn out_of_range_position_resolves_to_none() {
        let mut dispatcher = Dispatcher::new(single_key_table(code::ONE, code::SIN, Extended::Hyp));
        assert_eq!(dispatcher.press(PHYSICAL_KEYS + 1), None);
    }
}
