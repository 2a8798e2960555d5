//! Emulation of the HP-35's 1536-byte microcode ROM image.
//!
//! Unlike the TMS1100 this core is modeled after, the HP-35 ROM is not a
//! per-cartridge asset — it is the one fixed program that makes the device a
//! calculator at all. The image is still treated as immutable shared storage
//! loaded once at startup, the same way the teacher's cartridge ROM is loaded.

use arbitrary_int::u3;

/// The size, in bytes, of the HP-35 ROM image: 3 banks of 256 10-bit words,
/// each word stored as a big-endian `(H, L)` byte pair, each bank spanning
/// 512 bytes per the `offset * 512 + pc * 2` addressing formula.
pub const ROM_BYTES: usize = BANK_WORDS * 2 * 3;

/// The number of 10-bit microinstructions per ROM bank.
pub const BANK_WORDS: usize = 256;

/// A single fetched microinstruction, as the raw `(H, L)` byte pair read from ROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word {
    /// The high byte; only its low 2 bits carry the upper bits of the 10-bit word.
    pub h: u8,
    /// The low byte.
    pub l: u8,
}

/// The HP-35's 1536-byte (768 x 10-bit) microcode ROM.
///
/// Banks 0..2 are populated by the real ROM dump; banks 3..7 are addressable
/// by `OFFSET` but undefined, and a correct ROM image never selects them.
#[derive(Debug, Clone)]
pub struct Rom {
    data: [u8; ROM_BYTES],
}

impl Default for Rom {
    fn default() -> Self {
        Self::new()
    }
}

impl Rom {
    /// Create a new (zeroed) ROM image.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: [0; ROM_BYTES],
        }
    }

    /// Load a ROM image from a byte slice.
    ///
    /// If the given slice is shorter than [`ROM_BYTES`] the remaining space is
    /// filled with zeroes; this is only useful for constructing small synthetic
    /// ROMs in tests.
    ///
    /// # Panics
    ///
    /// If the given slice is longer than [`ROM_BYTES`].
    pub fn load(&mut self, bytes: &[u8]) {
        assert!(
            bytes.len() <= ROM_BYTES,
            "ROM image is larger than the HP-35's 1536-byte address space"
        );

        self.data[..bytes.len()].copy_from_slice(bytes);
        self.data[bytes.len()..].fill(0);
    }

    /// Build a ROM image directly from a byte slice (test/tooling convenience).
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut rom = Self::new();
        rom.load(bytes);
        rom
    }

    /// Fetch the microinstruction word at `pc` within ROM bank `offset`.
    ///
    /// Address `pc` within bank `offset` is at byte index `offset * 512 + pc * 2`,
    /// per the wire layout in the external interface contract. Banks 0..2 are
    /// always in range; the `% ROM_BYTES` only guards the undefined banks
    /// 3..7, which a correct ROM image never selects.
    #[must_use]
    pub fn fetch(&self, offset: u3, pc: u8) -> Word {
        let base = usize::from(offset.value()) * (BANK_WORDS * 2) + usize::from(pc) * 2;
        let base = base % ROM_BYTES;
        Word {
            h: self.data[base],
            l: self.data[base + 1],
        }
    }

    /// Return the checksum of the data contained in this ROM image.
    #[must_use]
    pub fn checksum(&self) -> u16 {
        self.data
            .iter()
            .copied()
            .map(u16::from)
            .fold(0, u16::wrapping_add)
    }
}
