//! 12-bit value → SPI waveform lookup table.
//!
//! The WS2812B reads one data bit per ~1.25 µs: a long high pulse is a `1`,
//! a short one a `0`. Clocking SPI at three times the bit rate lets each
//! data bit be drawn with three symbols:
//!
//! ```text
//! 1 → 1 1 0
//! 0 → 1 0 0
//! ```
//!
//! The SPI controllers this driver targets hold MOSI low for one extra clock
//! between bytes. That pause is the ninth symbol of every 3-bit group, and
//! since both triples end low it is always exactly the symbol the encoding
//! wants there. Each group of three data bits is therefore stored as its
//! first eight symbols only:
//!
//! ```text
//! data bits   1   1   0
//! symbols     110 110 10[0]   [0] = pause supplied by the transport
//! byte        1101_1010 = 0xDA
//! ```
//!
//! Twelve data bits become four bytes. The table holds all 4096 of them.

// Table construction runs in const context; the indices are bounded by the
// loop conditions.
#![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use crate::error::OutOfRangeError;

/// Largest value the mapper accepts.
pub const TWELVE_BIT_MAX: u16 = 0x0FFF;

/// Number of table entries (one per 12-bit value).
pub const TABLE_LEN: usize = TWELVE_BIT_MAX as usize + 1;

/// Bytes produced per 12-bit value.
pub const PATTERN_LEN: usize = 4;

/// Data bits packed into each pattern byte.
const BITS_PER_BYTE: usize = 3;

const ONE_SYMBOLS: u16 = 0b110;
const ZERO_SYMBOLS: u16 = 0b100;

/// Expand one 12-bit value into its 4-byte waveform.
const fn expand(value: u16) -> [u8; PATTERN_LEN] {
    let mut out = [0u8; PATTERN_LEN];
    let mut byte = 0;
    while byte < PATTERN_LEN {
        let mut symbols: u16 = 0;
        let mut i = 0;
        while i < BITS_PER_BYTE {
            let shift = 11 - (byte * BITS_PER_BYTE + i);
            let triple = if (value >> shift) & 1 == 1 {
                ONE_SYMBOLS
            } else {
                ZERO_SYMBOLS
            };
            symbols = (symbols << 3) | triple;
            i += 1;
        }
        // Nine symbols; the last one is the transport's pause bit.
        out[byte] = (symbols >> 1) as u8;
        byte += 1;
    }
    out
}

const fn build_table() -> [[u8; PATTERN_LEN]; TABLE_LEN] {
    let mut table = [[0u8; PATTERN_LEN]; TABLE_LEN];
    let mut value = 0;
    while value < TABLE_LEN {
        table[value] = expand(value as u16);
        value += 1;
    }
    table
}

static BIT_PATTERNS: [[u8; PATTERN_LEN]; TABLE_LEN] = build_table();

/// Lookup from 12-bit values to WS2812B SPI waveforms.
///
/// Backed by a table computed at compile time, so every instance shares
/// the same read-only data.
#[derive(Debug, Clone, Copy)]
pub struct TwelveBitIntToBitPatternMapper {
    table: &'static [[u8; PATTERN_LEN]; TABLE_LEN],
}

impl Default for TwelveBitIntToBitPatternMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl TwelveBitIntToBitPatternMapper {
    /// Mapper over the shared table.
    pub const fn new() -> Self {
        Self {
            table: &BIT_PATTERNS,
        }
    }

    /// Waveform bytes for `value`.
    ///
    /// # Errors
    ///
    /// [`OutOfRangeError`] if `value` does not fit in 12 bits.
    pub fn get_bit_pattern(&self, value: u16) -> Result<[u8; PATTERN_LEN], OutOfRangeError> {
        self.table
            .get(usize::from(value))
            .copied()
            .ok_or(OutOfRangeError {
                value: u32::from(value),
                min: 0,
                max: u32::from(TWELVE_BIT_MAX),
            })
    }
}

/// Recover the 12-bit value from a waveform.
///
/// Re-inserts the pause symbol after each byte and reads the middle symbol
/// of every triple. Returns `None` if a triple is neither `110` nor `100`.
pub fn decode(pattern: [u8; PATTERN_LEN]) -> Option<u16> {
    let mut value: u16 = 0;
    for byte in pattern {
        let symbols = u16::from(byte) << 1;
        for shift in [6, 3, 0] {
            let bit = match (symbols >> shift) & 0b111 {
                ONE_SYMBOLS => 1,
                ZERO_SYMBOLS => 0,
                _ => return None,
            };
            value = (value << 1) | bit;
        }
    }
    Some(value)
}
