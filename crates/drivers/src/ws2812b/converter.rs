//! Strip colors → SPI payload.

use alloc::vec::Vec;

use super::bit_pattern::{TwelveBitIntToBitPatternMapper, PATTERN_LEN};
use super::sequence::ColorChannelSequence;
use crate::error::OutOfRangeError;

/// SPI bytes emitted per LED: two 12-bit halves of four bytes each.
pub const BYTES_PER_LED: usize = 2 * PATTERN_LEN;

const TWELVE_BIT_MASK: u32 = 0x0FFF;

/// Encodes packed `0xRRGGBB` colors into the WS2812B SPI waveform.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorToBitPatternConverter {
    sequence: ColorChannelSequence,
    mapper: TwelveBitIntToBitPatternMapper,
}

impl ColorToBitPatternConverter {
    /// Converter emitting channels in `sequence` order.
    pub const fn new(sequence: ColorChannelSequence) -> Self {
        Self {
            sequence,
            mapper: TwelveBitIntToBitPatternMapper::new(),
        }
    }

    /// Channel order this converter emits.
    pub const fn sequence(&self) -> ColorChannelSequence {
        self.sequence
    }

    /// Encode `colors` into a fresh buffer of `8 × colors.len()` bytes.
    pub fn convert(&self, colors: &[u32]) -> Vec<u8> {
        let mut out = Vec::with_capacity(colors.len().saturating_mul(BYTES_PER_LED));
        for &color in colors {
            out.extend_from_slice(&self.encode_color(color));
        }
        out
    }

    /// Encode `colors` into `out`, which must be exactly `8 × colors.len()`
    /// bytes long.
    ///
    /// # Errors
    ///
    /// [`OutOfRangeError`] carrying the actual and required lengths when
    /// `out` has the wrong size. Nothing is written in that case.
    pub fn convert_into(&self, colors: &[u32], out: &mut [u8]) -> Result<(), OutOfRangeError> {
        let required = colors.len().saturating_mul(BYTES_PER_LED);
        if out.len() != required {
            let required = u32::try_from(required).unwrap_or(u32::MAX);
            return Err(OutOfRangeError {
                value: u32::try_from(out.len()).unwrap_or(u32::MAX),
                min: required,
                max: required,
            });
        }
        for (chunk, &color) in out.chunks_exact_mut(BYTES_PER_LED).zip(colors) {
            chunk.copy_from_slice(&self.encode_color(color));
        }
        Ok(())
    }

    /// Waveform for a single LED.
    pub fn encode_color(&self, color: u32) -> [u8; BYTES_PER_LED] {
        let wire = self.sequence.rearrange(color);
        let high = self.lookup(wire >> 12);
        let low = self.lookup(wire & TWELVE_BIT_MASK);

        let mut out = [0u8; BYTES_PER_LED];
        let (first, second) = out.split_at_mut(PATTERN_LEN);
        first.copy_from_slice(&high);
        second.copy_from_slice(&low);
        out
    }

    /// `half` is masked to 12 bits, so the table lookup cannot miss.
    fn lookup(&self, half: u32) -> [u8; PATTERN_LEN] {
        let key = u16::try_from(half & TWELVE_BIT_MASK).unwrap_or(0);
        self.mapper.get_bit_pattern(key).unwrap_or([0; PATTERN_LEN])
    }
}
