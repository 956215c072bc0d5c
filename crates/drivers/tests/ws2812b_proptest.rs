//! Property-based tests for the WS2812B encoder.
//! Verifies the encoding laws hold for ALL inputs, not just fixed vectors.

#![allow(clippy::unwrap_used)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]

use drivers::ws2812b::bit_pattern::{decode, TWELVE_BIT_MAX};
use drivers::ws2812b::{
    ColorChannelSequence, ColorToBitPatternConverter, TwelveBitIntToBitPatternMapper,
    BYTES_PER_LED,
};
use proptest::prelude::*;

fn any_sequence() -> impl Strategy<Value = ColorChannelSequence> {
    prop::sample::select(ColorChannelSequence::ALL.to_vec())
}

proptest! {
    /// Every 12-bit value survives encode → decode.
    #[test]
    fn bit_pattern_decodes_to_input(value in 0u16..=TWELVE_BIT_MAX) {
        let mapper = TwelveBitIntToBitPatternMapper::new();
        let pattern = mapper.get_bit_pattern(value).unwrap();
        prop_assert_eq!(decode(pattern), Some(value));
    }

    /// Anything wider than 12 bits is rejected, never truncated.
    #[test]
    fn bit_pattern_rejects_wide_values(value in (TWELVE_BIT_MAX + 1)..=u16::MAX) {
        let mapper = TwelveBitIntToBitPatternMapper::new();
        let err = mapper.get_bit_pattern(value).unwrap_err();
        prop_assert_eq!(err.value, u32::from(value));
        prop_assert_eq!(err.max, u32::from(TWELVE_BIT_MAX));
    }

    /// restore undoes rearrange for every sequence.
    #[test]
    fn restore_inverts_rearrange(color in 0u32..=0x00FF_FFFF, sequence in any_sequence()) {
        prop_assert_eq!(sequence.restore(sequence.rearrange(color)), color);
    }

    /// rearrange only permutes bytes: it never invents or loses bits.
    #[test]
    fn rearrange_keeps_byte_multiset(color in 0u32..=0x00FF_FFFF, sequence in any_sequence()) {
        let mut before = [color >> 16, (color >> 8) & 0xFF, color & 0xFF];
        let wire = sequence.rearrange(color);
        let mut after = [wire >> 16, (wire >> 8) & 0xFF, wire & 0xFF];
        before.sort_unstable();
        after.sort_unstable();
        prop_assert_eq!(before, after);
    }

    /// Output is exactly eight bytes per LED.
    #[test]
    fn conversion_size_law(
        colors in prop::collection::vec(0u32..=0x00FF_FFFF, 0..64),
        sequence in any_sequence(),
    ) {
        let converter = ColorToBitPatternConverter::new(sequence);
        prop_assert_eq!(converter.convert(&colors).len(), colors.len() * BYTES_PER_LED);
    }

    /// The top byte of a packed color is ignored.
    #[test]
    fn conversion_ignores_high_byte(color in any::<u32>()) {
        let converter = ColorToBitPatternConverter::new(ColorChannelSequence::Grb);
        prop_assert_eq!(
            converter.convert(&[color]),
            converter.convert(&[color & 0x00FF_FFFF])
        );
    }

    /// Each LED's 8 bytes decode back to its wire-order color.
    #[test]
    fn conversion_decodes_per_led(
        colors in prop::collection::vec(0u32..=0x00FF_FFFF, 1..16),
        sequence in any_sequence(),
    ) {
        let converter = ColorToBitPatternConverter::new(sequence);
        let frame = converter.convert(&colors);
        for (led, &color) in frame.chunks_exact(BYTES_PER_LED).zip(&colors) {
            let high = decode([led[0], led[1], led[2], led[3]]).unwrap();
            let low = decode([led[4], led[5], led[6], led[7]]).unwrap();
            let wire = (u32::from(high) << 12) | u32::from(low);
            prop_assert_eq!(sequence.restore(wire), color);
        }
    }
}
