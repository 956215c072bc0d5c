//! Channel order on the wire.

/// Order in which the three color channels are shifted out to the LED.
///
/// Colors enter the driver as `0xRRGGBB`. The WS2812B itself expects
/// [`Grb`](Self::Grb); other parts built around the same protocol use the
/// remaining permutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorChannelSequence {
    /// Red, green, blue.
    Rgb,
    /// Red, blue, green.
    Rbg,
    /// Green, red, blue (WS2812B native order).
    #[default]
    Grb,
    /// Green, blue, red.
    Gbr,
    /// Blue, red, green.
    Brg,
    /// Blue, green, red.
    Bgr,
}

/// Index of a channel inside `[red, green, blue]`.
const R: usize = 0;
const G: usize = 1;
const B: usize = 2;

impl ColorChannelSequence {
    /// All six permutations.
    pub const ALL: [Self; 6] = [Self::Rgb, Self::Rbg, Self::Grb, Self::Gbr, Self::Brg, Self::Bgr];

    /// Source channel for each output byte, most significant first.
    const fn order(self) -> [usize; 3] {
        match self {
            Self::Rgb => [R, G, B],
            Self::Rbg => [R, B, G],
            Self::Grb => [G, R, B],
            Self::Gbr => [G, B, R],
            Self::Brg => [B, R, G],
            Self::Bgr => [B, G, R],
        }
    }

    /// Move the channels of `0xRRGGBB` into this sequence's byte order.
    ///
    /// Bits above the 24-bit color are ignored.
    #[must_use]
    pub fn rearrange(self, color: u32) -> u32 {
        let [_, r, g, b] = color.to_be_bytes();
        let channels = [r, g, b];
        let [first, second, third] = self.order().map(|c| channels.get(c).copied().unwrap_or(0));
        u32::from_be_bytes([0, first, second, third])
    }

    /// Inverse of [`rearrange`](Self::rearrange): back to `0xRRGGBB`.
    #[must_use]
    pub fn restore(self, wire: u32) -> u32 {
        let [_, first, second, third] = wire.to_be_bytes();
        let mut channels = [0u8; 3];
        for (slot, byte) in self.order().into_iter().zip([first, second, third]) {
            if let Some(c) = channels.get_mut(slot) {
                *c = byte;
            }
        }
        let [r, g, b] = channels;
        u32::from_be_bytes([0, r, g, b])
    }
}
