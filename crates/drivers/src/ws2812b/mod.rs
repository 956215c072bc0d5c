//! WS2812B addressable LED strips driven over SPI.
//!
//! ```text
//! &[0xRRGGBB]  →  ColorChannelSequence  →  two 12-bit halves
//!              →  bit-pattern table (4 bytes each)  →  one SPI write
//! ```
//!
//! See [`bit_pattern`] for how SPI clocks stand in for the one-wire timing.

pub mod bit_pattern;
pub mod converter;
mod driver;
pub mod sequence;

pub use bit_pattern::TwelveBitIntToBitPatternMapper;
pub use converter::{ColorToBitPatternConverter, BYTES_PER_LED};
pub use driver::Ws2812b;
pub use sequence::ColorChannelSequence;
