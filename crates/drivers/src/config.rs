//! Crate-wide configuration and constants
//!
//! Chip defaults that more than one module (or the xtask tooling) needs
//! live here rather than being hardcoded at the call site.

use crate::peripheral::{BitOrder, SpiConfig, SpiMode};

/// Crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");

/// Crate version (synchronized with Cargo.toml)
pub const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// SPI clock for the WS2812B encoder.
///
/// Three SPI clocks per data bit: 3 × 416.7 ns = 1.25 µs per bit, giving
/// T0H ≈ 417 ns and T1H ≈ 833 ns, both inside the datasheet windows.
pub const WS2812B_SPI_FREQUENCY_HZ: u32 = 2_400_000;

/// SPI settings the WS2812B driver applies before its first frame.
///
/// Mode 0 keeps the data line idle low between frames, which doubles as
/// the ≥ 50 µs reset/latch period.
pub const WS2812B_SPI_CONFIG: SpiConfig = SpiConfig {
    frequency: WS2812B_SPI_FREQUENCY_HZ,
    mode: SpiMode::Mode0,
    bit_order: BitOrder::MsbFirst,
    bits_per_word: 8,
};

/// Default software debounce for push buttons, in milliseconds.
pub const DEFAULT_BUTTON_DEBOUNCE_MS: u64 = 50;

/// Capacity of the per-driver input event queues.
pub const INPUT_QUEUE_DEPTH: usize = 16;
