//! Peripheral drivers for single-board computers and microcontrollers
//!
//! Register-level drivers written against the `embedded-hal` 1.0 traits, so
//! the same code runs on a Linux SBC (`linux-embedded-hal`), on an MCU HAL,
//! or against mocks on the host.
//!
//! # Drivers
//!
//! | Module            | Part                                     | Bus  |
//! |-------------------|------------------------------------------|------|
//! | [`ws2812b`]       | WS2812B addressable LEDs                 | SPI  |
//! | [`bmx280`]        | Bosch BMP280 / BME280                    | I2C  |
//! | [`ads1x15`]       | TI ADS1015 / ADS1115 ADC                 | I2C  |
//! | [`cap12xx`]       | Microchip CAP12xx capacitive touch       | I2C  |
//! | [`ht16k33`]       | Holtek HT16K33 LED matrix / segments     | I2C  |
//! | [`pca9685`]       | NXP PCA9685 16-channel PWM               | I2C  |
//! | [`motor_hat`]     | DC-motor HAT on a PCA9685                | I2C  |
//! | [`button`]        | Debounced push button                    | GPIO |
//! | [`matrix_keypad`] | Row/column keypad                        | GPIO |
//!
//! # Host interfaces
//!
//! - [`SensorSource`] - poll any sensor for a [`Reading`]
//! - [`InputDevice`] - drain [`InputEvent`]s from buttons, keypads and touch
//!   controllers
//!
//! # Features
//!
//! - `std`: Expose the [`mocks`] module to downstream tests
//! - `defmt`: Enable defmt logging and `defmt::Format` derives
//!
//! # Example
//!
//! ```
//! use drivers::ws2812b::{ColorChannelSequence, ColorToBitPatternConverter};
//!
//! let converter = ColorToBitPatternConverter::new(ColorChannelSequence::Rgb);
//! let frame = converter.convert(&[0xFF_00_00]);
//! assert_eq!(frame, [0xDB, 0xDB, 0xDA, 0x92, 0x92, 0x92, 0x92, 0x92]);
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
// Pedantic lints suppressed for this driver crate:
#![allow(clippy::doc_markdown)] // register names and hex addresses in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::unreadable_literal)] // register values read as datasheet hex

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod ads1x15;
pub mod bmx280;
pub mod button;
pub mod cap12xx;
pub mod config;
pub mod error;
pub mod ht16k33;
pub mod input;
pub mod matrix_keypad;
#[cfg(any(test, feature = "std"))]
pub mod mocks;
pub mod motor_hat;
pub mod pca9685;
pub mod peripheral;
pub mod sensor;
pub mod ws2812b;

// Re-export the shared error taxonomy
pub use error::{Error, OutOfRangeError};

// Re-export host-facing traits
pub use input::{EventQueue, InputDevice, InputEvent, KeyCode};
pub use sensor::{Reading, SensorSource};

// Re-export peripheral types
pub use peripheral::{BitOrder, HalSpi, HalSpiError, SpiConfig, SpiMode, SpiTransport};

// Re-export drivers
pub use ads1x15::Ads1x15;
pub use bmx280::Bmx280;
pub use button::Button;
pub use cap12xx::Cap12xx;
pub use ht16k33::Ht16k33;
pub use matrix_keypad::MatrixKeypad;
pub use motor_hat::MotorHat;
pub use pca9685::Pca9685;
pub use ws2812b::{ColorChannelSequence, Ws2812b};
