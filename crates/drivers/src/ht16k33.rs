//! Holtek HT16K33 LED matrix / segment display controller driver.
//!
//! Reference: Holtek HT16K33 datasheet v1.10, command summary. The chip has
//! no register pointer for control: system setup, display setup and dimming
//! are single command bytes with the setting in the low bits. Display RAM is
//! 16 bytes at 0x00; row `n` is the little-endian pair at `2n`.

use embedded_hal::i2c::I2c;

use crate::error::{Error, OutOfRangeError};

/// Lowest selectable address (A0..A2 open).
pub const HT16K33_I2C_ADDR_MIN: u8 = 0x70;
/// Highest selectable address (A0..A2 bridged).
pub const HT16K33_I2C_ADDR_MAX: u8 = 0x77;

/// System setup command; bit 0 = oscillator on.
pub const CMD_SYSTEM_SETUP: u8 = 0x20;
/// Display setup command; bit 0 = display on, bits 2:1 = blink rate.
pub const CMD_DISPLAY_SETUP: u8 = 0x80;
/// Dimming command; bits 3:0 = duty level.
pub const CMD_DIMMING: u8 = 0xE0;
/// Display RAM start address.
pub const DISPLAY_RAM_ADDR: u8 = 0x00;

/// Number of 16-bit display rows.
pub const ROWS: u8 = 8;
/// Display RAM size in bytes.
pub const DISPLAY_RAM_LEN: usize = 16;
/// Highest dimming level (16/16 duty).
pub const MAX_BRIGHTNESS: u8 = 15;

/// Blink rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Blink {
    /// Steady
    #[default]
    Off = 0b00,
    /// 2 Hz
    Hz2 = 0b01,
    /// 1 Hz
    Hz1 = 0b10,
    /// 0.5 Hz
    HalfHz = 0b11,
}

/// Decimal point segment of the 14-segment layout.
pub const SEGMENT_DP: u16 = 1 << 14;

/// 14-segment glyph for `c`, blank for characters the font lacks.
///
/// Lower-case letters render as their upper-case glyph.
pub const fn alphanumeric_glyph(c: char) -> u16 {
    match c.to_ascii_uppercase() {
        '0' => 0x0C3F,
        '1' => 0x0006,
        '2' => 0x00DB,
        '3' => 0x008F,
        '4' => 0x00E6,
        '5' => 0x2069,
        '6' => 0x00FD,
        '7' => 0x0007,
        '8' => 0x00FF,
        '9' => 0x00EF,
        'A' => 0x00F7,
        'B' => 0x128F,
        'C' => 0x0039,
        'D' => 0x120F,
        'E' => 0x00F9,
        'F' => 0x0071,
        'G' => 0x00BD,
        'H' => 0x00F6,
        'I' => 0x1209,
        'J' => 0x001E,
        'K' => 0x2470,
        'L' => 0x0038,
        'M' => 0x0536,
        'N' => 0x2136,
        'O' => 0x003F,
        'P' => 0x00F3,
        'Q' => 0x203F,
        'R' => 0x20F3,
        'S' => 0x00ED,
        'T' => 0x1201,
        'U' => 0x003E,
        'V' => 0x0C30,
        'W' => 0x2836,
        'X' => 0x2D00,
        'Y' => 0x1500,
        'Z' => 0x0C09,
        '-' => 0x00C0,
        '+' => 0x12C0,
        '*' => 0x3FC0,
        '/' => 0x0C00,
        '_' => 0x0008,
        '=' => 0x00C8,
        '.' => SEGMENT_DP,
        _ => 0x0000,
    }
}

/// HT16K33 over I2C.
pub struct Ht16k33<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> Ht16k33<I> {
    /// Driver for the chip at `address`. Nothing is sent until the
    /// oscillator is enabled.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `address` is outside 0x70..=0x77.
    pub fn new(i2c: I, address: u8) -> Result<Self, Error<I::Error>> {
        OutOfRangeError::check(
            u32::from(address),
            u32::from(HT16K33_I2C_ADDR_MIN),
            u32::from(HT16K33_I2C_ADDR_MAX),
        )?;
        Ok(Self { i2c, address })
    }

    /// Release the bus.
    pub fn release(self) -> I {
        self.i2c
    }

    fn command(&mut self, byte: u8) -> Result<(), Error<I::Error>> {
        self.i2c.write(self.address, &[byte]).map_err(Error::Bus)
    }

    /// Start (`true`) or stop the internal oscillator. Stopped means
    /// standby: the display is dark and RAM is kept.
    pub fn enable_oscillator(&mut self, on: bool) -> Result<(), Error<I::Error>> {
        self.command(CMD_SYSTEM_SETUP | u8::from(on))
    }

    /// Turn the display on or off and set the blink rate.
    pub fn set_display(&mut self, on: bool, blink: Blink) -> Result<(), Error<I::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("ht16k33: display on={} blink={}", on, blink);
        self.command(CMD_DISPLAY_SETUP | (blink as u8).wrapping_shl(1) | u8::from(on))
    }

    /// Set the dimming level, 0 (1/16 duty) to 15 (16/16 duty).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] above 15; nothing is sent.
    pub fn set_brightness(&mut self, level: u8) -> Result<(), Error<I::Error>> {
        OutOfRangeError::check(u32::from(level), 0, u32::from(MAX_BRIGHTNESS))?;
        self.command(CMD_DIMMING | level)
    }

    /// Write one 16-bit row of display RAM.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `row` is 8 or more.
    pub fn write_row(&mut self, row: u8, bits: u16) -> Result<(), Error<I::Error>> {
        OutOfRangeError::check(u32::from(row), 0, u32::from(ROWS).saturating_sub(1))?;
        let [lo, hi] = bits.to_le_bytes();
        let addr = DISPLAY_RAM_ADDR.saturating_add(row.saturating_mul(2));
        self.i2c
            .write(self.address, &[addr, lo, hi])
            .map_err(Error::Bus)
    }

    /// Blank all of display RAM in one transfer.
    pub fn clear(&mut self) -> Result<(), Error<I::Error>> {
        let mut frame = [0u8; DISPLAY_RAM_LEN + 1];
        if let Some(first) = frame.first_mut() {
            *first = DISPLAY_RAM_ADDR;
        }
        self.i2c.write(self.address, &frame).map_err(Error::Bus)
    }

    /// Show `c` on the 14-segment digit at `position`.
    pub fn write_alphanumeric(&mut self, position: u8, c: char) -> Result<(), Error<I::Error>> {
        self.write_row(position, alphanumeric_glyph(c))
    }
}
