//! NXP PCA9685 16-channel, 12-bit PWM controller driver.
//!
//! Reference: NXP PCA9685 product data sheet rev. 4, §7.3 register map.
//! Each channel has an ON and an OFF count within a 4096-tick period; bit 4
//! of the high byte is the full-on / full-off flag. The prescaler can only
//! be written while the oscillator sleeps.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::{Error, OutOfRangeError};

/// Default 7-bit I2C address (A5..A0 low).
pub const PCA9685_I2C_ADDR: u8 = 0x40;

/// MODE1 (RESTART, EXTCLK, AI, SLEEP, SUBx, ALLCALL).
pub const REG_MODE1: u8 = 0x00;
/// MODE2 (INVRT, OCH, OUTDRV, OUTNE).
pub const REG_MODE2: u8 = 0x01;
/// LED0_ON_L; channel `n` starts at `0x06 + 4n`.
pub const REG_LED0_ON_L: u8 = 0x06;
/// Prescaler for the PWM output frequency.
pub const REG_PRE_SCALE: u8 = 0xFE;

/// MODE1: restart PWM channels after sleep.
pub const MODE1_RESTART: u8 = 1 << 7;
/// MODE1: register auto-increment.
pub const MODE1_AI: u8 = 1 << 5;
/// MODE1: low-power mode, oscillator off.
pub const MODE1_SLEEP: u8 = 1 << 4;
/// MODE1: respond to the LED All Call address.
pub const MODE1_ALLCALL: u8 = 1 << 0;
/// MODE2: totem-pole outputs.
pub const MODE2_OUTDRV: u8 = 1 << 2;

/// Number of PWM outputs.
pub const CHANNELS: u8 = 16;
/// Ticks per PWM period.
pub const PWM_PERIOD_TICKS: u16 = 4096;
/// Largest ON/OFF count and largest duty.
pub const MAX_COUNT: u16 = PWM_PERIOD_TICKS - 1;
/// Full-on / full-off flag in a 13-bit count.
const FULL_FLAG: u16 = PWM_PERIOD_TICKS;

/// Internal oscillator frequency.
pub const OSCILLATOR_HZ: u32 = 25_000_000;
/// Smallest prescale the chip accepts.
pub const PRESCALE_MIN: u8 = 3;
/// Largest prescale.
pub const PRESCALE_MAX: u8 = 255;

/// Oscillator start-up time after leaving sleep.
const OSCILLATOR_STARTUP_US: u32 = 500;

/// Prescale for `hz`: `round(25 MHz / (4096 × hz)) − 1`.
///
/// # Errors
///
/// Returns the out-of-range prescale (or `hz` itself when zero) if the
/// result falls outside 3..=255.
#[allow(clippy::arithmetic_side_effects)] // Safety: hz >= 1 checked, u64 cannot overflow
#[allow(clippy::cast_possible_truncation)] // range checked before narrowing
pub const fn prescale_for(hz: u32) -> Result<u8, OutOfRangeError> {
    if hz == 0 {
        return Err(OutOfRangeError {
            value: 0,
            min: 1,
            max: u32::MAX,
        });
    }
    let ticks = PWM_PERIOD_TICKS as u64 * hz as u64;
    let rounded = (OSCILLATOR_HZ as u64 + ticks / 2) / ticks;
    let prescale = rounded.saturating_sub(1);
    if prescale < PRESCALE_MIN as u64 || prescale > PRESCALE_MAX as u64 {
        return Err(OutOfRangeError {
            value: if prescale > u32::MAX as u64 {
                u32::MAX
            } else {
                prescale as u32
            },
            min: PRESCALE_MIN as u32,
            max: PRESCALE_MAX as u32,
        });
    }
    Ok(prescale as u8)
}

/// PCA9685 over I2C.
pub struct Pca9685<I, D> {
    i2c: I,
    delay: D,
    address: u8,
}

impl<I: I2c, D: DelayNs> Pca9685<I, D> {
    /// Wake the chip with auto-increment and totem-pole outputs.
    ///
    /// # Errors
    ///
    /// [`Error::Bus`] on any I2C failure.
    pub fn new(i2c: I, delay: D, address: u8) -> Result<Self, Error<I::Error>> {
        let mut dev = Self {
            i2c,
            delay,
            address,
        };
        dev.write_reg(REG_MODE2, MODE2_OUTDRV)?;
        dev.write_reg(REG_MODE1, MODE1_AI | MODE1_ALLCALL)?;
        dev.delay.delay_us(OSCILLATOR_STARTUP_US);
        Ok(dev)
    }

    /// Release the bus and the delay provider.
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, Error<I::Error>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(Error::Bus)?;
        let [value] = buf;
        Ok(value)
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Error<I::Error>> {
        self.i2c.write(self.address, &[reg, value]).map_err(Error::Bus)
    }

    /// Set the PWM frequency shared by all channels.
    ///
    /// The prescaler is written in sleep mode; the previous MODE1 settings
    /// are restored and the outputs restarted afterwards.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the prescale is outside 3..=255
    /// (roughly 24 Hz to 1526 Hz); nothing is written.
    pub fn set_pwm_frequency(&mut self, hz: u32) -> Result<(), Error<I::Error>> {
        let prescale = prescale_for(hz)?;
        #[cfg(feature = "defmt")]
        defmt::debug!("pca9685: {} Hz, prescale {}", hz, prescale);

        let awake = self.read_reg(REG_MODE1)? & !(MODE1_RESTART | MODE1_SLEEP);
        self.write_reg(REG_MODE1, awake | MODE1_SLEEP)?;
        self.write_reg(REG_PRE_SCALE, prescale)?;
        self.write_reg(REG_MODE1, awake)?;
        self.delay.delay_us(OSCILLATOR_STARTUP_US);
        self.write_reg(REG_MODE1, awake | MODE1_RESTART | MODE1_AI)
    }

    fn write_channel(&mut self, channel: u8, on: u16, off: u16) -> Result<(), Error<I::Error>> {
        let reg = REG_LED0_ON_L.saturating_add(channel.saturating_mul(4));
        let [on_l, on_h] = on.to_le_bytes();
        let [off_l, off_h] = off.to_le_bytes();
        self.i2c
            .write(self.address, &[reg, on_l, on_h, off_l, off_h])
            .map_err(Error::Bus)
    }

    fn check_channel(channel: u8) -> Result<(), OutOfRangeError> {
        OutOfRangeError::check(u32::from(channel), 0, u32::from(CHANNELS).saturating_sub(1))
            .map(|_| ())
    }

    /// Raw ON and OFF tick counts for `channel`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for channel ≥ 16 or a count ≥ 4096.
    pub fn set_pwm(&mut self, channel: u8, on: u16, off: u16) -> Result<(), Error<I::Error>> {
        Self::check_channel(channel)?;
        OutOfRangeError::check(u32::from(on), 0, u32::from(MAX_COUNT))?;
        OutOfRangeError::check(u32::from(off), 0, u32::from(MAX_COUNT))?;
        self.write_channel(channel, on, off)
    }

    /// Duty cycle in ticks, 0 (always low) to 4095 (always high).
    ///
    /// The end points use the full-off / full-on flags so the output has no
    /// glitch pulse.
    pub fn set_duty(&mut self, channel: u8, duty: u16) -> Result<(), Error<I::Error>> {
        Self::check_channel(channel)?;
        OutOfRangeError::check(u32::from(duty), 0, u32::from(MAX_COUNT))?;
        match duty {
            0 => self.write_channel(channel, 0, FULL_FLAG),
            MAX_COUNT => self.write_channel(channel, FULL_FLAG, 0),
            _ => self.write_channel(channel, 0, duty),
        }
    }
}
