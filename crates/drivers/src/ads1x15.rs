//! TI ADS1015 (12-bit) / ADS1115 (16-bit) delta-sigma ADC driver.
//!
//! Reference: Texas Instruments ADS1015 (SBAS473) and ADS1115 (SBAS444)
//! datasheets, §8.6 register map. Both parts share the register layout; they
//! differ in resolution and data-rate table. The comparator is left
//! disabled and conversions run in single-shot mode.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::Error;
use crate::sensor::{Reading, SensorSource};

/// 7-bit I2C address with ADDR tied to GND (0x48..=0x4B selectable).
pub const ADS1X15_I2C_ADDR_GND: u8 = 0x48;
/// ADDR tied to VDD.
pub const ADS1X15_I2C_ADDR_VDD: u8 = 0x49;
/// ADDR tied to SDA.
pub const ADS1X15_I2C_ADDR_SDA: u8 = 0x4A;
/// ADDR tied to SCL.
pub const ADS1X15_I2C_ADDR_SCL: u8 = 0x4B;

/// Conversion result register (read-only).
pub const REG_CONVERSION: u8 = 0x00;
/// Config register.
pub const REG_CONFIG: u8 = 0x01;

/// OS: write 1 to start a single conversion; reads 1 when idle.
pub const CONFIG_OS: u16 = 1 << 15;
/// MODE: single-shot / power-down.
pub const CONFIG_MODE_SINGLE: u16 = 1 << 8;
/// COMP_QUE = 0b11: comparator disabled, ALERT/RDY high-Z.
pub const CONFIG_COMP_QUE_DISABLE: u16 = 0b11;

/// Status polls before a conversion is declared lost.
pub const MAX_POLLS: u32 = 16;

/// Which part is on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Variant {
    /// 12-bit, 128..=3300 SPS.
    Ads1015,
    /// 16-bit, 8..=860 SPS.
    Ads1115,
}

impl Variant {
    /// Result width in bits.
    pub const fn resolution_bits(self) -> u32 {
        match self {
            Self::Ads1015 => 12,
            Self::Ads1115 => 16,
        }
    }

    /// Positive full-scale code count, `2^(bits - 1)`.
    const fn full_scale_counts(self) -> f32 {
        match self {
            Self::Ads1015 => 2_048.0,
            Self::Ads1115 => 32_768.0,
        }
    }
}

/// Input multiplexer setting (MUX[14:12]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// AIN0 − AIN1
    Diff0_1,
    /// AIN0 − AIN3
    Diff0_3,
    /// AIN1 − AIN3
    Diff1_3,
    /// AIN2 − AIN3
    Diff2_3,
    /// AIN0 − GND
    #[default]
    Ain0,
    /// AIN1 − GND
    Ain1,
    /// AIN2 − GND
    Ain2,
    /// AIN3 − GND
    Ain3,
}

impl Channel {
    const fn mux_bits(self) -> u16 {
        match self {
            Self::Diff0_1 => 0b000,
            Self::Diff0_3 => 0b001,
            Self::Diff1_3 => 0b010,
            Self::Diff2_3 => 0b011,
            Self::Ain0 => 0b100,
            Self::Ain1 => 0b101,
            Self::Ain2 => 0b110,
            Self::Ain3 => 0b111,
        }
    }
}

/// Programmable gain amplifier setting, named by full-scale range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    /// ±6.144 V
    Fsr6_144,
    /// ±4.096 V
    Fsr4_096,
    /// ±2.048 V (power-on default)
    #[default]
    Fsr2_048,
    /// ±1.024 V
    Fsr1_024,
    /// ±0.512 V
    Fsr0_512,
    /// ±0.256 V
    Fsr0_256,
}

impl Gain {
    const fn pga_bits(self) -> u16 {
        match self {
            Self::Fsr6_144 => 0b000,
            Self::Fsr4_096 => 0b001,
            Self::Fsr2_048 => 0b010,
            Self::Fsr1_024 => 0b011,
            Self::Fsr0_512 => 0b100,
            Self::Fsr0_256 => 0b101,
        }
    }

    /// Full-scale range in volts.
    pub const fn full_scale_volts(self) -> f32 {
        match self {
            Self::Fsr6_144 => 6.144,
            Self::Fsr4_096 => 4.096,
            Self::Fsr2_048 => 2.048,
            Self::Fsr1_024 => 1.024,
            Self::Fsr0_512 => 0.512,
            Self::Fsr0_256 => 0.256,
        }
    }
}

/// Data rate (DR[7:5]). The samples per second depend on the [`Variant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataRate {
    /// 128 SPS (ADS1015) / 8 SPS (ADS1115)
    Dr0,
    /// 250 / 16
    Dr1,
    /// 490 / 32
    Dr2,
    /// 920 / 64
    Dr3,
    /// 1600 / 128 (power-on default)
    #[default]
    Dr4,
    /// 2400 / 250
    Dr5,
    /// 3300 / 475
    Dr6,
    /// 3300 / 860
    Dr7,
}

impl DataRate {
    const fn dr_bits(self) -> u16 {
        match self {
            Self::Dr0 => 0b000,
            Self::Dr1 => 0b001,
            Self::Dr2 => 0b010,
            Self::Dr3 => 0b011,
            Self::Dr4 => 0b100,
            Self::Dr5 => 0b101,
            Self::Dr6 => 0b110,
            Self::Dr7 => 0b111,
        }
    }

    /// Nominal samples per second on `variant`.
    pub const fn samples_per_second(self, variant: Variant) -> u32 {
        match (variant, self) {
            (Variant::Ads1015, Self::Dr0) => 128,
            (Variant::Ads1015, Self::Dr1) => 250,
            (Variant::Ads1015, Self::Dr2) => 490,
            (Variant::Ads1015, Self::Dr3) => 920,
            (Variant::Ads1015, Self::Dr4) => 1_600,
            (Variant::Ads1015, Self::Dr5) => 2_400,
            (Variant::Ads1015, Self::Dr6 | Self::Dr7) => 3_300,
            (Variant::Ads1115, Self::Dr0) => 8,
            (Variant::Ads1115, Self::Dr1) => 16,
            (Variant::Ads1115, Self::Dr2) => 32,
            (Variant::Ads1115, Self::Dr3) => 64,
            (Variant::Ads1115, Self::Dr4) => 128,
            (Variant::Ads1115, Self::Dr5) => 250,
            (Variant::Ads1115, Self::Dr6) => 475,
            (Variant::Ads1115, Self::Dr7) => 860,
        }
    }
}

/// Conversion settings applied to every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ads1x15Config {
    /// PGA full-scale range.
    pub gain: Gain,
    /// Sample rate.
    pub data_rate: DataRate,
}

impl Ads1x15Config {
    /// Config register word that starts a single-shot conversion of
    /// `channel`.
    #[allow(clippy::arithmetic_side_effects)] // Safety: every field fits its bit range
    pub const fn config_word(self, channel: Channel) -> u16 {
        CONFIG_OS
            | (channel.mux_bits() << 12)
            | (self.gain.pga_bits() << 9)
            | CONFIG_MODE_SINGLE
            | (self.data_rate.dr_bits() << 5)
            | CONFIG_COMP_QUE_DISABLE
    }
}

/// ADS1015 / ADS1115 over I2C.
pub struct Ads1x15<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    variant: Variant,
    config: Ads1x15Config,
    channel: Channel,
}

impl<I: I2c, D: DelayNs> Ads1x15<I, D> {
    /// Driver with power-on settings. The chip has no id register, so
    /// nothing is read here.
    pub fn new(i2c: I, delay: D, address: u8, variant: Variant) -> Self {
        Self {
            i2c,
            delay,
            address,
            variant,
            config: Ads1x15Config::default(),
            channel: Channel::default(),
        }
    }

    /// Part this driver was built for.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Active conversion settings.
    pub fn config(&self) -> Ads1x15Config {
        self.config
    }

    /// Replace the conversion settings used by later reads.
    pub fn set_config(&mut self, config: Ads1x15Config) {
        #[cfg(feature = "defmt")]
        defmt::debug!("ads1x15: {}", config);
        self.config = config;
    }

    /// Set the PGA range.
    pub fn set_gain(&mut self, gain: Gain) {
        self.config.gain = gain;
    }

    /// Set the data rate.
    pub fn set_data_rate(&mut self, data_rate: DataRate) {
        self.config.data_rate = data_rate;
    }

    /// Channel sampled by [`SensorSource::read`].
    pub fn set_channel(&mut self, channel: Channel) {
        self.channel = channel;
    }

    /// Release the bus and the delay provider.
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    fn read_register(&mut self, reg: u8) -> Result<u16, Error<I::Error>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(Error::Bus)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn write_register(&mut self, reg: u8, value: u16) -> Result<(), Error<I::Error>> {
        let [hi, lo] = value.to_be_bytes();
        self.i2c
            .write(self.address, &[reg, hi, lo])
            .map_err(Error::Bus)
    }

    /// Wait between status polls: a quarter of one conversion period.
    #[allow(clippy::arithmetic_side_effects)] // Safety: divisor clamped to >= 1
    fn poll_interval_us(&self) -> u32 {
        let sps = self.config.data_rate.samples_per_second(self.variant);
        (1_000_000 / sps.max(1) / 4).max(1)
    }

    /// Start a conversion on `channel` and return the signed result code.
    ///
    /// ADS1015 results are shifted down to their 12 significant bits with
    /// the sign kept.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if OS never reports completion within
    ///   [`MAX_POLLS`] polls.
    /// - [`Error::Bus`] on any I2C failure.
    pub fn read_raw(&mut self, channel: Channel) -> Result<i16, Error<I::Error>> {
        self.write_register(REG_CONFIG, self.config.config_word(channel))?;

        let interval = self.poll_interval_us();
        let mut done = false;
        for _ in 0..MAX_POLLS {
            self.delay.delay_us(interval);
            if self.read_register(REG_CONFIG)? & CONFIG_OS != 0 {
                done = true;
                break;
            }
        }
        if !done {
            #[cfg(feature = "defmt")]
            defmt::warn!("ads1x15: conversion on {} timed out", channel);
            return Err(Error::Timeout);
        }

        let code = i16::from_be_bytes(self.read_register(REG_CONVERSION)?.to_be_bytes());
        Ok(match self.variant {
            Variant::Ads1015 => code.wrapping_shr(4),
            Variant::Ads1115 => code,
        })
    }

    /// Convert `channel` and scale the result to volts with the active gain.
    pub fn read_voltage(&mut self, channel: Channel) -> Result<f32, Error<I::Error>> {
        let raw = self.read_raw(channel)?;
        Ok(code_to_volts(raw, self.config.gain, self.variant))
    }
}

/// Scale a result code to volts: `raw × FSR ÷ 2^(bits − 1)`.
#[allow(clippy::arithmetic_side_effects)] // f32 only
pub fn code_to_volts(raw: i16, gain: Gain, variant: Variant) -> f32 {
    f32::from(raw) * gain.full_scale_volts() / variant.full_scale_counts()
}

impl<I: I2c, D: DelayNs> SensorSource for Ads1x15<I, D> {
    type Error = Error<I::Error>;

    fn read(&mut self) -> Result<Reading, Self::Error> {
        let channel = self.channel;
        self.read_voltage(channel).map(Reading::Voltage)
    }
}
