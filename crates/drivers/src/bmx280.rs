//! Bosch BMP280 / BME280 temperature + pressure sensor driver.
//!
//! Reference: Bosch BMP280 datasheet (BST-BMP280-DS001), §3–§4 and the
//! floating-point compensation formulas of §8.1. The BME280 shares the
//! temperature/pressure register map and is accepted by chip id; its
//! humidity channel is not read.

use embedded_hal::i2c::I2c;

use crate::error::Error;
use crate::sensor::{Reading, SensorSource};

/// 7-bit I2C address with SDO tied to GND.
pub const BMX280_I2C_ADDR_PRIMARY: u8 = 0x76;
/// 7-bit I2C address with SDO tied to VDDIO.
pub const BMX280_I2C_ADDR_SECONDARY: u8 = 0x77;

/// First trimming parameter register (dig_T1 LSB).
pub const REG_CALIBRATION: u8 = 0x88;
/// Chip identification.
pub const REG_CHIP_ID: u8 = 0xD0;
/// Soft reset; write [`RESET_COMMAND`].
pub const REG_RESET: u8 = 0xE0;
/// Status (measuring bit 3, im_update bit 0).
pub const REG_STATUS: u8 = 0xF3;
/// Measurement control (osrs_t[7:5], osrs_p[4:2], mode[1:0]).
pub const REG_CTRL_MEAS: u8 = 0xF4;
/// Standby, IIR filter, SPI 3-wire.
pub const REG_CONFIG: u8 = 0xF5;
/// Start of the pressure + temperature burst (press_msb).
pub const REG_PRESS_MSB: u8 = 0xF7;

/// Trimming parameter block length in bytes.
pub const CALIBRATION_LEN: usize = 24;
/// Pressure + temperature burst length in bytes.
pub const DATA_LEN: usize = 6;

/// Chip id of the BMP280.
pub const CHIP_ID_BMP280: u8 = 0x58;
/// Chip id of the BME280.
pub const CHIP_ID_BME280: u8 = 0x60;
/// Value written to [`REG_RESET`] to reset the chip.
pub const RESET_COMMAND: u8 = 0xB6;

/// ctrl_meas mode field.
pub const CTRL_MODE_MASK: u8 = 0b0000_0011;
/// ctrl_meas pressure oversampling field.
pub const CTRL_OSRS_P_MASK: u8 = 0b0001_1100;
/// ctrl_meas temperature oversampling field.
pub const CTRL_OSRS_T_MASK: u8 = 0b1110_0000;
/// Status bit set while a conversion is running.
pub const STATUS_MEASURING: u8 = 1 << 3;

/// Raw value reported for a channel whose oversampling is `Skipped`.
pub const RAW_SKIPPED: i32 = 0x8_0000;

/// Which part answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Chip {
    /// BMP280 (temperature + pressure).
    Bmp280,
    /// BME280 (temperature + pressure + humidity).
    Bme280,
}

impl Chip {
    fn from_id(id: u8) -> Option<Self> {
        match id {
            CHIP_ID_BMP280 => Some(Self::Bmp280),
            CHIP_ID_BME280 => Some(Self::Bme280),
            _ => None,
        }
    }
}

/// Power mode (ctrl_meas mode[1:0]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Mode {
    /// No measurements; lowest power. Power-on default.
    Sleep = 0b00,
    /// One measurement, then back to sleep.
    Forced = 0b01,
    /// Continuous measurements separated by the standby time.
    Normal = 0b11,
}

/// Oversampling setting for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Oversampling {
    /// Channel disabled; its data register reads 0x80000.
    Skipped = 0b000,
    /// ×1
    X1 = 0b001,
    /// ×2
    X2 = 0b010,
    /// ×4
    X4 = 0b011,
    /// ×8
    X8 = 0b100,
    /// ×16
    X16 = 0b101,
}

/// Factory trimming parameters (dig_T1 … dig_P9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Calibration {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,
}

impl Calibration {
    /// Decode the little-endian block read from [`REG_CALIBRATION`].
    pub fn from_bytes(raw: &[u8; CALIBRATION_LEN]) -> Self {
        let [t1l, t1h, t2l, t2h, t3l, t3h, p1l, p1h, p2l, p2h, p3l, p3h, p4l, p4h, p5l, p5h, p6l, p6h, p7l, p7h, p8l, p8h, p9l, p9h] =
            *raw;
        Self {
            dig_t1: u16::from_le_bytes([t1l, t1h]),
            dig_t2: i16::from_le_bytes([t2l, t2h]),
            dig_t3: i16::from_le_bytes([t3l, t3h]),
            dig_p1: u16::from_le_bytes([p1l, p1h]),
            dig_p2: i16::from_le_bytes([p2l, p2h]),
            dig_p3: i16::from_le_bytes([p3l, p3h]),
            dig_p4: i16::from_le_bytes([p4l, p4h]),
            dig_p5: i16::from_le_bytes([p5l, p5h]),
            dig_p6: i16::from_le_bytes([p6l, p6h]),
            dig_p7: i16::from_le_bytes([p7l, p7h]),
            dig_p8: i16::from_le_bytes([p8l, p8h]),
            dig_p9: i16::from_le_bytes([p9l, p9h]),
        }
    }

    /// Temperature in °C plus the `t_fine` carry-over the pressure formula
    /// needs.
    #[allow(clippy::arithmetic_side_effects)] // f64 only; no integer overflow
    pub fn compensate_temperature(&self, adc_t: i32) -> (f64, f64) {
        let adc_t = f64::from(adc_t);
        let t1 = f64::from(self.dig_t1);
        let var1 = (adc_t / 16_384.0 - t1 / 1_024.0) * f64::from(self.dig_t2);
        let delta = adc_t / 131_072.0 - t1 / 8_192.0;
        let var2 = delta * delta * f64::from(self.dig_t3);
        let t_fine = var1 + var2;
        (t_fine / 5_120.0, t_fine)
    }

    /// Pressure in Pa for raw `adc_p` at temperature `t_fine`.
    ///
    /// Returns 0 when the trimming data would divide by zero.
    #[allow(clippy::arithmetic_side_effects)] // f64 only; divisor checked
    pub fn compensate_pressure(&self, adc_p: i32, t_fine: f64) -> f64 {
        let mut var1 = t_fine / 2.0 - 64_000.0;
        let mut var2 = var1 * var1 * f64::from(self.dig_p6) / 32_768.0;
        var2 += var1 * f64::from(self.dig_p5) * 2.0;
        var2 = var2 / 4.0 + f64::from(self.dig_p4) * 65_536.0;
        var1 = (f64::from(self.dig_p3) * var1 * var1 / 524_288.0 + f64::from(self.dig_p2) * var1)
            / 524_288.0;
        var1 = (1.0 + var1 / 32_768.0) * f64::from(self.dig_p1);
        if var1 == 0.0 {
            return 0.0;
        }
        let mut p = 1_048_576.0 - f64::from(adc_p);
        p = (p - var2 / 4_096.0) * 6_250.0 / var1;
        var1 = f64::from(self.dig_p9) * p * p / 2_147_483_648.0;
        var2 = p * f64::from(self.dig_p8) / 32_768.0;
        p + (var1 + var2 + f64::from(self.dig_p7)) / 16.0
    }
}

/// Assemble a 20-bit reading from msb, lsb and the top nibble of xlsb.
#[allow(clippy::arithmetic_side_effects)] // Safety: at most 20 bits set, fits i32
fn raw20(msb: u8, lsb: u8, xlsb: u8) -> i32 {
    (i32::from(msb) << 12) | (i32::from(lsb) << 4) | (i32::from(xlsb) >> 4)
}

/// BMP280 / BME280 over I2C.
pub struct Bmx280<I> {
    i2c: I,
    address: u8,
    chip: Chip,
    calibration: Calibration,
}

impl<I: I2c> Bmx280<I> {
    /// Probe the chip at `address` and load its trimming parameters.
    ///
    /// # Errors
    ///
    /// - [`Error::UnexpectedChipId`] if neither a BMP280 nor a BME280
    ///   answers.
    /// - [`Error::Bus`] on any I2C failure.
    pub fn new(mut i2c: I, address: u8) -> Result<Self, Error<I::Error>> {
        let mut id = [0u8; 1];
        i2c.write_read(address, &[REG_CHIP_ID], &mut id)
            .map_err(Error::Bus)?;
        let [id] = id;
        let chip = Chip::from_id(id).ok_or(Error::UnexpectedChipId(id))?;

        let mut raw = [0u8; CALIBRATION_LEN];
        i2c.write_read(address, &[REG_CALIBRATION], &mut raw)
            .map_err(Error::Bus)?;
        let calibration = Calibration::from_bytes(&raw);

        #[cfg(feature = "defmt")]
        defmt::info!("bmx280: found {} at {=u8:#x}", chip, address);

        Ok(Self {
            i2c,
            address,
            chip,
            calibration,
        })
    }

    /// Part detected at construction.
    pub fn chip(&self) -> Chip {
        self.chip
    }

    /// Trimming parameters loaded at construction.
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Release the bus.
    pub fn release(self) -> I {
        self.i2c
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

    /// Read-modify-write of the bits selected by `mask`.
    fn update_reg(&mut self, reg: u8, mask: u8, bits: u8) -> Result<(), Error<I::Error>> {
        let current = self.read_reg(reg)?;
        self.write_reg(reg, (current & !mask) | (bits & mask))
    }

    /// Soft reset; trimming parameters survive, ctrl_meas returns to sleep.
    pub fn soft_reset(&mut self) -> Result<(), Error<I::Error>> {
        self.write_reg(REG_RESET, RESET_COMMAND)
    }

    /// Set the power mode.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), Error<I::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("bmx280: mode {}", mode);
        self.update_reg(REG_CTRL_MEAS, CTRL_MODE_MASK, mode as u8)
    }

    /// Current power mode.
    pub fn mode(&mut self) -> Result<Mode, Error<I::Error>> {
        Ok(match self.read_reg(REG_CTRL_MEAS)? & CTRL_MODE_MASK {
            0b00 => Mode::Sleep,
            0b11 => Mode::Normal,
            // 0b01 and 0b10 both mean forced mode.
            _ => Mode::Forced,
        })
    }

    /// Set temperature oversampling.
    pub fn set_temperature_oversampling(
        &mut self,
        oversampling: Oversampling,
    ) -> Result<(), Error<I::Error>> {
        let bits = (oversampling as u8).wrapping_shl(5);
        self.update_reg(REG_CTRL_MEAS, CTRL_OSRS_T_MASK, bits)
    }

    /// Set pressure oversampling.
    pub fn set_pressure_oversampling(
        &mut self,
        oversampling: Oversampling,
    ) -> Result<(), Error<I::Error>> {
        let bits = (oversampling as u8).wrapping_shl(2);
        self.update_reg(REG_CTRL_MEAS, CTRL_OSRS_P_MASK, bits)
    }

    /// `true` while a conversion is in progress.
    pub fn is_measuring(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.read_reg(REG_STATUS)? & STATUS_MEASURING != 0)
    }

    /// Burst-read the raw pressure and temperature words.
    fn read_raw(&mut self) -> Result<(i32, i32), Error<I::Error>> {
        let mut data = [0u8; DATA_LEN];
        self.i2c
            .write_read(self.address, &[REG_PRESS_MSB], &mut data)
            .map_err(Error::Bus)?;
        let [p_msb, p_lsb, p_xlsb, t_msb, t_lsb, t_xlsb] = data;
        Ok((raw20(p_msb, p_lsb, p_xlsb), raw20(t_msb, t_lsb, t_xlsb)))
    }

    /// Temperature in degrees Celsius.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidData`] if temperature measurement is skipped.
    pub fn read_temperature(&mut self) -> Result<f32, Error<I::Error>> {
        let (_, adc_t) = self.read_raw()?;
        if adc_t == RAW_SKIPPED {
            return Err(Error::InvalidData);
        }
        let (celsius, _) = self.calibration.compensate_temperature(adc_t);
        Ok(narrow(celsius))
    }

    /// Pressure in hectopascal.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidData`] if either channel is skipped (the pressure
    /// formula needs the temperature of the same sample).
    pub fn read_pressure(&mut self) -> Result<f32, Error<I::Error>> {
        let (_, hpa) = self.read_temperature_and_pressure()?;
        Ok(hpa)
    }

    /// Temperature (°C) and pressure (hPa) from one burst read.
    pub fn read_temperature_and_pressure(&mut self) -> Result<(f32, f32), Error<I::Error>> {
        let (adc_p, adc_t) = self.read_raw()?;
        if adc_t == RAW_SKIPPED || adc_p == RAW_SKIPPED {
            return Err(Error::InvalidData);
        }
        let (celsius, t_fine) = self.calibration.compensate_temperature(adc_t);
        let pascal = self.calibration.compensate_pressure(adc_p, t_fine);
        Ok((narrow(celsius), narrow(pascal / 100.0)))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn narrow(value: f64) -> f32 {
    value as f32
}

impl<I: I2c> SensorSource for Bmx280<I> {
    type Error = Error<I::Error>;

    fn read(&mut self) -> Result<Reading, Self::Error> {
        let (celsius, hpa) = self.read_temperature_and_pressure()?;
        Ok(Reading::Environment { celsius, hpa })
    }
}
