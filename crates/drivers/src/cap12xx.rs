//! Microchip CAP1203 / CAP1206 / CAP1208 / CAP1293 / CAP1296 / CAP1298
//! capacitive touch controller driver.
//!
//! Reference: Microchip CAP1203 (DS00001572), CAP1206 (DS00001567),
//! CAP1208 (DS00001570) and CAP129x datasheets, §6 register map. The family
//! shares one register layout; parts differ in product id and channel count.
//!
//! Touches latch in the sensor input status register until the INT bit of
//! main control is cleared, so [`Cap12xx::scan`] always clears it after
//! reading.

use crate::error::{Error, OutOfRangeError};
use crate::input::{EventQueue, InputDevice, InputEvent, KeyCode};
use embedded_hal::i2c::I2c;

/// 7-bit I2C address (fixed on CAP120x, default strap on CAP129x).
pub const CAP12XX_I2C_ADDR: u8 = 0x28;

/// Main control (STBY, DSLEEP, INT).
pub const REG_MAIN_CONTROL: u8 = 0x00;
/// General status (BC_OUT, ACAL_FAIL, PWR, MULT, MTP, TOUCH).
pub const REG_GENERAL_STATUS: u8 = 0x02;
/// Sensor input status, one bit per channel.
pub const REG_SENSOR_INPUT_STATUS: u8 = 0x03;
/// Sensitivity control (DELTA_SENSE[6:4], BASE_SHIFT[3:0]).
pub const REG_SENSITIVITY: u8 = 0x1F;
/// Sensor input enable.
pub const REG_INPUTS_ENABLE: u8 = 0x21;
/// Repeat rate enable.
pub const REG_REPEAT_ENABLE: u8 = 0x28;
/// Multiple touch configuration (MULT_BLK_EN, B_MULT_T[3:2]).
pub const REG_MULTITOUCH_CONFIG: u8 = 0x2A;
/// Sensor input LED linking.
pub const REG_LED_LINKING: u8 = 0x72;
/// Product id.
pub const REG_PRODUCT_ID: u8 = 0xFD;

/// Main control INT bit; status bits only clear once this is cleared.
pub const MAIN_CONTROL_INT: u8 = 1 << 0;
/// Multiple touch block enable.
pub const MULTITOUCH_BLOCK_ENABLE: u8 = 1 << 7;
/// BASE_SHIFT power-on value, kept when changing sensitivity.
pub const SENSITIVITY_BASE_SHIFT_DEFAULT: u8 = 0x0F;

/// Part number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cap12xxModel {
    /// 3 channels
    Cap1203,
    /// 6 channels
    Cap1206,
    /// 8 channels
    Cap1208,
    /// 3 channels
    Cap1293,
    /// 6 channels
    Cap1296,
    /// 8 channels
    Cap1298,
}

impl Cap12xxModel {
    /// Value of [`REG_PRODUCT_ID`] for this part.
    pub const fn product_id(self) -> u8 {
        match self {
            Self::Cap1203 => 0x6D,
            Self::Cap1206 => 0x67,
            Self::Cap1208 => 0x6B,
            Self::Cap1293 => 0x6F,
            Self::Cap1296 => 0x69,
            Self::Cap1298 => 0x71,
        }
    }

    /// Number of touch inputs.
    pub const fn channels(self) -> u8 {
        match self {
            Self::Cap1203 | Self::Cap1293 => 3,
            Self::Cap1206 | Self::Cap1296 => 6,
            Self::Cap1208 | Self::Cap1298 => 8,
        }
    }

    /// Status bits that map to real inputs.
    pub const fn channel_mask(self) -> u8 {
        match self.channels() {
            3 => 0x07,
            6 => 0x3F,
            _ => 0xFF,
        }
    }
}

/// Touch sensitivity multiplier (DELTA_SENSE). Higher is more sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Sensitivity {
    X128 = 0b000,
    X64 = 0b001,
    /// Power-on default.
    #[default]
    X32 = 0b010,
    X16 = 0b011,
    X8 = 0b100,
    X4 = 0b101,
    X2 = 0b110,
    X1 = 0b111,
}

/// CAP12xx touch controller over I2C.
pub struct Cap12xx<I> {
    i2c: I,
    address: u8,
    model: Cap12xxModel,
    last_touches: u8,
    events: EventQueue,
}

impl<I: I2c> Cap12xx<I> {
    /// Verify the product id of `model` at `address`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnexpectedChipId`] with the id read if it does not match
    ///   `model`.
    /// - [`Error::Bus`] on any I2C failure.
    pub fn new(i2c: I, address: u8, model: Cap12xxModel) -> Result<Self, Error<I::Error>> {
        let mut dev = Self {
            i2c,
            address,
            model,
            last_touches: 0,
            events: EventQueue::new(),
        };
        let id = dev.read_reg(REG_PRODUCT_ID)?;
        if id != model.product_id() {
            return Err(Error::UnexpectedChipId(id));
        }
        #[cfg(feature = "defmt")]
        defmt::info!("cap12xx: found {} at {=u8:#x}", model, address);
        Ok(dev)
    }

    /// Part this driver was built for.
    pub fn model(&self) -> Cap12xxModel {
        self.model
    }

    /// Touch mask seen by the last [`scan`](Self::scan).
    pub fn last_touches(&self) -> u8 {
        self.last_touches
    }

    /// Events dropped because nobody drained [`InputDevice::poll_event`].
    pub fn dropped_events(&self) -> u32 {
        self.events.dropped()
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

    /// Current touch mask, bit n = input n+1 touched.
    pub fn read_touches(&mut self) -> Result<u8, Error<I::Error>> {
        Ok(self.read_reg(REG_SENSOR_INPUT_STATUS)? & self.model.channel_mask())
    }

    /// Clear the INT bit so latched touches can reset.
    pub fn clear_interrupt(&mut self) -> Result<(), Error<I::Error>> {
        let control = self.read_reg(REG_MAIN_CONTROL)?;
        self.write_reg(REG_MAIN_CONTROL, control & !MAIN_CONTROL_INT)
    }

    /// Sample the pads and queue one event per changed channel.
    ///
    /// Channel numbers (0-based) are the event [`KeyCode`]s. Returns the new
    /// touch mask.
    pub fn scan(&mut self) -> Result<u8, Error<I::Error>> {
        let touches = self.read_touches()?;
        self.clear_interrupt()?;

        let changed = touches ^ self.last_touches;
        for channel in 0..self.model.channels() {
            let bit = 1u8.wrapping_shl(u32::from(channel));
            if changed & bit == 0 {
                continue;
            }
            let key = KeyCode::from(channel);
            let event = if touches & bit != 0 {
                InputEvent::KeyPress(key)
            } else {
                InputEvent::KeyRelease(key)
            };
            self.events.push(event);
        }
        self.last_touches = touches;
        Ok(touches)
    }

    /// Enable sensing on the inputs set in `mask`.
    pub fn set_inputs_enabled(&mut self, mask: u8) -> Result<(), Error<I::Error>> {
        self.write_reg(REG_INPUTS_ENABLE, mask & self.model.channel_mask())
    }

    /// Enable auto-repeat on the inputs set in `mask`.
    pub fn set_repeat_enabled(&mut self, mask: u8) -> Result<(), Error<I::Error>> {
        self.write_reg(REG_REPEAT_ENABLE, mask & self.model.channel_mask())
    }

    /// Limit simultaneous touches to `max` (1..=4); further touches are
    /// blocked.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] outside 1..=4; nothing is written.
    pub fn set_multitouch_max(&mut self, max: u8) -> Result<(), Error<I::Error>> {
        OutOfRangeError::check(u32::from(max), 1, 4)?;
        let b_mult_t = max.saturating_sub(1).wrapping_shl(2);
        self.write_reg(REG_MULTITOUCH_CONFIG, MULTITOUCH_BLOCK_ENABLE | b_mult_t)
    }

    /// Set the touch sensitivity, keeping the default base shift.
    pub fn set_sensitivity(&mut self, sensitivity: Sensitivity) -> Result<(), Error<I::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("cap12xx: sensitivity {}", sensitivity);
        let delta = (sensitivity as u8).wrapping_shl(4);
        self.write_reg(REG_SENSITIVITY, delta | SENSITIVITY_BASE_SHIFT_DEFAULT)
    }

    /// Let the inputs set in `mask` drive their matching LED outputs.
    pub fn set_led_linking(&mut self, mask: u8) -> Result<(), Error<I::Error>> {
        self.write_reg(REG_LED_LINKING, mask & self.model.channel_mask())
    }
}

impl<I: I2c> InputDevice for Cap12xx<I> {
    fn poll_event(&mut self) -> Option<InputEvent> {
        self.events.pop()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use std::vec;
    use std::vec::Vec;

    const ADDR: u8 = CAP12XX_I2C_ADDR;

    fn detect(model: Cap12xxModel) -> I2cTransaction {
        I2cTransaction::write_read(ADDR, vec![REG_PRODUCT_ID], vec![model.product_id()])
    }

    fn scan_transactions(status: u8) -> Vec<I2cTransaction> {
        vec![
            I2cTransaction::write_read(ADDR, vec![REG_SENSOR_INPUT_STATUS], vec![status]),
            I2cTransaction::write_read(ADDR, vec![REG_MAIN_CONTROL], vec![MAIN_CONTROL_INT]),
            I2cTransaction::write(ADDR, vec![REG_MAIN_CONTROL, 0x00]),
        ]
    }

    fn device(model: Cap12xxModel, rest: &[I2cTransaction]) -> (Cap12xx<I2cMock>, I2cMock) {
        let mut expectations = vec![detect(model)];
        expectations.extend_from_slice(rest);
        let i2c = I2cMock::new(&expectations);
        let dev = Cap12xx::new(i2c.clone(), ADDR, model).unwrap();
        (dev, i2c)
    }

    #[test]
    fn wrong_product_id_is_rejected() {
        let mut i2c = I2cMock::new(&[I2cTransaction::write_read(
            ADDR,
            vec![REG_PRODUCT_ID],
            vec![0x6D],
        )]);
        let result = Cap12xx::new(i2c.clone(), ADDR, Cap12xxModel::Cap1208);
        assert!(matches!(result, Err(Error::UnexpectedChipId(0x6D))));
        i2c.done();
    }

    #[test]
    fn touches_are_masked_to_channel_count() {
        let (mut dev, mut i2c) = device(
            Cap12xxModel::Cap1203,
            &[I2cTransaction::write_read(
                ADDR,
                vec![REG_SENSOR_INPUT_STATUS],
                vec![0xFF],
            )],
        );
        assert_eq!(dev.read_touches().unwrap(), 0x07);
        i2c.done();
    }

    #[test]
    fn scan_reports_press_then_release() {
        let mut rest = scan_transactions(0b0000_0101);
        rest.extend(scan_transactions(0b0000_0100));
        let (mut dev, mut i2c) = device(Cap12xxModel::Cap1208, &rest);

        assert_eq!(dev.scan().unwrap(), 0b101);
        assert_eq!(dev.poll_event(), Some(InputEvent::KeyPress(0)));
        assert_eq!(dev.poll_event(), Some(InputEvent::KeyPress(2)));
        assert_eq!(dev.poll_event(), None);

        assert_eq!(dev.scan().unwrap(), 0b100);
        assert_eq!(dev.poll_event(), Some(InputEvent::KeyRelease(0)));
        assert_eq!(dev.poll_event(), None);
        assert_eq!(dev.last_touches(), 0b100);
        i2c.done();
    }

    #[test]
    fn unchanged_touches_queue_nothing() {
        let mut rest = scan_transactions(0b10);
        rest.extend(scan_transactions(0b10));
        let (mut dev, mut i2c) = device(Cap12xxModel::Cap1206, &rest);
        dev.scan().unwrap();
        assert_eq!(dev.poll_event(), Some(InputEvent::KeyPress(1)));
        dev.scan().unwrap();
        assert_eq!(dev.poll_event(), None);
        i2c.done();
    }

    #[test]
    fn multitouch_limit_encodes_b_mult_t() {
        let (mut dev, mut i2c) = device(
            Cap12xxModel::Cap1208,
            &[I2cTransaction::write(ADDR, vec![REG_MULTITOUCH_CONFIG, 0x84])],
        );
        dev.set_multitouch_max(2).unwrap();
        i2c.done();
    }

    #[test]
    fn multitouch_limit_out_of_range_touches_no_register() {
        let (mut dev, mut i2c) = device(Cap12xxModel::Cap1208, &[]);
        assert!(matches!(
            dev.set_multitouch_max(5),
            Err(Error::InvalidArgument(e)) if e.value == 5
        ));
        assert!(dev.set_multitouch_max(0).is_err());
        i2c.done();
    }

    #[test]
    fn sensitivity_keeps_base_shift() {
        let (mut dev, mut i2c) = device(
            Cap12xxModel::Cap1298,
            &[
                I2cTransaction::write(ADDR, vec![REG_SENSITIVITY, 0x2F]),
                I2cTransaction::write(ADDR, vec![REG_SENSITIVITY, 0x0F]),
            ],
        );
        dev.set_sensitivity(Sensitivity::default()).unwrap();
        dev.set_sensitivity(Sensitivity::X128).unwrap();
        i2c.done();
    }

    #[test]
    fn channel_masks_apply_to_configuration_writes() {
        let (mut dev, mut i2c) = device(
            Cap12xxModel::Cap1296,
            &[
                I2cTransaction::write(ADDR, vec![REG_INPUTS_ENABLE, 0x3F]),
                I2cTransaction::write(ADDR, vec![REG_REPEAT_ENABLE, 0x00]),
                I2cTransaction::write(ADDR, vec![REG_LED_LINKING, 0x21]),
            ],
        );
        dev.set_inputs_enabled(0xFF).unwrap();
        dev.set_repeat_enabled(0x00).unwrap();
        dev.set_led_linking(0x21).unwrap();
        i2c.done();
    }
}
