//! DC-motor HAT: a PCA9685 driving two dual H-bridges (TB6612).
//!
//! Each motor uses three PWM channels: a speed channel into the bridge's PWM
//! input and two channels used as logic levels for IN1 / IN2.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::Error;
use crate::pca9685::{Pca9685, MAX_COUNT};

/// Default 7-bit I2C address of the HAT's PCA9685.
pub const MOTOR_HAT_I2C_ADDR: u8 = 0x60;
/// PWM frequency the HAT runs at.
pub const MOTOR_HAT_PWM_HZ: u32 = 1_600;

/// Motor terminal pair on the HAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum Motor {
    M1,
    M2,
    M3,
    M4,
}

impl Motor {
    /// `(PWM, IN2, IN1)` PCA9685 channels wired to this motor.
    pub const fn channels(self) -> (u8, u8, u8) {
        match self {
            Self::M1 => (8, 9, 10),
            Self::M2 => (13, 12, 11),
            Self::M3 => (2, 3, 4),
            Self::M4 => (7, 6, 5),
        }
    }
}

/// Bridge state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// IN1 high, IN2 low.
    Forward,
    /// IN1 low, IN2 high.
    Backward,
    /// Both low; the motor coasts.
    Release,
}

/// Scale an 8-bit speed to a 12-bit duty; 255 is full on.
#[allow(clippy::arithmetic_side_effects)] // Safety: 255 * 4095 fits u32
#[allow(clippy::cast_possible_truncation)] // result <= 4095
pub const fn speed_to_duty(speed: u8) -> u16 {
    (speed as u32 * MAX_COUNT as u32 / u8::MAX as u32) as u16
}

/// Motor HAT wrapping its PCA9685.
pub struct MotorHat<I, D> {
    pwm: Pca9685<I, D>,
}

impl<I: I2c, D: DelayNs> MotorHat<I, D> {
    /// Bring up the PCA9685 at `address` and set the bridge PWM frequency.
    pub fn new(i2c: I, delay: D, address: u8) -> Result<Self, Error<I::Error>> {
        let mut pwm = Pca9685::new(i2c, delay, address)?;
        pwm.set_pwm_frequency(MOTOR_HAT_PWM_HZ)?;
        Ok(Self { pwm })
    }

    /// Underlying PWM controller, for the HAT's spare channels.
    pub fn pwm(&mut self) -> &mut Pca9685<I, D> {
        &mut self.pwm
    }

    /// Give back the PWM controller.
    pub fn into_inner(self) -> Pca9685<I, D> {
        self.pwm
    }

    /// Set the speed (0 stopped, 255 full) without changing direction.
    pub fn set_speed(&mut self, motor: Motor, speed: u8) -> Result<(), Error<I::Error>> {
        let (pwm, _, _) = motor.channels();
        self.pwm.set_duty(pwm, speed_to_duty(speed))
    }

    fn set_pin(&mut self, channel: u8, high: bool) -> Result<(), Error<I::Error>> {
        self.pwm.set_duty(channel, if high { MAX_COUNT } else { 0 })
    }

    /// Drive the bridge inputs for `direction`.
    pub fn run(&mut self, motor: Motor, direction: Direction) -> Result<(), Error<I::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("motor_hat: {} {}", motor, direction);
        let (_, in2, in1) = motor.channels();
        // Drop one side before raising the other so the bridge never sees
        // both inputs high.
        match direction {
            Direction::Forward => {
                self.set_pin(in2, false)?;
                self.set_pin(in1, true)
            }
            Direction::Backward => {
                self.set_pin(in1, false)?;
                self.set_pin(in2, true)
            }
            Direction::Release => {
                self.set_pin(in1, false)?;
                self.set_pin(in2, false)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pca9685::{REG_MODE1, REG_MODE2, REG_PRE_SCALE};
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use std::vec;
    use std::vec::Vec;

    const ADDR: u8 = MOTOR_HAT_I2C_ADDR;
    const FULL_OFF: [u8; 4] = [0x00, 0x00, 0x00, 0x10];
    const FULL_ON: [u8; 4] = [0x00, 0x10, 0x00, 0x00];

    fn channel_write(channel: u8, counts: [u8; 4]) -> I2cTransaction {
        let mut bytes = vec![0x06 + 4 * channel];
        bytes.extend_from_slice(&counts);
        I2cTransaction::write(ADDR, bytes)
    }

    fn hat(rest: &[I2cTransaction]) -> (MotorHat<I2cMock, NoopDelay>, I2cMock) {
        let mut expectations: Vec<I2cTransaction> = vec![
            I2cTransaction::write(ADDR, vec![REG_MODE2, 0x04]),
            I2cTransaction::write(ADDR, vec![REG_MODE1, 0x21]),
            I2cTransaction::write_read(ADDR, vec![REG_MODE1], vec![0x21]),
            I2cTransaction::write(ADDR, vec![REG_MODE1, 0x31]),
            // round(25 MHz / (4096 * 1600)) - 1
            I2cTransaction::write(ADDR, vec![REG_PRE_SCALE, 3]),
            I2cTransaction::write(ADDR, vec![REG_MODE1, 0x21]),
            I2cTransaction::write(ADDR, vec![REG_MODE1, 0xA1]),
        ];
        expectations.extend_from_slice(rest);
        let i2c = I2cMock::new(&expectations);
        let hat = MotorHat::new(i2c.clone(), NoopDelay::new(), ADDR).unwrap();
        (hat, i2c)
    }

    #[test]
    fn speed_scaling_hits_both_ends() {
        assert_eq!(speed_to_duty(0), 0);
        assert_eq!(speed_to_duty(255), 4_095);
        assert_eq!(speed_to_duty(128), 2_055);
    }

    #[test]
    fn set_speed_drives_pwm_channel() {
        let (mut hat, mut i2c) = hat(&[
            channel_write(8, [0x00, 0x00, 0x07, 0x08]),
            channel_write(13, FULL_ON),
        ]);
        hat.set_speed(Motor::M1, 128).unwrap();
        hat.set_speed(Motor::M2, 255).unwrap();
        i2c.done();
    }

    #[test]
    fn forward_lowers_in2_then_raises_in1() {
        let (mut hat, mut i2c) = hat(&[channel_write(9, FULL_OFF), channel_write(10, FULL_ON)]);
        hat.run(Motor::M1, Direction::Forward).unwrap();
        i2c.done();
    }

    #[test]
    fn backward_and_release_on_m4() {
        let (mut hat, mut i2c) = hat(&[
            channel_write(5, FULL_OFF),
            channel_write(6, FULL_ON),
            channel_write(5, FULL_OFF),
            channel_write(6, FULL_OFF),
        ]);
        hat.run(Motor::M4, Direction::Backward).unwrap();
        hat.run(Motor::M4, Direction::Release).unwrap();
        i2c.done();
    }

    #[test]
    fn channel_triples_match_board_wiring() {
        assert_eq!(Motor::M1.channels(), (8, 9, 10));
        assert_eq!(Motor::M2.channels(), (13, 12, 11));
        assert_eq!(Motor::M3.channels(), (2, 3, 4));
        assert_eq!(Motor::M4.channels(), (7, 6, 5));
    }
}
