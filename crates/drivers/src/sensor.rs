//! Host-facing sensor interface.
//!
//! A host polls any sensor driver through [`SensorSource`] without knowing
//! the chip behind it.

/// One measurement, in physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reading {
    /// Temperature in degrees Celsius.
    Temperature(f32),
    /// Barometric pressure in hectopascal.
    Pressure(f32),
    /// Temperature and pressure taken from the same sample.
    Environment {
        /// Degrees Celsius.
        celsius: f32,
        /// Hectopascal.
        hpa: f32,
    },
    /// Electric potential in volts.
    Voltage(f32),
}

/// A driver that can produce a [`Reading`] on demand.
pub trait SensorSource {
    /// Error type
    type Error;

    /// Take one measurement.
    fn read(&mut self) -> Result<Reading, Self::Error>;
}
