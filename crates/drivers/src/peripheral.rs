//! Peripheral abstraction layer
//!
//! I2C and GPIO drivers in this crate use the `embedded-hal` traits
//! directly. SPI output drivers go through [`SpiTransport`] instead, because
//! they need two things `SpiDevice` does not model: an explicit
//! configuration step before the first transfer and an explicit release of
//! the bus handle.

use embedded_hal::spi::SpiDevice;

/// SPI output transport consumed by the SPI drivers.
pub trait SpiTransport {
    /// Error type
    type Error: core::fmt::Debug;

    /// Configure clock frequency, mode and bit order.
    ///
    /// Called once by the driver before the first [`write`](Self::write).
    fn configure(&mut self, config: SpiConfig) -> Result<(), Self::Error>;

    /// Write data (half duplex), as a single transfer.
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Release the underlying bus handle.
    fn close(&mut self) -> Result<(), Self::Error>;
}

/// SPI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// SPI mode (CPOL, CPHA)
    pub mode: SpiMode,
    /// Bit order
    pub bit_order: BitOrder,
    /// Bits per transferred word
    pub bits_per_word: u8,
}

/// SPI modes (CPOL, CPHA)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiMode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl From<SpiMode> for embedded_hal::spi::Mode {
    fn from(mode: SpiMode) -> Self {
        match mode {
            SpiMode::Mode0 => embedded_hal::spi::MODE_0,
            SpiMode::Mode1 => embedded_hal::spi::MODE_1,
            SpiMode::Mode2 => embedded_hal::spi::MODE_2,
            SpiMode::Mode3 => embedded_hal::spi::MODE_3,
        }
    }
}

/// Bit order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// Most significant bit first
    MsbFirst,
    /// Least significant bit first
    LsbFirst,
}

/// [`SpiTransport`] over any `embedded-hal` [`SpiDevice`].
///
/// `embedded-hal` leaves bus clocking to the HAL that built the device, so
/// [`configure`](SpiTransport::configure) only records the requested
/// settings; the board code must build the device with the same values
/// (see [`HalSpi::config`]). `close` drops the device.
///
/// Bytes are passed through unchanged. For WS2812B frames the controller
/// must also hold MOSI low for one clock between bytes: that idle clock is
/// the ninth symbol of every stored group (see
/// [`bit_pattern`](crate::ws2812b::bit_pattern)). A controller that clocks
/// bytes back to back joins a trailing `11` to the next byte's leading `1`
/// and the strip reads garbage.
pub struct HalSpi<S> {
    spi: Option<S>,
    config: Option<SpiConfig>,
}

impl<S: SpiDevice> HalSpi<S> {
    /// Wrap a configured SPI device.
    pub fn new(spi: S) -> Self {
        Self {
            spi: Some(spi),
            config: None,
        }
    }

    /// Settings requested by the driver, if it has configured the transport.
    pub fn config(&self) -> Option<SpiConfig> {
        self.config
    }

    /// Give the device back, unless it was already closed.
    pub fn into_inner(self) -> Option<S> {
        self.spi
    }
}

/// Error of a [`HalSpi`] transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalSpiError<E> {
    /// The wrapped `SpiDevice` failed.
    Spi(E),
    /// The device was already dropped by `close`.
    Released,
}

impl<S: SpiDevice> SpiTransport for HalSpi<S> {
    type Error = HalSpiError<S::Error>;

    fn configure(&mut self, config: SpiConfig) -> Result<(), Self::Error> {
        self.config = Some(config);
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        let spi = self.spi.as_mut().ok_or(HalSpiError::Released)?;
        spi.write(data).map_err(HalSpiError::Spi)
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        drop(self.spi.take());
        Ok(())
    }
}
