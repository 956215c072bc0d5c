//! WS2812B strip driver.

use super::converter::ColorToBitPatternConverter;
use super::sequence::ColorChannelSequence;
use crate::config::WS2812B_SPI_CONFIG;
use crate::error::Error;
use crate::peripheral::SpiTransport;

/// WS2812B LED strip on an SPI MOSI line.
///
/// Each [`write`](Self::write) encodes the whole strip and pushes it in a
/// single transfer. The strip has no back channel: a failed transfer leaves
/// the previous frame showing and is reported, not retried.
pub struct Ws2812b<T: SpiTransport> {
    transport: Option<T>,
    converter: ColorToBitPatternConverter,
}

impl<T: SpiTransport> Ws2812b<T> {
    /// Take ownership of `transport`, configure it for WS2812B timing and
    /// emit colors in `sequence` order.
    ///
    /// # Errors
    ///
    /// [`Error::Bus`] if the transport rejects the configuration.
    pub fn new(mut transport: T, sequence: ColorChannelSequence) -> Result<Self, Error<T::Error>> {
        transport.configure(WS2812B_SPI_CONFIG).map_err(Error::Bus)?;
        #[cfg(feature = "defmt")]
        defmt::debug!("ws2812b: transport configured, sequence {}", sequence);
        Ok(Self {
            transport: Some(transport),
            converter: ColorToBitPatternConverter::new(sequence),
        })
    }

    /// Channel order the driver emits.
    pub fn sequence(&self) -> ColorChannelSequence {
        self.converter.sequence()
    }

    /// `true` once [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.transport.is_none()
    }

    /// Show `colors` (packed `0xRRGGBB`, first LED first).
    ///
    /// # Errors
    ///
    /// - [`Error::DeviceClosed`] after [`close`](Self::close); the transport
    ///   is not touched.
    /// - [`Error::Bus`] with the transport's own error.
    pub fn write(&mut self, colors: &[u32]) -> Result<(), Error<T::Error>> {
        let transport = self.transport.as_mut().ok_or(Error::DeviceClosed)?;
        let frame = self.converter.convert(colors);
        #[cfg(feature = "defmt")]
        defmt::trace!("ws2812b: {} leds, {} bytes", colors.len(), frame.len());
        transport.write(&frame).map_err(Error::Bus)
    }

    /// Release the transport. Further calls do nothing.
    ///
    /// # Errors
    ///
    /// [`Error::Bus`] if the transport fails to close; the handle is
    /// released either way.
    pub fn close(&mut self) -> Result<(), Error<T::Error>> {
        match self.transport.take() {
            Some(mut transport) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("ws2812b: closing transport");
                transport.close().map_err(Error::Bus)
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::{MockError, MockSpiTransport};

    fn open(sequence: ColorChannelSequence) -> (Ws2812b<MockSpiTransport>, MockSpiTransport) {
        let transport = MockSpiTransport::new();
        let strip = Ws2812b::new(transport.clone(), sequence).unwrap();
        (strip, transport)
    }

    #[test]
    fn construction_configures_transport() {
        let (_strip, transport) = open(ColorChannelSequence::Grb);
        assert_eq!(transport.config(), Some(WS2812B_SPI_CONFIG));
        assert!(transport.writes().is_empty(), "no frame before the first write");
    }

    #[test]
    fn write_issues_exactly_one_transfer() {
        let (mut strip, transport) = open(ColorChannelSequence::Rgb);
        strip.write(&[0xFF_00_00, 0x00_FF_00, 0x00_00_FF]).unwrap();
        let writes = transport.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].len(), 24);
        assert_eq!(
            &writes[0][..8],
            &[0xDB, 0xDB, 0xDA, 0x92, 0x92, 0x92, 0x92, 0x92]
        );
    }

    #[test]
    fn empty_strip_still_writes_once() {
        let (mut strip, transport) = open(ColorChannelSequence::Grb);
        strip.write(&[]).unwrap();
        assert_eq!(transport.writes(), std::vec![std::vec::Vec::<u8>::new()]);
    }

    #[test]
    fn close_twice_closes_transport_once() {
        let (mut strip, transport) = open(ColorChannelSequence::Grb);
        strip.close().unwrap();
        strip.close().unwrap();
        assert_eq!(transport.close_calls(), 1);
        assert!(strip.is_closed());
    }

    #[test]
    fn write_after_close_is_device_closed() {
        let (mut strip, transport) = open(ColorChannelSequence::Grb);
        strip.close().unwrap();
        assert_eq!(strip.write(&[0x12_34_56]), Err(Error::DeviceClosed));
        assert!(transport.writes().is_empty());
    }

    #[test]
    fn transport_failure_propagates_unmodified() {
        let (mut strip, transport) = open(ColorChannelSequence::Grb);
        transport.fail_writes();
        assert_eq!(strip.write(&[0]), Err(Error::Bus(MockError)));
        // Nothing is buffered for a retry.
        assert!(transport.writes().is_empty());
        assert!(!strip.is_closed());
    }

    #[test]
    fn sequence_is_reported() {
        let (strip, _transport) = open(ColorChannelSequence::Bgr);
        assert_eq!(strip.sequence(), ColorChannelSequence::Bgr);
    }
}
