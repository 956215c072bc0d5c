//! End-to-end tests through the public API against `embedded-hal-mock` buses.
//! Each test scripts the exact bus traffic a real chip would see.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use drivers::ads1x15::{Ads1x15, Channel, Variant, ADS1X15_I2C_ADDR_GND};
use drivers::bmx280::{Bmx280, BMX280_I2C_ADDR_SECONDARY};
use drivers::{ColorChannelSequence, Error, HalSpi, HalSpiError, Reading, SensorSource, Ws2812b};
use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

/// Helper: one `SpiDevice::write` as the mock sees it.
fn spi_device_write(data: Vec<u8>) -> [SpiTransaction<u8>; 3] {
    [
        SpiTransaction::transaction_start(),
        SpiTransaction::write_vec(data),
        SpiTransaction::transaction_end(),
    ]
}

// ── WS2812B ──────────────────────────────────────────────────────────────────

#[test]
fn red_led_in_rgb_order_over_spi_device() {
    let mut spi = SpiMock::new(&spi_device_write(vec![
        0xDB, 0xDB, 0xDA, 0x92, 0x92, 0x92, 0x92, 0x92,
    ]));
    let mut strip = Ws2812b::new(HalSpi::new(spi.clone()), ColorChannelSequence::Rgb).unwrap();
    strip.write(&[0xFF_00_00]).unwrap();
    strip.close().unwrap();
    spi.done();
}

#[test]
fn native_grb_order_puts_green_first() {
    // Pure green under GRB: green byte first, so the same waveform as red
    // under RGB.
    let mut spi = SpiMock::new(&spi_device_write(vec![
        0xDB, 0xDB, 0xDA, 0x92, 0x92, 0x92, 0x92, 0x92,
    ]));
    let mut strip = Ws2812b::new(HalSpi::new(spi.clone()), ColorChannelSequence::Grb).unwrap();
    strip.write(&[0x00_FF_00]).unwrap();
    spi.done();
}

#[test]
fn closed_strip_reports_device_closed_without_bus_traffic() {
    let mut spi = SpiMock::new(&[]);
    let mut strip = Ws2812b::new(HalSpi::new(spi.clone()), ColorChannelSequence::Grb).unwrap();
    strip.close().unwrap();
    strip.close().unwrap();
    assert_eq!(
        strip.write(&[0x10_20_30]),
        Err(Error::<HalSpiError<_>>::DeviceClosed)
    );
    spi.done();
}

// ── Sensors through the host-facing trait ────────────────────────────────────

fn sample<S: SensorSource>(sensor: &mut S) -> Reading
where
    S::Error: core::fmt::Debug,
{
    sensor.read().unwrap()
}

#[test]
fn bmx280_datasheet_sample_on_secondary_address() {
    let addr = BMX280_I2C_ADDR_SECONDARY;
    let mut i2c = I2cMock::new(&[
        I2cTransaction::write_read(addr, vec![0xD0], vec![0x58]),
        I2cTransaction::write_read(
            addr,
            vec![0x88],
            vec![
                0x70, 0x6B, 0x43, 0x67, 0x18, 0xFC, 0x7D, 0x8E, 0x43, 0xD6, 0xD0, 0x0B, 0x27,
                0x0B, 0x8C, 0x00, 0xF9, 0xFF, 0x8C, 0x3C, 0xF8, 0xC6, 0x70, 0x17,
            ],
        ),
        I2cTransaction::write_read(addr, vec![0xF7], vec![0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00]),
    ]);
    let mut sensor = Bmx280::new(i2c.clone(), addr).unwrap();
    match sample(&mut sensor) {
        Reading::Environment { celsius, hpa } => {
            assert!((celsius - 25.08).abs() < 0.01, "temperature {celsius}");
            assert!((hpa - 1006.53).abs() < 0.01, "pressure {hpa}");
        }
        other => panic!("expected environment reading, got {other:?}"),
    }
    i2c.done();
}

#[test]
fn ads1015_differential_negative_voltage() {
    let addr = ADS1X15_I2C_ADDR_GND;
    // OS | MUX=000 | PGA=010 | MODE | DR=100 | COMP_QUE=11
    let mut i2c = I2cMock::new(&[
        I2cTransaction::write(addr, vec![0x01, 0x85, 0x83]),
        I2cTransaction::write_read(addr, vec![0x01], vec![0x85, 0x83]),
        // -1024 left-justified
        I2cTransaction::write_read(addr, vec![0x00], vec![0xC0, 0x00]),
    ]);
    let mut adc = Ads1x15::new(i2c.clone(), NoopDelay::new(), addr, Variant::Ads1015);
    adc.set_channel(Channel::Diff0_1);
    match sample(&mut adc) {
        Reading::Voltage(volts) => assert!((volts + 1.024).abs() < 1e-4, "got {volts}"),
        other => panic!("expected voltage, got {other:?}"),
    }
    i2c.done();
}
