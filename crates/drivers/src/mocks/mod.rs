//! Mock implementations for testing
//!
//! Recording stand-ins for the transports the drivers consume, for use in
//! unit and integration tests. Like the `embedded-hal-mock` types, every
//! mock is `Clone` and clones share state: hand one clone to the driver and
//! keep another for assertions.

#![cfg(any(test, feature = "std"))]

use std::sync::{Arc, Mutex, MutexGuard};
use std::vec::Vec;

use crate::peripheral::{SpiConfig, SpiTransport};

/// Error injected by the mocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

impl embedded_hal::digital::Error for MockError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

// ---------------------------------------------------------------------------
// SPI transport
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct SpiState {
    config: Option<SpiConfig>,
    writes: Vec<Vec<u8>>,
    close_calls: usize,
    fail_writes: bool,
}

/// Mock [`SpiTransport`] recording configuration, frames and close calls.
#[derive(Debug, Clone, Default)]
pub struct MockSpiTransport {
    state: Arc<Mutex<SpiState>>,
}

impl MockSpiTransport {
    /// Create new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SpiState> {
        // A poisoned lock means another test thread already panicked.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Make every subsequent `write` fail with [`MockError`].
    pub fn fail_writes(&self) {
        self.state().fail_writes = true;
    }

    /// Configuration applied by the driver, if any.
    pub fn config(&self) -> Option<SpiConfig> {
        self.state().config
    }

    /// Every frame written so far, in order.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state().writes.clone()
    }

    /// Number of `close` calls seen.
    pub fn close_calls(&self) -> usize {
        self.state().close_calls
    }
}

impl SpiTransport for MockSpiTransport {
    type Error = MockError;

    fn configure(&mut self, config: SpiConfig) -> Result<(), Self::Error> {
        self.state().config = Some(config);
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(MockError);
        }
        state.writes.push(data.to_vec());
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        let mut state = self.state();
        state.close_calls = state.close_calls.saturating_add(1);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Key matrix
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct MatrixState {
    /// Output level per row (`true` = high).
    rows: Vec<bool>,
    /// Pressed switches, `pressed[row][col]`.
    pressed: Vec<Vec<bool>>,
}

/// Simulated switch matrix wired to row outputs and pulled-up column inputs.
///
/// A column reads low while any row driven low has a closed switch on that
/// column, which is how a real matrix with pull-ups behaves.
#[derive(Debug, Clone)]
pub struct MockKeyMatrix {
    state: Arc<Mutex<MatrixState>>,
}

impl MockKeyMatrix {
    /// Matrix with `rows × cols` open switches and all rows high.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(MatrixState {
                rows: std::vec![true; rows],
                pressed: std::vec![std::vec![false; cols]; rows],
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, MatrixState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Close (`true`) or open (`false`) the switch at `row`, `col`.
    pub fn set_pressed(&self, row: usize, col: usize, pressed: bool) {
        if let Some(cell) = self.state().pressed.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = pressed;
        }
    }

    /// Output pin driving `row`.
    pub fn row_pin(&self, row: usize) -> MockRowPin {
        MockRowPin {
            matrix: self.clone(),
            row,
        }
    }

    /// Input pin sensing `col`.
    pub fn col_pin(&self, col: usize) -> MockColPin {
        MockColPin {
            matrix: self.clone(),
            col,
        }
    }
}

/// Row output of a [`MockKeyMatrix`].
#[derive(Debug, Clone)]
pub struct MockRowPin {
    matrix: MockKeyMatrix,
    row: usize,
}

impl embedded_hal::digital::ErrorType for MockRowPin {
    type Error = MockError;
}

impl embedded_hal::digital::OutputPin for MockRowPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut state = self.matrix.state();
        let level = state.rows.get_mut(self.row).ok_or(MockError)?;
        *level = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut state = self.matrix.state();
        let level = state.rows.get_mut(self.row).ok_or(MockError)?;
        *level = true;
        Ok(())
    }
}

/// Column input of a [`MockKeyMatrix`].
#[derive(Debug, Clone)]
pub struct MockColPin {
    matrix: MockKeyMatrix,
    col: usize,
}

impl embedded_hal::digital::ErrorType for MockColPin {
    type Error = MockError;
}

impl embedded_hal::digital::InputPin for MockColPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        let state = self.matrix.state();
        let pulled_down = state
            .rows
            .iter()
            .zip(&state.pressed)
            .any(|(&high, switches)| !high && switches.get(self.col).copied().unwrap_or(false));
        Ok(pulled_down)
    }
}

// ---------------------------------------------------------------------------
// Single input line
// ---------------------------------------------------------------------------

/// Input pin whose level the test sets directly.
#[derive(Debug, Clone, Default)]
pub struct MockInputPin {
    high: Arc<Mutex<bool>>,
}

impl MockInputPin {
    /// Pin starting at `high`.
    pub fn new(high: bool) -> Self {
        Self {
            high: Arc::new(Mutex::new(high)),
        }
    }

    /// Drive the simulated line.
    pub fn set_high(&self, high: bool) {
        *self
            .high
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = high;
    }
}

impl embedded_hal::digital::ErrorType for MockInputPin {
    type Error = MockError;
}

impl embedded_hal::digital::InputPin for MockInputPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(*self
            .high
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use embedded_hal::digital::{InputPin, OutputPin};

    #[test]
    fn test_mock_spi_records_frames() {
        let handle = MockSpiTransport::new();
        let mut spi = handle.clone();
        spi.write(&[1, 2, 3]).unwrap();
        spi.write(&[4]).unwrap();
        assert_eq!(handle.writes(), std::vec![std::vec![1, 2, 3], std::vec![4]]);
    }

    #[test]
    fn test_mock_spi_injected_failure() {
        let handle = MockSpiTransport::new();
        let mut spi = handle.clone();
        handle.fail_writes();
        assert_eq!(spi.write(&[0]), Err(MockError));
        assert!(handle.writes().is_empty());
    }

    #[test]
    fn test_mock_matrix_column_follows_driven_row() {
        let matrix = MockKeyMatrix::new(2, 2);
        let mut row0 = matrix.row_pin(0);
        let mut col1 = matrix.col_pin(1);
        matrix.set_pressed(0, 1, true);

        assert!(col1.is_high().unwrap(), "row idle high → column pulled up");
        row0.set_low().unwrap();
        assert!(col1.is_low().unwrap());
        row0.set_high().unwrap();
        assert!(col1.is_high().unwrap());
    }

    #[test]
    fn test_mock_input_pin_level() {
        let handle = MockInputPin::new(true);
        let mut pin = handle.clone();
        assert!(pin.is_high().unwrap());
        handle.set_high(false);
        assert!(pin.is_low().unwrap());
    }
}
