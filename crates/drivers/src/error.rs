//! Shared error taxonomy for every driver in this crate.
//!
//! All drivers return [`Error<E>`] where `E` is the bus error of the
//! transport they own (`I2c::Error`, `SpiTransport::Error`, pin error, ...).
//! Bus errors are wrapped, never translated or retried.

// ── OutOfRangeError ──────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

impl OutOfRangeError {
    /// Check `value` against the inclusive range `min..=max`.
    ///
    /// # Errors
    ///
    /// Returns `Err(Self)` describing the violation when `value` is outside
    /// the range.
    pub const fn check(value: u32, min: u32, max: u32) -> Result<u32, Self> {
        if value < min || value > max {
            Err(Self { value, min, max })
        } else {
            Ok(value)
        }
    }
}

impl core::fmt::Display for OutOfRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "value {} outside valid range {}..={}",
            self.value, self.min, self.max
        )
    }
}

impl core::error::Error for OutOfRangeError {}

// ── Error ────────────────────────────────────────────────────────────────────

/// Driver error, generic over the bus error `E`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Transport failure, propagated unmodified from the bus primitive.
    Bus(E),
    /// An argument was outside the domain the chip (or encoder) accepts.
    InvalidArgument(OutOfRangeError),
    /// The driver was used after `close()`.
    DeviceClosed,
    /// The identification register did not hold the expected value.
    UnexpectedChipId(u8),
    /// The chip did not finish an operation within the polling budget.
    Timeout,
    /// The chip returned a value that cannot be a valid measurement.
    InvalidData,
}

impl<E> From<OutOfRangeError> for Error<E> {
    fn from(err: OutOfRangeError) -> Self {
        Self::InvalidArgument(err)
    }
}

impl<E> Error<E> {
    /// Map the bus error type, keeping every other variant.
    pub fn map_bus<F>(self, f: impl FnOnce(E) -> F) -> Error<F> {
        match self {
            Self::Bus(e) => Error::Bus(f(e)),
            Self::InvalidArgument(e) => Error::InvalidArgument(e),
            Self::DeviceClosed => Error::DeviceClosed,
            Self::UnexpectedChipId(id) => Error::UnexpectedChipId(id),
            Self::Timeout => Error::Timeout,
            Self::InvalidData => Error::InvalidData,
        }
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    // Bus errors only guarantee `Debug`.
    #[allow(clippy::use_debug)]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus transfer failed: {e:?}"),
            Self::InvalidArgument(e) => write!(f, "invalid argument: {e}"),
            Self::DeviceClosed => write!(f, "device already closed"),
            Self::UnexpectedChipId(id) => write!(f, "unexpected chip id 0x{id:02X}"),
            Self::Timeout => write!(f, "operation timed out"),
            Self::InvalidData => write!(f, "chip returned invalid data"),
        }
    }
}

impl<E: core::fmt::Debug> core::error::Error for Error<E> {}
