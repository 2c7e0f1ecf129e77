//! Error types for the OLED display driver.

use core::fmt;

use embedded_hal_async::i2c::{ErrorKind, NoAcknowledgeSource};

/// Errors that can occur during OLED display operations.
///
/// Bus errors from the underlying I2C peripheral are reduced to their
/// [`ErrorKind`], so this enum is non-generic and `Copy`.
///
/// Drawing primitives never produce an error for out-of-range arguments;
/// they clip silently. Only lifecycle and bus problems surface here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OledError {
    /// The bus failed while opening the session (arbitration loss, bus
    /// fault, overrun, ...).
    BusUnavailable,
    /// No device acknowledged its address during [`begin()`](crate::OledDriver::begin).
    DeviceNotFound,
    /// An operation was attempted before [`begin()`](crate::OledDriver::begin)
    /// succeeded or after [`end()`](crate::OledDriver::end).
    NotInitialized,
    /// A command or data write failed mid-stream.
    ///
    /// The session stays open but the panel contents are indeterminate
    /// until the next successful present.
    TransferFailure(ErrorKind),
    /// The configured width/height pair is not a supported panel geometry.
    InvalidGeometry,
}

impl OledError {
    /// Classify a bus error that occurred while probing the device.
    ///
    /// An address NACK means nothing answered at the configured address;
    /// any other fault means the bus itself is unusable.
    pub(crate) fn from_probe(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
            | ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown) => OledError::DeviceNotFound,
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) => OledError::TransferFailure(kind),
            _ => OledError::BusUnavailable,
        }
    }
}

impl fmt::Display for OledError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OledError::BusUnavailable => write!(f, "I2C bus unavailable"),
            OledError::DeviceNotFound => write!(f, "No device acknowledged the display address"),
            OledError::NotInitialized => write!(f, "Display not initialized"),
            OledError::TransferFailure(kind) => write!(f, "Transfer failure: {}", kind),
            OledError::InvalidGeometry => write!(f, "Unsupported display geometry"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OledError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            OledError::BusUnavailable => defmt::write!(f, "Bus unavailable"),
            OledError::DeviceNotFound => defmt::write!(f, "Device not found"),
            OledError::NotInitialized => defmt::write!(f, "Not initialized"),
            OledError::TransferFailure(_kind) => defmt::write!(f, "Transfer failure"),
            OledError::InvalidGeometry => defmt::write!(f, "Invalid geometry"),
        }
    }
}
