//! Error types for hardware operations.
//!
//! This module defines error types for the capability boundary: reader and
//! actuator communication failures, nonvolatile region access, and I/O of
//! file-backed regions.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Device configuration error.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Nonvolatile access outside the region.
    #[error("Access out of range: offset {offset} + {len} bytes exceeds region of {size} bytes")]
    OutOfRange {
        offset: usize,
        len: usize,
        size: usize,
    },

    /// Nonvolatile write failed.
    #[error("Write failed at offset {offset}: {message}")]
    WriteFailed { offset: usize, message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Create a new out-of-range error.
    pub fn out_of_range(offset: usize, len: usize, size: usize) -> Self {
        Self::OutOfRange { offset, len, size }
    }

    /// Create a new write failure error.
    pub fn write_failed(offset: usize, message: impl Into<String>) -> Self {
        Self::WriteFailed {
            offset,
            message: message.into(),
        }
    }
}
