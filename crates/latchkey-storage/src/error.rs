use latchkey_hardware::HardwareError;
use thiserror::Error;

/// Storage-specific error types for the credential store.
///
/// Domain rejections such as a full store are not errors: they are reported
/// through [`EnrollOutcome`](crate::EnrollOutcome). These variants cover
/// failures of the nonvolatile region itself.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The underlying nonvolatile region failed.
    #[error("Nonvolatile region error: {0}")]
    Hardware(#[from] HardwareError),

    /// The region cannot hold the configured layout.
    #[error("Region too small: layout needs {needed} bytes, region has {size}")]
    RegionTooSmall { needed: usize, size: usize },

    /// A slot index outside the configured capacity was requested.
    #[error("Slot {slot} out of range for capacity {capacity}")]
    SlotOutOfRange { slot: usize, capacity: usize },
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
