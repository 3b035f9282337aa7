use latchkey_hardware::HardwareError;
use latchkey_storage::StorageError;
use thiserror::Error;

/// Errors that stop the control loop.
///
/// Access decisions are never errors: declines and full-store rejections are
/// reported through feedback. These variants are failures of configuration,
/// of the credential region, or of a peripheral. None is retried.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The configuration describes an inoperable unit.
    #[error(transparent)]
    Config(#[from] latchkey_core::Error),

    /// The credential store failed.
    #[error("Credential store error: {0}")]
    Storage(#[from] StorageError),

    /// A peripheral failed.
    #[error("Peripheral error: {0}")]
    Hardware(#[from] HardwareError),
}

pub type Result<T> = std::result::Result<T, ControllerError>;
