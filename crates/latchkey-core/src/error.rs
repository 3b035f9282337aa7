use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Credential errors
    #[error("Invalid credential length: expected {min}-{max} bytes, got {actual}")]
    InvalidCredentialLength {
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Invalid credential format: {0}")]
    InvalidCredentialFormat(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
