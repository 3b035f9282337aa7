//! Core value types for the Latchkey single-door access controller.
//!
//! Everything here is plain data shared by the hardware, storage, and
//! controller crates: the fixed-width [`Credential`], the commanded
//! [`LockState`], the optional [`DoorSensorState`], and the closed
//! [`Outcome`] set together with its light/sound [`Signal`] mapping.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
