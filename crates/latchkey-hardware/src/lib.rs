//! Hardware capability layer for the Latchkey door controller.
//!
//! This crate defines the traits through which the access controller talks
//! to the outside world, plus the implementations that do not depend on a
//! particular board: a servo-driven latch, nonvolatile region backends, and
//! mock devices for tests and simulation.
//!
//! # Design Philosophy
//!
//! - **Polling, not async**: the controller runs a single cooperative loop.
//!   Every trait method is synchronous and returns promptly; the only
//!   intentional block is the actuator settle delay.
//! - **Error-aware**: fallible operations return [`Result<T>`][error::Result]
//!   carrying a [`HardwareError`].
//! - **Integrity failures are silent**: a reader whose checksum fails reports
//!   "nothing presented", never an error.
//!
//! # Capability Traits
//!
//! | Trait | Role |
//! |-------|------|
//! | [`CredentialReader`] | non-blocking credential poll, periodic re-arm |
//! | [`LockActuator`] | drive the latch to one of two positions |
//! | [`FeedbackSink`] | render an outcome as light and sound |
//! | [`NonvolatileStore`] | byte-addressable persistent region |
//! | [`InputPanel`] | button level and optional door sensor |
//! | [`Clock`], [`Delay`] | monotonic milliseconds, bounded waits |
//! | [`ServoDriver`] | PWM channel behind [`ServoLock`] |
//!
//! # Examples
//!
//! ```
//! use latchkey_core::Credential;
//! use latchkey_hardware::mock::MockReader;
//! use latchkey_hardware::traits::CredentialReader;
//!
//! let (mut reader, handle) = MockReader::<8>::new();
//! handle.present(Credential::from_slice(&[1, 2, 3, 4]).unwrap());
//! assert!(reader.try_read().unwrap().is_some());
//! ```
//!
//! [`CredentialReader`]: traits::CredentialReader
//! [`LockActuator`]: traits::LockActuator
//! [`FeedbackSink`]: traits::FeedbackSink
//! [`NonvolatileStore`]: traits::NonvolatileStore
//! [`InputPanel`]: traits::InputPanel
//! [`Clock`]: traits::Clock
//! [`Delay`]: traits::Delay
//! [`ServoDriver`]: traits::ServoDriver
//! [`ServoLock`]: servo::ServoLock

pub mod error;
pub mod mock;
pub mod nvs;
pub mod servo;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use nvs::{FileNvs, MemoryNvs};
pub use servo::ServoLock;
pub use traits::{
    Clock, CredentialReader, Delay, FeedbackSink, InputPanel, LockActuator, NonvolatileStore,
    ServoDriver,
};
pub use types::{PanelSnapshot, ServoCalibration};
