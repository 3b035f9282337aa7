//! Access control logic for a single Latchkey door.
//!
//! This crate decides, every polling tick, whether to enroll, revoke,
//! unlock, lock or decline, and drives the peripherals accordingly.
//!
//! # Architecture
//!
//! - [`ControllerConfig`] - policy, enrollment gate and timings
//! - [`LockMachine`] - pure decision logic: `(state, inputs, now)` to
//!   [`Command`]s
//! - [`AccessController`] - boot sequence and poll loop over the capability
//!   traits of `latchkey-hardware` and a
//!   [`CredentialRepository`](latchkey_storage::CredentialRepository)
//!
//! # Policies
//!
//! | Policy | Button | Recognized credential | Auto-relock |
//! |---|---|---|---|
//! | [`AccessPolicy::TimeoutRelock`] | unlocks | unlocks while locked | after `lock_timeout_ms` of quiet |
//! | [`AccessPolicy::ManualToggle`] | toggles | toggles, at most once per `lock_timeout_ms` | never |
//!
//! Unrecognized credentials are declined, at most once per
//! `rearm_interval_ms` while held on the reader. Enrollment takes priority
//! over both policies whenever its [`EnrollmentGate`] is open.

pub mod config;
pub mod controller;
pub mod error;
pub mod machine;

pub use config::{AccessPolicy, ControllerConfig, EnrollmentGate};
pub use controller::{AccessController, BootReport, Peripherals};
pub use error::{ControllerError, Result};
pub use machine::{
    Command, LockMachine, LockTransition, MAX_HISTORY_SIZE, TickInput, TransitionCause,
};
