//! Controller configuration.
//!
//! A [`ControllerConfig`] selects the access policy and enrollment gate of a
//! unit and carries its timings. It is plain data: `serde` loads it from
//! JSON, missing fields fall back to the defaults in
//! [`latchkey_core::constants`], and [`ControllerConfig::validate`] rejects
//! combinations under which the door could never be operated.
//!
//! # Examples
//!
//! ```
//! use latchkey_controller::{AccessPolicy, ControllerConfig, EnrollmentGate};
//!
//! let config: ControllerConfig = serde_json::from_str(
//!     r#"{ "policy": "manual_toggle", "enrollment_gate": "while_locked", "door_sensor": false }"#,
//! ).unwrap();
//!
//! assert_eq!(config.policy, AccessPolicy::ManualToggle);
//! assert_eq!(config.enrollment_gate, EnrollmentGate::WhileLocked);
//! assert_eq!(config.lock_timeout_ms, 1000);
//! config.validate().unwrap();
//! ```

use latchkey_core::constants::{
    DEFAULT_LOCK_TIMEOUT_MS, DEFAULT_REARM_INTERVAL_MS, DEFAULT_RESET_HOLD_MS, DEFAULT_TICK_MS,
};
use latchkey_core::{Error, Result};
use latchkey_hardware::ServoCalibration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the lock reacts to the button, credentials and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicy {
    /// Credentials and the button only unlock; the lock re-engages by itself
    /// once the door has been quiet for the lock timeout.
    TimeoutRelock,

    /// The button and recognized credentials toggle the lock; nothing
    /// happens on its own.
    ManualToggle,
}

impl fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessPolicy::TimeoutRelock => write!(f, "timeout-relock"),
            AccessPolicy::ManualToggle => write!(f, "manual-toggle"),
        }
    }
}

/// When a presented credential goes to enrollment instead of access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentGate {
    /// Every presentation while the lock is engaged enrolls or revokes.
    WhileLocked,

    /// Only presentations made with the door open and the button held.
    /// Requires a door sensor.
    DoorOpenWithButtonHeld,
}

/// Configuration of one access controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub policy: AccessPolicy,

    pub enrollment_gate: EnrollmentGate,

    /// Whether a door-open sensor is fitted.
    pub door_sensor: bool,

    /// Quiescence before auto-relock (timeout relock), or the minimum gap
    /// between credential-driven actuations (manual toggle).
    pub lock_timeout_ms: u32,

    /// Credential evaluation interval and reader re-arm period.
    pub rearm_interval_ms: u32,

    /// How long the button must be held through boot to erase the store.
    pub reset_hold_ms: u32,

    /// Polling period of the control loop.
    pub tick_ms: u32,

    pub servo: ServoCalibration,
}

impl Default for ControllerConfig {
    /// The sensor-equipped timeout-relock unit.
    fn default() -> Self {
        Self {
            policy: AccessPolicy::TimeoutRelock,
            enrollment_gate: EnrollmentGate::DoorOpenWithButtonHeld,
            door_sensor: true,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            rearm_interval_ms: DEFAULT_REARM_INTERVAL_MS,
            reset_hold_ms: DEFAULT_RESET_HOLD_MS,
            tick_ms: DEFAULT_TICK_MS,
            servo: ServoCalibration::default(),
        }
    }
}

impl ControllerConfig {
    /// Sensorless manual-toggle unit that enrolls while locked.
    pub fn manual_toggle() -> Self {
        Self {
            policy: AccessPolicy::ManualToggle,
            enrollment_gate: EnrollmentGate::WhileLocked,
            door_sensor: false,
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_enrollment_gate(mut self, gate: EnrollmentGate) -> Self {
        self.enrollment_gate = gate;
        self
    }

    pub fn with_door_sensor(mut self, fitted: bool) -> Self {
        self.door_sensor = fitted;
        self
    }

    pub fn with_lock_timeout_ms(mut self, ms: u32) -> Self {
        self.lock_timeout_ms = ms;
        self
    }

    pub fn with_rearm_interval_ms(mut self, ms: u32) -> Self {
        self.rearm_interval_ms = ms;
        self
    }

    pub fn with_reset_hold_ms(mut self, ms: u32) -> Self {
        self.reset_hold_ms = ms;
        self
    }

    pub fn with_tick_ms(mut self, ms: u32) -> Self {
        self.tick_ms = ms;
        self
    }

    pub fn with_servo(mut self, servo: ServoCalibration) -> Self {
        self.servo = servo;
        self
    }

    /// Check that the configuration describes an operable unit.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if:
    /// - the door-open gate is selected without a door sensor
    /// - timeout relock is combined with the while-locked gate, which would
    ///   route every credential to enrollment and none to unlocking
    /// - any duration is zero
    pub fn validate(&self) -> Result<()> {
        if self.enrollment_gate == EnrollmentGate::DoorOpenWithButtonHeld && !self.door_sensor {
            return Err(Error::config(
                "door_open_with_button_held enrollment requires a door sensor",
            ));
        }

        if self.policy == AccessPolicy::TimeoutRelock
            && self.enrollment_gate == EnrollmentGate::WhileLocked
        {
            return Err(Error::config(
                "timeout_relock cannot enroll while_locked: no credential could unlock",
            ));
        }

        let durations = [
            ("lock_timeout_ms", self.lock_timeout_ms),
            ("rearm_interval_ms", self.rearm_interval_ms),
            ("reset_hold_ms", self.reset_hold_ms),
            ("tick_ms", self.tick_ms),
            ("servo.settle_ms", self.servo.settle_ms),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, ms)| *ms == 0) {
            return Err(Error::config(format!("{name} must be non-zero")));
        }

        Ok(())
    }
}
