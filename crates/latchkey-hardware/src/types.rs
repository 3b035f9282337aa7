//! Common types shared across device implementations.

use latchkey_core::DoorSensorState;
use latchkey_core::constants::{DEFAULT_LOCKED_ANGLE, DEFAULT_SETTLE_MS, DEFAULT_UNLOCKED_ANGLE};
use serde::{Deserialize, Serialize};

/// Input levels sampled from the door panel in one polling tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PanelSnapshot {
    /// Level of the unlock/enroll button (`true` while held).
    pub button_pressed: bool,

    /// Door-open sensor level, `None` on units without a sensor.
    pub door: Option<DoorSensorState>,
}

impl PanelSnapshot {
    /// Snapshot of a unit without a door sensor.
    pub fn without_sensor(button_pressed: bool) -> Self {
        Self {
            button_pressed,
            door: None,
        }
    }

    /// Snapshot of a unit with a door sensor.
    pub fn with_door(button_pressed: bool, door: DoorSensorState) -> Self {
        Self {
            button_pressed,
            door: Some(door),
        }
    }

    /// `true` only if a sensor is fitted and reports the door open.
    pub fn door_open(&self) -> bool {
        self.door.is_some_and(DoorSensorState::is_open)
    }
}

/// Calibrated positions and settle time of a servo-driven latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoCalibration {
    /// Servo angle of the locked position, in degrees.
    pub locked_angle: u8,

    /// Servo angle of the unlocked position, in degrees.
    pub unlocked_angle: u8,

    /// Time to keep driving before releasing torque.
    pub settle_ms: u32,
}

impl Default for ServoCalibration {
    fn default() -> Self {
        Self {
            locked_angle: DEFAULT_LOCKED_ANGLE,
            unlocked_angle: DEFAULT_UNLOCKED_ANGLE,
            settle_ms: DEFAULT_SETTLE_MS,
        }
    }
}

impl ServoCalibration {
    /// Set the locked angle.
    pub fn with_locked_angle(mut self, degrees: u8) -> Self {
        self.locked_angle = degrees;
        self
    }

    /// Set the unlocked angle.
    pub fn with_unlocked_angle(mut self, degrees: u8) -> Self {
        self.unlocked_angle = degrees;
        self
    }

    /// Set the settle duration.
    pub fn with_settle_ms(mut self, settle_ms: u32) -> Self {
        self.settle_ms = settle_ms;
        self
    }
}
