//! Servo-driven latch.
//!
//! [`ServoLock`] implements [`LockActuator`] on top of any [`ServoDriver`]:
//! attach, move to the calibrated angle, wait the settle time, detach. The
//! detach step releases holding torque so the servo does not buzz or strain
//! against the latch while idle.

use crate::error::Result;
use crate::traits::{Delay, LockActuator, ServoDriver};
use crate::types::ServoCalibration;
use latchkey_core::LockState;
use tracing::{debug, info};

/// Lock actuator backed by a hobby servo.
///
/// # Examples
///
/// ```
/// use latchkey_core::LockState;
/// use latchkey_hardware::mock::{MockDelay, MockServo};
/// use latchkey_hardware::servo::ServoLock;
/// use latchkey_hardware::traits::LockActuator;
/// use latchkey_hardware::types::ServoCalibration;
///
/// let (servo, handle) = MockServo::new();
/// let mut lock = ServoLock::new(servo, MockDelay::default(), ServoCalibration::default());
///
/// lock.set_position(LockState::Locked).unwrap();
/// assert_eq!(handle.last_angle(), Some(170));
/// assert!(!handle.is_attached());
/// ```
#[derive(Debug)]
pub struct ServoLock<S, D> {
    servo: S,
    delay: D,
    calibration: ServoCalibration,
}

impl<S: ServoDriver, D: Delay> ServoLock<S, D> {
    pub fn new(servo: S, delay: D, calibration: ServoCalibration) -> Self {
        Self {
            servo,
            delay,
            calibration,
        }
    }

    pub fn calibration(&self) -> &ServoCalibration {
        &self.calibration
    }

    fn angle_for(&self, position: LockState) -> u8 {
        match position {
            LockState::Locked => self.calibration.locked_angle,
            LockState::Unlocked => self.calibration.unlocked_angle,
        }
    }
}

impl<S: ServoDriver, D: Delay> LockActuator for ServoLock<S, D> {
    fn set_position(&mut self, position: LockState) -> Result<()> {
        let angle = self.angle_for(position);
        debug!(%position, angle, "driving latch servo");

        self.servo.attach()?;
        let moved = self.servo.write_angle(angle);
        if moved.is_ok() {
            self.delay.delay_ms(self.calibration.settle_ms);
        }
        // Torque is released even when the move failed.
        self.servo.detach()?;
        moved?;

        info!(%position, "latch moved");
        Ok(())
    }
}
