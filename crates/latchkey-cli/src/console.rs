//! Peripherals that render to the log instead of to hardware.

use latchkey_core::{IndicatorColor, Outcome};
use latchkey_hardware::traits::{FeedbackSink, ServoDriver};
use latchkey_hardware::{HardwareError, Result};
use tracing::{debug, info};

/// Servo channel that logs every pulse change.
#[derive(Debug, Default)]
pub struct ConsoleServo {
    attached: bool,
}

impl ServoDriver for ConsoleServo {
    fn attach(&mut self) -> Result<()> {
        self.attached = true;
        debug!("servo attached");
        Ok(())
    }

    fn write_angle(&mut self, degrees: u8) -> Result<()> {
        if !self.attached {
            return Err(HardwareError::communication("servo not attached"));
        }
        info!(degrees, "servo");
        Ok(())
    }

    fn detach(&mut self) -> Result<()> {
        self.attached = false;
        debug!("servo detached");
        Ok(())
    }
}

/// LED and buzzer rendered as log lines. Silent indicator changes are
/// logged only when the color actually changes.
#[derive(Debug, Default)]
pub struct ConsoleFeedback {
    color: Option<IndicatorColor>,
}

impl FeedbackSink for ConsoleFeedback {
    fn indicate(&mut self, outcome: Outcome) -> Result<()> {
        let signal = outcome.signal();
        self.color = Some(signal.color);
        info!(
            %outcome,
            led = ?signal.color,
            tone_hz = signal.pattern.frequency_hz,
            beeps = signal.pattern.repeats,
            duration_ms = signal.pattern.duration_ms(),
            "feedback"
        );
        Ok(())
    }

    fn show(&mut self, color: IndicatorColor) -> Result<()> {
        if self.color.replace(color) == Some(color) {
            debug!(led = ?color, "indicator unchanged");
        } else {
            info!(led = ?color, "indicator");
        }
        Ok(())
    }
}
