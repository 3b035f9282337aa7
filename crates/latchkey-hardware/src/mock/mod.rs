//! Mock device implementations for testing and simulation.
//!
//! Each mock comes as a `(device, handle)` pair sharing state: the device is
//! handed to the controller, the handle stays with the test (or simulator) to
//! drive inputs and inspect what the controller commanded. Everything is
//! single-threaded, matching the polling loop.

pub mod actuator;
pub mod clock;
pub mod feedback;
pub mod panel;
pub mod reader;
pub mod servo;

// Re-export commonly used types
pub use actuator::{MockActuator, MockActuatorHandle};
pub use clock::{ManualClock, MockDelay};
pub use feedback::{FeedbackEvent, MockFeedback, MockFeedbackHandle};
pub use panel::{MockPanel, MockPanelHandle};
pub use reader::{MockReader, MockReaderHandle, ReportMode};
pub use servo::{MockServo, MockServoHandle, ServoCall};
