//! Mock servo PWM channel.

use crate::{HardwareError, Result, traits::ServoDriver};
use std::cell::RefCell;
use std::rc::Rc;

/// One call made on a servo driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoCall {
    Attach,
    Write(u8),
    Detach,
}

#[derive(Debug, Default)]
struct ServoState {
    calls: Vec<ServoCall>,
    attached: bool,
    fail_writes: bool,
}

/// Mock servo recording attach/write/detach calls.
#[derive(Debug)]
pub struct MockServo {
    state: Rc<RefCell<ServoState>>,
}

impl MockServo {
    pub fn new() -> (Self, MockServoHandle) {
        let state = Rc::new(RefCell::new(ServoState::default()));
        (
            Self {
                state: Rc::clone(&state),
            },
            MockServoHandle { state },
        )
    }
}

impl ServoDriver for MockServo {
    fn attach(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.attached = true;
        state.calls.push(ServoCall::Attach);
        Ok(())
    }

    fn write_angle(&mut self, degrees: u8) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if !state.attached {
            return Err(HardwareError::communication("servo not attached"));
        }
        if state.fail_writes {
            return Err(HardwareError::communication("servo stalled"));
        }
        state.calls.push(ServoCall::Write(degrees));
        Ok(())
    }

    fn detach(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.attached = false;
        state.calls.push(ServoCall::Detach);
        Ok(())
    }
}

/// Handle for inspecting a mock servo.
#[derive(Debug, Clone)]
pub struct MockServoHandle {
    state: Rc<RefCell<ServoState>>,
}

impl MockServoHandle {
    pub fn calls(&self) -> Vec<ServoCall> {
        self.state.borrow().calls.clone()
    }

    /// Angle of the most recent successful write.
    pub fn last_angle(&self) -> Option<u8> {
        self.state
            .borrow()
            .calls
            .iter()
            .rev()
            .find_map(|call| match call {
                ServoCall::Write(degrees) => Some(*degrees),
                _ => None,
            })
    }

    pub fn is_attached(&self) -> bool {
        self.state.borrow().attached
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }
}
