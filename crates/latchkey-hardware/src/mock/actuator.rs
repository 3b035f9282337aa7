//! Mock lock actuator.

use crate::{HardwareError, Result, traits::LockActuator};
use latchkey_core::LockState;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct ActuatorState {
    commands: Vec<LockState>,
    jammed: bool,
}

/// Mock actuator recording every commanded position.
///
/// # Examples
///
/// ```
/// use latchkey_core::LockState;
/// use latchkey_hardware::mock::MockActuator;
/// use latchkey_hardware::traits::LockActuator;
///
/// let (mut actuator, handle) = MockActuator::new();
/// actuator.set_position(LockState::Locked).unwrap();
/// assert_eq!(handle.position(), Some(LockState::Locked));
/// ```
#[derive(Debug)]
pub struct MockActuator {
    state: Rc<RefCell<ActuatorState>>,
}

impl MockActuator {
    pub fn new() -> (Self, MockActuatorHandle) {
        let state = Rc::new(RefCell::new(ActuatorState::default()));
        (
            Self {
                state: Rc::clone(&state),
            },
            MockActuatorHandle { state },
        )
    }
}

impl LockActuator for MockActuator {
    fn set_position(&mut self, position: LockState) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.jammed {
            return Err(HardwareError::communication("actuator jammed"));
        }
        state.commands.push(position);
        Ok(())
    }
}

/// Handle for inspecting a mock actuator.
#[derive(Debug, Clone)]
pub struct MockActuatorHandle {
    state: Rc<RefCell<ActuatorState>>,
}

impl MockActuatorHandle {
    /// Every position commanded so far, oldest first.
    pub fn commands(&self) -> Vec<LockState> {
        self.state.borrow().commands.clone()
    }

    /// Last commanded position.
    pub fn position(&self) -> Option<LockState> {
        self.state.borrow().commands.last().copied()
    }

    /// Make every subsequent command fail.
    pub fn set_jammed(&self, jammed: bool) {
        self.state.borrow_mut().jammed = jammed;
    }

    pub fn clear(&self) {
        self.state.borrow_mut().commands.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_commands_in_order() {
        let (mut actuator, handle) = MockActuator::new();
        actuator.set_position(LockState::Unlocked).unwrap();
        actuator.set_position(LockState::Locked).unwrap();

        assert_eq!(
            handle.commands(),
            vec![LockState::Unlocked, LockState::Locked]
        );
        handle.clear();
        assert_eq!(handle.position(), None);
    }

    #[test]
    fn test_jammed_actuator_fails() {
        let (mut actuator, handle) = MockActuator::new();
        handle.set_jammed(true);
        assert!(actuator.set_position(LockState::Locked).is_err());
        assert!(handle.commands().is_empty());
    }
}
