//! Mock button and door sensor.

use crate::traits::InputPanel;
use crate::types::PanelSnapshot;
use latchkey_core::DoorSensorState;
use std::cell::Cell;
use std::rc::Rc;

/// Mock input panel.
///
/// # Examples
///
/// ```
/// use latchkey_core::DoorSensorState;
/// use latchkey_hardware::mock::MockPanel;
/// use latchkey_hardware::traits::InputPanel;
///
/// let (mut panel, handle) = MockPanel::with_sensor(DoorSensorState::Closed);
/// handle.press();
/// handle.open_door();
///
/// let snapshot = panel.sample();
/// assert!(snapshot.button_pressed);
/// assert!(snapshot.door_open());
/// ```
#[derive(Debug)]
pub struct MockPanel {
    button: Rc<Cell<bool>>,
    door: Rc<Cell<Option<DoorSensorState>>>,
}

impl MockPanel {
    /// Panel with a button only.
    pub fn without_sensor() -> (Self, MockPanelHandle) {
        Self::build(None)
    }

    /// Panel with a button and a door sensor in the given state.
    pub fn with_sensor(door: DoorSensorState) -> (Self, MockPanelHandle) {
        Self::build(Some(door))
    }

    fn build(door: Option<DoorSensorState>) -> (Self, MockPanelHandle) {
        let button = Rc::new(Cell::new(false));
        let door = Rc::new(Cell::new(door));
        (
            Self {
                button: Rc::clone(&button),
                door: Rc::clone(&door),
            },
            MockPanelHandle { button, door },
        )
    }
}

impl InputPanel for MockPanel {
    fn sample(&mut self) -> PanelSnapshot {
        PanelSnapshot {
            button_pressed: self.button.get(),
            door: self.door.get(),
        }
    }
}

/// Handle for driving a mock input panel.
#[derive(Debug, Clone)]
pub struct MockPanelHandle {
    button: Rc<Cell<bool>>,
    door: Rc<Cell<Option<DoorSensorState>>>,
}

impl MockPanelHandle {
    pub fn press(&self) {
        self.button.set(true);
    }

    pub fn release(&self) {
        self.button.set(false);
    }

    pub fn is_pressed(&self) -> bool {
        self.button.get()
    }

    /// Report the door open. No effect on a panel without a sensor.
    pub fn open_door(&self) {
        if self.door.get().is_some() {
            self.door.set(Some(DoorSensorState::Open));
        }
    }

    /// Report the door closed. No effect on a panel without a sensor.
    pub fn close_door(&self) {
        if self.door.get().is_some() {
            self.door.set(Some(DoorSensorState::Closed));
        }
    }

    pub fn door(&self) -> Option<DoorSensorState> {
        self.door.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_without_sensor_ignores_door() {
        let (mut panel, handle) = MockPanel::without_sensor();
        handle.open_door();

        let snapshot = panel.sample();
        assert_eq!(snapshot.door, None);
        assert!(!snapshot.button_pressed);
    }

    #[test]
    fn test_button_press_and_release() {
        let (mut panel, handle) = MockPanel::without_sensor();
        handle.press();
        assert!(panel.sample().button_pressed);
        handle.release();
        assert!(!panel.sample().button_pressed);
    }

    #[test]
    fn test_door_transitions() {
        let (mut panel, handle) = MockPanel::with_sensor(DoorSensorState::Open);
        handle.close_door();
        assert_eq!(panel.sample().door, Some(DoorSensorState::Closed));
        handle.open_door();
        assert_eq!(handle.door(), Some(DoorSensorState::Open));
    }
}
