//! Common test utilities for controller integration tests.
//!
//! [`Door`] wires an [`AccessController`] to mock peripherals on a manual
//! clock and keeps the mock handles, so a test reads as a script: present a
//! credential, press the button, run the loop for a while, inspect what the
//! lock and the LED did.

#![allow(dead_code)]

use latchkey_controller::{AccessController, ControllerConfig, Peripherals};
use latchkey_core::{Credential, DoorSensorState, LockState};
use latchkey_hardware::MemoryNvs;
use latchkey_hardware::mock::*;
use latchkey_hardware::traits::Clock;
use latchkey_storage::{CredentialRepository, CredentialStore};

pub const TICK_MS: u32 = 10;

pub type Store = CredentialStore<MemoryNvs, 3, 8>;

pub type Controller = AccessController<
    MockReader<8>,
    MockActuator,
    MockFeedback,
    MockPanel,
    ManualClock,
    MockDelay,
    Store,
    8,
>;

pub struct Door {
    pub controller: Controller,
    pub clock: ManualClock,
    pub reader: MockReaderHandle<8>,
    pub actuator: MockActuatorHandle,
    pub feedback: MockFeedbackHandle,
    pub panel: MockPanelHandle,
}

/// Credential `04 A1 B2 <id>`, zero-padded to 8 bytes.
pub fn key(id: u8) -> Credential<8> {
    Credential::from_bytes([0x04, 0xA1, 0xB2, id, 0, 0, 0, 0])
}

/// Region image holding the given credentials.
pub fn enrolled(ids: &[u8]) -> MemoryNvs {
    let mut store = Store::initialize(MemoryNvs::new(64), false).unwrap();
    for &id in ids {
        store.toggle_enroll(&key(id)).unwrap();
    }
    store.into_inner()
}

impl Door {
    /// Boot a door at t=0 with the given sensor level (`None` for no sensor).
    pub fn boot(config: ControllerConfig, door: Option<DoorSensorState>, nvs: MemoryNvs) -> Self {
        Self::boot_with(config, door, nvs, ReportMode::EveryPoll)
    }

    pub fn boot_with(
        config: ControllerConfig,
        door: Option<DoorSensorState>,
        nvs: MemoryNvs,
        mode: ReportMode,
    ) -> Self {
        let clock = ManualClock::new(0);
        let (reader, reader_handle) = MockReader::with_mode(mode);
        let (actuator, actuator_handle) = MockActuator::new();
        let (feedback, feedback_handle) = MockFeedback::new();
        let (panel, panel_handle) = match door {
            Some(level) => MockPanel::with_sensor(level),
            None => MockPanel::without_sensor(),
        };

        let peripherals = Peripherals {
            reader,
            actuator,
            feedback,
            panel,
            clock: clock.clone(),
            delay: MockDelay::linked(clock.clone()),
        };
        let controller =
            Controller::boot(config, peripherals, |reset| Store::initialize(nvs, reset)).unwrap();

        Self {
            controller,
            clock,
            reader: reader_handle,
            actuator: actuator_handle,
            feedback: feedback_handle,
            panel: panel_handle,
        }
    }

    pub fn now(&self) -> u32 {
        self.clock.now_ms()
    }

    /// Poll once at the current time.
    pub fn poll(&mut self) {
        self.controller.poll().unwrap();
    }

    /// Poll at every tick in `[now, until)`, leaving the clock at `until`.
    pub fn run_until(&mut self, until: u32) {
        while self.now() < until {
            self.poll();
            self.clock.advance(TICK_MS);
        }
    }

    /// Poll at every tick for `ms` milliseconds.
    pub fn run_for(&mut self, ms: u32) {
        let until = self.now() + ms;
        self.run_until(until);
    }

    pub fn state(&self) -> LockState {
        self.controller.state()
    }

    pub fn enrolled(&self) -> usize {
        self.controller.repository().count()
    }

    /// Forget everything recorded so far.
    pub fn clear_records(&self) {
        self.feedback.clear();
        self.actuator.clear();
    }
}
