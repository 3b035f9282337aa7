//! Access controller driver.
//!
//! [`AccessController`] binds a [`LockMachine`] to real (or mock)
//! peripherals and a credential repository. It runs the boot sequence once
//! and then one [`poll`](AccessController::poll) per tick: sample inputs,
//! step the machine, execute the resulting commands in order.
//!
//! # Examples
//!
//! ```
//! use latchkey_controller::{AccessController, ControllerConfig, Peripherals};
//! use latchkey_core::LockState;
//! use latchkey_hardware::MemoryNvs;
//! use latchkey_hardware::mock::{
//!     ManualClock, MockActuator, MockDelay, MockFeedback, MockPanel, MockReader,
//! };
//! use latchkey_storage::CredentialStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let clock = ManualClock::new(0);
//! let (reader, _reader_handle) = MockReader::<8>::new();
//! let (actuator, actuator_handle) = MockActuator::new();
//! let (feedback, _feedback_handle) = MockFeedback::new();
//! let (panel, panel_handle) = MockPanel::with_sensor(latchkey_core::DoorSensorState::Closed);
//!
//! let peripherals = Peripherals {
//!     reader,
//!     actuator,
//!     feedback,
//!     panel,
//!     clock: clock.clone(),
//!     delay: MockDelay::linked(clock.clone()),
//! };
//!
//! let mut controller = AccessController::<_, _, _, _, _, _, _, 8>::boot(
//!     ControllerConfig::default(),
//!     peripherals,
//!     |reset| CredentialStore::<_, 3, 8>::initialize(MemoryNvs::new(1024), reset),
//! )?;
//!
//! // nothing enrolled yet: the unit boots open
//! assert_eq!(controller.state(), LockState::Unlocked);
//! assert_eq!(actuator_handle.position(), Some(LockState::Unlocked));
//!
//! panel_handle.press();
//! clock.advance(10);
//! controller.poll()?;
//! # Ok(())
//! # }
//! ```

use crate::config::ControllerConfig;
use crate::error::Result;
use crate::machine::{Command, LockMachine, LockTransition, TickInput};
use latchkey_core::constants::elapsed_ms;
use latchkey_core::{LockState, Outcome};
use latchkey_hardware::traits::{
    Clock, CredentialReader, Delay, FeedbackSink, InputPanel, LockActuator,
};
use latchkey_hardware::PanelSnapshot;
use latchkey_storage::{CredentialRepository, StorageResult};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// The peripherals of one door.
#[derive(Debug)]
pub struct Peripherals<Rd, Act, Fb, Pn, Clk, Dl> {
    pub reader: Rd,
    pub actuator: Act,
    pub feedback: Fb,
    pub panel: Pn,
    pub clock: Clk,

    /// Used only for the bounded boot-time reset-hold wait.
    pub delay: Dl,
}

/// What happened during boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootReport {
    /// The button was held through the reset-hold duration.
    pub reset_requested: bool,

    pub initial_state: LockState,

    /// Credentials in the store after initialization.
    pub enrolled: usize,

    /// Clock reading at which the timers started.
    pub at_ms: u32,
}

/// Single-door access controller.
#[derive(Debug)]
pub struct AccessController<Rd, Act, Fb, Pn, Clk, Dl, Repo, const W: usize> {
    config: ControllerConfig,
    peripherals: Peripherals<Rd, Act, Fb, Pn, Clk, Dl>,
    repository: Repo,
    machine: LockMachine<W>,
    boot: BootReport,
}

impl<Rd, Act, Fb, Pn, Clk, Dl, Repo, const W: usize>
    AccessController<Rd, Act, Fb, Pn, Clk, Dl, Repo, W>
where
    Rd: CredentialReader<W>,
    Act: LockActuator,
    Fb: FeedbackSink,
    Pn: InputPanel,
    Clk: Clock,
    Dl: Delay,
    Repo: CredentialRepository<W>,
{
    /// Run the boot sequence.
    ///
    /// 1. Validate `config`.
    /// 2. While the button is held, wait up to `reset_hold_ms`; reaching it
    ///    indicates `Deleted` and requests a reset.
    /// 3. Open the repository with `open_store(reset_requested)`.
    /// 4. Start the machine and drive the lock to its boot position.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the store cannot be
    /// opened, or a peripheral fails.
    pub fn boot<F>(
        config: ControllerConfig,
        mut peripherals: Peripherals<Rd, Act, Fb, Pn, Clk, Dl>,
        open_store: F,
    ) -> Result<Self>
    where
        F: FnOnce(bool) -> StorageResult<Repo>,
    {
        config.validate()?;

        let reset_requested = detect_reset_hold(&config, &mut peripherals)?;
        let repository = open_store(reset_requested)?;

        let now = peripherals.clock.now_ms();
        let panel = masked_sample(&config, &mut peripherals.panel);
        let (machine, commands) =
            LockMachine::start(&config, repository.is_empty(), &panel, now);

        let boot = BootReport {
            reset_requested,
            initial_state: machine.state(),
            enrolled: repository.count(),
            at_ms: now,
        };

        let mut controller = Self {
            config,
            peripherals,
            repository,
            machine,
            boot,
        };
        for command in commands {
            controller.execute(command)?;
        }

        info!(
            state = %boot.initial_state,
            enrolled = boot.enrolled,
            capacity = controller.repository.capacity(),
            reset = reset_requested,
            "access controller booted"
        );
        Ok(controller)
    }

    /// Run one tick and return the commands that were executed.
    ///
    /// # Errors
    ///
    /// Returns the first repository or peripheral failure. Commands after a
    /// failed one are not executed.
    pub fn poll(&mut self) -> Result<Vec<Command>> {
        let now = self.peripherals.clock.now_ms();
        let panel = masked_sample(&self.config, &mut self.peripherals.panel);
        let credential = self.peripherals.reader.try_read()?;

        let input = TickInput::new(panel, credential);
        let commands = self.machine.step(&input, now, &mut self.repository)?;

        for &command in &commands {
            self.execute(command)?;
        }
        Ok(commands)
    }

    fn execute(&mut self, command: Command) -> Result<()> {
        debug!(?command, "executing");
        match command {
            Command::SetLock(position) => self.peripherals.actuator.set_position(position)?,
            Command::Indicate(outcome) => self.peripherals.feedback.indicate(outcome)?,
            Command::ShowState(color) => self.peripherals.feedback.show(color)?,
            Command::RearmReader => self.peripherals.reader.rearm()?,
        }
        Ok(())
    }

    pub fn state(&self) -> LockState {
        self.machine.state()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn boot_report(&self) -> &BootReport {
        &self.boot
    }

    /// Recent lock transitions, oldest first.
    pub fn history(&self) -> &VecDeque<LockTransition> {
        self.machine.history()
    }

    pub fn repository(&self) -> &Repo {
        &self.repository
    }
}

/// Sample the panel, dropping the door level on units configured without a
/// sensor.
fn masked_sample<Pn: InputPanel>(config: &ControllerConfig, panel: &mut Pn) -> PanelSnapshot {
    let mut snapshot = panel.sample();
    if !config.door_sensor {
        snapshot.door = None;
    }
    snapshot
}

/// Wait while the button is held, for at most `reset_hold_ms`.
///
/// The wait is bounded by both the clock and the sum of requested delays.
fn detect_reset_hold<Rd, Act, Fb, Pn, Clk, Dl>(
    config: &ControllerConfig,
    peripherals: &mut Peripherals<Rd, Act, Fb, Pn, Clk, Dl>,
) -> Result<bool>
where
    Fb: FeedbackSink,
    Pn: InputPanel,
    Clk: Clock,
    Dl: Delay,
{
    let start = peripherals.clock.now_ms();
    let mut waited: u32 = 0;

    while peripherals.panel.sample().button_pressed {
        let held = elapsed_ms(peripherals.clock.now_ms(), start).max(waited);
        if held >= config.reset_hold_ms {
            warn!(held_ms = held, "button held through boot, erasing credential store");
            peripherals.feedback.indicate(Outcome::Deleted)?;
            return Ok(true);
        }
        peripherals.delay.delay_ms(config.tick_ms);
        waited = waited.saturating_add(config.tick_ms);
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AccessPolicy;
    use latchkey_core::{Credential, DoorSensorState, IndicatorColor};
    use latchkey_hardware::MemoryNvs;
    use latchkey_hardware::mock::*;
    use latchkey_storage::CredentialStore;

    type Store = CredentialStore<MemoryNvs, 3, 8>;
    type TestController = AccessController<
        MockReader<8>,
        MockActuator,
        MockFeedback,
        MockPanel,
        ManualClock,
        MockDelay,
        Store,
        8,
    >;

    struct Rig {
        clock: ManualClock,
        reader: MockReaderHandle<8>,
        actuator: MockActuatorHandle,
        feedback: MockFeedbackHandle,
        panel: MockPanelHandle,
    }

    type MockPeripherals =
        Peripherals<MockReader<8>, MockActuator, MockFeedback, MockPanel, ManualClock, MockDelay>;

    fn rig(panel: (MockPanel, MockPanelHandle)) -> (MockPeripherals, Rig) {
        let clock = ManualClock::new(0);
        let (reader, reader_handle) = MockReader::new();
        let (actuator, actuator_handle) = MockActuator::new();
        let (feedback, feedback_handle) = MockFeedback::new();
        let (panel, panel_handle) = panel;

        (
            Peripherals {
                reader,
                actuator,
                feedback,
                panel,
                clock: clock.clone(),
                delay: MockDelay::linked(clock.clone()),
            },
            Rig {
                clock,
                reader: reader_handle,
                actuator: actuator_handle,
                feedback: feedback_handle,
                panel: panel_handle,
            },
        )
    }

    fn key(id: u8) -> Credential<8> {
        Credential::from_bytes([0x04, 0x11, 0x22, id, 0, 0, 0, 0])
    }

    fn nvs_with(ids: &[u8]) -> MemoryNvs {
        let mut store = Store::initialize(MemoryNvs::new(64), false).unwrap();
        for &id in ids {
            store.toggle_enroll(&key(id)).unwrap();
        }
        store.into_inner()
    }

    #[test]
    fn test_boot_locked_with_enrolled_credentials() {
        let (peripherals, rig) = rig(MockPanel::with_sensor(DoorSensorState::Closed));
        let nvs = nvs_with(&[1]);

        let controller =
            TestController::boot(ControllerConfig::default(), peripherals, |reset| {
                Store::initialize(nvs, reset)
            })
            .unwrap();

        assert_eq!(controller.state(), LockState::Locked);
        assert_eq!(rig.actuator.commands(), vec![LockState::Locked]);
        assert_eq!(rig.feedback.color(), Some(IndicatorColor::Red));
        assert_eq!(controller.boot_report().enrolled, 1);
        assert!(!controller.boot_report().reset_requested);
    }

    #[test]
    fn test_reset_hold_erases_store() {
        let (peripherals, rig) = rig(MockPanel::with_sensor(DoorSensorState::Closed));
        rig.panel.press();
        let nvs = nvs_with(&[1, 2]);

        let controller =
            TestController::boot(ControllerConfig::default(), peripherals, |reset| {
                Store::initialize(nvs, reset)
            })
            .unwrap();

        assert!(controller.boot_report().reset_requested);
        assert_eq!(rig.feedback.outcomes(), vec![Outcome::Deleted]);
        assert_eq!(controller.repository().count(), 0);
        assert_eq!(controller.state(), LockState::Unlocked);
        assert_eq!(rig.clock.now_ms(), 3000);
    }

    /// Panel whose button reads pressed for the first `held_samples` samples.
    struct ReleasedAfter {
        held_samples: usize,
    }

    impl InputPanel for ReleasedAfter {
        fn sample(&mut self) -> PanelSnapshot {
            let pressed = self.held_samples > 0;
            self.held_samples = self.held_samples.saturating_sub(1);
            PanelSnapshot::with_door(pressed, DoorSensorState::Closed)
        }
    }

    #[test]
    fn test_short_hold_keeps_store() {
        let (p, rig) = rig(MockPanel::with_sensor(DoorSensorState::Closed));
        let peripherals = Peripherals {
            reader: p.reader,
            actuator: p.actuator,
            feedback: p.feedback,
            panel: ReleasedAfter { held_samples: 100 },
            clock: p.clock,
            delay: p.delay,
        };
        let nvs = nvs_with(&[1]);

        let controller = AccessController::<_, _, _, _, _, _, _, 8>::boot(
            ControllerConfig::default(),
            peripherals,
            |reset| Store::initialize(nvs, reset),
        )
        .unwrap();

        assert!(!controller.boot_report().reset_requested);
        assert_eq!(controller.repository().count(), 1);
        assert_eq!(controller.boot_report().at_ms, 1000);
        assert!(rig.feedback.outcomes().is_empty());
    }

    #[test]
    fn test_invalid_config_fails_boot() {
        let (peripherals, _rig) = rig(MockPanel::without_sensor());
        let config = ControllerConfig::default().with_door_sensor(false);
        let result = TestController::boot(config, peripherals, |reset| {
            Store::initialize(MemoryNvs::new(64), reset)
        });
        assert!(matches!(result, Err(crate::ControllerError::Config(_))));
    }

    #[test]
    fn test_sensorless_config_ignores_door_level() {
        let (peripherals, _rig) = rig(MockPanel::with_sensor(DoorSensorState::Open));
        let nvs = nvs_with(&[1]);

        let controller = TestController::boot(
            ControllerConfig::manual_toggle(),
            peripherals,
            |reset| Store::initialize(nvs, reset),
        )
        .unwrap();

        assert_eq!(controller.state(), LockState::Locked);
        assert_eq!(controller.config().policy, AccessPolicy::ManualToggle);
    }

    #[test]
    fn test_poll_executes_commands_in_order() {
        let (peripherals, rig) = rig(MockPanel::with_sensor(DoorSensorState::Closed));
        let nvs = nvs_with(&[1]);
        let mut controller =
            TestController::boot(ControllerConfig::default(), peripherals, |reset| {
                Store::initialize(nvs, reset)
            })
            .unwrap();
        rig.feedback.clear();
        rig.actuator.clear();

        rig.reader.present(key(1));
        rig.clock.advance(10);
        let commands = controller.poll().unwrap();

        assert_eq!(
            commands,
            vec![
                Command::Indicate(Outcome::Success),
                Command::SetLock(LockState::Unlocked)
            ]
        );
        assert_eq!(rig.feedback.outcomes(), vec![Outcome::Success]);
        assert_eq!(rig.actuator.commands(), vec![LockState::Unlocked]);
        assert_eq!(controller.history().len(), 1);
    }

    #[test]
    fn test_reader_failure_propagates() {
        let (peripherals, rig) = rig(MockPanel::with_sensor(DoorSensorState::Closed));
        let mut controller =
            TestController::boot(ControllerConfig::default(), peripherals, |reset| {
                Store::initialize(MemoryNvs::new(64), reset)
            })
            .unwrap();

        rig.reader.set_disconnected(true);
        assert!(matches!(
            controller.poll(),
            Err(crate::ControllerError::Hardware(_))
        ));
    }

    #[test]
    fn test_jammed_actuator_propagates() {
        let (peripherals, rig) = rig(MockPanel::with_sensor(DoorSensorState::Closed));
        let nvs = nvs_with(&[1]);
        let mut controller =
            TestController::boot(ControllerConfig::default(), peripherals, |reset| {
                Store::initialize(nvs, reset)
            })
            .unwrap();

        rig.actuator.set_jammed(true);
        rig.panel.press();
        rig.clock.advance(10);
        assert!(controller.poll().is_err());
    }
}
