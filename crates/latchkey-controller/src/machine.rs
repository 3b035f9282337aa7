//! Lock decision machine.
//!
//! [`LockMachine`] owns the lock state and every controller timer. Each tick
//! it receives the inputs gathered by the driver and returns the commands to
//! execute, in order. It performs no I/O apart from consulting (and, on the
//! enrollment path, mutating) the credential repository.
//!
//! # Tick order
//!
//! 1. Button press edge
//! 2. Door-open activity (timeout relock only)
//! 3. Auto-relock (timeout relock only)
//! 4. Presented credential, if admitted by the rate limiter
//!
//! The rate limiter is keyed on the credential: a different credential is
//! evaluated at once, the same one at most once per re-arm interval. Only
//! evaluations that act (enroll, revoke, unlock, toggle, decline) count.
//! 5. Reader re-arm
//!
//! # Examples
//!
//! ```
//! use latchkey_controller::{Command, ControllerConfig, LockMachine, TickInput};
//! use latchkey_core::{Credential, IndicatorColor, LockState, Outcome};
//! use latchkey_hardware::{MemoryNvs, PanelSnapshot};
//! use latchkey_storage::{CredentialRepository, CredentialStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = CredentialStore::<_, 3, 8>::initialize(MemoryNvs::new(64), false)?;
//! let key: Credential<8> = "04A1B2C3".parse()?;
//! store.toggle_enroll(&key)?;
//!
//! let closed = PanelSnapshot::with_door(false, latchkey_core::DoorSensorState::Closed);
//! let (mut machine, boot) = LockMachine::start(&ControllerConfig::default(), false, &closed, 0);
//! assert_eq!(boot, vec![Command::ShowState(IndicatorColor::Red), Command::SetLock(LockState::Locked)]);
//!
//! let commands = machine.step(&TickInput::new(closed, Some(key)), 10, &mut store)?;
//! assert_eq!(commands, vec![Command::Indicate(Outcome::Success), Command::SetLock(LockState::Unlocked)]);
//! assert_eq!(machine.state(), LockState::Unlocked);
//! # Ok(())
//! # }
//! ```

use crate::config::{AccessPolicy, ControllerConfig, EnrollmentGate};
use latchkey_core::constants::elapsed_ms;
use latchkey_core::{Credential, IndicatorColor, LockState, Outcome};
use latchkey_hardware::PanelSnapshot;
use latchkey_storage::{CredentialRepository, EnrollOutcome, StorageResult};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info};

/// Number of lock transitions kept for diagnostics.
pub const MAX_HISTORY_SIZE: usize = 32;

/// Action requested from the peripherals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Drive the lock actuator.
    SetLock(LockState),

    /// Render an outcome on the LED and buzzer.
    Indicate(Outcome),

    /// Switch the LED silently.
    ShowState(IndicatorColor),

    /// Reinitialize the credential reader.
    RearmReader,
}

/// Inputs gathered by the driver for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickInput<const W: usize> {
    pub panel: PanelSnapshot,
    pub credential: Option<Credential<W>>,
}

impl<const W: usize> TickInput<W> {
    pub fn new(panel: PanelSnapshot, credential: Option<Credential<W>>) -> Self {
        Self { panel, credential }
    }

    /// Tick with nothing presented and the given panel levels.
    pub fn idle(panel: PanelSnapshot) -> Self {
        Self::new(panel, None)
    }
}

/// What moved the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    Button,
    Credential,
    AutoRelock,
}

impl fmt::Display for TransitionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionCause::Button => write!(f, "button"),
            TransitionCause::Credential => write!(f, "credential"),
            TransitionCause::AutoRelock => write!(f, "auto-relock"),
        }
    }
}

/// One recorded lock transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockTransition {
    pub from: LockState,
    pub to: LockState,
    pub cause: TransitionCause,

    /// Clock reading when the transition was decided.
    pub at_ms: u32,
}

/// A credential evaluation that produced a decision.
#[derive(Debug, Clone, Copy)]
struct Evaluation<const W: usize> {
    credential: Credential<W>,
    at_ms: u32,
}

/// Pure lock/enrollment state machine for credentials of width `W`.
#[derive(Debug, Clone)]
pub struct LockMachine<const W: usize> {
    policy: AccessPolicy,
    gate: EnrollmentGate,
    lock_timeout_ms: u32,
    rearm_interval_ms: u32,

    state: LockState,
    button_was_pressed: bool,

    /// Timeout relock: later of the last unlock and the last door-open tick.
    last_activity: u32,

    /// Manual toggle: last lock movement of any cause.
    last_actuation: u32,

    last_evaluation: Option<Evaluation<W>>,

    last_rearm: u32,

    history: VecDeque<LockTransition>,
}

impl<const W: usize> LockMachine<W> {
    /// Choose the boot state and return the machine with its boot commands.
    ///
    /// A non-empty store boots locked unless the door is reported open; an
    /// empty store always boots unlocked so the unit can be commissioned.
    /// All timers start at `now`. A button still held from boot does not
    /// count as a press until it has been released.
    pub fn start(
        config: &ControllerConfig,
        store_is_empty: bool,
        panel: &PanelSnapshot,
        now: u32,
    ) -> (Self, Vec<Command>) {
        let door_open = panel.door_open();
        let state = if store_is_empty || door_open {
            LockState::Unlocked
        } else {
            LockState::Locked
        };

        let machine = Self {
            policy: config.policy,
            gate: config.enrollment_gate,
            lock_timeout_ms: config.lock_timeout_ms,
            rearm_interval_ms: config.rearm_interval_ms,
            state,
            button_was_pressed: panel.button_pressed,
            last_activity: now,
            last_actuation: now,
            last_evaluation: None,
            last_rearm: now,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        };

        info!(%state, store_is_empty, door_open, policy = %config.policy, "lock machine started");
        (
            machine,
            vec![Command::ShowState(state.indicator()), Command::SetLock(state)],
        )
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    /// Recorded transitions, oldest first.
    pub fn history(&self) -> &VecDeque<LockTransition> {
        &self.history
    }

    /// Advance one tick.
    ///
    /// # Errors
    ///
    /// Propagates repository failures. Timers and state changes decided
    /// earlier in the same tick are kept.
    pub fn step<R>(
        &mut self,
        input: &TickInput<W>,
        now: u32,
        repository: &mut R,
    ) -> StorageResult<Vec<Command>>
    where
        R: CredentialRepository<W> + ?Sized,
    {
        let mut commands = Vec::new();

        let pressed = input.panel.button_pressed;
        let press_edge = pressed && !self.button_was_pressed;
        self.button_was_pressed = pressed;

        if press_edge {
            self.on_button_press(now, &mut commands);
        }

        if self.policy == AccessPolicy::TimeoutRelock {
            if input.panel.door_open() {
                self.last_activity = now;
            }

            if !repository.is_empty()
                && self.state == LockState::Unlocked
                && elapsed_ms(now, self.last_activity) >= self.lock_timeout_ms
            {
                commands.push(Command::ShowState(IndicatorColor::Red));
                self.transition(LockState::Locked, TransitionCause::AutoRelock, now, &mut commands);
            }
        }

        if let Some(credential) = input.credential {
            if self.admit_evaluation(&credential, now)
                && self.on_credential(&credential, &input.panel, now, repository, &mut commands)?
            {
                self.last_evaluation = Some(Evaluation {
                    credential,
                    at_ms: now,
                });
            }
        }

        if elapsed_ms(now, self.last_rearm) > self.rearm_interval_ms {
            self.last_rearm = now;
            commands.push(Command::RearmReader);
        }

        Ok(commands)
    }

    fn on_button_press(&mut self, now: u32, commands: &mut Vec<Command>) {
        match self.policy {
            AccessPolicy::TimeoutRelock => {
                if self.state == LockState::Locked {
                    commands.push(Command::Indicate(Outcome::Success));
                    self.transition(LockState::Unlocked, TransitionCause::Button, now, commands);
                }
            }
            AccessPolicy::ManualToggle => {
                let target = self.state.toggled();
                commands.push(Command::ShowState(target.indicator()));
                self.transition(target, TransitionCause::Button, now, commands);
            }
        }
    }

    /// Rate limiter: the last decided credential is not evaluated again
    /// until a re-arm interval has passed.
    fn admit_evaluation(&self, credential: &Credential<W>, now: u32) -> bool {
        match &self.last_evaluation {
            Some(last) if last.credential == *credential => {
                elapsed_ms(now, last.at_ms) >= self.rearm_interval_ms
            }
            _ => true,
        }
    }

    fn enrollment_open(&self, panel: &PanelSnapshot) -> bool {
        match self.gate {
            EnrollmentGate::WhileLocked => self.state == LockState::Locked,
            EnrollmentGate::DoorOpenWithButtonHeld => panel.door_open() && panel.button_pressed,
        }
    }

    /// Evaluate a presented credential. Returns whether it was acted on.
    fn on_credential<R>(
        &mut self,
        credential: &Credential<W>,
        panel: &PanelSnapshot,
        now: u32,
        repository: &mut R,
        commands: &mut Vec<Command>,
    ) -> StorageResult<bool>
    where
        R: CredentialRepository<W> + ?Sized,
    {
        if self.enrollment_open(panel) {
            let outcome = repository.toggle_enroll(credential)?;
            commands.push(Command::Indicate(outcome.feedback()));
            if let EnrollOutcome::Rejected(reason) = outcome {
                debug!(%credential, ?reason, "enrollment rejected");
                commands.push(Command::ShowState(self.state.indicator()));
            }
            return Ok(true);
        }

        let recognized = repository.lookup(credential)?.is_some();

        let acted = match (self.policy, self.state, recognized) {
            (AccessPolicy::TimeoutRelock, LockState::Locked, true) => {
                commands.push(Command::Indicate(Outcome::Success));
                self.transition(LockState::Unlocked, TransitionCause::Credential, now, commands);
                true
            }
            (AccessPolicy::TimeoutRelock, LockState::Unlocked, _) => {
                debug!(%credential, "credential ignored while unlocked");
                false
            }
            (AccessPolicy::ManualToggle, state, true) => {
                if elapsed_ms(now, self.last_actuation) > self.lock_timeout_ms {
                    let target = state.toggled();
                    commands.push(Command::Indicate(Outcome::Success));
                    commands.push(Command::ShowState(target.indicator()));
                    self.transition(target, TransitionCause::Credential, now, commands);
                    true
                } else {
                    debug!(%credential, "credential ignored within actuation timeout");
                    false
                }
            }
            (_, _, false) => {
                info!(%credential, "credential declined");
                commands.push(Command::Indicate(Outcome::Decline));
                true
            }
        };

        Ok(acted)
    }

    fn transition(
        &mut self,
        to: LockState,
        cause: TransitionCause,
        now: u32,
        commands: &mut Vec<Command>,
    ) {
        let from = self.state;
        self.state = to;
        self.last_actuation = now;
        if to == LockState::Unlocked {
            self.last_activity = now;
        }

        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(LockTransition {
            from,
            to,
            cause,
            at_ms: now,
        });

        info!(%from, %to, %cause, at_ms = now, "lock transition");
        commands.push(Command::SetLock(to));
    }
}
