//! Manually driven clock and recording delay.

use crate::traits::{Clock, Delay};
use std::cell::Cell;
use std::rc::Rc;

/// Clock advanced explicitly by the test or simulator.
///
/// Clones share the same time. With a non-zero auto step, every `now_ms`
/// call advances time by that step afterwards, so busy-wait loops that poll
/// the clock make progress.
///
/// # Examples
///
/// ```
/// use latchkey_hardware::mock::ManualClock;
/// use latchkey_hardware::traits::Clock;
///
/// let clock = ManualClock::new(0);
/// clock.advance(250);
/// assert_eq!(clock.now_ms(), 250);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u32>>,
    auto_step: Rc<Cell<u32>>,
}

impl ManualClock {
    pub fn new(start_ms: u32) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
            auto_step: Rc::new(Cell::new(0)),
        }
    }

    /// Advance time by `ms`, wrapping at `u32::MAX`.
    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }

    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }

    /// Advance by `step_ms` after every read. Zero disables.
    pub fn set_auto_step(&self, step_ms: u32) {
        self.auto_step.set(step_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        let now = self.now.get();
        self.now.set(now.wrapping_add(self.auto_step.get()));
        now
    }
}

/// Delay that records requested waits instead of sleeping.
///
/// When linked to a [`ManualClock`], each delay also advances that clock,
/// which is what a blocking delay does to a real monotonic clock.
#[derive(Debug, Clone, Default)]
pub struct MockDelay {
    total: Rc<Cell<u64>>,
    clock: Option<ManualClock>,
}

impl MockDelay {
    /// Delay that advances `clock` by every requested wait.
    pub fn linked(clock: ManualClock) -> Self {
        Self {
            total: Rc::default(),
            clock: Some(clock),
        }
    }

    /// Sum of all requested waits.
    pub fn total_ms(&self) -> u64 {
        self.total.get()
    }
}

impl Delay for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.total.set(self.total.get() + u64::from(ms));
        if let Some(clock) = &self.clock {
            clock.advance(ms);
        }
    }
}
