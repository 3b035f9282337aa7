//! Mock credential reader.

use crate::{HardwareError, Result, traits::CredentialReader};
use latchkey_core::Credential;
use std::cell::RefCell;
use std::rc::Rc;

/// How often a continuously presented credential is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    /// Report the presented credential on every poll.
    #[default]
    EveryPoll,

    /// Report it once, then stay silent until the next re-arm. This is how
    /// an MFRC522 behaves: a card that has been read is halted and only
    /// shows up as "new" again after the reader is reset.
    OncePerArm,
}

#[derive(Debug)]
struct ReaderState<const W: usize> {
    presented: Option<Credential<W>>,
    corrupted: bool,
    reported_since_arm: bool,
    mode: ReportMode,
    disconnected: bool,
    reads: usize,
    rearms: usize,
}

/// Mock credential reader for testing and simulation.
///
/// # Examples
///
/// ```
/// use latchkey_core::Credential;
/// use latchkey_hardware::mock::MockReader;
/// use latchkey_hardware::traits::CredentialReader;
///
/// let (mut reader, handle) = MockReader::<8>::new();
/// assert_eq!(reader.try_read().unwrap(), None);
///
/// let key = Credential::from_slice(&[0x04, 0xAB, 0xCD, 0xEF]).unwrap();
/// handle.present(key);
/// assert_eq!(reader.try_read().unwrap(), Some(key));
/// ```
#[derive(Debug)]
pub struct MockReader<const W: usize> {
    state: Rc<RefCell<ReaderState<W>>>,
}

impl<const W: usize> MockReader<W> {
    /// Create a reader that reports on every poll.
    pub fn new() -> (Self, MockReaderHandle<W>) {
        Self::with_mode(ReportMode::EveryPoll)
    }

    /// Create a reader with the given report mode.
    pub fn with_mode(mode: ReportMode) -> (Self, MockReaderHandle<W>) {
        let state = Rc::new(RefCell::new(ReaderState {
            presented: None,
            corrupted: false,
            reported_since_arm: false,
            mode,
            disconnected: false,
            reads: 0,
            rearms: 0,
        }));

        (
            Self {
                state: Rc::clone(&state),
            },
            MockReaderHandle { state },
        )
    }
}

impl<const W: usize> CredentialReader<W> for MockReader<W> {
    fn try_read(&mut self) -> Result<Option<Credential<W>>> {
        let mut state = self.state.borrow_mut();
        if state.disconnected {
            return Err(HardwareError::disconnected("mock reader"));
        }
        state.reads += 1;

        let Some(credential) = state.presented else {
            return Ok(None);
        };
        if state.corrupted {
            return Ok(None);
        }
        if state.mode == ReportMode::OncePerArm && state.reported_since_arm {
            return Ok(None);
        }

        state.reported_since_arm = true;
        Ok(Some(credential))
    }

    fn rearm(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.disconnected {
            return Err(HardwareError::disconnected("mock reader"));
        }
        state.rearms += 1;
        state.reported_since_arm = false;
        Ok(())
    }
}

/// Handle for controlling a mock credential reader.
#[derive(Debug, Clone)]
pub struct MockReaderHandle<const W: usize> {
    state: Rc<RefCell<ReaderState<W>>>,
}

impl<const W: usize> MockReaderHandle<W> {
    /// Place a credential on the reader. It stays presented until removed.
    pub fn present(&self, credential: Credential<W>) {
        let mut state = self.state.borrow_mut();
        state.presented = Some(credential);
        state.reported_since_arm = false;
    }

    /// Take the credential away.
    pub fn remove(&self) {
        self.state.borrow_mut().presented = None;
    }

    /// Make reads fail their integrity check (e.g. bad 1-Wire CRC).
    pub fn set_corrupted(&self, corrupted: bool) {
        self.state.borrow_mut().corrupted = corrupted;
    }

    /// Simulate a reader that no longer answers on its bus.
    pub fn set_disconnected(&self, disconnected: bool) {
        self.state.borrow_mut().disconnected = disconnected;
    }

    pub fn presented(&self) -> Option<Credential<W>> {
        self.state.borrow().presented
    }

    /// Number of polls since creation.
    pub fn read_count(&self) -> usize {
        self.state.borrow().reads
    }

    /// Number of re-arms since creation.
    pub fn rearm_count(&self) -> usize {
        self.state.borrow().rearms
    }
}
