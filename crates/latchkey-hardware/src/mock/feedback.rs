//! Mock feedback sink.

use crate::{Result, traits::FeedbackSink};
use latchkey_core::{IndicatorColor, Outcome};
use std::cell::RefCell;
use std::rc::Rc;

/// One call made on a feedback sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackEvent {
    Indicate(Outcome),
    Show(IndicatorColor),
}

#[derive(Debug, Default)]
struct FeedbackState {
    events: Vec<FeedbackEvent>,
    color: Option<IndicatorColor>,
}

/// Mock feedback sink recording outcomes and indicator changes.
///
/// # Examples
///
/// ```
/// use latchkey_core::{IndicatorColor, Outcome};
/// use latchkey_hardware::mock::MockFeedback;
/// use latchkey_hardware::traits::FeedbackSink;
///
/// let (mut feedback, handle) = MockFeedback::new();
/// feedback.indicate(Outcome::Decline).unwrap();
/// assert_eq!(handle.count(Outcome::Decline), 1);
/// assert_eq!(handle.color(), Some(IndicatorColor::Red));
/// ```
#[derive(Debug)]
pub struct MockFeedback {
    state: Rc<RefCell<FeedbackState>>,
}

impl MockFeedback {
    pub fn new() -> (Self, MockFeedbackHandle) {
        let state = Rc::new(RefCell::new(FeedbackState::default()));
        (
            Self {
                state: Rc::clone(&state),
            },
            MockFeedbackHandle { state },
        )
    }
}

impl FeedbackSink for MockFeedback {
    fn indicate(&mut self, outcome: Outcome) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.events.push(FeedbackEvent::Indicate(outcome));
        state.color = Some(outcome.signal().color);
        Ok(())
    }

    fn show(&mut self, color: IndicatorColor) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.events.push(FeedbackEvent::Show(color));
        state.color = Some(color);
        Ok(())
    }
}

/// Handle for inspecting a mock feedback sink.
#[derive(Debug, Clone)]
pub struct MockFeedbackHandle {
    state: Rc<RefCell<FeedbackState>>,
}

impl MockFeedbackHandle {
    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.state.borrow().events.clone()
    }

    /// Outcomes indicated so far, oldest first.
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.state
            .borrow()
            .events
            .iter()
            .filter_map(|event| match event {
                FeedbackEvent::Indicate(outcome) => Some(*outcome),
                FeedbackEvent::Show(_) => None,
            })
            .collect()
    }

    /// How many times `outcome` was indicated.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes().iter().filter(|o| **o == outcome).count()
    }

    /// Color the indicator currently shows.
    pub fn color(&self) -> Option<IndicatorColor> {
        self.state.borrow().color
    }

    pub fn clear(&self) {
        self.state.borrow_mut().events.clear();
    }
}
