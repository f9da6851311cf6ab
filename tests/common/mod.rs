//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use std::cell::RefCell;
use std::rc::Rc;
use workflow_canvas::GestureOutcome;

/// Records the outcome of every finished gesture.
#[derive(Default, Clone)]
pub struct OutcomeLog {
    pub outcomes: Rc<RefCell<Vec<GestureOutcome>>>,
}

impl OutcomeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: GestureOutcome) {
        self.outcomes.borrow_mut().push(outcome);
    }

    pub fn last(&self) -> Option<GestureOutcome> {
        self.outcomes.borrow().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.outcomes.borrow().len()
    }

    /// Clear all recorded outcomes.
    pub fn clear(&self) {
        self.outcomes.borrow_mut().clear();
    }
}
