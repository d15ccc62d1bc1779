use crate::task::{Completer, PendingSubmission, RegistrationRequest, SubmitOperation};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Default)]
struct ManualState {
    requests: Vec<RegistrationRequest>,
    waiting: VecDeque<Completer>,
}

/// Submit operation completed by hand, oldest first. Clones share state, so a
/// caller can keep one handle while the form owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualOperation {
    state: Arc<Mutex<ManualState>>,
}

impl ManualOperation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<RegistrationRequest> {
        self.state.lock().requests.clone()
    }

    pub fn in_flight(&self) -> usize {
        self.state.lock().waiting.len()
    }

    /// Returns false if nothing was waiting.
    pub fn resolve_next(&self) -> bool {
        match self.state.lock().waiting.pop_front() {
            Some(completer) => {
                completer.resolve();
                true
            }
            None => false,
        }
    }

    pub fn fail_next(&self, message: impl Into<String>) -> bool {
        match self.state.lock().waiting.pop_front() {
            Some(completer) => {
                completer.fail(message);
                true
            }
            None => false,
        }
    }
}

impl SubmitOperation for ManualOperation {
    fn start(&self, request: RegistrationRequest) -> PendingSubmission {
        let (completer, pending) = PendingSubmission::channel();
        let mut state = self.state.lock();
        state.requests.push(request);
        state.waiting.push_back(completer);
        pending
    }
}
