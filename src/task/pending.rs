use crate::error::SubmitError;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

pub type SubmitOutcome = Result<(), SubmitError>;

/// Deferred result of a submit operation.
#[derive(Debug)]
pub struct PendingSubmission {
    receiver: Receiver<SubmitOutcome>,
}

/// Producer side of a [`PendingSubmission`]. Dropping it unresolved abandons
/// the submission.
#[derive(Debug)]
pub struct Completer {
    sender: Sender<SubmitOutcome>,
}

impl PendingSubmission {
    pub fn channel() -> (Completer, PendingSubmission) {
        let (sender, receiver) = mpsc::channel::<SubmitOutcome>();
        (Completer { sender }, PendingSubmission { receiver })
    }

    pub fn ready(outcome: SubmitOutcome) -> Self {
        let (completer, pending) = Self::channel();
        completer.complete(outcome);
        pending
    }

    /// Non-blocking. `None` while the operation is still running.
    pub fn try_take(&self) -> Option<SubmitOutcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(SubmitError::Abandoned)),
        }
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Option<SubmitOutcome> {
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(SubmitError::Abandoned)),
        }
    }
}

impl Completer {
    pub fn complete(self, outcome: SubmitOutcome) {
        // The receiving form may already be gone; nothing left to notify.
        let _ = self.sender.send(outcome);
    }

    pub fn resolve(self) {
        self.complete(Ok(()));
    }

    pub fn fail(self, message: impl Into<String>) {
        self.complete(Err(SubmitError::failed(message)));
    }
}
