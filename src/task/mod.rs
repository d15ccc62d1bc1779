pub mod manual;
pub mod pending;

pub use manual::ManualOperation;
pub use pending::{Completer, PendingSubmission};

use std::time::Duration;

/// What the form hands to the submit operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub course_id: String,
}

/// The single asynchronous step of a registration.
///
/// `start` must return promptly. The outcome is delivered later through the
/// returned [`PendingSubmission`].
pub trait SubmitOperation: Send {
    fn start(&self, request: RegistrationRequest) -> PendingSubmission;
}

impl<F> SubmitOperation for F
where
    F: Fn(RegistrationRequest) -> PendingSubmission + Send,
{
    fn start(&self, request: RegistrationRequest) -> PendingSubmission {
        self(request)
    }
}

/// Stands in for the network round trip: resolves successfully after `delay`.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedDelay {
    delay: Duration,
}

impl SimulatedDelay {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedDelay {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

impl SubmitOperation for SimulatedDelay {
    fn start(&self, request: RegistrationRequest) -> PendingSubmission {
        let (completer, pending) = PendingSubmission::channel();
        let delay = self.delay;
        std::thread::spawn(move || {
            tracing::debug!(email = %request.email, ?delay, "simulated registration started");
            std::thread::sleep(delay);
            completer.resolve();
        });
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::{RegistrationRequest, SimulatedDelay, SubmitOperation};
    use std::time::{Duration, Instant};

    fn request() -> RegistrationRequest {
        RegistrationRequest {
            name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            phone: "555-1111".to_string(),
            course_id: "negotiation_mastery".to_string(),
        }
    }

    #[test]
    fn simulated_delay_resolves_after_its_delay() {
        let op = SimulatedDelay::new(Duration::from_millis(20));
        let started = Instant::now();
        let pending = op.start(request());

        let outcome = pending
            .wait_timeout(Duration::from_secs(2))
            .expect("outcome should arrive");
        assert_eq!(outcome, Ok(()));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn default_delay_matches_simulated_round_trip() {
        assert_eq!(SimulatedDelay::default().delay(), Duration::from_millis(1500));
    }
}
