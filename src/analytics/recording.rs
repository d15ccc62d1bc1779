use crate::analytics::{AnalyticsClient, AnalyticsEvent, Properties};
use crate::error::AnalyticsError;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Capture(AnalyticsEvent),
    Identify {
        subject_id: String,
        traits: Properties,
    },
}

/// In-memory client that keeps every call. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingClient {
    calls: Arc<Mutex<Vec<Recorded>>>,
    fail: bool,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records calls but reports every one of them as failed.
    pub fn failing() -> Self {
        Self {
            calls: Arc::default(),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().clone()
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Recorded::Capture(event) => Some(event.clone()),
                Recorded::Identify { .. } => None,
            })
            .collect()
    }

    pub fn event_names(&self) -> Vec<String> {
        self.events().into_iter().map(|event| event.name).collect()
    }

    /// Capture names plus `$identify` markers, in call order.
    pub fn sequence(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .map(|call| match call {
                Recorded::Capture(event) => event.name.clone(),
                Recorded::Identify { .. } => "$identify".to_string(),
            })
            .collect()
    }

    pub fn last_event(&self, name: &str) -> Option<AnalyticsEvent> {
        self.events().into_iter().rev().find(|event| event.name == name)
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: Recorded) -> Result<(), AnalyticsError> {
        self.calls.lock().push(call);
        if self.fail {
            return Err(AnalyticsError::Closed);
        }
        Ok(())
    }
}

impl AnalyticsClient for RecordingClient {
    fn capture(&self, event: &AnalyticsEvent) -> Result<(), AnalyticsError> {
        self.record(Recorded::Capture(event.clone()))
    }

    fn identify(&self, subject_id: &str, traits: &Properties) -> Result<(), AnalyticsError> {
        self.record(Recorded::Identify {
            subject_id: subject_id.to_string(),
            traits: traits.clone(),
        })
    }
}
