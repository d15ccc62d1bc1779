use crate::analytics::{AnalyticsClient, AnalyticsEvent, Properties};
use crate::error::AnalyticsError;

/// Writes analytics calls to the tracing log instead of the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogClient;

impl LogClient {
    pub fn new() -> Self {
        Self
    }
}

impl AnalyticsClient for LogClient {
    fn capture(&self, event: &AnalyticsEvent) -> Result<(), AnalyticsError> {
        let properties = serde_json::to_string(&event.properties)?;
        tracing::info!(target: "enroll::analytics", event = %event.name, %properties, "capture");
        Ok(())
    }

    fn identify(&self, subject_id: &str, traits: &Properties) -> Result<(), AnalyticsError> {
        let traits = serde_json::to_string(traits)?;
        tracing::info!(target: "enroll::analytics", subject = subject_id, %traits, "identify");
        Ok(())
    }
}
