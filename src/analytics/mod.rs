//! Analytics capability consumed by the registration form.
//!
//! The form never talks to a vendor SDK directly. It holds a [`Tracker`], which
//! forwards to whatever [`AnalyticsClient`] was injected, or does nothing when
//! none was. Delivery is best-effort: client errors are logged and dropped.

pub mod log_client;
pub mod posthog;
pub mod recording;

pub use log_client::LogClient;
pub use posthog::PosthogClient;
pub use recording::{Recorded, RecordingClient};

use crate::error::AnalyticsError;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A JSON primitive. Event properties never nest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Primitive {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Primitive {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for Primitive {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Primitive {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Primitive {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Insertion-ordered property map. Also used for identify traits.
pub type Properties = IndexMap<String, Primitive>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub name: String,
    pub properties: Properties,
}

impl AnalyticsEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Properties::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Primitive>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&Primitive> {
        self.properties.get(key)
    }
}

/// Builds a [`Properties`] map from `key => value` pairs.
#[macro_export]
macro_rules! properties {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut map = $crate::analytics::Properties::new();
        $(map.insert(($key).to_string(), $crate::analytics::Primitive::from($value));)*
        map
    }};
}

pub trait AnalyticsClient: Send + Sync {
    fn capture(&self, event: &AnalyticsEvent) -> Result<(), AnalyticsError>;

    /// Associates later events with `subject_id`.
    fn identify(&self, subject_id: &str, traits: &Properties) -> Result<(), AnalyticsError>;
}

/// Null-safe front for an optional analytics client.
#[derive(Clone, Default)]
pub struct Tracker {
    client: Option<Arc<dyn AnalyticsClient>>,
}

impl Tracker {
    pub fn new(client: Option<Arc<dyn AnalyticsClient>>) -> Self {
        Self { client }
    }

    pub fn with_client(client: Arc<dyn AnalyticsClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub fn emit(&self, name: &str, properties: Properties) {
        let Some(client) = &self.client else {
            return;
        };
        let event = AnalyticsEvent {
            name: name.to_string(),
            properties,
        };
        if let Err(err) = client.capture(&event) {
            tracing::warn!(event = name, error = %err, "analytics capture dropped");
        }
    }

    pub fn identify(&self, subject_id: &str, traits: Properties) {
        let Some(client) = &self.client else {
            return;
        };
        if let Err(err) = client.identify(subject_id, &traits) {
            tracing::warn!(subject = subject_id, error = %err, "analytics identify dropped");
        }
    }
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{AnalyticsEvent, Primitive, Recorded, RecordingClient, Tracker};
    use std::sync::Arc;

    #[test]
    fn disabled_tracker_is_a_no_op() {
        let tracker = Tracker::disabled();
        tracker.emit("$pageview", properties! { "page_title" => "x" });
        tracker.identify("jane@x.com", properties! {});
        assert!(!tracker.is_enabled());
    }

    #[test]
    fn tracker_forwards_in_call_order() {
        let client = RecordingClient::new();
        let tracker = Tracker::with_client(Arc::new(client.clone()));

        tracker.emit("first", properties! { "n" => 1i64 });
        tracker.identify("jane@x.com", properties! { "email" => "jane@x.com" });
        tracker.emit("second", properties! {});

        let calls = client.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(&calls[0], Recorded::Capture(event) if event.name == "first"));
        assert!(matches!(
            &calls[1],
            Recorded::Identify { subject_id, .. } if subject_id == "jane@x.com"
        ));
        assert!(matches!(&calls[2], Recorded::Capture(event) if event.name == "second"));
    }

    #[test]
    fn client_failures_are_swallowed() {
        let client = RecordingClient::failing();
        let tracker = Tracker::with_client(Arc::new(client.clone()));

        tracker.emit("registration_completed", properties! {});
        tracker.identify("jane@x.com", properties! {});

        assert_eq!(client.calls().len(), 2);
    }

    #[test]
    fn properties_serialize_as_flat_primitives() {
        let event = AnalyticsEvent::new("mixed")
            .with("text", "a")
            .with("flag", true)
            .with("count", 3i64)
            .with("none", Primitive::Null);

        let json = serde_json::to_value(&event.properties).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "text": "a", "flag": true, "count": 3, "none": null })
        );
    }

    #[test]
    fn properties_keep_insertion_order() {
        let map = properties! { "z" => "1", "a" => "2", "m" => "3" };
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }
}
