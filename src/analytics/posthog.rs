use crate::analytics::{AnalyticsClient, AnalyticsEvent, Properties};
use crate::error::AnalyticsError;
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "https://us.i.posthog.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const LIB_NAME: &str = "enroll";

#[derive(Debug, Clone, PartialEq, Serialize)]
struct CaptureRequest {
    api_key: String,
    event: String,
    distinct_id: String,
    properties: Map<String, Value>,
    timestamp: String,
}

/// PostHog client speaking the public `/capture/` endpoint.
///
/// Calls only enqueue; a single worker thread performs the HTTP requests in
/// order. Until `identify` is called, events go out under an anonymous UUID.
pub struct PosthogClient {
    api_key: String,
    distinct_id: Mutex<String>,
    sender: Mutex<Option<Sender<CaptureRequest>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl PosthogClient {
    pub fn new(api_key: impl Into<String>, host: &str) -> Self {
        let endpoint = capture_endpoint(host);
        let (sender, receiver) = mpsc::channel::<CaptureRequest>();
        let worker = std::thread::spawn(move || deliver_all(receiver, &endpoint));

        Self {
            api_key: api_key.into(),
            distinct_id: Mutex::new(uuid::Uuid::new_v4().to_string()),
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        }
    }

    pub fn distinct_id(&self) -> String {
        self.distinct_id.lock().clone()
    }

    /// Stops accepting events and waits until queued ones have been sent.
    pub fn shutdown(&self) {
        drop(self.sender.lock().take());
        if let Some(worker) = self.worker.lock().take() {
            if worker.join().is_err() {
                tracing::warn!("posthog worker panicked during shutdown");
            }
        }
    }

    fn capture_request(&self, event: &AnalyticsEvent) -> Result<CaptureRequest, AnalyticsError> {
        let mut properties = to_map(&event.properties)?;
        properties.insert("$lib".to_string(), Value::from(LIB_NAME));
        properties.insert(
            "$lib_version".to_string(),
            Value::from(env!("CARGO_PKG_VERSION")),
        );

        Ok(CaptureRequest {
            api_key: self.api_key.clone(),
            event: event.name.clone(),
            distinct_id: self.distinct_id(),
            properties,
            timestamp: now_iso8601(),
        })
    }

    fn identify_request(
        &self,
        subject_id: &str,
        traits: &Properties,
    ) -> Result<CaptureRequest, AnalyticsError> {
        let previous = {
            let mut current = self.distinct_id.lock();
            std::mem::replace(&mut *current, subject_id.to_string())
        };

        let mut properties = Map::new();
        properties.insert("$set".to_string(), Value::Object(to_map(traits)?));
        if previous != subject_id {
            properties.insert("$anon_distinct_id".to_string(), Value::from(previous));
        }
        properties.insert("$lib".to_string(), Value::from(LIB_NAME));

        Ok(CaptureRequest {
            api_key: self.api_key.clone(),
            event: "$identify".to_string(),
            distinct_id: subject_id.to_string(),
            properties,
            timestamp: now_iso8601(),
        })
    }

    fn enqueue(&self, request: CaptureRequest) -> Result<(), AnalyticsError> {
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            return Err(AnalyticsError::Closed);
        };
        sender.send(request).map_err(|_| AnalyticsError::Closed)
    }
}

impl AnalyticsClient for PosthogClient {
    fn capture(&self, event: &AnalyticsEvent) -> Result<(), AnalyticsError> {
        let request = self.capture_request(event)?;
        self.enqueue(request)
    }

    fn identify(&self, subject_id: &str, traits: &Properties) -> Result<(), AnalyticsError> {
        let request = self.identify_request(subject_id, traits)?;
        self.enqueue(request)
    }
}

impl Drop for PosthogClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn capture_endpoint(host: &str) -> String {
    let host = host.trim();
    let host = if host.is_empty() { DEFAULT_HOST } else { host };
    format!("{}/capture/", host.trim_end_matches('/'))
}

fn to_map(properties: &Properties) -> Result<Map<String, Value>, AnalyticsError> {
    match serde_json::to_value(properties)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn deliver_all(receiver: Receiver<CaptureRequest>, endpoint: &str) {
    let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
    for request in receiver {
        match deliver(&agent, endpoint, &request) {
            Ok(()) => tracing::debug!(event = %request.event, "posthog capture sent"),
            Err(err) => {
                tracing::warn!(event = %request.event, error = %err, "posthog capture failed")
            }
        }
    }
}

fn deliver(
    agent: &ureq::Agent,
    endpoint: &str,
    request: &CaptureRequest,
) -> Result<(), AnalyticsError> {
    match agent.post(endpoint).send_json(request) {
        Ok(_) => Ok(()),
        Err(ureq::Error::Status(code, _)) => Err(AnalyticsError::Status(code)),
        Err(err) => Err(AnalyticsError::Transport(err.to_string())),
    }
}
