use std::io;
use std::path::PathBuf;

/// Failure of the deferred registration operation. Its message is what
/// `registration_error` reports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("{0}")]
    Failed(String),

    #[error("registration was abandoned before it completed")]
    Abandoned,
}

impl SubmitError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("analytics request failed: {0}")]
    Transport(String),

    #[error("analytics endpoint returned status {0}")]
    Status(u16),

    #[error("failed to encode analytics payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("analytics client is shut down")]
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("posthog analytics needs an api key (set analytics.api_key or POSTHOG_API_KEY)")]
    MissingApiKey,

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("terminal error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to set up logging: {0}")]
    Logging(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
