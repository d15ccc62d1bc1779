use crate::analytics::posthog::DEFAULT_HOST;
use crate::core::registration::{
    DEFAULT_COURSE_ID, DEFAULT_FORM_LOCATION, DEFAULT_PAGE_TITLE, DEFAULT_PAGE_TYPE, FormSettings,
};
use crate::error::ConfigError;
use crate::task::SimulatedDelay;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "enroll.yaml";
const DEFAULT_SUBTITLE: &str =
    "Join our exclusive course for adults who want to master the art of negotiation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsProvider {
    Posthog,
    /// Write events to the log file instead of sending them.
    #[default]
    Log,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyticsConfig {
    pub provider: AnalyticsProvider,
    pub api_key: Option<String>,
    pub host: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            provider: AnalyticsProvider::default(),
            api_key: None,
            host: DEFAULT_HOST.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    pub title: String,
    pub subtitle: String,
    pub page_title: String,
    pub page_type: String,
    pub benefits: Vec<String>,
    pub security_note: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Negotiation Mastery".to_string(),
            subtitle: DEFAULT_SUBTITLE.to_string(),
            page_title: DEFAULT_PAGE_TITLE.to_string(),
            page_type: DEFAULT_PAGE_TYPE.to_string(),
            benefits: vec![
                "Advanced negotiation strategies".to_string(),
                "Win-win communication techniques".to_string(),
                "Salary and contract negotiation".to_string(),
                "Conflict resolution skills".to_string(),
            ],
            security_note: "Your information is secure and will never be shared".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CourseConfig {
    pub id: String,
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_COURSE_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormConfig {
    pub location: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            location: DEFAULT_FORM_LOCATION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub submit_delay_ms: u64,
    pub success_display_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            submit_delay_ms: SimulatedDelay::DEFAULT_DELAY.as_millis() as u64,
            success_display_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub analytics: AnalyticsConfig,
    pub page: PageConfig,
    pub course: CourseConfig,
    pub form: FormConfig,
    pub timing: TimingConfig,
}

impl Config {
    /// Loads `path`, or `enroll.yaml` from the working directory when no path is
    /// given. A missing default file yields the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_yaml(&text, &path)
    }

    pub fn from_yaml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.course.id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "course.id",
                reason: "must not be empty".to_string(),
            });
        }
        if self.timing.success_display_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "timing.success_display_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// API key from the config, falling back to `env_key`.
    pub fn posthog_api_key(&self, env_key: Option<&str>) -> Result<String, ConfigError> {
        self.analytics
            .api_key
            .as_deref()
            .or(env_key)
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn form_settings(&self) -> FormSettings {
        FormSettings {
            course_id: self.course.id.clone(),
            form_location: self.form.location.clone(),
            page_title: self.page.page_title.clone(),
            page_type: self.page.page_type.clone(),
            success_display: Duration::from_millis(self.timing.success_display_ms),
        }
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.timing.submit_delay_ms)
    }
}
