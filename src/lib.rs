pub mod analytics;
pub mod config;
pub mod core;
pub mod error;
pub mod input;
pub mod runtime;
pub mod task;
pub mod terminal;
pub mod ui;

pub use analytics::{AnalyticsClient, AnalyticsEvent, Tracker};
pub use config::Config;
pub use core::registration::{FormSettings, RegistrationForm, SubmissionState, SubmitAttempt};
pub use error::{Error, Result};
pub use task::{RegistrationRequest, SimulatedDelay, SubmitOperation};
