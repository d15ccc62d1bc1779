use clap::Parser;
use enroll::analytics::{AnalyticsClient, LogClient, PosthogClient, Tracker};
use enroll::config::{AnalyticsProvider, Config};
use enroll::runtime::{Runtime, Session};
use enroll::terminal::Terminal;
use enroll::{Error, RegistrationForm, Result, SimulatedDelay};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "enroll", version, about = "Course registration form for the terminal")]
struct Cli {
    /// Config file (defaults to ./enroll.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the analytics provider from the config
    #[arg(long, value_enum)]
    analytics: Option<AnalyticsProvider>,

    #[arg(long, env = "POSTHOG_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Write logs here; logging is off otherwise since the form owns the screen
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(provider) = cli.analytics {
        config.analytics.provider = provider;
    }
    config.validate()?;

    let posthog = match config.analytics.provider {
        AnalyticsProvider::Posthog => {
            let api_key = config.posthog_api_key(cli.api_key.as_deref())?;
            Some(Arc::new(PosthogClient::new(api_key, &config.analytics.host)))
        }
        _ => None,
    };
    let client: Option<Arc<dyn AnalyticsClient>> = match config.analytics.provider {
        AnalyticsProvider::Posthog => posthog
            .clone()
            .map(|client| client as Arc<dyn AnalyticsClient>),
        AnalyticsProvider::Log => Some(Arc::new(LogClient::new())),
        AnalyticsProvider::None => None,
    };
    tracing::info!(provider = ?config.analytics.provider, "starting registration form");

    let form = RegistrationForm::new(
        config.form_settings(),
        Tracker::new(client),
        SimulatedDelay::new(config.submit_delay()),
    );
    let terminal = Terminal::new()?;
    let mut runtime = Runtime::new(Session::new(form), config.page.clone(), terminal);
    let result = runtime.run();
    drop(runtime);

    if let Some(posthog) = posthog {
        posthog.shutdown();
    }
    result.map_err(Error::from)
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|err| Error::Logging(err.to_string()))
}
