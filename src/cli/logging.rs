//! Log output setup

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

impl Verbosity {
    pub fn level(&self) -> LevelFilter {
        match self {
            Verbosity::Silent => LevelFilter::ERROR,
            Verbosity::Quiet => LevelFilter::WARN,
            Verbosity::Normal => LevelFilter::INFO,
            Verbosity::Verbose => LevelFilter::DEBUG,
        }
    }
}

/// How log lines are rendered on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    /// Message and fields only, no timestamp, level or target
    Message,
}

impl OutputFormat {
    pub const NAMES: [&'static str; 3] = ["text", "json", "message"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "message" => Some(OutputFormat::Message),
            _ => None,
        }
    }
}

/// Install the global subscriber; `RUST_LOG` overrides the verbosity
///
/// Does nothing if a subscriber is already installed.
pub fn init_logging(verbosity: Verbosity, format: OutputFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match format {
        OutputFormat::Text => builder.try_init(),
        OutputFormat::Json => builder.json().try_init(),
        OutputFormat::Message => builder
            .without_time()
            .with_level(false)
            .with_target(false)
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("log subscriber already installed");
    }
}
