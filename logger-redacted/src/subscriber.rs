// Global tracing subscriber setup
use crate::config::LoggerConfig;
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter '{directive}': {message}")]
    InvalidFilter { directive: String, message: String },

    #[error("A global subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}

/// Build the filter: `RUST_LOG` wins, otherwise the configured level
pub fn build_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let directive = config.default_directive();
    EnvFilter::try_new(&directive).map_err(|e| LoggerError::InvalidFilter {
        directive,
        message: e.to_string(),
    })
}

/// Install the process-wide subscriber. Call once from `main`.
pub fn init_logging(config: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = build_filter(config)?;

    let result = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(config.with_target)
                    .with_timer(fmt::time::ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(config.with_target)
                    .with_timer(fmt::time::ChronoUtc::rfc_3339()),
            )
            .try_init()
    };

    result.map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))
}
