// Process-wide tracing subscriber
use thiserror::Error;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggerConfig;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Logger already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Build the filter: `RUST_LOG` wins, otherwise the configured level
pub fn env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(config.default_directive())
            .map_err(|e| LoggerError::InvalidFilter(e.to_string())),
    }
}

/// Install the global subscriber
///
/// JSON output for production, human-readable output otherwise.
pub fn init_logging(config: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = env_filter(config)?;

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json(),
            )
            .try_init()
            .map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_level(true),
            )
            .try_init()
            .map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))
    }
}
