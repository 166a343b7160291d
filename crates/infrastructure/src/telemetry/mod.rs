//! Logging setup
//!
//! One `tracing-subscriber` registry with an `EnvFilter` and a fmt layer
//! writing to stderr, so command output on stdout stays clean.

use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, LoggingConfig};

/// Errors while installing the subscriber
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Filter directive could not be parsed
    #[error("Invalid log filter '{filter}': {reason}")]
    Filter {
        /// Rejected directive
        filter: String,
        /// Parser message
        reason: String,
    },

    /// Failed to initialize tracing subscriber
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}

/// Filter for a `-v` count: 0 warn, 1 info, 2 debug, 3+ trace
#[must_use]
pub const fn verbosity_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Pick the filter directive: `RUST_LOG`, then the configured level, then verbosity
#[must_use]
pub fn resolve_filter(rust_log: Option<&str>, configured: Option<&str>, verbosity: u8) -> String {
    usable(rust_log)
        .or_else(|| usable(configured))
        .unwrap_or_else(|| verbosity_filter(verbosity))
        .to_string()
}

fn usable(filter: Option<&str>) -> Option<&str> {
    filter.map(str::trim).filter(|f| !f.is_empty())
}

/// Install the global subscriber
///
/// # Errors
///
/// Fails on an unparsable filter or when a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig, verbosity: u8) -> Result<(), TelemetryError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = resolve_filter(rust_log.as_deref(), config.level.as_deref(), verbosity);
    let env_filter = EnvFilter::try_new(&directive).map_err(|e| TelemetryError::Filter {
        filter: directive.clone(),
        reason: e.to_string(),
    })?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    result.map_err(|e| TelemetryError::Init(e.to_string()))?;

    debug!(filter = %directive, format = ?config.format, "Logging initialized");
    Ok(())
}
