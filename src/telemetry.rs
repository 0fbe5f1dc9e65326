//! Tracing subscriber setup.
//!
//! Installs a global `tracing-subscriber` fmt layer filtered by `RUST_LOG`,
//! falling back to the configured level directive.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Errors from tracing initialization.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The level directive could not be parsed.
    #[error("invalid log filter '{directive}': {message}")]
    InvalidFilter { directive: String, message: String },

    /// A global subscriber is already installed.
    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Builds the filter: `RUST_LOG` if set and valid, else the configured level.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.level).map_err(|e| TelemetryError::InvalidFilter {
        directive: config.level.clone(),
        message: e.to_string(),
    })
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns `TelemetryError::AlreadyInitialized` if called more than once.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };

    result.map_err(|_| TelemetryError::AlreadyInitialized)
}
