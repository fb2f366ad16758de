//! Tracing Setup
//!
//! Installs a console `tracing` subscriber configured from
//! [`LoggingConfig`]. `RUST_LOG` wins over the configured level.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bybit_connector::config::load_config;
//! use bybit_connector::telemetry::init_tracing;
//!
//! let config = load_config(None)?;
//! init_tracing(&config.observability.logging)?;
//! ```

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use crate::config::LoggingConfig;

/// Tracing setup errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber is already installed.
    #[error("Failed to install tracing subscriber: {0}")]
    AlreadyInitialized(String),

    /// Unknown output format.
    #[error("Unknown log format '{0}'")]
    UnknownFormat(String),
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the format is unknown or a subscriber already exists.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let span_events = if config.include_spans {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_span_events(span_events)
        .with_target(config.with_target)
        .with_ansi(config.ansi);

    let result = match config.format.as_str() {
        "pretty" => builder.pretty().try_init(),
        "compact" => builder.compact().try_init(),
        "full" => builder.try_init(),
        other => return Err(TelemetryError::UnknownFormat(other.to_string())),
    };
    result.map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    tracing::debug!(level = %config.level, format = %config.format, "Tracing initialized");
    Ok(())
}
