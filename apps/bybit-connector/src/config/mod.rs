//! Configuration module for the Bybit connector.
//!
//! YAML configuration with environment variable interpolation and
//! validation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bybit_connector::config::load_config;
//!
//! // Load from default path (bybit-connector.yaml)
//! let config = load_config(None)?;
//!
//! println!("window: {}ms", config.history.max_window_ms);
//! ```

mod history;
mod leverage;
mod observability;
mod transport;
mod venue;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use history::{HistoryConfig, PageSizesConfig};
pub use leverage::LeverageConfig;
pub use observability::{LoggingConfig, ObservabilityConfig};
pub use transport::TransportConfig;
pub use venue::VenueConfig;

use crate::application::history::MAX_WINDOW_MS;
use crate::domain::market::MarketCategory;

const DEFAULT_PATH: &str = "bybit-connector.yaml";
const LOG_FORMATS: [&str; 3] = ["pretty", "compact", "full"];

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Venue and account.
    #[serde(default)]
    pub venue: VenueConfig,
    /// Windowed history.
    #[serde(default)]
    pub history: HistoryConfig,
    /// Transport retry budgets.
    #[serde(default)]
    pub transport: TransportConfig,
    /// Leverage handling.
    #[serde(default)]
    pub leverage: LeverageConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<ConnectorConfig, ConfigError> {
    let path = path.unwrap_or(DEFAULT_PATH);

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<ConnectorConfig, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: ConnectorConfig = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // constant pattern
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map(|m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &ConnectorConfig) -> Result<(), ConfigError> {
    if config.venue.account.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "venue.account must not be empty".to_string(),
        ));
    }

    if config
        .venue
        .default_category
        .parse::<MarketCategory>()
        .is_err()
    {
        return Err(ConfigError::ValidationError(format!(
            "venue.default_category must be one of spot, linear, inverse, option; got '{}'",
            config.venue.default_category
        )));
    }

    let window = config.history.max_window_ms;
    if window <= 0 || window > MAX_WINDOW_MS {
        return Err(ConfigError::ValidationError(format!(
            "history.max_window_ms must be between 1 and {MAX_WINDOW_MS}, got {window}"
        )));
    }

    let sizes = config.history.page_sizes.values();
    for ((name, cap), size) in PageSizesConfig::CAPS.iter().zip(sizes) {
        if size == 0 || size > *cap {
            return Err(ConfigError::ValidationError(format!(
                "history.page_sizes.{name} must be between 1 and {cap}, got {size}"
            )));
        }
    }

    let format = config.observability.logging.format.as_str();
    if !LOG_FORMATS.contains(&format) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {LOG_FORMATS:?}"
        )));
    }

    Ok(())
}
