//! Console logging settings.

use serde::{Deserialize, Serialize};

use super::leverage::default_true;

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ObservabilityConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format (`pretty`, `compact` or `full`).
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Emit an event when a span closes.
    #[serde(default = "default_true")]
    pub include_spans: bool,
    /// Print the module path of each event.
    #[serde(default)]
    pub with_target: bool,
    /// Colorize output; turn off when logs go to a file or collector.
    #[serde(default = "default_true")]
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            include_spans: true,
            with_target: false,
            ansi: true,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
