//! Leverage configuration.

use serde::{Deserialize, Serialize};

/// Leverage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeverageConfig {
    /// Venue codes treated as "already set" on set-leverage, on top of the
    /// built-in list.
    #[serde(default)]
    pub extra_idempotent_codes: Vec<i64>,
    /// Probe the position list when the leverage cache misses.
    #[serde(default = "default_true")]
    pub lazy_probe: bool,
}

impl Default for LeverageConfig {
    fn default() -> Self {
        Self {
            extra_idempotent_codes: Vec::new(),
            lazy_probe: true,
        }
    }
}

pub(crate) const fn default_true() -> bool {
    true
}
