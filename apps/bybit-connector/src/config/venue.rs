//! Venue and account configuration.

use serde::{Deserialize, Serialize};

use crate::domain::market::MarketCategory;

/// Venue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueConfig {
    /// Account name used to look up the leverage cache.
    #[serde(default = "default_account")]
    pub account: String,
    /// Category for symbol-less queries (`spot`, `linear`, `inverse`, `option`).
    #[serde(default = "default_category")]
    pub default_category: String,
    /// Settle coins iterated by symbol-less contract queries.
    #[serde(default = "default_settle_coins")]
    pub default_settle_coins: Vec<String>,
}

impl VenueConfig {
    /// Parsed default category; linear if the value is unknown.
    #[must_use]
    pub fn category(&self) -> MarketCategory {
        self.default_category.parse().unwrap_or(MarketCategory::Linear)
    }
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            account: default_account(),
            default_category: default_category(),
            default_settle_coins: default_settle_coins(),
        }
    }
}

fn default_account() -> String {
    "default".to_string()
}

fn default_category() -> String {
    "linear".to_string()
}

fn default_settle_coins() -> Vec<String> {
    vec!["USDT".to_string(), "USDC".to_string()]
}
