//! History query configuration.

use serde::{Deserialize, Serialize};

use crate::application::history::MAX_WINDOW_MS;

/// Windowed history configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Widest time range one request may cover (ms).
    #[serde(default = "default_max_window_ms")]
    pub max_window_ms: i64,
    /// Split over-wide ranges instead of rejecting them when the caller
    /// does not say.
    #[serde(default)]
    pub auto_clip: bool,
    /// Page sizes per endpoint.
    #[serde(default)]
    pub page_sizes: PageSizesConfig,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_window_ms: default_max_window_ms(),
            auto_clip: false,
            page_sizes: PageSizesConfig::default(),
        }
    }
}

/// `limit` sent to each paginated endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSizesConfig {
    /// `/v5/order/realtime` and `/v5/order/history` (venue cap 50).
    #[serde(default = "default_orders")]
    pub orders: u32,
    /// `/v5/execution/list` (venue cap 100).
    #[serde(default = "default_executions")]
    pub executions: u32,
    /// `/v5/account/transaction-log` (venue cap 50).
    #[serde(default = "default_transaction_log")]
    pub transaction_log: u32,
    /// `/v5/position/list` (venue cap 200).
    #[serde(default = "default_positions")]
    pub positions: u32,
}

impl PageSizesConfig {
    /// Venue caps, in field order.
    pub(crate) const CAPS: [(&'static str, u32); 4] = [
        ("orders", 50),
        ("executions", 100),
        ("transaction_log", 50),
        ("positions", 200),
    ];

    pub(crate) const fn values(&self) -> [u32; 4] {
        [
            self.orders,
            self.executions,
            self.transaction_log,
            self.positions,
        ]
    }
}

impl Default for PageSizesConfig {
    fn default() -> Self {
        Self {
            orders: default_orders(),
            executions: default_executions(),
            transaction_log: default_transaction_log(),
            positions: default_positions(),
        }
    }
}

const fn default_max_window_ms() -> i64 {
    MAX_WINDOW_MS
}

const fn default_orders() -> u32 {
    50
}

const fn default_executions() -> u32 {
    100
}

const fn default_transaction_log() -> u32 {
    50
}

const fn default_positions() -> u32 {
    200
}
