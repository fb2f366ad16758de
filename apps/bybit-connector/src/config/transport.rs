//! Retry budgets handed to the transport.

use serde::{Deserialize, Serialize};

/// Transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Retries for read-only calls.
    #[serde(default = "default_read_retries")]
    pub read_retries: u32,
    /// Retries for state-changing calls.
    #[serde(default)]
    pub write_retries: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            read_retries: default_read_retries(),
            write_retries: 0,
        }
    }
}

const fn default_read_retries() -> u32 {
    3
}
