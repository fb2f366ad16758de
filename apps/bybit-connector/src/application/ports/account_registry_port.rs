//! Account Registry Port (Driven Port)
//!
//! Resolves an account name to its leverage-cache storage.

use std::sync::Arc;

use crate::domain::leverage::LeverageCache;

/// Account Registry Port.
pub trait AccountRegistryPort: Send + Sync {
    /// Leverage cache of the named account, created on first use.
    fn leverage_cache(&self, account: &str) -> Arc<LeverageCache>;
}
