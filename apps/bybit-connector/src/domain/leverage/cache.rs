//! Per-account current-leverage cache.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Last known leverage multiple per symbol for one account.
#[derive(Debug, Default)]
pub struct LeverageCache {
    entries: Mutex<HashMap<String, u32>>,
}

impl LeverageCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached leverage for a symbol.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<u32> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(symbol)
            .copied()
    }

    /// Record the leverage for a symbol.
    pub fn set(&self, symbol: impl Into<String>, leverage: u32) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(symbol.into(), leverage);
    }

    /// Drop the cached value for a symbol.
    pub fn invalidate(&self, symbol: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(symbol);
    }

    /// Number of cached symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let cache = LeverageCache::new();
        assert!(cache.is_empty());
        cache.set("BTC/USDT:USDT", 10);
        assert_eq!(cache.get("BTC/USDT:USDT"), Some(10));
        cache.set("BTC/USDT:USDT", 25);
        assert_eq!(cache.get("BTC/USDT:USDT"), Some(25));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_removes_entry() {
        let cache = LeverageCache::new();
        cache.set("A", 3);
        cache.invalidate("A");
        assert_eq!(cache.get("A"), None);
    }
}
