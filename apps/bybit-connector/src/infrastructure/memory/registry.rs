//! In-memory market and account registries.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::application::ports::{AccountRegistryPort, MarketRegistryPort};
use crate::domain::leverage::LeverageCache;
use crate::domain::market::{MarketCategory, MarketDescriptor};
use crate::error::ConnectorError;

#[derive(Debug, Default)]
struct Markets {
    by_symbol: HashMap<String, MarketDescriptor>,
    by_venue_id: HashMap<(MarketCategory, String), String>,
}

/// Market registry backed by hash maps.
///
/// Markets are added up front by whatever loads venue metadata; lookups never
/// reach the network.
#[derive(Debug, Default)]
pub struct InMemoryMarketRegistry {
    markets: RwLock<Markets>,
    currencies: RwLock<HashMap<String, String>>,
}

impl InMemoryMarketRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the given markets.
    #[must_use]
    pub fn with_markets(markets: impl IntoIterator<Item = MarketDescriptor>) -> Self {
        let registry = Self::new();
        for market in markets {
            registry.add(market);
        }
        registry
    }

    /// Add or replace a market.
    pub fn add(&self, market: MarketDescriptor) {
        let mut markets = self.markets.write().unwrap_or_else(PoisonError::into_inner);
        markets
            .by_venue_id
            .insert((market.category, market.id.clone()), market.symbol.clone());
        markets.by_symbol.insert(market.symbol.clone(), market);
    }

    /// Map a venue coin code to a unified code (e.g. `XBT` to `BTC`).
    pub fn add_currency(&self, venue_code: impl Into<String>, code: impl Into<String>) {
        self.currencies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(venue_code.into(), code.into());
    }

    /// Number of markets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_symbol
            .len()
    }

    /// Whether no market is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MarketRegistryPort for InMemoryMarketRegistry {
    fn market_for(&self, symbol: &str) -> Result<MarketDescriptor, ConnectorError> {
        self.markets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_symbol
            .get(symbol)
            .cloned()
            .ok_or_else(|| {
                ConnectorError::parameter_invalid("symbol", format!("unknown market '{symbol}'"))
                    .with_context("symbol", symbol)
            })
    }

    fn symbol_for(&self, venue_id: &str, category: MarketCategory) -> Option<String> {
        self.markets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_venue_id
            .get(&(category, venue_id.to_string()))
            .cloned()
    }

    fn currency_code_for(&self, venue_code: &str) -> String {
        self.currencies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(venue_code)
            .cloned()
            .unwrap_or_else(|| venue_code.to_ascii_uppercase())
    }
}

/// Leverage caches keyed by account name, created on first use.
#[derive(Debug, Default)]
pub struct InMemoryAccountRegistry {
    caches: RwLock<HashMap<String, Arc<LeverageCache>>>,
}

impl InMemoryAccountRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountRegistryPort for InMemoryAccountRegistry {
    fn leverage_cache(&self, account: &str) -> Arc<LeverageCache> {
        if let Some(cache) = self
            .caches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(account)
        {
            return Arc::clone(cache);
        }
        let mut caches = self.caches.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(caches.entry(account.to_string()).or_default())
    }
}
