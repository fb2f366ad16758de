//! Market Registry Port (Driven Port)
//!
//! Read-only lookup of market metadata loaded elsewhere.

use crate::domain::market::{MarketCategory, MarketDescriptor};
use crate::error::ConnectorError;

/// Market Registry Port.
pub trait MarketRegistryPort: Send + Sync {
    /// Descriptor for a unified symbol.
    fn market_for(&self, symbol: &str) -> Result<MarketDescriptor, ConnectorError>;

    /// Unified symbol for a venue id within a category.
    fn symbol_for(&self, venue_id: &str, category: MarketCategory) -> Option<String>;

    /// Unified currency code for a venue coin code.
    fn currency_code_for(&self, venue_code: &str) -> String;
}
