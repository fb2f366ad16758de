//! Precision Port (Driven Port)
//!
//! Rounds prices and quantities to a market's tick and step sizes.

use rust_decimal::Decimal;

use crate::domain::market::MarketDescriptor;

/// Precision Port.
pub trait PrecisionPort: Send + Sync {
    /// Round a price to the market's tick size.
    fn round_price(&self, market: &MarketDescriptor, value: Decimal) -> Decimal;

    /// Round a base quantity to the market's step size.
    fn round_amount(&self, market: &MarketDescriptor, value: Decimal) -> Decimal;

    /// Round a quote-denominated cost.
    fn round_cost(&self, market: &MarketDescriptor, value: Decimal) -> Decimal;
}
