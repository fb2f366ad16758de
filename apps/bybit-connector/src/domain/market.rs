//! Market descriptor supplied by the market registry.
//!
//! Descriptors are owned by the registry and only read here.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConnectorError;

/// Venue market category. Determines which request fields are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketCategory {
    /// Spot pairs.
    Spot,
    /// Linear (USDT/USDC settled) contracts.
    Linear,
    /// Inverse (coin settled) contracts.
    Inverse,
    /// Options.
    Option,
}

impl MarketCategory {
    /// Wire string for the `category` request field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Spot => "spot",
            Self::Linear => "linear",
            Self::Inverse => "inverse",
            Self::Option => "option",
        }
    }

    /// Linear or inverse contract.
    #[must_use]
    pub const fn is_contract(&self) -> bool {
        matches!(self, Self::Linear | Self::Inverse)
    }

    /// Resolve the category from registry flags.
    ///
    /// Exactly one flag must be set.
    pub fn from_flags(
        spot: bool,
        linear: bool,
        inverse: bool,
        option: bool,
    ) -> Result<Self, ConnectorError> {
        match (spot, linear, inverse, option) {
            (true, false, false, false) => Ok(Self::Spot),
            (false, true, false, false) => Ok(Self::Linear),
            (false, false, true, false) => Ok(Self::Inverse),
            (false, false, false, true) => Ok(Self::Option),
            _ => Err(ConnectorError::parameter_invalid(
                "category",
                "market must carry exactly one category flag",
            )),
        }
    }
}

impl fmt::Display for MarketCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketCategory {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spot" => Ok(Self::Spot),
            "linear" => Ok(Self::Linear),
            "inverse" => Ok(Self::Inverse),
            "option" => Ok(Self::Option),
            other => Err(ConnectorError::parameter_invalid(
                "category",
                format!("unknown market category '{other}'"),
            )),
        }
    }
}

/// Tick and step sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketPrecision {
    /// Price tick size.
    pub price: Decimal,
    /// Quantity step size.
    pub amount: Decimal,
    /// Quote-denominated step for cost-sized spot market orders.
    pub cost: Option<Decimal>,
}

impl Default for MarketPrecision {
    fn default() -> Self {
        Self {
            price: Decimal::new(1, 8),
            amount: Decimal::new(1, 8),
            cost: None,
        }
    }
}

/// Order size limits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketLimits {
    /// Minimum order quantity.
    pub min_amount: Option<Decimal>,
    /// Maximum order quantity.
    pub max_amount: Option<Decimal>,
    /// Minimum order value.
    pub min_cost: Option<Decimal>,
}

/// Read-only market metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDescriptor {
    /// Unified symbol (e.g. `BTC/USDT:USDT`).
    pub symbol: String,
    /// Venue symbol id (e.g. `BTCUSDT`).
    pub id: String,
    /// Market category.
    pub category: MarketCategory,
    /// Base currency code.
    pub base: String,
    /// Quote currency code.
    pub quote: String,
    /// Settle currency code (contracts and options).
    pub settle: Option<String>,
    /// Tick and step sizes.
    pub precision: MarketPrecision,
    /// Size limits.
    pub limits: MarketLimits,
}

impl MarketDescriptor {
    /// Create a descriptor with default precision and no limits.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        id: impl Into<String>,
        category: MarketCategory,
        base: impl Into<String>,
        quote: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            id: id.into(),
            category,
            base: base.into(),
            quote: quote.into(),
            settle: None,
            precision: MarketPrecision::default(),
            limits: MarketLimits::default(),
        }
    }

    /// Set the settle currency.
    #[must_use]
    pub fn with_settle(mut self, settle: impl Into<String>) -> Self {
        self.settle = Some(settle.into());
        self
    }

    /// Set tick and step sizes.
    #[must_use]
    pub fn with_precision(mut self, price_tick: Decimal, amount_step: Decimal) -> Self {
        self.precision.price = price_tick;
        self.precision.amount = amount_step;
        self
    }

    /// Set the cost step for quote-sized orders.
    #[must_use]
    pub fn with_cost_precision(mut self, cost_step: Decimal) -> Self {
        self.precision.cost = Some(cost_step);
        self
    }

    /// Convenience accessor.
    #[must_use]
    pub const fn is_spot(&self) -> bool {
        matches!(self.category, MarketCategory::Spot)
    }

    /// Convenience accessor.
    #[must_use]
    pub const fn is_contract(&self) -> bool {
        self.category.is_contract()
    }

    /// Currency that fees are charged in when the venue omits it.
    #[must_use]
    pub fn fee_currency_hint(&self, is_buy: bool) -> &str {
        match (self.category, &self.settle) {
            (MarketCategory::Spot, _) if is_buy => &self.base,
            (MarketCategory::Spot, _) => &self.quote,
            (_, Some(settle)) => settle,
            (_, None) => &self.quote,
        }
    }
}
