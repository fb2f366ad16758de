//! Venue-neutral trading intents and option bags.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::market::MarketCategory;
use super::value_objects::{OrderSide, OrderType, TimeInForce};

/// An order the caller wants placed or amended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    /// Unified symbol.
    pub symbol: String,
    /// Abstract order type.
    pub order_type: OrderType,
    /// Side.
    pub side: OrderSide,
    /// Base-denominated quantity.
    pub amount: Decimal,
    /// Limit price.
    pub price: Option<Decimal>,
    /// Optional fields.
    pub options: OrderOptions,
}

impl OrderIntent {
    /// Create an intent with empty options.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        order_type: OrderType,
        side: OrderSide,
        amount: Decimal,
        price: Option<Decimal>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            order_type,
            side,
            amount,
            price,
            options: OrderOptions::default(),
        }
    }

    /// Replace the option bag.
    #[must_use]
    pub fn with_options(mut self, options: OrderOptions) -> Self {
        self.options = options;
        self
    }
}

/// Recognized order options.
///
/// Fields map one-to-one onto venue request fields; the category rule table
/// decides which of them a market accepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderOptions {
    /// Conditional trigger price.
    pub trigger_price: Option<Decimal>,
    /// Explicit trigger direction (1 rising, 2 falling).
    pub trigger_direction: Option<u8>,
    /// Trigger price source (`LastPrice`, `MarkPrice`, `IndexPrice`).
    pub trigger_by: Option<String>,
    /// Attached stop-loss trigger.
    pub stop_loss_price: Option<Decimal>,
    /// Attached take-profit trigger.
    pub take_profit_price: Option<Decimal>,
    /// Limit price for the take-profit leg.
    pub tp_limit_price: Option<Decimal>,
    /// Limit price for the stop-loss leg.
    pub sl_limit_price: Option<Decimal>,
    /// `Market` or `Limit` for the take-profit leg.
    pub tp_order_type: Option<String>,
    /// `Market` or `Limit` for the stop-loss leg.
    pub sl_order_type: Option<String>,
    /// Take-profit trigger source.
    pub tp_trigger_by: Option<String>,
    /// Stop-loss trigger source.
    pub sl_trigger_by: Option<String>,
    /// `Full` or `Partial`.
    pub tpsl_mode: Option<String>,
    /// Time in force.
    pub time_in_force: Option<TimeInForce>,
    /// Maker only.
    pub post_only: bool,
    /// Only reduce an existing position.
    pub reduce_only: bool,
    /// Close the whole position.
    pub close_position: bool,
    /// Close-on-trigger flag for conditional contract orders.
    pub close_on_trigger: bool,
    /// Abstract position side (`long`, `short`, `net`, `both`).
    pub position_side: Option<String>,
    /// Explicit venue position index; wins over `position_side`.
    pub position_idx: Option<u8>,
    /// Trailing distance.
    pub trailing_delta: Option<Decimal>,
    /// Trailing activation price.
    pub activation_price: Option<Decimal>,
    /// Percent callback rate (not supported by the venue).
    pub callback_rate: Option<Decimal>,
    /// Client order id (`orderLinkId`).
    pub client_order_id: Option<String>,
    /// Quote-denominated size for spot market orders.
    pub cost: Option<Decimal>,
    /// Spot order filter (`Order`, `tpslOrder`, `StopOrder`).
    pub order_filter: Option<String>,
    /// Spot margin borrowing.
    pub is_leverage: Option<bool>,
    /// Market maker protection (options).
    pub mmp: Option<bool>,
    /// Implied volatility price (options).
    pub order_iv: Option<Decimal>,
    /// Best bid/offer side type (contracts).
    pub bbo_side_type: Option<String>,
    /// Best bid/offer level 1-5 (contracts).
    pub bbo_level: Option<u8>,
    /// `TickSize` or `Percent`.
    pub slippage_tolerance_type: Option<String>,
    /// Slippage tolerance value.
    pub slippage_tolerance: Option<Decimal>,
    /// Self-match prevention type.
    pub smp_type: Option<String>,
}

impl OrderOptions {
    /// Set the trigger price.
    #[must_use]
    pub const fn with_trigger_price(mut self, price: Decimal) -> Self {
        self.trigger_price = Some(price);
        self
    }

    /// Set the stop-loss price.
    #[must_use]
    pub const fn with_stop_loss(mut self, price: Decimal) -> Self {
        self.stop_loss_price = Some(price);
        self
    }

    /// Set the take-profit price.
    #[must_use]
    pub const fn with_take_profit(mut self, price: Decimal) -> Self {
        self.take_profit_price = Some(price);
        self
    }

    /// Mark reduce-only.
    #[must_use]
    pub const fn reduce_only(mut self) -> Self {
        self.reduce_only = true;
        self
    }

    /// Set the client order id.
    #[must_use]
    pub fn with_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.client_order_id = Some(id.into());
        self
    }
}

/// Direction in which the history fetcher walks sub-windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowDirection {
    /// Most recent window first, walking backward.
    EndToStart,
    /// Oldest window first, walking forward. Requires `since`.
    StartToEnd,
}

/// Options recognized by list, cancel and lookup operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Category when no symbol is given.
    pub category: Option<MarketCategory>,
    /// Settle coin filter for contract queries without a symbol.
    pub settle_coin: Option<String>,
    /// Several settle coins, queried one after another.
    pub settle_coins: Vec<String>,
    /// Upper bound of the time range (ms).
    pub until: Option<i64>,
    /// Explicit sub-window length (ms).
    pub loop_interval: Option<i64>,
    /// Sub-window walking direction.
    pub direction: Option<WindowDirection>,
    /// Clamp or split ranges wider than the venue window.
    pub auto_clip: Option<bool>,
    /// Resume pagination from this cursor.
    pub after_cursor: Option<String>,
    /// Ask the transport to bypass its cache.
    pub no_cache: bool,
    /// Client order id for lookups and cancels.
    pub client_order_id: Option<String>,
    /// Target conditional (trigger) orders.
    pub trigger: bool,
    /// Transaction-log type filter.
    pub income_type: Option<String>,
    /// Transaction-log currency filter.
    pub currency: Option<String>,
}

impl QueryOptions {
    /// Set the category.
    #[must_use]
    pub const fn with_category(mut self, category: MarketCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Set the upper time bound.
    #[must_use]
    pub const fn with_until(mut self, until: i64) -> Self {
        self.until = Some(until);
        self
    }

    /// Set an explicit sub-window length.
    #[must_use]
    pub const fn with_loop_interval(mut self, interval_ms: i64) -> Self {
        self.loop_interval = Some(interval_ms);
        self
    }

    /// Enable auto-clipping.
    #[must_use]
    pub const fn with_auto_clip(mut self) -> Self {
        self.auto_clip = Some(true);
        self
    }

    /// Settle coins to iterate, explicit list first.
    #[must_use]
    pub fn requested_settle_coins(&self) -> Vec<String> {
        if !self.settle_coins.is_empty() {
            return self.settle_coins.clone();
        }
        self.settle_coin.iter().cloned().collect()
    }
}
