//! Normalized records produced by the response parser.
//!
//! All records are immutable value objects built from a single venue record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::value_objects::{OrderSide, OrderStatus, OrderType, PositionSide, TimeInForce};

/// A fee charged in one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    /// Amount charged (negative for rebates).
    pub cost: Decimal,
    /// Currency code.
    pub currency: Option<String>,
}

/// Normalized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedOrder {
    /// Venue order id.
    pub id: String,
    /// Client order id.
    pub client_order_id: Option<String>,
    /// Unified symbol, or the raw venue symbol when it cannot be resolved.
    pub symbol: String,
    /// Reconstructed abstract type.
    pub order_type: Option<OrderType>,
    /// Side.
    pub side: Option<OrderSide>,
    /// Status.
    pub status: OrderStatus,
    /// Time in force.
    pub time_in_force: Option<TimeInForce>,
    /// Hedge-mode leg, derived from the position index.
    pub position_side: Option<PositionSide>,
    /// Limit price.
    pub price: Option<Decimal>,
    /// Average fill price.
    pub average: Option<Decimal>,
    /// Ordered quantity.
    pub amount: Option<Decimal>,
    /// Filled quantity.
    pub filled: Option<Decimal>,
    /// Unfilled quantity.
    pub remaining: Option<Decimal>,
    /// Conditional trigger price.
    pub trigger_price: Option<Decimal>,
    /// Alias of the trigger price for stop semantics.
    pub stop_price: Option<Decimal>,
    /// Attached take-profit.
    pub take_profit_price: Option<Decimal>,
    /// Attached stop-loss.
    pub stop_loss_price: Option<Decimal>,
    /// Filled value in quote.
    pub cost: Option<Decimal>,
    /// Maker only.
    pub post_only: bool,
    /// Reduce only.
    pub reduce_only: bool,
    /// Cumulative fee.
    pub fee: Option<Fee>,
    /// Creation time (ms).
    pub timestamp: Option<i64>,
    /// Last update time (ms).
    pub last_update_timestamp: Option<i64>,
    /// Last fill time (ms); `None` while nothing has filled.
    pub last_trade_timestamp: Option<i64>,
}

impl NormalizedOrder {
    /// Placeholder for an order the venue acknowledged but did not echo.
    #[must_use]
    pub fn acknowledged(id: impl Into<String>, symbol: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: id.into(),
            client_order_id: None,
            symbol: symbol.into(),
            order_type: None,
            side: None,
            status: OrderStatus::Open,
            time_in_force: None,
            position_side: None,
            price: None,
            average: None,
            amount: None,
            filled: None,
            remaining: None,
            trigger_price: None,
            stop_price: None,
            take_profit_price: None,
            stop_loss_price: None,
            cost: None,
            post_only: false,
            reduce_only: false,
            fee: None,
            timestamp: Some(timestamp),
            last_update_timestamp: Some(timestamp),
            last_trade_timestamp: None,
        }
    }
}

/// Normalized execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTrade {
    /// Execution id.
    pub id: String,
    /// Unified or raw symbol.
    pub symbol: String,
    /// Side.
    pub side: Option<OrderSide>,
    /// Reconstructed type of the parent order.
    pub order_type: Option<OrderType>,
    /// Executed quantity.
    pub amount: Decimal,
    /// Execution price.
    pub price: Decimal,
    /// Executed value.
    pub cost: Decimal,
    /// Parent order id.
    pub order_id: Option<String>,
    /// Parent client order id.
    pub client_order_id: Option<String>,
    /// Execution time (ms).
    pub timestamp: Option<i64>,
    /// Maker flag.
    pub is_maker: Option<bool>,
    /// Fee for this execution.
    pub fee: Option<Fee>,
    /// Parent order quantity filled so far.
    pub filled: Option<Decimal>,
    /// Parent order state inferred from quantities.
    pub state: Option<OrderStatus>,
}

/// Normalized transaction-log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedIncome {
    /// Unified or raw symbol; `None` for account-level entries.
    pub symbol: Option<String>,
    /// Normalized income type.
    pub income_type: String,
    /// Signed balance change.
    pub income: Decimal,
    /// Currency code.
    pub asset: String,
    /// Transaction time (ms).
    pub timestamp: Option<i64>,
    /// Venue transaction id.
    pub transaction_id: String,
    /// Related trade id.
    pub trade_id: Option<String>,
}

/// Normalized position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Unified or raw symbol.
    pub symbol: String,
    /// Long or short; `None` when flat.
    pub side: Option<PositionSide>,
    /// Venue position index.
    pub position_idx: u8,
    /// Absolute size.
    pub contracts: Decimal,
    /// Average entry price.
    pub entry_price: Option<Decimal>,
    /// Mark price.
    pub mark_price: Option<Decimal>,
    /// Position value.
    pub notional: Option<Decimal>,
    /// Leverage multiple.
    pub leverage: Option<Decimal>,
    /// Liquidation price.
    pub liquidation_price: Option<Decimal>,
    /// Unrealized profit and loss.
    pub unrealized_pnl: Option<Decimal>,
    /// Creation time (ms).
    pub timestamp: Option<i64>,
    /// Last update time (ms).
    pub last_update_timestamp: Option<i64>,
}
