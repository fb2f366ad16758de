//! Bybit v5 response types.
//!
//! One explicit struct per record shape. Bybit sends numbers as strings and
//! uses `""` for "not set", so numeric fields go through the lenient
//! deserializers at the bottom of this file.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::ConnectorError;

// ============================================================================
// Envelope
// ============================================================================

/// Common response wrapper: `{retCode, retMsg, result, time}`.
///
/// `result` is kept raw until `retCode` has been checked, because failed
/// responses carry `{}` there.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Venue status code; 0 is success.
    pub ret_code: i64,
    /// Venue status message.
    #[serde(default)]
    pub ret_msg: String,
    /// Endpoint-specific payload.
    #[serde(default)]
    pub result: serde_json::Value,
    /// Server time (ms).
    #[serde(default, deserialize_with = "opt_i64")]
    pub time: Option<i64>,
}

impl Envelope {
    /// Decode the raw response body.
    pub fn parse(body: &str) -> Result<Self, ConnectorError> {
        serde_json::from_str(body).map_err(|e| ConnectorError::unmarshal("response envelope", &e))
    }

    /// Whether the venue reported success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.ret_code == 0
    }

    /// Decode `result` into a typed shape.
    pub fn decode<T: DeserializeOwned>(&self, what: &str) -> Result<T, ConnectorError> {
        let value = if self.result.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            self.result.clone()
        };
        serde_json::from_value(value).map_err(|e| ConnectorError::unmarshal(what, &e))
    }
}

/// Paginated list result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult<T> {
    /// Category echoed by the venue.
    #[serde(default)]
    pub category: Option<String>,
    /// Records.
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
    /// Cursor of the next page; empty when exhausted.
    #[serde(default)]
    pub next_page_cursor: Option<String>,
}

// ============================================================================
// Order Types
// ============================================================================

/// Record of `/v5/order/realtime` and `/v5/order/history`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderRecord {
    /// Venue order id.
    pub order_id: String,
    /// Client order id.
    pub order_link_id: String,
    /// Venue symbol.
    pub symbol: String,
    /// Limit price.
    #[serde(deserialize_with = "opt_decimal")]
    pub price: Option<Decimal>,
    /// Order quantity.
    #[serde(deserialize_with = "opt_decimal")]
    pub qty: Option<Decimal>,
    /// `Buy` or `Sell`.
    pub side: String,
    /// Order status.
    pub order_status: String,
    /// `Market` or `Limit`.
    pub order_type: String,
    /// Conditional tag (`TakeProfit`, `StopLoss`, `TrailingStop`, `Stop`, ...).
    pub stop_order_type: String,
    /// Time in force.
    pub time_in_force: String,
    /// Average fill price.
    #[serde(deserialize_with = "opt_decimal")]
    pub avg_price: Option<Decimal>,
    /// Unfilled quantity.
    #[serde(deserialize_with = "opt_decimal")]
    pub leaves_qty: Option<Decimal>,
    /// Filled quantity.
    #[serde(deserialize_with = "opt_decimal")]
    pub cum_exec_qty: Option<Decimal>,
    /// Filled value.
    #[serde(deserialize_with = "opt_decimal")]
    pub cum_exec_value: Option<Decimal>,
    /// Cumulative fee.
    #[serde(deserialize_with = "opt_decimal")]
    pub cum_exec_fee: Option<Decimal>,
    /// Per-currency fee breakdown.
    #[serde(deserialize_with = "decimal_map")]
    pub cum_fee_detail: BTreeMap<String, Decimal>,
    /// Fee currency (spot).
    pub fee_currency: String,
    /// Trigger price.
    #[serde(deserialize_with = "opt_decimal")]
    pub trigger_price: Option<Decimal>,
    /// Attached take-profit.
    #[serde(deserialize_with = "opt_decimal")]
    pub take_profit: Option<Decimal>,
    /// Attached stop-loss.
    #[serde(deserialize_with = "opt_decimal")]
    pub stop_loss: Option<Decimal>,
    /// Reduce only.
    pub reduce_only: bool,
    /// Position index.
    #[serde(deserialize_with = "opt_i64")]
    pub position_idx: Option<i64>,
    /// Creation time (ms).
    #[serde(deserialize_with = "opt_i64")]
    pub created_time: Option<i64>,
    /// Update time (ms).
    #[serde(deserialize_with = "opt_i64")]
    pub updated_time: Option<i64>,
}

/// Result of create, amend and cancel.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderIdResult {
    /// Venue order id.
    pub order_id: String,
    /// Client order id.
    pub order_link_id: String,
}

// ============================================================================
// Execution Types
// ============================================================================

/// Record of `/v5/execution/list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutionRecord {
    /// Execution id.
    pub exec_id: String,
    /// Parent order id.
    pub order_id: String,
    /// Parent client order id.
    pub order_link_id: String,
    /// Venue symbol.
    pub symbol: String,
    /// `Buy` or `Sell`.
    pub side: String,
    /// Parent order type.
    pub order_type: String,
    /// Parent conditional tag.
    pub stop_order_type: String,
    /// Execution price.
    #[serde(deserialize_with = "opt_decimal")]
    pub exec_price: Option<Decimal>,
    /// Executed quantity.
    #[serde(deserialize_with = "opt_decimal")]
    pub exec_qty: Option<Decimal>,
    /// Executed value.
    #[serde(deserialize_with = "opt_decimal")]
    pub exec_value: Option<Decimal>,
    /// Execution fee.
    #[serde(deserialize_with = "opt_decimal")]
    pub exec_fee: Option<Decimal>,
    /// Fee currency.
    pub fee_currency: String,
    /// Parent order quantity.
    #[serde(deserialize_with = "opt_decimal")]
    pub order_qty: Option<Decimal>,
    /// Parent order unfilled quantity.
    #[serde(deserialize_with = "opt_decimal")]
    pub leaves_qty: Option<Decimal>,
    /// Maker flag.
    pub is_maker: Option<bool>,
    /// Execution time (ms).
    #[serde(deserialize_with = "opt_i64")]
    pub exec_time: Option<i64>,
}

// ============================================================================
// Account Types
// ============================================================================

/// Record of `/v5/account/transaction-log`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionLogRecord {
    /// Transaction id.
    pub id: String,
    /// Venue symbol; empty for account-level entries.
    pub symbol: String,
    /// Category of the symbol.
    pub category: String,
    /// Transaction type (`TRADE`, `SETTLEMENT`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Balance change.
    #[serde(deserialize_with = "opt_decimal")]
    pub change: Option<Decimal>,
    /// Venue coin code.
    pub currency: String,
    /// Transaction time (ms).
    #[serde(deserialize_with = "opt_i64")]
    pub transaction_time: Option<i64>,
    /// Related trade id.
    pub trade_id: String,
}

// ============================================================================
// Position Types
// ============================================================================

/// Record of `/v5/position/list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionRecord {
    /// Venue symbol.
    pub symbol: String,
    /// `Buy`, `Sell` or empty when flat.
    pub side: String,
    /// Position size.
    #[serde(deserialize_with = "opt_decimal")]
    pub size: Option<Decimal>,
    /// Entry price.
    #[serde(deserialize_with = "opt_decimal")]
    pub avg_price: Option<Decimal>,
    /// Position value.
    #[serde(deserialize_with = "opt_decimal")]
    pub position_value: Option<Decimal>,
    /// Leverage.
    #[serde(deserialize_with = "opt_decimal")]
    pub leverage: Option<Decimal>,
    /// Mark price.
    #[serde(deserialize_with = "opt_decimal")]
    pub mark_price: Option<Decimal>,
    /// Liquidation price.
    #[serde(deserialize_with = "opt_decimal")]
    pub liq_price: Option<Decimal>,
    /// Unrealized PnL.
    #[serde(deserialize_with = "opt_decimal")]
    pub unrealised_pnl: Option<Decimal>,
    /// Position index.
    #[serde(deserialize_with = "opt_i64")]
    pub position_idx: Option<i64>,
    /// Creation time (ms).
    #[serde(deserialize_with = "opt_i64")]
    pub created_time: Option<i64>,
    /// Update time (ms).
    #[serde(deserialize_with = "opt_i64")]
    pub updated_time: Option<i64>,
}

// ============================================================================
// Market Types
// ============================================================================

/// Record of `/v5/market/risk-limit`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskLimitRecord {
    /// Tier id.
    #[serde(deserialize_with = "opt_i64")]
    pub id: Option<i64>,
    /// Venue symbol.
    pub symbol: String,
    /// Tier notional capacity.
    #[serde(deserialize_with = "opt_decimal")]
    pub risk_limit_value: Option<Decimal>,
    /// Maintenance margin rate as a fraction.
    #[serde(deserialize_with = "opt_decimal")]
    pub maintenance_margin: Option<Decimal>,
    /// Maximum leverage of the tier.
    #[serde(deserialize_with = "opt_decimal")]
    pub max_leverage: Option<Decimal>,
}

// ============================================================================
// Lenient Deserializers
// ============================================================================

/// Decimal from a string, a JSON number, `""` or `null`.
fn opt_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    value_to_decimal(value.as_ref()).map_err(serde::de::Error::custom)
}

fn value_to_decimal(value: Option<&serde_json::Value>) -> Result<Option<Decimal>, String> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(s.trim()))
            .map(Some)
            .map_err(|e| format!("invalid decimal '{s}': {e}")),
        Some(serde_json::Value::Number(n)) => n
            .to_string()
            .parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .map(Some)
            .map_err(|e| format!("invalid decimal {n}: {e}")),
        Some(other) => Err(format!("expected a decimal, got {other}")),
    }
}

/// Integer from a string, a JSON number, `""` or `null`.
fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid integer '{s}': {e}"))),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("integer out of range: {n}"))),
        Some(other) => Err(D::Error::custom(format!("expected an integer, got {other}"))),
    }
}

/// `{"BTC": "0.001", ...}` with lenient values; unset values are dropped.
fn decimal_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
    let mut out = BTreeMap::new();
    for (currency, value) in raw.unwrap_or_default() {
        if let Some(amount) = value_to_decimal(Some(&value)).map_err(serde::de::Error::custom)? {
            out.insert(currency, amount);
        }
    }
    Ok(out)
}
