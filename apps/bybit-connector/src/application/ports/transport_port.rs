//! Transport Port (Driven Port)
//!
//! Interface for sending one compiled request to the venue. Signing, HTTP,
//! retries and caching live behind this port.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{ConnectorError, ErrorCode};

/// HTTP method of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    /// Query-string request.
    Get,
    /// JSON body request.
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// Venue endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    /// Place an order.
    CreateOrder,
    /// Amend an open order.
    AmendOrder,
    /// Cancel one order.
    CancelOrder,
    /// Cancel all orders of a symbol or settle coin.
    CancelAllOrders,
    /// Open and recently closed orders.
    OpenOrders,
    /// Order history.
    OrderHistory,
    /// Execution list.
    Executions,
    /// Account transaction log.
    TransactionLog,
    /// Position list.
    Positions,
    /// Set leverage.
    SetLeverage,
    /// Position trading stop (TP/SL/trailing).
    TradingStop,
    /// Risk-limit table.
    RiskLimit,
}

impl Endpoint {
    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        match self {
            Self::OpenOrders
            | Self::OrderHistory
            | Self::Executions
            | Self::TransactionLog
            | Self::Positions
            | Self::RiskLimit => HttpMethod::Get,
            Self::CreateOrder
            | Self::AmendOrder
            | Self::CancelOrder
            | Self::CancelAllOrders
            | Self::SetLeverage
            | Self::TradingStop => HttpMethod::Post,
        }
    }

    /// v5 path.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::CreateOrder => "/v5/order/create",
            Self::AmendOrder => "/v5/order/amend",
            Self::CancelOrder => "/v5/order/cancel",
            Self::CancelAllOrders => "/v5/order/cancel-all",
            Self::OpenOrders => "/v5/order/realtime",
            Self::OrderHistory => "/v5/order/history",
            Self::Executions => "/v5/execution/list",
            Self::TransactionLog => "/v5/account/transaction-log",
            Self::Positions => "/v5/position/list",
            Self::SetLeverage => "/v5/position/set-leverage",
            Self::TradingStop => "/v5/position/trading-stop",
            Self::RiskLimit => "/v5/market/risk-limit",
        }
    }

    /// Whether the call changes account state.
    #[must_use]
    pub const fn is_write(&self) -> bool {
        matches!(self.method(), HttpMethod::Post)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

/// A single request parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// String (decimals are always sent as strings).
    Str(String),
    /// Integer.
    Int(i64),
    /// Boolean.
    Bool(bool),
}

impl ParamValue {
    /// String payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer payload, if any.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Boolean payload, if any.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Serialize a decimal as a plain string: no exponent, no trailing zeros.
#[must_use]
pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Request parameters handed to the transport.
///
/// Keys are kept sorted so the same request always serializes identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestParams {
    entries: BTreeMap<String, ParamValue>,
}

impl RequestParams {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a string field.
    pub fn set_str(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.entries.insert(key.to_string(), ParamValue::Str(value.into()));
        self
    }

    /// Set a decimal field as a normalized string.
    pub fn set_decimal(&mut self, key: &str, value: Decimal) -> &mut Self {
        self.set_str(key, format_decimal(value))
    }

    /// Set an integer field.
    pub fn set_int(&mut self, key: &str, value: i64) -> &mut Self {
        self.entries.insert(key.to_string(), ParamValue::Int(value));
        self
    }

    /// Set a boolean field.
    pub fn set_bool(&mut self, key: &str, value: bool) -> &mut Self {
        self.entries.insert(key.to_string(), ParamValue::Bool(value));
        self
    }

    /// Set a string field when present.
    pub fn set_opt_str(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.set_str(key, value);
        }
        self
    }

    /// Look up a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    /// String value of a field.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_str)
    }

    /// Whether a field is set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-call transport options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// How many times the transport may retry.
    pub retries: u32,
    /// Bypass any response cache.
    pub no_cache: bool,
}

/// Transport port error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Connection-level failure.
    #[error("network error: {message}")]
    Network {
        /// Description.
        message: String,
    },

    /// Request timed out or was cancelled.
    #[error("request timed out")]
    Timeout,

    /// The venue answered with a non-zero `retCode`.
    #[error("venue error {code}: {message}")]
    Venue {
        /// Venue `retCode`.
        code: i64,
        /// Venue `retMsg`.
        message: String,
    },
}

impl From<TransportError> for ConnectorError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network { .. } | TransportError::Timeout => {
                Self::transport(err.to_string())
            }
            TransportError::Venue { code, message } => {
                Self::venue(ErrorCode::BusinessRejected, code, message)
            }
        }
    }
}

/// Transport Port - sends one request and returns the raw JSON body.
#[async_trait]
pub trait TransportPort: Send + Sync {
    /// Perform one call.
    async fn call(
        &self,
        endpoint: Endpoint,
        params: &RequestParams,
        options: CallOptions,
    ) -> Result<String, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn format_decimal_strips_trailing_zeros() {
        assert_eq!(format_decimal(dec!(90.000)), "90");
        assert_eq!(format_decimal(dec!(0.0100)), "0.01");
        assert_eq!(format_decimal(dec!(12345.6789)), "12345.6789");
    }

    #[test]
    fn params_are_key_ordered() {
        let mut params = RequestParams::new();
        params.set_str("symbol", "BTCUSDT").set_decimal("qty", dec!(1.50)).set_int("positionIdx", 0);
        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["positionIdx", "qty", "symbol"]);
        assert_eq!(params.get_str("qty"), Some("1.5"));
    }

    #[test]
    fn params_serialize_as_flat_object() {
        let mut params = RequestParams::new();
        params.set_str("side", "Buy").set_bool("reduceOnly", true).set_int("triggerDirection", 1);
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"reduceOnly":true,"side":"Buy","triggerDirection":1}"#);
    }

    #[test]
    fn endpoint_table() {
        assert_eq!(Endpoint::CreateOrder.path(), "/v5/order/create");
        assert_eq!(Endpoint::RiskLimit.method(), HttpMethod::Get);
        assert!(Endpoint::SetLeverage.is_write());
        assert_eq!(Endpoint::Executions.to_string(), "GET /v5/execution/list");
    }

    #[test]
    fn transport_errors_convert() {
        let err: ConnectorError = TransportError::Timeout.into();
        assert_eq!(err.code(), ErrorCode::Transport);
        let err: ConnectorError = TransportError::Venue { code: 10001, message: "bad".into() }.into();
        assert_eq!(err.context_value("ret_code"), Some("10001"));
    }
}
