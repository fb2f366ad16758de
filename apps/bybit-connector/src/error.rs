//! Rich error handling for the connector.
//!
//! Errors fall into three tiers:
//!
//! | Tier | Codes | Raised by |
//! |------|-------|-----------|
//! | Pre-flight validation | `PARAMETER_MISSING`, `PARAMETER_INVALID`, `NOT_SUPPORTED` | Parameter compiler, before any network call |
//! | Venue business errors | `UNAUTHORIZED`, `NOT_FOUND`, `UNSUPPORTED_MARKET`, `INSUFFICIENT_FUNDS`, `BUSINESS_REJECTED`, `RATE_LIMITED`, `TIME_RANGE_EXCEEDED` | `retCode` classification |
//! | Data integrity | `DATA_NOT_FOUND`, `UNMARSHAL_FAILED` | Decoders and ladder lookups |
//!
//! Every error carries key/value context naming the offending field, symbol,
//! endpoint or venue code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for the connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Pre-flight validation
    /// A required parameter was not supplied.
    ParameterMissing,
    /// A parameter is malformed, out of range, conflicting, or forbidden
    /// for the market category.
    ParameterInvalid,
    /// The requested feature is not supported by the venue.
    NotSupported,

    // Venue business errors
    /// Credentials rejected or permission denied.
    Unauthorized,
    /// The venue does not know the referenced order or resource.
    NotFound,
    /// The market or category cannot serve this request.
    UnsupportedMarket,
    /// Insufficient balance or margin.
    InsufficientFunds,
    /// Any other business rejection (no trade, order rejected, ...).
    BusinessRejected,
    /// Request rate exceeded.
    RateLimited,
    /// The query time range exceeds the venue window.
    TimeRangeExceeded,

    // Data integrity
    /// An empty result where one must exist.
    DataNotFound,
    /// A venue payload could not be decoded.
    UnmarshalFailed,

    // Transport
    /// Network failure or timeout reported by the transport.
    Transport,
}

impl ErrorCode {
    /// Get the stable reason string for this code.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::ParameterMissing => "PARAMETER_MISSING",
            Self::ParameterInvalid => "PARAMETER_INVALID",
            Self::NotSupported => "NOT_SUPPORTED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NotFound => "NOT_FOUND",
            Self::UnsupportedMarket => "UNSUPPORTED_MARKET",
            Self::InsufficientFunds => "INSUFFICIENT_FUNDS",
            Self::BusinessRejected => "BUSINESS_REJECTED",
            Self::RateLimited => "RATE_LIMITED",
            Self::TimeRangeExceeded => "TIME_RANGE_EXCEEDED",
            Self::DataNotFound => "DATA_NOT_FOUND",
            Self::UnmarshalFailed => "UNMARSHAL_FAILED",
            Self::Transport => "TRANSPORT",
        }
    }

    /// Returns true for pre-flight validation codes.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ParameterMissing | Self::ParameterInvalid | Self::NotSupported
        )
    }

    /// Returns true if retrying the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Transport)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// A rich error with context for the connector.
#[derive(Debug, Clone, Error)]
pub struct ConnectorError {
    /// Error code.
    code: ErrorCode,
    /// Human-readable message.
    message: String,
    /// Additional context (key-value pairs).
    context: Vec<(String, String)>,
}

impl ConnectorError {
    /// Create a new connector error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    /// Add context to the error.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }

    /// Get the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the context.
    #[must_use]
    pub fn context(&self) -> &[(String, String)] {
        &self.context
    }

    /// Look up a context value by key.
    #[must_use]
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl std::fmt::Display for ConnectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.reason(), self.message)
    }
}

/// Convenience constructors for common errors.
impl ConnectorError {
    /// A required parameter is missing.
    #[must_use]
    pub fn parameter_missing(field: &str) -> Self {
        Self::new(
            ErrorCode::ParameterMissing,
            format!("{field} is required"),
        )
        .with_context("field", field)
    }

    /// A parameter is invalid.
    #[must_use]
    pub fn parameter_invalid(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParameterInvalid, message).with_context("field", field)
    }

    /// Two parameters cannot be combined.
    #[must_use]
    pub fn parameter_conflict(field: &str, other: &str) -> Self {
        Self::new(
            ErrorCode::ParameterInvalid,
            format!("{field} cannot be combined with {other}"),
        )
        .with_context("field", field)
        .with_context("conflicts_with", other)
    }

    /// Unsupported feature.
    #[must_use]
    pub fn not_supported(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotSupported, message).with_context("field", field)
    }

    /// Market cannot serve the request.
    #[must_use]
    pub fn unsupported_market(symbol: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnsupportedMarket, message).with_context("symbol", symbol)
    }

    /// A result that must exist is empty.
    #[must_use]
    pub fn data_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DataNotFound, message)
    }

    /// A venue payload failed to decode.
    #[must_use]
    pub fn unmarshal(what: &str, err: &serde_json::Error) -> Self {
        Self::new(
            ErrorCode::UnmarshalFailed,
            format!("failed to decode {what}: {err}"),
        )
        .with_context("payload", what)
    }

    /// Venue returned a coded failure, already classified.
    #[must_use]
    pub fn venue(code: ErrorCode, ret_code: i64, message: impl Into<String>) -> Self {
        Self::new(code, message).with_context("ret_code", ret_code.to_string())
    }

    /// Transport-level failure.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Transport, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_predicates() {
        assert!(ErrorCode::ParameterMissing.is_validation());
        assert!(ErrorCode::NotSupported.is_validation());
        assert!(!ErrorCode::NotFound.is_validation());
        assert!(ErrorCode::RateLimited.is_retryable());
        assert!(!ErrorCode::ParameterInvalid.is_retryable());
    }

    #[test]
    fn test_parameter_missing_names_field() {
        let error = ConnectorError::parameter_missing("price");
        assert_eq!(error.code(), ErrorCode::ParameterMissing);
        assert_eq!(error.context_value("field"), Some("price"));
        assert_eq!(error.to_string(), "[PARAMETER_MISSING] price is required");
    }

    #[test]
    fn test_conflict_carries_both_fields() {
        let error = ConnectorError::parameter_conflict("reduceOnly", "takeProfit");
        assert_eq!(error.code(), ErrorCode::ParameterInvalid);
        assert_eq!(error.context_value("conflicts_with"), Some("takeProfit"));
    }

    #[test]
    fn test_unmarshal_includes_parse_error() {
        let err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let error = ConnectorError::unmarshal("order list", &err);
        assert_eq!(error.code(), ErrorCode::UnmarshalFailed);
        assert!(error.message().contains("order list"));
        assert!(error.message().contains("key must be a string"));
    }

    #[test]
    fn test_error_code_serde() {
        let json = serde_json::to_string(&ErrorCode::TimeRangeExceeded).unwrap();
        assert_eq!(json, "\"TIME_RANGE_EXCEEDED\"");
    }
}
