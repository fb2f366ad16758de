//! Order side.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConnectorError;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Buy.
    Buy,
    /// Sell.
    Sell,
}

impl OrderSide {
    /// Venue enum value (`Buy` / `Sell`).
    #[must_use]
    pub const fn as_venue(&self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
        }
    }

    /// Parse the venue enum value. Case-insensitive.
    #[must_use]
    pub fn from_venue(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("buy") {
            Some(Self::Buy)
        } else if value.eq_ignore_ascii_case("sell") {
            Some(Self::Sell)
        } else {
            None
        }
    }

    /// Returns true for buy.
    #[must_use]
    pub const fn is_buy(&self) -> bool {
        matches!(self, Self::Buy)
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Abstract sides are lowercase only.
impl FromStr for OrderSide {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            other => Err(ConnectorError::parameter_invalid(
                "side",
                format!("unknown order side '{other}'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lowercase_sides() {
        assert_eq!("buy".parse::<OrderSide>().unwrap(), OrderSide::Buy);
        assert_eq!("sell".parse::<OrderSide>().unwrap(), OrderSide::Sell);
    }

    #[test]
    fn unknown_side_names_field() {
        let err = "hold".parse::<OrderSide>().unwrap_err();
        assert_eq!(err.context_value("field"), Some("side"));
    }

    #[test]
    fn venue_round_trip() {
        assert_eq!(OrderSide::Buy.as_venue(), "Buy");
        assert_eq!(OrderSide::from_venue("Sell"), Some(OrderSide::Sell));
        assert_eq!(OrderSide::from_venue("None"), None);
    }
}
