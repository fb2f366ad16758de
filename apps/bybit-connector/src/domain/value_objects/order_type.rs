//! Abstract order types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConnectorError;

/// Venue-neutral order type.
///
/// The stop and take-profit families are conditional: they only activate once
/// a trigger price is crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderType {
    /// Market order.
    Market,
    /// Limit order.
    Limit,
    /// Post-only limit order.
    LimitMaker,
    /// Stop order; limit when priced, market otherwise.
    Stop,
    /// Stop-loss; limit when priced, market otherwise.
    StopLoss,
    /// Stop order executed at market.
    StopMarket,
    /// Stop-loss executed as a limit order.
    StopLossLimit,
    /// Take-profit; limit when priced, market otherwise.
    TakeProfit,
    /// Take-profit executed at market.
    TakeProfitMarket,
    /// Take-profit executed as a limit order.
    TakeProfitLimit,
    /// Trailing stop executed at market.
    TrailingStopMarket,
}

impl OrderType {
    /// Abstract type name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Limit => "limit",
            Self::LimitMaker => "limitMaker",
            Self::Stop => "stop",
            Self::StopLoss => "stopLoss",
            Self::StopMarket => "stopMarket",
            Self::StopLossLimit => "stopLossLimit",
            Self::TakeProfit => "takeProfit",
            Self::TakeProfitMarket => "takeProfitMarket",
            Self::TakeProfitLimit => "takeProfitLimit",
            Self::TrailingStopMarket => "trailingStopMarket",
        }
    }

    /// Stop or take-profit family.
    #[must_use]
    pub const fn is_conditional(&self) -> bool {
        matches!(
            self,
            Self::Stop
                | Self::StopLoss
                | Self::StopMarket
                | Self::StopLossLimit
                | Self::TakeProfit
                | Self::TakeProfitMarket
                | Self::TakeProfitLimit
        )
    }

    /// Take-profit family.
    #[must_use]
    pub const fn is_take_profit(&self) -> bool {
        matches!(
            self,
            Self::TakeProfit | Self::TakeProfitMarket | Self::TakeProfitLimit
        )
    }

    /// Types that always execute at market.
    #[must_use]
    pub const fn is_market_family(&self) -> bool {
        matches!(
            self,
            Self::Market | Self::StopMarket | Self::TakeProfitMarket | Self::TrailingStopMarket
        )
    }

    /// Types that always rest as a limit order.
    #[must_use]
    pub const fn is_limit_family(&self) -> bool {
        matches!(
            self,
            Self::Limit | Self::LimitMaker | Self::StopLossLimit | Self::TakeProfitLimit
        )
    }

    /// Trailing stop.
    #[must_use]
    pub const fn is_trailing(&self) -> bool {
        matches!(self, Self::TrailingStopMarket)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s {
            "market" => Self::Market,
            "limit" => Self::Limit,
            "limitMaker" => Self::LimitMaker,
            "stop" => Self::Stop,
            "stopLoss" => Self::StopLoss,
            "stopMarket" => Self::StopMarket,
            "stopLossLimit" => Self::StopLossLimit,
            "takeProfit" => Self::TakeProfit,
            "takeProfitMarket" => Self::TakeProfitMarket,
            "takeProfitLimit" => Self::TakeProfitLimit,
            "trailingStopMarket" => Self::TrailingStopMarket,
            other => {
                return Err(ConnectorError::parameter_invalid(
                    "type",
                    format!("unknown order type '{other}'"),
                ));
            }
        };
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families_are_disjoint_where_expected() {
        for t in [
            OrderType::Market,
            OrderType::Limit,
            OrderType::LimitMaker,
            OrderType::Stop,
            OrderType::StopLoss,
            OrderType::StopMarket,
            OrderType::StopLossLimit,
            OrderType::TakeProfit,
            OrderType::TakeProfitMarket,
            OrderType::TakeProfitLimit,
            OrderType::TrailingStopMarket,
        ] {
            assert!(!(t.is_market_family() && t.is_limit_family()), "{t}");
            assert_eq!(t.as_str().parse::<OrderType>().unwrap(), t);
        }
    }

    #[test]
    fn plain_stop_types_are_ambiguous() {
        for t in [OrderType::Stop, OrderType::StopLoss, OrderType::TakeProfit] {
            assert!(!t.is_market_family());
            assert!(!t.is_limit_family());
            assert!(t.is_conditional());
        }
    }

    #[test]
    fn take_profit_family() {
        assert!(OrderType::TakeProfitLimit.is_take_profit());
        assert!(!OrderType::StopLossLimit.is_take_profit());
        assert!(!OrderType::TrailingStopMarket.is_conditional());
    }

    #[test]
    fn unknown_type_rejected() {
        assert!("iceberg".parse::<OrderType>().is_err());
    }
}
