//! Parameter compiler.
//!
//! Turns venue-neutral intents into Bybit v5 request parameters. Nothing
//! here performs I/O; every validation failure is raised before a request
//! exists.

mod amend;
mod cancel;
mod order;

pub use amend::compile_amend;
pub use cancel::{compile_cancel, compile_cancel_all};
pub use order::compile_create;

use rust_decimal::Decimal;

use super::request::ExitLeg;
use crate::domain::intent::{OrderIntent, OrderOptions};
use crate::domain::value_objects::{
    OrderSide, OrderType, POSITION_IDX_HEDGE_SHORT, POSITION_IDX_ONE_WAY, PositionSide,
};
use crate::error::ConnectorError;

/// Venue `orderType` for an abstract type.
///
/// Plain stop-loss/take-profit types are limit orders when a price is given
/// and market orders otherwise.
#[must_use]
pub fn bybit_order_type_from(order_type: OrderType, price: Option<Decimal>) -> &'static str {
    if order_type.is_market_family() {
        return "Market";
    }
    if order_type.is_limit_family() {
        return "Limit";
    }
    if price.is_some_and(|p| p > Decimal::ZERO) {
        "Limit"
    } else {
        "Market"
    }
}

/// Trigger direction for contract conditionals: 1 fires on a rise, 2 on a fall.
///
/// A buy stop fires on a rise and a sell stop on a fall; take-profits mirror
/// that.
#[must_use]
pub const fn infer_trigger_direction(order_type: OrderType, side: OrderSide) -> u8 {
    match (order_type.is_take_profit(), side.is_buy()) {
        (true, true) | (false, false) => 2,
        (true, false) | (false, true) => 1,
    }
}

/// Resolve `positionIdx`.
///
/// An explicit index is trusted as-is and the position-side hint is ignored.
pub fn resolve_position_idx(options: &OrderOptions) -> Result<u8, ConnectorError> {
    if let Some(idx) = options.position_idx {
        if idx > POSITION_IDX_HEDGE_SHORT {
            return Err(ConnectorError::parameter_invalid(
                "positionIdx",
                format!("positionIdx must be 0, 1 or 2, got {idx}"),
            ));
        }
        return Ok(idx);
    }
    match options.position_side.as_deref() {
        Some(side) => Ok(side.parse::<PositionSide>()?.position_idx()),
        None => Ok(POSITION_IDX_ONE_WAY),
    }
}

/// Venue names of the category-restricted options the caller set.
#[must_use]
pub fn requested_fields(options: &OrderOptions) -> Vec<&'static str> {
    let mut fields = Vec::new();
    let mut push = |present: bool, name: &'static str| {
        if present {
            fields.push(name);
        }
    };
    push(options.order_filter.is_some(), "orderFilter");
    push(options.is_leverage.is_some(), "isLeverage");
    push(options.trigger_direction.is_some(), "triggerDirection");
    push(options.trigger_by.is_some(), "triggerBy");
    push(options.tp_trigger_by.is_some(), "tpTriggerBy");
    push(options.sl_trigger_by.is_some(), "slTriggerBy");
    push(options.tpsl_mode.is_some(), "tpslMode");
    push(options.bbo_side_type.is_some(), "bboSideType");
    push(options.bbo_level.is_some(), "bboLevel");
    push(options.close_on_trigger, "closeOnTrigger");
    push(options.close_position, "closePosition");
    push(options.mmp.is_some(), "mmp");
    push(options.order_iv.is_some(), "orderIv");
    push(options.slippage_tolerance_type.is_some(), "slippageToleranceType");
    push(options.slippage_tolerance.is_some(), "slippageTolerance");
    fields
}

/// Trigger and exit legs after the conditional-order rule is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Triggers<'a> {
    /// `triggerPrice`.
    pub trigger: Option<Decimal>,
    /// Attached take-profit.
    pub take_profit: ExitLeg<'a>,
    /// Attached stop-loss.
    pub stop_loss: ExitLeg<'a>,
    /// `tpslMode`, dropped along with the legs.
    pub tpsl_mode: Option<&'a str>,
}

impl Triggers<'_> {
    /// Venue name of the first attached exit field, if any.
    #[must_use]
    pub fn first_exit_field(&self) -> Option<&'static str> {
        let legs = [
            (&self.take_profit, ["takeProfit", "tpLimitPrice", "tpOrderType", "tpTriggerBy"]),
            (&self.stop_loss, ["stopLoss", "slLimitPrice", "slOrderType", "slTriggerBy"]),
        ];
        for (leg, [trigger, limit, kind, by]) in legs {
            let present = [
                (leg.trigger.is_some(), trigger),
                (leg.limit_price.is_some(), limit),
                (leg.order_type.is_some(), kind),
                (leg.trigger_by.is_some(), by),
            ];
            if let Some((_, name)) = present.into_iter().find(|(set, _)| *set) {
                return Some(name);
            }
        }
        None
    }
}

/// Apply the conditional-order rule.
///
/// For stop/take-profit types the trigger comes from `trigger_price`, else
/// from the matching exit price, and the exit legs are dropped: the order
/// is itself the exit. With `require_trigger` a conditional type without
/// any trigger is an error.
pub fn resolve_triggers(
    intent: &OrderIntent,
    require_trigger: bool,
) -> Result<Triggers<'_>, ConnectorError> {
    let options = &intent.options;

    if intent.order_type.is_conditional() {
        let from_exit = if intent.order_type.is_take_profit() {
            options.take_profit_price.or(options.stop_loss_price)
        } else {
            options.stop_loss_price.or(options.take_profit_price)
        };
        let trigger = options.trigger_price.or(from_exit);
        if trigger.is_none() && require_trigger {
            return Err(ConnectorError::parameter_missing("triggerPrice")
                .with_context("type", intent.order_type.as_str()));
        }
        return Ok(Triggers {
            trigger,
            ..Triggers::default()
        });
    }

    Ok(Triggers {
        trigger: options.trigger_price,
        take_profit: ExitLeg {
            trigger: options.take_profit_price,
            limit_price: options.tp_limit_price,
            order_type: options
                .tp_order_type
                .as_deref()
                .map(|t| normalize_exit_type("tpOrderType", t))
                .transpose()?,
            trigger_by: options.tp_trigger_by.as_deref(),
        },
        stop_loss: ExitLeg {
            trigger: options.stop_loss_price,
            limit_price: options.sl_limit_price,
            order_type: options
                .sl_order_type
                .as_deref()
                .map(|t| normalize_exit_type("slOrderType", t))
                .transpose()?,
            trigger_by: options.sl_trigger_by.as_deref(),
        },
        tpsl_mode: options.tpsl_mode.as_deref(),
    })
}

fn normalize_exit_type(field: &str, value: &str) -> Result<&'static str, ConnectorError> {
    match value.to_ascii_lowercase().as_str() {
        "market" => Ok("Market"),
        "limit" => Ok("Limit"),
        other => Err(ConnectorError::parameter_invalid(
            field,
            format!("{field} must be Market or Limit, got '{other}'"),
        )),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use rust_decimal_macros::dec;

    use crate::domain::market::{MarketCategory, MarketDescriptor};

    pub fn linear() -> MarketDescriptor {
        MarketDescriptor::new("BTC/USDT:USDT", "BTCUSDT", MarketCategory::Linear, "BTC", "USDT")
            .with_settle("USDT")
            .with_precision(dec!(0.1), dec!(0.001))
    }

    pub fn inverse() -> MarketDescriptor {
        MarketDescriptor::new("BTC/USD:BTC", "BTCUSD", MarketCategory::Inverse, "BTC", "USD")
            .with_settle("BTC")
            .with_precision(dec!(0.5), dec!(1))
    }

    pub fn spot() -> MarketDescriptor {
        MarketDescriptor::new("ETH/USDT", "ETHUSDT", MarketCategory::Spot, "ETH", "USDT")
            .with_precision(dec!(0.01), dec!(0.0001))
    }

    pub fn option() -> MarketDescriptor {
        MarketDescriptor::new(
            "BTC/USDC:USDC-241227-50000-C",
            "BTC-27DEC24-50000-C",
            MarketCategory::Option,
            "BTC",
            "USDC",
        )
        .with_settle("USDC")
        .with_precision(dec!(5), dec!(0.01))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    #[test_case(OrderType::Market, None, "Market")]
    #[test_case(OrderType::StopMarket, Some(dec!(10)), "Market")]
    #[test_case(OrderType::TakeProfitMarket, None, "Market")]
    #[test_case(OrderType::TrailingStopMarket, None, "Market")]
    #[test_case(OrderType::Limit, Some(dec!(10)), "Limit")]
    #[test_case(OrderType::LimitMaker, Some(dec!(10)), "Limit")]
    #[test_case(OrderType::StopLossLimit, Some(dec!(10)), "Limit")]
    #[test_case(OrderType::TakeProfitLimit, Some(dec!(10)), "Limit")]
    #[test_case(OrderType::StopLoss, Some(dec!(10)), "Limit")]
    #[test_case(OrderType::StopLoss, None, "Market")]
    #[test_case(OrderType::TakeProfit, None, "Market")]
    #[test_case(OrderType::Stop, Some(dec!(10)), "Limit")]
    fn venue_order_type(order_type: OrderType, price: Option<Decimal>, expected: &str) {
        assert_eq!(bybit_order_type_from(order_type, price), expected);
    }

    #[test_case(OrderType::TakeProfitMarket, OrderSide::Buy, 2)]
    #[test_case(OrderType::TakeProfit, OrderSide::Sell, 1)]
    #[test_case(OrderType::StopMarket, OrderSide::Buy, 1)]
    #[test_case(OrderType::StopLoss, OrderSide::Sell, 2)]
    #[test_case(OrderType::Limit, OrderSide::Buy, 1)]
    fn trigger_direction(order_type: OrderType, side: OrderSide, expected: u8) {
        assert_eq!(infer_trigger_direction(order_type, side), expected);
    }

    #[test]
    fn explicit_position_idx_wins() {
        let options = OrderOptions {
            position_idx: Some(2),
            position_side: Some("long".to_string()),
            ..OrderOptions::default()
        };
        assert_eq!(resolve_position_idx(&options).unwrap(), 2);
    }

    #[test_case(Some("long"), 1)]
    #[test_case(Some("short"), 2)]
    #[test_case(Some(""), 0)]
    #[test_case(Some("net"), 0)]
    #[test_case(None, 0)]
    fn position_side_mapping(side: Option<&str>, expected: u8) {
        let options = OrderOptions {
            position_side: side.map(str::to_string),
            ..OrderOptions::default()
        };
        assert_eq!(resolve_position_idx(&options).unwrap(), expected);
    }

    #[test]
    fn out_of_range_position_idx_rejected() {
        let options = OrderOptions {
            position_idx: Some(3),
            ..OrderOptions::default()
        };
        assert!(resolve_position_idx(&options).is_err());
    }

    #[test]
    fn conditional_takes_matching_exit_price() {
        let intent = OrderIntent::new("X", OrderType::TakeProfit, OrderSide::Sell, dec!(1), None)
            .with_options(OrderOptions::default().with_stop_loss(dec!(90)).with_take_profit(dec!(120)));
        let triggers = resolve_triggers(&intent, true).unwrap();
        assert_eq!(triggers.trigger, Some(dec!(120)));
        assert_eq!(triggers.first_exit_field(), None);
    }

    #[test]
    fn conditional_without_trigger_is_missing() {
        let intent = OrderIntent::new("X", OrderType::StopMarket, OrderSide::Sell, dec!(1), None);
        let err = resolve_triggers(&intent, true).unwrap_err();
        assert_eq!(err.context_value("field"), Some("triggerPrice"));
        assert!(resolve_triggers(&intent, false).unwrap().trigger.is_none());
    }

    #[test]
    fn exit_order_type_normalized() {
        let intent = OrderIntent::new("X", OrderType::Limit, OrderSide::Buy, dec!(1), Some(dec!(1)))
            .with_options(OrderOptions {
                tp_order_type: Some("limit".to_string()),
                ..OrderOptions::default()
            });
        let triggers = resolve_triggers(&intent, true).unwrap();
        assert_eq!(triggers.take_profit.order_type, Some("Limit"));
        assert_eq!(triggers.first_exit_field(), Some("tpOrderType"));
    }
}
