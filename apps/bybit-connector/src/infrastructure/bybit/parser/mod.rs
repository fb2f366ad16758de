//! Response parser.
//!
//! Pure functions from decoded Bybit records to normalized records. Missing
//! venue fields are derived where a formula exists; unknown enum values are
//! carried through rather than dropped.

mod income;
mod order;
mod position;
mod trade;

pub use income::{normalize_income_type, parse_income};
pub use order::parse_order;
pub use position::parse_position;
pub use trade::{infer_execution_state, parse_trade};

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::application::ports::MarketRegistryPort;
use crate::domain::market::MarketCategory;
use crate::domain::records::Fee;
use crate::domain::value_objects::{OrderType, TimeInForce};

/// Rebuild the abstract order type from the venue's split type fields.
///
/// Returns `None` when the base type is neither `Market` nor `Limit`.
#[must_use]
pub fn reconstruct_order_type(
    base: &str,
    stop_order_type: &str,
    trigger_price: Option<Decimal>,
    time_in_force: Option<TimeInForce>,
) -> Option<OrderType> {
    let is_market = match base {
        "Market" => true,
        "Limit" => false,
        _ => return None,
    };
    let pick = |market: OrderType, limit: OrderType| if is_market { market } else { limit };
    let triggered = trigger_price.is_some_and(|p| p > Decimal::ZERO);

    let order_type = match stop_order_type {
        "TakeProfit" | "PartialTakeProfit" => {
            pick(OrderType::TakeProfitMarket, OrderType::TakeProfitLimit)
        }
        "StopLoss" | "PartialStopLoss" => pick(OrderType::StopMarket, OrderType::StopLossLimit),
        "TrailingStop" => OrderType::TrailingStopMarket,
        "Stop" | "StopOrder" | "tpslOrder" => pick(OrderType::StopMarket, OrderType::Stop),
        _ if triggered => pick(OrderType::StopMarket, OrderType::Stop),
        _ if !is_market && time_in_force == Some(TimeInForce::PostOnly) => OrderType::LimitMaker,
        _ => pick(OrderType::Market, OrderType::Limit),
    };
    Some(order_type)
}

/// Unified symbol for a venue id, or the raw id when it cannot be resolved.
pub(crate) fn resolve_symbol(
    registry: &dyn MarketRegistryPort,
    venue_id: &str,
    category: MarketCategory,
) -> String {
    registry
        .symbol_for(venue_id, category)
        .unwrap_or_else(|| venue_id.to_string())
}

/// Fee from a per-currency breakdown, else a single cumulative field.
///
/// The breakdown is scanned in key order and the first non-zero entry wins.
pub(crate) fn extract_fee(
    registry: &dyn MarketRegistryPort,
    breakdown: &BTreeMap<String, Decimal>,
    cumulative: Option<Decimal>,
    fee_currency: &str,
    fallback_currency: impl FnOnce() -> Option<String>,
) -> Option<Fee> {
    if let Some((code, cost)) = breakdown.iter().find(|(_, cost)| !cost.is_zero()) {
        return Some(Fee {
            cost: *cost,
            currency: Some(registry.currency_code_for(code)),
        });
    }
    let cost = cumulative?;
    let currency = if fee_currency.is_empty() {
        fallback_currency()
    } else {
        Some(registry.currency_code_for(fee_currency))
    };
    Some(Fee { cost, currency })
}

pub(crate) fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

pub(crate) fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryMarketRegistry;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    #[test_case("Market", "TakeProfit", None, OrderType::TakeProfitMarket)]
    #[test_case("Limit", "TakeProfit", None, OrderType::TakeProfitLimit)]
    #[test_case("Limit", "StopLoss", None, OrderType::StopLossLimit)]
    #[test_case("Market", "StopLoss", None, OrderType::StopMarket)]
    #[test_case("Market", "PartialStopLoss", None, OrderType::StopMarket)]
    #[test_case("Market", "TrailingStop", None, OrderType::TrailingStopMarket)]
    #[test_case("Market", "", Some(dec!(100)), OrderType::StopMarket)]
    #[test_case("Limit", "", Some(dec!(100)), OrderType::Stop)]
    #[test_case("Market", "UNKNOWN", Some(dec!(100)), OrderType::StopMarket)]
    #[test_case("Market", "StopOrder", None, OrderType::StopMarket)]
    #[test_case("Limit", "tpslOrder", None, OrderType::Stop)]
    #[test_case("Market", "", None, OrderType::Market)]
    #[test_case("Limit", "", Some(dec!(0)), OrderType::Limit)]
    fn order_type_round_trip(
        base: &str,
        stop_type: &str,
        trigger: Option<Decimal>,
        expected: OrderType,
    ) {
        assert_eq!(reconstruct_order_type(base, stop_type, trigger, None), Some(expected));
    }

    #[test]
    fn post_only_limit_is_limit_maker() {
        assert_eq!(
            reconstruct_order_type("Limit", "", None, Some(TimeInForce::PostOnly)),
            Some(OrderType::LimitMaker)
        );
    }

    #[test]
    fn unknown_base_type() {
        assert_eq!(reconstruct_order_type("UNKNOWN", "", None, None), None);
    }

    #[test]
    fn fee_breakdown_first_non_zero_in_key_order() {
        let registry = InMemoryMarketRegistry::new();
        let breakdown = BTreeMap::from([
            ("BTC".to_string(), dec!(0)),
            ("MNT".to_string(), dec!(0.2)),
            ("USDT".to_string(), dec!(0.5)),
        ]);
        let fee = extract_fee(&registry, &breakdown, Some(dec!(9)), "USDT", || None).unwrap();
        assert_eq!(fee.cost, dec!(0.2));
        assert_eq!(fee.currency.as_deref(), Some("MNT"));
    }

    #[test]
    fn fee_falls_back_to_cumulative() {
        let registry = InMemoryMarketRegistry::new();
        let empty = BTreeMap::new();
        let fee = extract_fee(&registry, &empty, Some(dec!(0.1)), "", || Some("USDT".to_string()))
            .unwrap();
        assert_eq!(fee.currency.as_deref(), Some("USDT"));
        assert!(extract_fee(&registry, &empty, None, "USDT", || None).is_none());
    }
}
