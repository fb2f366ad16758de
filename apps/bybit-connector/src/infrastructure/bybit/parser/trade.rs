//! Execution records.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::{extract_fee, non_empty, positive, reconstruct_order_type, resolve_symbol};
use crate::application::ports::MarketRegistryPort;
use crate::domain::market::MarketCategory;
use crate::domain::records::NormalizedTrade;
use crate::domain::value_objects::{OrderSide, OrderStatus};
use crate::infrastructure::bybit::api_types::ExecutionRecord;

/// Parent-order fill and state for an execution that carries no status.
///
/// With the order quantity and leaves known, `filled = orderQty - leaves`
/// and the state follows from it. Without leaves, an execution covering the
/// whole order quantity is a fill and any smaller one a partial fill.
#[must_use]
pub fn infer_execution_state(
    order_qty: Option<Decimal>,
    leaves_qty: Option<Decimal>,
    exec_qty: Option<Decimal>,
) -> (Option<Decimal>, Option<OrderStatus>) {
    if let (Some(order_qty), Some(leaves)) = (positive(order_qty), leaves_qty) {
        let filled = order_qty - leaves;
        let state = if filled <= Decimal::ZERO {
            OrderStatus::Open
        } else if leaves <= Decimal::ZERO || filled >= order_qty {
            OrderStatus::Filled
        } else {
            OrderStatus::PartFilled
        };
        return (Some(filled), Some(state));
    }
    if let Some(exec_qty) = positive(exec_qty) {
        if positive(order_qty).is_some_and(|order_qty| exec_qty >= order_qty) {
            return (Some(exec_qty), Some(OrderStatus::Filled));
        }
        return (None, Some(OrderStatus::PartFilled));
    }
    (None, None)
}

/// Normalize one execution record.
///
/// Returns `None` for a record without an execution id.
#[must_use]
pub fn parse_trade(
    record: &ExecutionRecord,
    category: MarketCategory,
    registry: &dyn MarketRegistryPort,
) -> Option<NormalizedTrade> {
    if record.exec_id.is_empty() {
        return None;
    }

    let symbol = resolve_symbol(registry, &record.symbol, category);
    let side = OrderSide::from_venue(&record.side);
    let amount = record.exec_qty.unwrap_or_default();
    let price = record.exec_price.unwrap_or_default();
    let cost = positive(record.exec_value)
        .or_else(|| price.checked_mul(amount))
        .unwrap_or_default();
    let (filled, state) = infer_execution_state(record.order_qty, record.leaves_qty, record.exec_qty);

    let is_buy = side.is_some_and(|s| s.is_buy());
    let fee = extract_fee(
        registry,
        &BTreeMap::new(),
        record.exec_fee,
        &record.fee_currency,
        || {
            registry
                .market_for(&symbol)
                .ok()
                .map(|market| market.fee_currency_hint(is_buy).to_string())
        },
    );

    Some(NormalizedTrade {
        id: record.exec_id.clone(),
        side,
        order_type: reconstruct_order_type(&record.order_type, &record.stop_order_type, None, None),
        amount,
        price,
        cost,
        order_id: non_empty(&record.order_id),
        client_order_id: non_empty(&record.order_link_id),
        timestamp: record.exec_time,
        is_maker: record.is_maker,
        fee,
        filled,
        state,
        symbol,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::MarketDescriptor;
    use crate::infrastructure::memory::InMemoryMarketRegistry;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use test_case::test_case;

    fn registry() -> InMemoryMarketRegistry {
        InMemoryMarketRegistry::with_markets([MarketDescriptor::new(
            "ETH/USDT",
            "ETHUSDT",
            MarketCategory::Spot,
            "ETH",
            "USDT",
        )])
    }

    #[test]
    fn cost_from_price_times_quantity() {
        let record: ExecutionRecord = serde_json::from_value(json!({
            "execId": "e1",
            "symbol": "ETHUSDT",
            "side": "Buy",
            "orderType": "Market",
            "execPrice": "100",
            "execQty": "0.5",
            "execValue": "0",
            "execFee": "0.0001",
            "feeCurrency": "",
            "isMaker": false,
            "execTime": "1700000000000",
        }))
        .unwrap();
        let trade = parse_trade(&record, MarketCategory::Spot, &registry()).unwrap();
        assert_eq!(trade.cost, dec!(50));
        assert_eq!(trade.symbol, "ETH/USDT");
        assert_eq!(trade.state, Some(OrderStatus::PartFilled));
        assert_eq!(trade.is_maker, Some(false));
        // spot buys pay fees in the base coin
        assert_eq!(trade.fee.unwrap().currency.as_deref(), Some("ETH"));
    }

    #[test]
    fn exec_value_preferred() {
        let record: ExecutionRecord = serde_json::from_value(json!({
            "execId": "e2",
            "symbol": "ETHUSDT",
            "execPrice": "100",
            "execQty": "0.5",
            "execValue": "50.01",
            "feeCurrency": "USDT",
            "execFee": "0.02",
        }))
        .unwrap();
        let trade = parse_trade(&record, MarketCategory::Spot, &registry()).unwrap();
        assert_eq!(trade.cost, dec!(50.01));
        assert_eq!(trade.fee.unwrap().currency.as_deref(), Some("USDT"));
    }

    #[test]
    fn oversized_price_times_quantity_does_not_overflow() {
        let record: ExecutionRecord = serde_json::from_value(json!({
            "execId": "e3",
            "symbol": "ETHUSDT",
            "execPrice": "79228162514264337593543950335",
            "execQty": "2",
            "execValue": "",
        }))
        .unwrap();
        let trade = parse_trade(&record, MarketCategory::Spot, &registry()).unwrap();
        assert_eq!(trade.cost, Decimal::ZERO);

        let record: ExecutionRecord = serde_json::from_value(json!({
            "execId": "e4",
            "symbol": "ETHUSDT",
            "execPrice": "79228162514264337593543950335",
            "execQty": "2",
            "execValue": "12.5",
        }))
        .unwrap();
        let trade = parse_trade(&record, MarketCategory::Spot, &registry()).unwrap();
        assert_eq!(trade.cost, dec!(12.5));
    }

    #[test_case(Some(dec!(10)), Some(dec!(10)), None, Some(dec!(0)), Some(OrderStatus::Open))]
    #[test_case(Some(dec!(10)), Some(dec!(4)), None, Some(dec!(6)), Some(OrderStatus::PartFilled))]
    #[test_case(Some(dec!(10)), Some(dec!(0)), None, Some(dec!(10)), Some(OrderStatus::Filled))]
    #[test_case(None, None, Some(dec!(1)), None, Some(OrderStatus::PartFilled))]
    #[test_case(Some(dec!(2)), None, Some(dec!(2)), Some(dec!(2)), Some(OrderStatus::Filled))]
    #[test_case(Some(dec!(2)), None, Some(dec!(1)), None, Some(OrderStatus::PartFilled))]
    #[test_case(None, None, None, None, None)]
    fn execution_state(
        order_qty: Option<Decimal>,
        leaves: Option<Decimal>,
        exec_qty: Option<Decimal>,
        filled: Option<Decimal>,
        state: Option<OrderStatus>,
    ) {
        assert_eq!(infer_execution_state(order_qty, leaves, exec_qty), (filled, state));
    }
}
