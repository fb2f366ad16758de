//! Order records.

use rust_decimal::Decimal;

use super::{extract_fee, non_empty, positive, reconstruct_order_type, resolve_symbol};
use crate::application::ports::MarketRegistryPort;
use crate::domain::market::MarketCategory;
use crate::domain::records::NormalizedOrder;
use crate::domain::value_objects::{OrderSide, OrderStatus, PositionSide, TimeInForce};
use crate::infrastructure::bybit::api_types::OrderRecord;

/// Normalize one order record.
///
/// Returns `None` for a record without an order id.
#[must_use]
pub fn parse_order(
    record: &OrderRecord,
    category: MarketCategory,
    registry: &dyn MarketRegistryPort,
) -> Option<NormalizedOrder> {
    if record.order_id.is_empty() {
        return None;
    }

    let symbol = resolve_symbol(registry, &record.symbol, category);
    let side = OrderSide::from_venue(&record.side);
    let time_in_force = TimeInForce::from_venue(&record.time_in_force);
    let trigger_price = positive(record.trigger_price);

    let amount = record.qty;
    let filled = record.cum_exec_qty;
    let remaining = record.leaves_qty.or(match (amount, filled) {
        (Some(amount), Some(filled)) => Some(amount - filled),
        _ => None,
    });

    let has_fill = filled.is_some_and(|f| f > Decimal::ZERO);
    let average_reported = positive(record.avg_price);
    let cost = match (positive(record.cum_exec_value), average_reported) {
        (Some(value), _) => Some(value),
        (None, Some(average)) if has_fill => filled.map(|f| average * f),
        (None, _) => record.cum_exec_value,
    };
    let average = average_reported.or_else(|| match (positive(cost), filled) {
        (Some(cost), Some(filled)) if has_fill => Some(cost / filled),
        _ => None,
    });

    let position_side = if category.is_contract() {
        record
            .position_idx
            .and_then(|idx| u8::try_from(idx).ok())
            .and_then(PositionSide::from_position_idx)
    } else {
        None
    };

    let is_buy = side.is_some_and(|s| s.is_buy());
    let fee = extract_fee(
        registry,
        &record.cum_fee_detail,
        record.cum_exec_fee,
        &record.fee_currency,
        || {
            registry
                .market_for(&symbol)
                .ok()
                .map(|market| market.fee_currency_hint(is_buy).to_string())
        },
    );

    Some(NormalizedOrder {
        id: record.order_id.clone(),
        client_order_id: non_empty(&record.order_link_id),
        order_type: reconstruct_order_type(
            &record.order_type,
            &record.stop_order_type,
            trigger_price,
            time_in_force,
        ),
        side,
        status: OrderStatus::from_venue(&record.order_status),
        post_only: time_in_force == Some(TimeInForce::PostOnly),
        time_in_force,
        position_side,
        price: positive(record.price),
        average,
        amount,
        filled,
        remaining,
        trigger_price,
        stop_price: trigger_price,
        take_profit_price: positive(record.take_profit),
        stop_loss_price: positive(record.stop_loss),
        cost,
        reduce_only: record.reduce_only,
        fee,
        timestamp: record.created_time,
        last_update_timestamp: record.updated_time,
        last_trade_timestamp: if has_fill { record.updated_time } else { None },
        symbol,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::MarketDescriptor;
    use crate::domain::value_objects::OrderType;
    use crate::infrastructure::memory::InMemoryMarketRegistry;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn registry() -> InMemoryMarketRegistry {
        InMemoryMarketRegistry::with_markets([MarketDescriptor::new(
            "BTC/USDT:USDT",
            "BTCUSDT",
            MarketCategory::Linear,
            "BTC",
            "USDT",
        )
        .with_settle("USDT")])
    }

    fn record(value: serde_json::Value) -> OrderRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn average_from_cost_when_zero() {
        let raw = record(json!({
            "orderId": "1",
            "symbol": "BTCUSDT",
            "side": "Buy",
            "orderType": "Limit",
            "orderStatus": "PartiallyFilled",
            "qty": "5",
            "avgPrice": "0",
            "cumExecQty": "2",
            "cumExecValue": "300",
        }));
        let order = parse_order(&raw, MarketCategory::Linear, &registry()).unwrap();
        assert_eq!(order.average, Some(dec!(150)));
        assert_eq!(order.cost, Some(dec!(300)));
        assert_eq!(order.remaining, Some(dec!(3)));
        assert_eq!(order.status, OrderStatus::PartFilled);
        assert_eq!(order.symbol, "BTC/USDT:USDT");
    }

    #[test]
    fn cost_from_average_when_zero() {
        let raw = record(json!({
            "orderId": "1",
            "symbol": "BTCUSDT",
            "orderType": "Market",
            "orderStatus": "Filled",
            "qty": "2",
            "avgPrice": "101.5",
            "cumExecQty": "2",
            "cumExecValue": "0",
            "leavesQty": "0",
        }));
        let order = parse_order(&raw, MarketCategory::Linear, &registry()).unwrap();
        assert_eq!(order.cost, Some(dec!(203)));
        assert_eq!(order.average, Some(dec!(101.5)));
        assert_eq!(order.remaining, Some(dec!(0)));
    }

    #[test]
    fn full_linear_order() {
        let raw = record(json!({
            "orderId": "fd4300ae",
            "orderLinkId": "mine-7",
            "symbol": "BTCUSDT",
            "price": "28000",
            "qty": "0.01",
            "side": "Sell",
            "orderStatus": "Untriggered",
            "orderType": "Limit",
            "stopOrderType": "StopLoss",
            "timeInForce": "GTC",
            "triggerPrice": "28100",
            "takeProfit": "",
            "stopLoss": "0",
            "avgPrice": "",
            "leavesQty": "0.01",
            "cumExecQty": "0",
            "cumExecValue": "0",
            "cumExecFee": "0",
            "feeCurrency": "",
            "reduceOnly": true,
            "positionIdx": 2,
            "createdTime": "1700000000000",
            "updatedTime": "1700000001000",
        }));
        let order = parse_order(&raw, MarketCategory::Linear, &registry()).unwrap();
        assert_eq!(order.order_type, Some(OrderType::StopLossLimit));
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.client_order_id.as_deref(), Some("mine-7"));
        assert_eq!(order.trigger_price, Some(dec!(28100)));
        assert_eq!(order.stop_price, Some(dec!(28100)));
        assert_eq!(order.stop_loss_price, None);
        assert_eq!(order.position_side, Some(PositionSide::Short));
        assert!(order.reduce_only);
        assert_eq!(order.average, None);
        assert_eq!(order.last_trade_timestamp, None);
        assert_eq!(order.last_update_timestamp, Some(1_700_000_001_000));
        let fee = order.fee.unwrap();
        assert_eq!(fee.currency.as_deref(), Some("USDT"));
    }

    #[test]
    fn unresolved_symbol_and_status_pass_through() {
        let raw = record(json!({
            "orderId": "9",
            "symbol": "NEWCOINUSDT",
            "orderType": "Limit",
            "orderStatus": "SomethingNew",
            "cumExecQty": "1",
            "updatedTime": 5,
        }));
        let order = parse_order(&raw, MarketCategory::Spot, &registry()).unwrap();
        assert_eq!(order.symbol, "NEWCOINUSDT");
        assert_eq!(order.status, OrderStatus::Unrecognized("SomethingNew".to_string()));
        assert_eq!(order.last_trade_timestamp, Some(5));
        assert_eq!(order.position_side, None);
    }

    #[test]
    fn record_without_id_is_skipped() {
        assert!(parse_order(&record(json!({})), MarketCategory::Linear, &registry()).is_none());
    }
}
