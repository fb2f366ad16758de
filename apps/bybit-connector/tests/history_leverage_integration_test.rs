//! History and Leverage Integration Tests
//!
//! Windowed history walks, cursor pagination, bracket loading and the
//! best-effort leverage lookup, all through the public connector API.

// Allow unwrap in tests - tests should panic on unexpected errors
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rust_decimal_macros::dec;
use serde_json::json;

use bybit_connector::{
    BybitConnector, ConnectorPorts, Endpoint, ErrorCode, FixedClock, InMemoryAccountRegistry,
    InMemoryMarketRegistry, LeverageBracketTable, MarketCategory, MarketDescriptor, QueryOptions,
    ScriptedTransport, TickSizePrecision, WindowDirection, load_config_from_string,
};

const NOW: i64 = 1_700_000_000_000;
const DAY: i64 = 86_400_000;

fn ports(transport: &Arc<ScriptedTransport>) -> ConnectorPorts {
    let markets = InMemoryMarketRegistry::with_markets([
        MarketDescriptor::new("BTC/USDT:USDT", "BTCUSDT", MarketCategory::Linear, "BTC", "USDT")
            .with_settle("USDT"),
        MarketDescriptor::new("ETH/USDT:USDT", "ETHUSDT", MarketCategory::Linear, "ETH", "USDT")
            .with_settle("USDT"),
    ]);
    ConnectorPorts {
        transport: transport.clone(),
        markets: Arc::new(markets),
        precision: Arc::new(TickSizePrecision),
        clock: Arc::new(FixedClock::new(NOW)),
        accounts: Arc::new(InMemoryAccountRegistry::new()),
    }
}

fn setup(yaml: &str) -> (Arc<ScriptedTransport>, BybitConnector) {
    let config = load_config_from_string(yaml).unwrap();
    let transport = Arc::new(ScriptedTransport::new());
    let connector = BybitConnector::new(ports(&transport), &config);
    (transport, connector)
}

fn order(id: &str, created: i64) -> serde_json::Value {
    json!({
        "orderId": id,
        "symbol": "BTCUSDT",
        "side": "Buy",
        "orderType": "Limit",
        "orderStatus": "Filled",
        "price": "30000",
        "qty": "0.01",
        "cumExecQty": "0.01",
        "cumExecValue": "300",
        "createdTime": created.to_string(),
        "updatedTime": created.to_string(),
    })
}

#[tokio::test]
async fn cursor_pages_are_followed_within_a_window() {
    let (transport, connector) = setup("{}");
    transport
        .push_ok(
            Endpoint::OrderHistory,
            json!({"list": [order("a", NOW - 3 * DAY), order("b", NOW - 2 * DAY)], "nextPageCursor": "p2"}),
        )
        .push_ok(
            Endpoint::OrderHistory,
            json!({"list": [order("c", NOW - DAY)], "nextPageCursor": ""}),
        );

    let orders = connector
        .fetch_orders(Some("BTC/USDT:USDT"), Some(NOW - 5 * DAY), None, &QueryOptions::default().with_until(NOW))
        .await
        .unwrap();
    assert_eq!(orders.len(), 3);

    let calls = transport.calls_to(Endpoint::OrderHistory);
    assert_eq!(calls.len(), 2);
    assert!(!calls[0].params.contains("cursor"));
    assert_eq!(calls[1].params.get_str("cursor"), Some("p2"));
}

#[tokio::test]
async fn chunked_walk_stops_at_limit() {
    let (transport, connector) = setup("{}");
    transport.push_ok(
        Endpoint::OrderHistory,
        json!({"list": [order("a", NOW - DAY), order("b", NOW - 2 * DAY), order("c", NOW - 3 * DAY)]}),
    );

    let options = QueryOptions {
        direction: Some(WindowDirection::EndToStart),
        ..QueryOptions::default().with_until(NOW).with_loop_interval(7 * DAY)
    };
    let orders = connector
        .fetch_orders(Some("BTC/USDT:USDT"), Some(NOW - 30 * DAY), Some(2), &options)
        .await
        .unwrap();
    assert_eq!(orders.len(), 2);
    // the limit was reached in the first window
    assert_eq!(transport.calls_to(Endpoint::OrderHistory).len(), 1);
}

#[tokio::test]
async fn loop_interval_above_window_rejected() {
    let (transport, connector) = setup("{}");
    let options = QueryOptions::default().with_until(NOW).with_loop_interval(8 * DAY);
    let err = connector
        .fetch_my_trades(Some("BTC/USDT:USDT"), Some(NOW - 30 * DAY), None, &options)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ParameterInvalid);
    assert_eq!(err.context_value("field"), Some("loopInterval"));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn configured_auto_clip_falls_back_after_venue_rejection() {
    let (transport, connector) = setup("history:\n  auto_clip: true\n");
    transport
        .push_ret_code(
            Endpoint::Executions,
            10001,
            "The time range between startTime and endTime cannot exceed 7 days",
        )
        .push_ok(Endpoint::Executions, json!({"list": []}));

    // open-ended range: nothing to check locally, so the venue decides
    let options = QueryOptions {
        direction: Some(WindowDirection::StartToEnd),
        ..QueryOptions::default()
    };
    let trades = connector
        .fetch_my_trades(Some("BTC/USDT:USDT"), Some(NOW - 2 * DAY), None, &options)
        .await
        .unwrap();
    assert!(trades.is_empty());
    assert_eq!(transport.calls_to(Endpoint::Executions).len(), 2);
}

#[tokio::test]
async fn bracket_table_is_shared_and_replaced_per_symbol() {
    let transport = Arc::new(ScriptedTransport::new());
    let config = load_config_from_string("{}").unwrap();
    let table = Arc::new(LeverageBracketTable::new());
    let first = BybitConnector::with_bracket_table(ports(&transport), &config, Arc::clone(&table));
    let second = BybitConnector::with_bracket_table(ports(&transport), &config, Arc::clone(&table));

    transport
        .push_ok(
            Endpoint::RiskLimit,
            json!({"list": [
                {"symbol": "BTCUSDT", "riskLimitValue": "2000000", "maintenanceMargin": "0.005", "maxLeverage": "100"},
                {"symbol": "BTCUSDT", "riskLimitValue": "4000000", "maintenanceMargin": "0.01", "maxLeverage": "50"},
                {"symbol": "ETHUSDT", "riskLimitValue": "1000000", "maintenanceMargin": "0.01", "maxLeverage": "50"},
            ], "nextPageCursor": "next"}),
        )
        .push_ok(Endpoint::RiskLimit, json!({"list": [], "nextPageCursor": ""}));
    let replaced = first
        .load_leverage_brackets(None, &QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(replaced, 2);

    // 0.01 * 3_000_000 - 2_000_000 * 0.005
    assert_eq!(second.calc_maint_margin("BTC/USDT:USDT", dec!(3000000)).unwrap(), dec!(20000));
    assert_eq!(second.max_leverage("ETH/USDT:USDT", dec!(500000)), 50);

    transport.push_ok(
        Endpoint::RiskLimit,
        json!({"list": [
            {"symbol": "ETHUSDT", "riskLimitValue": "1000000", "maintenanceMargin": "0.02", "maxLeverage": "25"},
        ]}),
    );
    second
        .load_leverage_brackets(Some("ETH/USDT:USDT"), &QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(first.max_leverage("ETH/USDT:USDT", dec!(500000)), 25);
    // BTC ladder untouched by the ETH reload
    assert_eq!(first.max_leverage("BTC/USDT:USDT", dec!(3000000)), 50);
}

#[tokio::test]
async fn lazy_probe_disabled_by_config() {
    let (transport, connector) = setup("leverage:\n  lazy_probe: false\n");
    transport.push_ok(Endpoint::RiskLimit, json!({"list": []}));

    assert_eq!(connector.get_leverage("BTC/USDT:USDT").await, None);
    assert!(transport.calls_to(Endpoint::Positions).is_empty());
}

#[tokio::test]
async fn extra_idempotent_code_from_config() {
    let (transport, connector) = setup("leverage:\n  extra_idempotent_codes: [34036]\n");
    transport.push_ret_code(Endpoint::SetLeverage, 34036, "leverage not modified");
    connector.set_leverage(20, "BTC/USDT:USDT").await.unwrap();

    transport.push_ok(Endpoint::RiskLimit, json!({"list": []}));
    assert_eq!(connector.get_leverage("BTC/USDT:USDT").await, Some(20));
}
