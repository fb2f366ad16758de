//! Order placement, amendment, cancellation and order lookups.

use rust_decimal::Decimal;
use tracing::info;

use super::{BybitConnector, ListRequest};
use crate::application::history::HistoryQuery;
use crate::application::ports::{Endpoint, RequestParams};
use crate::domain::intent::{OrderIntent, QueryOptions};
use crate::domain::market::{MarketCategory, MarketDescriptor};
use crate::domain::records::NormalizedOrder;
use crate::domain::value_objects::{OrderStatus, OrderType};
use crate::error::{ConnectorError, ErrorCode};
use crate::infrastructure::bybit::api_types::{ListResult, OrderIdResult, OrderRecord};
use crate::infrastructure::bybit::compiler::{
    compile_amend, compile_cancel, compile_cancel_all, compile_create,
};
use crate::infrastructure::bybit::parser::{non_empty, parse_order};
use crate::infrastructure::bybit::request::CompiledRequest;

fn param_decimal(params: &RequestParams, key: &str) -> Option<Decimal> {
    params.get_str(key).and_then(|v| v.parse().ok())
}

/// `None` entries mean "no settle coin scope".
fn settle_scopes(
    market: Option<&MarketDescriptor>,
    category: MarketCategory,
    coins: Vec<String>,
) -> Vec<Option<String>> {
    if market.is_some() || !category.is_contract() || coins.is_empty() {
        return vec![None];
    }
    coins.into_iter().map(Some).collect()
}

impl BybitConnector {
    /// Place an order.
    ///
    /// The returned record is built from the intent and the venue
    /// acknowledgement; the venue only echoes ids on placement. Trailing
    /// stops attach to the position and come back without an order id.
    pub async fn create_order(&self, intent: &OrderIntent) -> Result<NormalizedOrder, ConnectorError> {
        let market = self.market(&intent.symbol)?;
        let compiled = compile_create(intent, &market, self.ports.precision.as_ref())?;

        let (id, link_id) = if compiled.endpoint == Endpoint::TradingStop {
            self.send(compiled.endpoint, &compiled.params, false).await?;
            (String::new(), None)
        } else {
            let ack: OrderIdResult = self
                .request(compiled.endpoint, &compiled.params, "order acknowledgement", false)
                .await?;
            (ack.order_id, non_empty(&ack.order_link_id))
        };

        let order = self.acknowledge(id, link_id, &compiled, intent);
        info!(
            symbol = %intent.symbol,
            order_id = %order.id,
            client_order_id = ?order.client_order_id,
            side = %intent.side.as_venue(),
            order_type = %intent.order_type.as_str(),
            endpoint = %compiled.endpoint,
            "Order placed"
        );
        Ok(order)
    }

    /// Amend an open order by venue id or by the intent's client order id.
    pub async fn edit_order(
        &self,
        order_id: Option<&str>,
        intent: &OrderIntent,
    ) -> Result<NormalizedOrder, ConnectorError> {
        let market = self.market(&intent.symbol)?;
        let compiled = compile_amend(order_id, intent, &market, self.ports.precision.as_ref())?;
        let ack: OrderIdResult = self
            .request(compiled.endpoint, &compiled.params, "amend acknowledgement", false)
            .await?;

        let id = non_empty(&ack.order_id)
            .or_else(|| order_id.map(str::to_string))
            .unwrap_or_default();
        let order = self.acknowledge(id, non_empty(&ack.order_link_id), &compiled, intent);
        info!(symbol = %intent.symbol, order_id = %order.id, "Order amended");
        Ok(order)
    }

    /// Cancel one order by venue id or `options.client_order_id`.
    pub async fn cancel_order(
        &self,
        order_id: Option<&str>,
        symbol: &str,
        options: &QueryOptions,
    ) -> Result<NormalizedOrder, ConnectorError> {
        let market = self.market(symbol)?;
        let compiled = compile_cancel(order_id, &market, options)?;
        let ack: OrderIdResult = self
            .request(compiled.endpoint, &compiled.params, "cancel acknowledgement", false)
            .await?;

        let id = non_empty(&ack.order_id)
            .or_else(|| order_id.map(str::to_string))
            .unwrap_or_default();
        let mut order = NormalizedOrder::acknowledged(id, symbol, self.ports.clock.now_ms());
        order.client_order_id =
            non_empty(&ack.order_link_id).or_else(|| options.client_order_id.clone());
        order.status = OrderStatus::Canceled;
        info!(symbol = %symbol, order_id = %order.id, "Order canceled");
        Ok(order)
    }

    /// Cancel every open order of a symbol, or of each settle coin when a
    /// contract category is cancelled without a symbol.
    pub async fn cancel_all_orders(
        &self,
        symbol: Option<&str>,
        options: &QueryOptions,
    ) -> Result<Vec<NormalizedOrder>, ConnectorError> {
        let market = self.optional_market(symbol)?;
        let category = self.category_for(market.as_ref(), options);
        let now = self.ports.clock.now_ms();
        let unified = market.as_ref().map(|m| m.symbol.clone()).unwrap_or_default();

        let mut canceled = Vec::new();
        for coin in settle_scopes(market.as_ref(), category, self.settle_coins(options)) {
            let compiled = compile_cancel_all(market.as_ref(), category, coin.as_deref(), options)?;
            let result: ListResult<OrderIdResult> = self
                .request(compiled.endpoint, &compiled.params, "cancel-all result", false)
                .await?;
            canceled.extend(result.list.into_iter().filter(|ack| !ack.order_id.is_empty()).map(|ack| {
                let mut order = NormalizedOrder::acknowledged(ack.order_id, unified.clone(), now);
                order.client_order_id = non_empty(&ack.order_link_id);
                order.status = OrderStatus::Canceled;
                order
            }));
        }
        info!(
            category = %category,
            symbol = ?symbol,
            count = canceled.len(),
            "Orders canceled"
        );
        Ok(canceled)
    }

    /// Look up one order: open orders first, then order history.
    pub async fn fetch_order(
        &self,
        order_id: &str,
        symbol: &str,
        options: &QueryOptions,
    ) -> Result<NormalizedOrder, ConnectorError> {
        let market = self.market(symbol)?;
        let mut params = RequestParams::new();
        params
            .set_str("category", market.category.as_str())
            .set_str("symbol", market.id.as_str());
        match (non_empty(order_id), options.client_order_id.as_deref()) {
            (Some(id), _) => params.set_str("orderId", id),
            (None, Some(link)) => params.set_str("orderLinkId", link),
            (None, None) => return Err(ConnectorError::parameter_missing("id")),
        };
        if market.is_spot() && options.trigger {
            params.set_str("orderFilter", "StopOrder");
        }

        let registry = self.ports.markets.as_ref();
        for endpoint in [Endpoint::OpenOrders, Endpoint::OrderHistory] {
            let result: ListResult<OrderRecord> = self
                .request(endpoint, &params, "order list", options.no_cache)
                .await?;
            if let Some(order) = result
                .list
                .iter()
                .find_map(|record| parse_order(record, market.category, registry))
            {
                return Ok(order);
            }
        }

        Err(
            ConnectorError::new(ErrorCode::NotFound, format!("order {order_id} not found"))
                .with_context("symbol", symbol)
                .with_context("order_id", order_id),
        )
    }

    /// Open orders, newest first as the venue returns them.
    ///
    /// The realtime endpoint has no time filter, so `since` is applied to
    /// the parsed orders.
    pub async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        options: &QueryOptions,
    ) -> Result<Vec<NormalizedOrder>, ConnectorError> {
        let market = self.optional_market(symbol)?;
        let category = self.category_for(market.as_ref(), options);

        let mut base = RequestParams::new();
        base.set_str("category", category.as_str());
        if let Some(market) = &market {
            base.set_str("symbol", market.id.as_str());
        }
        if category == MarketCategory::Spot && options.trigger {
            base.set_str("orderFilter", "StopOrder");
        }

        // `since` is applied after parsing, so the page walk cannot stop at `limit`
        let query = HistoryQuery {
            limit: if since.is_some() { None } else { limit },
            after_cursor: options.after_cursor.clone(),
            ..HistoryQuery::default()
        };
        let registry = self.ports.markets.as_ref();
        let mut orders = Vec::new();
        for coin in settle_scopes(market.as_ref(), category, self.settle_coins(options)) {
            let mut params = base.clone();
            params.set_opt_str("settleCoin", coin.as_deref());
            let request = ListRequest::new(Endpoint::OpenOrders, params, "open orders")
                .page_size(self.page_sizes.orders)
                .no_cache(options.no_cache);
            let page = self
                .fetch_list(request, &query, |record: &OrderRecord| {
                    parse_order(record, category, registry)
                })
                .await?;
            orders.extend(page.into_iter().filter(|order| {
                since.is_none_or(|since| order.timestamp.is_some_and(|ts| ts >= since))
            }));
            if limit.is_some_and(|limit| orders.len() >= limit) {
                break;
            }
        }
        if let Some(limit) = limit {
            orders.truncate(limit);
        }
        Ok(orders)
    }

    fn acknowledge(
        &self,
        id: String,
        link_id: Option<String>,
        compiled: &CompiledRequest,
        intent: &OrderIntent,
    ) -> NormalizedOrder {
        let params = &compiled.params;
        let options = &intent.options;
        let mut order =
            NormalizedOrder::acknowledged(id, intent.symbol.as_str(), self.ports.clock.now_ms());

        order.client_order_id = link_id.or_else(|| params.get_str("orderLinkId").map(str::to_string));
        order.order_type = Some(intent.order_type);
        order.side = Some(intent.side);
        order.amount = (intent.amount > Decimal::ZERO).then_some(intent.amount);
        order.price = param_decimal(params, "price").or(intent.price);
        order.time_in_force = options.time_in_force;
        order.post_only = options.post_only;
        order.reduce_only = options.reduce_only || options.close_position;
        order.take_profit_price = param_decimal(params, "takeProfit");
        order.stop_loss_price = param_decimal(params, "stopLoss");
        order.trigger_price = if intent.order_type == OrderType::TrailingStopMarket {
            param_decimal(params, "activePrice")
        } else {
            param_decimal(params, "triggerPrice")
        };
        order.stop_price = order.trigger_price;
        order
    }
}
