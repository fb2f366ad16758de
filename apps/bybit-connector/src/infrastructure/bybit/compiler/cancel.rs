//! `CancelOrder` and cancel-all compilation.

use crate::application::ports::{Endpoint, RequestParams};
use crate::domain::intent::QueryOptions;
use crate::domain::market::{MarketCategory, MarketDescriptor};
use crate::error::ConnectorError;
use crate::infrastructure::bybit::request::CompiledRequest;

/// Compile a single-order cancel.
pub fn compile_cancel(
    order_id: Option<&str>,
    market: &MarketDescriptor,
    options: &QueryOptions,
) -> Result<CompiledRequest, ConnectorError> {
    let mut params = RequestParams::new();
    params
        .set_str("category", market.category.as_str())
        .set_str("symbol", market.id.as_str());

    match (
        order_id.filter(|s| !s.is_empty()),
        options.client_order_id.as_deref().filter(|s| !s.is_empty()),
    ) {
        (Some(id), _) => params.set_str("orderId", id),
        (None, Some(link)) => params.set_str("orderLinkId", link),
        (None, None) => return Err(ConnectorError::parameter_missing("id")),
    };

    if market.is_spot() && options.trigger {
        params.set_str("orderFilter", "StopOrder");
    }

    Ok(CompiledRequest {
        endpoint: Endpoint::CancelOrder,
        params,
    })
}

/// Compile a cancel-all.
///
/// Without a symbol, contract categories need a settle coin to scope the
/// request.
pub fn compile_cancel_all(
    market: Option<&MarketDescriptor>,
    category: MarketCategory,
    settle_coin: Option<&str>,
    options: &QueryOptions,
) -> Result<CompiledRequest, ConnectorError> {
    let mut params = RequestParams::new();
    match market {
        Some(market) => {
            params
                .set_str("category", market.category.as_str())
                .set_str("symbol", market.id.as_str());
        }
        None => {
            params.set_str("category", category.as_str());
            if category.is_contract() {
                let coin = settle_coin.ok_or_else(|| {
                    ConnectorError::parameter_missing("settleCoin")
                        .with_context("category", category.as_str())
                })?;
                params.set_str("settleCoin", coin);
            }
        }
    }

    let is_spot = market.map_or(category, |m| m.category) == MarketCategory::Spot;
    if is_spot && options.trigger {
        params.set_str("orderFilter", "StopOrder");
    }

    Ok(CompiledRequest {
        endpoint: Endpoint::CancelAllOrders,
        params,
    })
}
