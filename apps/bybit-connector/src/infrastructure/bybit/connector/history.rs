//! Windowed history queries and the position list.

use super::{BybitConnector, ListRequest};
use crate::application::history::HistoryQuery;
use crate::application::ports::{Endpoint, RequestParams};
use crate::domain::intent::QueryOptions;
use crate::domain::market::{MarketCategory, MarketDescriptor};
use crate::domain::records::{NormalizedIncome, NormalizedOrder, NormalizedTrade, Position};
use crate::error::ConnectorError;
use crate::infrastructure::bybit::api_types::{
    ExecutionRecord, OrderRecord, PositionRecord, TransactionLogRecord,
};
use crate::infrastructure::bybit::parser::{parse_income, parse_order, parse_position, parse_trade};

impl BybitConnector {
    /// `category`, `symbol` and the optional `settleCoin` of a list query.
    fn list_params(
        market: Option<&MarketDescriptor>,
        category: MarketCategory,
        options: &QueryOptions,
    ) -> RequestParams {
        let mut params = RequestParams::new();
        params.set_str("category", category.as_str());
        match market {
            Some(market) => {
                params.set_str("symbol", market.id.as_str());
            }
            None if category.is_contract() => {
                params.set_opt_str("settleCoin", options.settle_coin.as_deref());
            }
            None => {}
        }
        params
    }

    /// Order history over `[since, until]`.
    pub async fn fetch_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        options: &QueryOptions,
    ) -> Result<Vec<NormalizedOrder>, ConnectorError> {
        let market = self.optional_market(symbol)?;
        let category = self.category_for(market.as_ref(), options);
        let mut params = Self::list_params(market.as_ref(), category, options);
        if category == MarketCategory::Spot && options.trigger {
            params.set_str("orderFilter", "StopOrder");
        }

        let request = ListRequest::new(Endpoint::OrderHistory, params, "order history")
            .page_size(self.page_sizes.orders)
            .no_cache(options.no_cache);
        let registry = self.ports.markets.as_ref();
        self.fetch_list(request, &self.history_query(since, limit, options), |record: &OrderRecord| {
            parse_order(record, category, registry)
        })
        .await
    }

    /// Executions over `[since, until]`.
    pub async fn fetch_my_trades(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        options: &QueryOptions,
    ) -> Result<Vec<NormalizedTrade>, ConnectorError> {
        let market = self.optional_market(symbol)?;
        let category = self.category_for(market.as_ref(), options);
        let params = Self::list_params(market.as_ref(), category, options);

        let request = ListRequest::new(Endpoint::Executions, params, "execution list")
            .page_size(self.page_sizes.executions)
            .no_cache(options.no_cache);
        let registry = self.ports.markets.as_ref();
        self.fetch_list(request, &self.history_query(since, limit, options), |record: &ExecutionRecord| {
            parse_trade(record, category, registry)
        })
        .await
    }

    /// Transaction log over `[since, until]`.
    ///
    /// The venue filters by coin, not by symbol, so entries of other
    /// symbols are dropped after parsing when a symbol is given.
    pub async fn fetch_income_history(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        options: &QueryOptions,
    ) -> Result<Vec<NormalizedIncome>, ConnectorError> {
        let market = self.optional_market(symbol)?;
        let category = self.category_for(market.as_ref(), options);

        let mut params = RequestParams::new();
        params.set_str("accountType", "UNIFIED");
        if market.is_some() || options.category.is_some() {
            params.set_str("category", category.as_str());
        }
        params
            .set_opt_str("baseCoin", market.as_ref().map(|m| m.base.as_str()))
            .set_opt_str("currency", options.currency.as_deref())
            .set_opt_str("type", options.income_type.as_deref());

        let request = ListRequest::new(Endpoint::TransactionLog, params, "transaction log")
            .page_size(self.page_sizes.transaction_log)
            .no_cache(options.no_cache);
        let registry = self.ports.markets.as_ref();
        let requested = market.as_ref().map(|m| m.symbol.as_str());
        self.fetch_list(
            request,
            &self.history_query(since, limit, options),
            |record: &TransactionLogRecord| parse_income(record, category, registry, requested),
        )
        .await
    }

    /// Open positions of a contract symbol, or of every settle coin.
    pub async fn fetch_positions(
        &self,
        symbol: Option<&str>,
        options: &QueryOptions,
    ) -> Result<Vec<Position>, ConnectorError> {
        let market = self.optional_market(symbol)?;
        let category = self.category_for(market.as_ref(), options);
        if category == MarketCategory::Spot {
            return Err(ConnectorError::unsupported_market(
                symbol.unwrap_or_default(),
                "positions exist only for contract and option markets",
            ));
        }

        let coins = match (&market, category) {
            (None, category) if category.is_contract() => {
                let coins = self.settle_coins(options);
                if coins.is_empty() {
                    return Err(ConnectorError::parameter_missing("settleCoin")
                        .with_context("category", category.as_str()));
                }
                coins.into_iter().map(Some).collect()
            }
            _ => vec![None],
        };

        let query = HistoryQuery::default();
        let registry = self.ports.markets.as_ref();
        let mut positions = Vec::new();
        for coin in coins {
            let mut params = Self::list_params(market.as_ref(), category, &QueryOptions::default());
            params.set_opt_str("settleCoin", coin.as_deref());
            let request = ListRequest::new(Endpoint::Positions, params, "position list")
                .page_size(self.page_sizes.positions)
                .no_cache(options.no_cache);
            positions.extend(
                self.fetch_list(request, &query, |record: &PositionRecord| {
                    Some(parse_position(record, category, registry))
                })
                .await?,
            );
        }
        Ok(positions)
    }
}
