//! Leverage setting, risk-limit brackets and margin queries.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{info, warn};

use super::{BybitConnector, ListRequest};
use crate::application::history::HistoryQuery;
use crate::application::ports::{Endpoint, MarketRegistryPort, RequestParams};
use crate::domain::intent::QueryOptions;
use crate::domain::leverage::{RiskLimitRow, build_ladders};
use crate::domain::market::MarketCategory;
use crate::error::ConnectorError;
use crate::infrastructure::bybit::api_types::RiskLimitRecord;
use crate::infrastructure::bybit::parser::resolve_symbol;

/// Resolve one risk-limit record; rows without a capacity are dropped.
fn risk_limit_row(
    record: &RiskLimitRecord,
    category: MarketCategory,
    registry: &dyn MarketRegistryPort,
) -> Option<RiskLimitRow> {
    Some(RiskLimitRow {
        symbol: resolve_symbol(registry, &record.symbol, category),
        risk_limit_value: record.risk_limit_value?,
        maintenance_margin: record.maintenance_margin.unwrap_or_default(),
        max_leverage: record.max_leverage.unwrap_or_default(),
    })
}

impl BybitConnector {
    /// Set buy and sell leverage of a contract symbol.
    ///
    /// "Leverage not modified" style venue codes count as success and
    /// update the account's leverage cache. Any other rejection drops the
    /// cached value.
    pub async fn set_leverage(&self, leverage: u32, symbol: &str) -> Result<(), ConnectorError> {
        let market = self.market(symbol)?;
        if !market.is_contract() {
            return Err(ConnectorError::unsupported_market(
                symbol,
                "leverage can only be set on linear and inverse markets",
            ));
        }
        if leverage == 0 {
            return Err(ConnectorError::parameter_invalid(
                "leverage",
                "leverage must be at least 1",
            ));
        }

        let value = leverage.to_string();
        let mut params = RequestParams::new();
        params
            .set_str("category", market.category.as_str())
            .set_str("symbol", market.id.as_str())
            .set_str("buyLeverage", value.as_str())
            .set_str("sellLeverage", value.as_str());

        let cache = self.ports.accounts.leverage_cache(&self.account);
        match self.send(Endpoint::SetLeverage, &params, false).await {
            Ok(_) => {}
            Err(err) if self.policy.is_idempotent(&err) => {
                warn!(symbol = %symbol, leverage, error = %err, "Leverage already in requested state");
            }
            Err(err) => {
                // venue state is unknown after a rejection; the next lookup re-probes
                cache.invalidate(&market.symbol);
                return Err(err);
            }
        }

        cache.set(market.symbol.as_str(), leverage);
        info!(symbol = %symbol, leverage, account = %self.account, "Leverage set");
        Ok(())
    }

    /// Load the risk-limit table and rebuild the ladders it covers.
    ///
    /// Returns the number of symbols whose ladder was replaced. Ladders of
    /// symbols absent from the response are kept.
    pub async fn load_leverage_brackets(
        &self,
        symbol: Option<&str>,
        options: &QueryOptions,
    ) -> Result<usize, ConnectorError> {
        let market = self.optional_market(symbol)?;
        let category = self.category_for(market.as_ref(), options);
        if !category.is_contract() {
            return Err(ConnectorError::unsupported_market(
                symbol.unwrap_or(category.as_str()),
                "risk limits exist only for linear and inverse markets",
            ));
        }

        let mut params = RequestParams::new();
        params.set_str("category", category.as_str());
        if let Some(market) = &market {
            params.set_str("symbol", market.id.as_str());
        }

        let request = ListRequest::new(Endpoint::RiskLimit, params, "risk limit table")
            .no_cache(options.no_cache);
        let registry = self.ports.markets.as_ref();
        let rows = self
            .fetch_list(request, &HistoryQuery::default(), |record: &RiskLimitRecord| {
                risk_limit_row(record, category, registry)
            })
            .await?;

        let row_count = rows.len();
        let replaced = self.brackets.replace(build_ladders(rows));
        info!(
            category = %category,
            symbol = ?symbol,
            rows = row_count,
            symbols = replaced,
            "Leverage brackets loaded"
        );
        Ok(replaced)
    }

    /// Maintenance margin of a position of `notional` in `symbol`.
    ///
    /// Fails with `DATA_NOT_FOUND` when no ladder is loaded for the symbol
    /// and `PARAMETER_INVALID` when the notional is below every bracket.
    pub fn calc_maint_margin(&self, symbol: &str, notional: Decimal) -> Result<Decimal, ConnectorError> {
        self.brackets.maint_margin(symbol, notional)
    }

    /// Highest leverage allowed at `notional`; zero when unknown.
    #[must_use]
    pub fn max_leverage(&self, symbol: &str, notional: Decimal) -> u32 {
        self.brackets.max_leverage(symbol, notional)
    }

    /// Current leverage of a contract symbol, best effort.
    ///
    /// Loads the symbol's ladder if missing, then answers from the account
    /// cache, probing the position list on a miss. Failures are logged and
    /// yield `None`.
    pub async fn get_leverage(&self, symbol: &str) -> Option<u32> {
        let market = match self.market(symbol) {
            Ok(market) if market.is_contract() => market,
            Ok(_) => return None,
            Err(err) => {
                warn!(symbol = %symbol, error = %err, "Leverage lookup for unknown market");
                return None;
            }
        };

        if !self.brackets.contains(&market.symbol) {
            if let Err(err) = self
                .load_leverage_brackets(Some(symbol), &QueryOptions::default())
                .await
            {
                warn!(symbol = %symbol, error = %err, "Lazy bracket load failed");
            }
        }

        let cache = self.ports.accounts.leverage_cache(&self.account);
        if let Some(leverage) = cache.get(&market.symbol) {
            return Some(leverage);
        }
        if !self.lazy_probe {
            return None;
        }

        let positions = match self.fetch_positions(Some(symbol), &QueryOptions::default()).await {
            Ok(positions) => positions,
            Err(err) => {
                warn!(symbol = %symbol, error = %err, "Leverage probe failed");
                return None;
            }
        };
        let leverage = positions
            .iter()
            .filter_map(|p| p.leverage)
            .max()?
            .round()
            .to_u32()
            .filter(|l| *l > 0)?;
        cache.set(market.symbol.as_str(), leverage);
        Some(leverage)
    }
}
