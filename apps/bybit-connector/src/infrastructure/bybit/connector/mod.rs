//! Bybit v5 connector service.
//!
//! Ties the parameter compiler, the response parser, the windowed history
//! fetcher and the leverage bracket table to the injected ports. Every
//! operation is a single `async fn`; nothing is spawned and pages are
//! requested one after another.
//!
//! # Usage
//!
//! ```rust,ignore
//! let connector = BybitConnector::new(ports, &config);
//! let order = connector.create_order(&intent).await?;
//! let trades = connector.fetch_my_trades(Some("BTC/USDT:USDT"), None, Some(100), &opts).await?;
//! ```

mod history;
mod leverage;
mod orders;

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::application::history::{HistoryItem, HistoryQuery, Page, PageSource, TimeRange, WindowedFetcher};
use crate::application::ports::{
    AccountRegistryPort, CallOptions, ClockPort, Endpoint, MarketRegistryPort, PrecisionPort,
    RequestParams, TransportPort,
};
use crate::config::{ConnectorConfig, PageSizesConfig};
use crate::domain::intent::QueryOptions;
use crate::domain::leverage::LeverageBracketTable;
use crate::domain::market::{MarketCategory, MarketDescriptor};
use crate::error::ConnectorError;

use super::api_types::{Envelope, ListResult};
use super::error::VenueErrorPolicy;

/// Collaborators the connector drives.
#[derive(Clone)]
pub struct ConnectorPorts {
    /// Signed HTTP transport.
    pub transport: Arc<dyn TransportPort>,
    /// Market metadata.
    pub markets: Arc<dyn MarketRegistryPort>,
    /// Tick/step rounding.
    pub precision: Arc<dyn PrecisionPort>,
    /// Wall clock.
    pub clock: Arc<dyn ClockPort>,
    /// Per-account leverage caches.
    pub accounts: Arc<dyn AccountRegistryPort>,
}

/// Order and risk operations against Bybit v5.
pub struct BybitConnector {
    ports: ConnectorPorts,
    brackets: Arc<LeverageBracketTable>,
    fetcher: WindowedFetcher,
    policy: VenueErrorPolicy,
    page_sizes: PageSizesConfig,
    default_category: MarketCategory,
    default_settle_coins: Vec<String>,
    read_retries: u32,
    write_retries: u32,
    auto_clip: bool,
    lazy_probe: bool,
    account: String,
}

impl BybitConnector {
    /// Create a connector with its own bracket table.
    #[must_use]
    pub fn new(ports: ConnectorPorts, config: &ConnectorConfig) -> Self {
        Self::with_bracket_table(ports, config, Arc::new(LeverageBracketTable::new()))
    }

    /// Create a connector sharing a bracket table with other connectors.
    #[must_use]
    pub fn with_bracket_table(
        ports: ConnectorPorts,
        config: &ConnectorConfig,
        brackets: Arc<LeverageBracketTable>,
    ) -> Self {
        Self {
            ports,
            brackets,
            fetcher: WindowedFetcher::new(config.history.max_window_ms),
            policy: VenueErrorPolicy::new(&config.leverage.extra_idempotent_codes),
            page_sizes: config.history.page_sizes.clone(),
            default_category: config.venue.category(),
            default_settle_coins: config.venue.default_settle_coins.clone(),
            read_retries: config.transport.read_retries,
            write_retries: config.transport.write_retries,
            auto_clip: config.history.auto_clip,
            lazy_probe: config.leverage.lazy_probe,
            account: config.venue.account.clone(),
        }
    }

    /// Shared bracket table.
    #[must_use]
    pub fn bracket_table(&self) -> Arc<LeverageBracketTable> {
        Arc::clone(&self.brackets)
    }

    /// Account whose leverage cache this connector uses.
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    fn market(&self, symbol: &str) -> Result<MarketDescriptor, ConnectorError> {
        self.ports.markets.market_for(symbol)
    }

    fn optional_market(&self, symbol: Option<&str>) -> Result<Option<MarketDescriptor>, ConnectorError> {
        symbol.map(|s| self.market(s)).transpose()
    }

    /// Category of a query: the market's, else the option, else the default.
    fn category_for(&self, market: Option<&MarketDescriptor>, options: &QueryOptions) -> MarketCategory {
        market
            .map(|m| m.category)
            .or(options.category)
            .unwrap_or(self.default_category)
    }

    fn settle_coins(&self, options: &QueryOptions) -> Vec<String> {
        let requested = options.requested_settle_coins();
        if requested.is_empty() {
            self.default_settle_coins.clone()
        } else {
            requested
        }
    }

    fn history_query(&self, since: Option<i64>, limit: Option<usize>, options: &QueryOptions) -> HistoryQuery {
        HistoryQuery {
            since,
            until: options.until,
            limit,
            loop_interval: options.loop_interval,
            direction: options.direction,
            auto_clip: options.auto_clip.unwrap_or(self.auto_clip),
            after_cursor: options.after_cursor.clone(),
        }
    }

    /// Send one request and check the envelope.
    async fn send(
        &self,
        endpoint: Endpoint,
        params: &RequestParams,
        no_cache: bool,
    ) -> Result<Envelope, ConnectorError> {
        let retries = if endpoint.is_write() {
            self.write_retries
        } else {
            self.read_retries
        };
        debug!(
            endpoint = %endpoint,
            category = ?params.get_str("category"),
            symbol = ?params.get_str("symbol"),
            fields = params.len(),
            "Sending compiled request"
        );

        let body = self
            .ports
            .transport
            .call(endpoint, params, CallOptions { retries, no_cache })
            .await
            .map_err(|e| self.policy.from_transport(e).with_context("endpoint", endpoint.path()))?;

        let envelope = Envelope::parse(&body)?;
        self.policy
            .ensure_success(&envelope)
            .map_err(|e| e.with_context("endpoint", endpoint.path()))?;
        Ok(envelope)
    }

    /// Send one request and decode its `result`.
    async fn request<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: &RequestParams,
        what: &str,
        no_cache: bool,
    ) -> Result<T, ConnectorError> {
        self.send(endpoint, params, no_cache).await?.decode(what)
    }

    /// Run a paginated list endpoint through the windowed fetcher.
    async fn fetch_list<R, T, F>(
        &self,
        request: ListRequest,
        query: &HistoryQuery,
        parse: F,
    ) -> Result<Vec<T>, ConnectorError>
    where
        R: DeserializeOwned + Send + 'static,
        T: HistoryItem + Send + 'static,
        F: Fn(&R) -> Option<T> + Send + Sync,
    {
        let source = ListSource {
            connector: self,
            request,
            parse,
            record: PhantomData,
        };
        self.fetcher
            .fetch(query, self.ports.clock.now_ms(), &source)
            .await
    }
}

/// Fixed part of a list request.
struct ListRequest {
    endpoint: Endpoint,
    params: RequestParams,
    page_size: Option<u32>,
    what: &'static str,
    no_cache: bool,
}

impl ListRequest {
    fn new(endpoint: Endpoint, params: RequestParams, what: &'static str) -> Self {
        Self {
            endpoint,
            params,
            page_size: None,
            what,
            no_cache: false,
        }
    }

    const fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    const fn no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }
}

/// One Bybit list endpoint as a page source.
///
/// Sets `startTime`/`endTime` from the range when bounded, `limit` from
/// the page size and `cursor` from the previous page's `nextPageCursor`.
struct ListSource<'a, R, T, F> {
    connector: &'a BybitConnector,
    request: ListRequest,
    parse: F,
    record: PhantomData<fn(R) -> T>,
}

#[async_trait]
impl<R, T, F> PageSource for ListSource<'_, R, T, F>
where
    R: DeserializeOwned + Send + 'static,
    T: HistoryItem + Send + 'static,
    F: Fn(&R) -> Option<T> + Send + Sync,
{
    type Item = T;

    async fn fetch_page(
        &self,
        range: TimeRange,
        cursor: Option<&str>,
    ) -> Result<Page<T>, ConnectorError> {
        let mut params = self.request.params.clone();
        if let Some(start) = range.start {
            params.set_int("startTime", start);
        }
        if let Some(end) = range.end {
            params.set_int("endTime", end);
        }
        if let Some(size) = self.request.page_size {
            params.set_int("limit", i64::from(size));
        }
        if let Some(cursor) = cursor.filter(|c| !c.is_empty()) {
            params.set_str("cursor", cursor);
        }

        let result: ListResult<R> = self
            .connector
            .request(self.request.endpoint, &params, self.request.what, self.request.no_cache)
            .await?;
        Ok(Page {
            items: result.list.iter().filter_map(&self.parse).collect(),
            next_cursor: result.next_page_cursor,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use rust_decimal_macros::dec;

    use super::{BybitConnector, ConnectorPorts};
    use crate::config::ConnectorConfig;
    use crate::domain::market::{MarketCategory, MarketDescriptor};
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::memory::{InMemoryAccountRegistry, InMemoryMarketRegistry, ScriptedTransport};
    use crate::infrastructure::precision::TickSizePrecision;

    pub const NOW: i64 = 1_700_000_000_000;

    pub fn markets() -> InMemoryMarketRegistry {
        InMemoryMarketRegistry::with_markets([
            MarketDescriptor::new("BTC/USDT:USDT", "BTCUSDT", MarketCategory::Linear, "BTC", "USDT")
                .with_settle("USDT")
                .with_precision(dec!(0.1), dec!(0.001)),
            MarketDescriptor::new("ETH/USDT", "ETHUSDT", MarketCategory::Spot, "ETH", "USDT")
                .with_precision(dec!(0.01), dec!(0.0001)),
        ])
    }

    pub fn connector(transport: Arc<ScriptedTransport>) -> BybitConnector {
        let ports = ConnectorPorts {
            transport,
            markets: Arc::new(markets()),
            precision: Arc::new(TickSizePrecision),
            clock: Arc::new(FixedClock::new(NOW)),
            accounts: Arc::new(InMemoryAccountRegistry::new()),
        };
        BybitConnector::new(ports, &ConnectorConfig::default())
    }
}
