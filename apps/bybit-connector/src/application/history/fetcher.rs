//! Windowed history fetcher.
//!
//! Satisfies a `(since, until, limit)` query against an endpoint that caps
//! the time span of every request and paginates with an opaque cursor.
//! Requests are issued strictly one after another.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::window::{MAX_WINDOW_MS, TimeRange, WindowIter};
use crate::domain::intent::WindowDirection;
use crate::domain::leverage::RiskLimitRow;
use crate::domain::records::{NormalizedIncome, NormalizedOrder, NormalizedTrade, Position};
use crate::error::{ConnectorError, ErrorCode};

/// Item returned by a paginated history endpoint.
pub trait HistoryItem {
    /// Key used to drop duplicates across pages and windows.
    fn dedup_key(&self) -> String;
}

/// Dedup key: the id, else `symbol:client_id`, else `symbol:timestamp`.
fn fallback_key(id: &str, symbol: &str, client_id: Option<&str>, timestamp: Option<i64>) -> String {
    if !id.is_empty() {
        return id.to_string();
    }
    match client_id.filter(|c| !c.is_empty()) {
        Some(client_id) => format!("{symbol}:{client_id}"),
        None => format!("{symbol}:{}", timestamp.unwrap_or_default()),
    }
}

impl HistoryItem for NormalizedOrder {
    fn dedup_key(&self) -> String {
        fallback_key(
            &self.id,
            &self.symbol,
            self.client_order_id.as_deref(),
            self.timestamp,
        )
    }
}

impl HistoryItem for NormalizedTrade {
    fn dedup_key(&self) -> String {
        fallback_key(
            &self.id,
            &self.symbol,
            self.client_order_id.as_deref(),
            self.timestamp,
        )
    }
}

impl HistoryItem for NormalizedIncome {
    fn dedup_key(&self) -> String {
        fallback_key(
            &self.transaction_id,
            self.symbol.as_deref().unwrap_or_default(),
            None,
            self.timestamp,
        )
    }
}

impl HistoryItem for Position {
    fn dedup_key(&self) -> String {
        format!("{}:{}", self.symbol, self.position_idx)
    }
}

impl HistoryItem for RiskLimitRow {
    fn dedup_key(&self) -> String {
        format!("{}:{}", self.symbol, self.risk_limit_value.normalize())
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Cursor for the next page; `None` or empty when exhausted.
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Last page.
    #[must_use]
    pub const fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }
}

/// Performs one page request for a time range.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Item type.
    type Item: HistoryItem + Send;

    /// Fetch one page. `cursor` is `None` for the first page of a range.
    async fn fetch_page(
        &self,
        range: TimeRange,
        cursor: Option<&str>,
    ) -> Result<Page<Self::Item>, ConnectorError>;
}

/// A bounded history query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    /// Lower bound (ms).
    pub since: Option<i64>,
    /// Upper bound (ms).
    pub until: Option<i64>,
    /// Stop once this many unique items are collected.
    pub limit: Option<usize>,
    /// Explicit sub-window length; enables chunked mode.
    pub loop_interval: Option<i64>,
    /// Chunk walking direction.
    pub direction: Option<WindowDirection>,
    /// Clamp or split ranges wider than the venue window instead of failing.
    pub auto_clip: bool,
    /// Resume the first range from this cursor.
    pub after_cursor: Option<String>,
}

/// Drives a [`PageSource`] over one or more time windows.
#[derive(Debug, Clone, Copy)]
pub struct WindowedFetcher {
    max_window_ms: i64,
}

impl Default for WindowedFetcher {
    fn default() -> Self {
        Self::new(MAX_WINDOW_MS)
    }
}

struct Collector<T> {
    items: Vec<T>,
    seen: HashSet<String>,
    limit: Option<usize>,
}

impl<T: HistoryItem> Collector<T> {
    fn new(limit: Option<usize>) -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            limit: limit.filter(|l| *l > 0),
        }
    }

    fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.items.len() >= limit)
    }

    fn extend(&mut self, page: Vec<T>) {
        for item in page {
            if self.is_full() {
                return;
            }
            if self.seen.insert(item.dedup_key()) {
                self.items.push(item);
            }
        }
    }
}

impl WindowedFetcher {
    /// Create a fetcher for a venue window.
    #[must_use]
    pub const fn new(max_window_ms: i64) -> Self {
        Self { max_window_ms }
    }

    /// Venue window.
    #[must_use]
    pub const fn max_window_ms(&self) -> i64 {
        self.max_window_ms
    }

    /// Run a query to completion.
    pub async fn fetch<S>(
        &self,
        query: &HistoryQuery,
        now_ms: i64,
        source: &S,
    ) -> Result<Vec<S::Item>, ConnectorError>
    where
        S: PageSource + ?Sized,
    {
        if let (Some(since), Some(until)) = (query.since, query.until) {
            if since > until {
                return Err(ConnectorError::parameter_invalid(
                    "since",
                    format!("since {since} is after until {until}"),
                ));
            }
        }

        let mut collector = Collector::new(query.limit);

        let Some(requested) = query.loop_interval else {
            return self.fetch_single(query, now_ms, source, collector).await;
        };
        let interval = self.checked_interval(requested, query.auto_clip)?;
        self.fetch_chunked(query, interval, now_ms, source, &mut collector)
            .await?;
        Ok(collector.items)
    }

    async fn fetch_single<S>(
        &self,
        query: &HistoryQuery,
        now_ms: i64,
        source: &S,
        mut collector: Collector<S::Item>,
    ) -> Result<Vec<S::Item>, ConnectorError>
    where
        S: PageSource + ?Sized,
    {
        let range = TimeRange {
            start: query.since,
            end: query.until,
        };
        if range.span().is_some_and(|span| span > self.max_window_ms) {
            if !query.auto_clip {
                return Err(ConnectorError::parameter_invalid(
                    "until",
                    format!(
                        "time range {}ms exceeds the {}ms venue window",
                        range.span().unwrap_or_default(),
                        self.max_window_ms
                    ),
                ));
            }
            debug!(span_ms = ?range.span(), "Range wider than venue window, chunking");
            self.fetch_chunked(query, self.max_window_ms, now_ms, source, &mut collector)
                .await?;
            return Ok(collector.items);
        }

        match Self::drain(range, query.after_cursor.clone(), source, &mut collector).await {
            Ok(()) => Ok(collector.items),
            Err(err) if err.code() == ErrorCode::TimeRangeExceeded && query.auto_clip => {
                warn!(error = %err, "Venue rejected range, falling back to chunked mode");
                let mut collector = Collector::new(query.limit);
                self.fetch_chunked(query, self.max_window_ms, now_ms, source, &mut collector)
                    .await?;
                Ok(collector.items)
            }
            Err(err) => Err(err),
        }
    }

    fn checked_interval(&self, requested: i64, auto_clip: bool) -> Result<i64, ConnectorError> {
        if requested <= 0 {
            return Err(ConnectorError::parameter_invalid(
                "loopInterval",
                format!("loop interval must be positive, got {requested}"),
            ));
        }
        if requested > self.max_window_ms {
            if auto_clip {
                return Ok(self.max_window_ms);
            }
            return Err(ConnectorError::parameter_invalid(
                "loopInterval",
                format!(
                    "loop interval {requested}ms exceeds the {}ms venue window",
                    self.max_window_ms
                ),
            ));
        }
        Ok(requested)
    }

    async fn fetch_chunked<S>(
        &self,
        query: &HistoryQuery,
        interval: i64,
        now_ms: i64,
        source: &S,
        collector: &mut Collector<S::Item>,
    ) -> Result<(), ConnectorError>
    where
        S: PageSource + ?Sized,
    {
        let direction = match (query.direction, query.since) {
            (Some(WindowDirection::StartToEnd), None) => {
                return Err(ConnectorError::parameter_missing("since")
                    .with_context("direction", "startToEnd"));
            }
            (Some(direction), _) => direction,
            (None, None) => WindowDirection::EndToStart,
            (None, Some(_)) => WindowDirection::StartToEnd,
        };
        let floor = query.since.unwrap_or(0);
        let ceiling = query.until.unwrap_or(now_ms);

        let mut resume = query.after_cursor.clone();
        for window in WindowIter::new(floor, ceiling, interval, direction) {
            if collector.is_full() {
                break;
            }
            debug!(
                start = ?window.start,
                end = ?window.end,
                collected = collector.items.len(),
                "Fetching history window"
            );
            Self::drain(window, resume.take(), source, collector).await?;
        }
        Ok(())
    }

    /// Follow the cursor chain of one range.
    async fn drain<S>(
        range: TimeRange,
        mut cursor: Option<String>,
        source: &S,
        collector: &mut Collector<S::Item>,
    ) -> Result<(), ConnectorError>
    where
        S: PageSource + ?Sized,
    {
        loop {
            let page = source.fetch_page(range, cursor.as_deref()).await?;
            let empty = page.items.is_empty();
            collector.extend(page.items);
            if empty || collector.is_full() {
                return Ok(());
            }
            match page.next_cursor.filter(|c| !c.is_empty()) {
                Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                    warn!(cursor = %next, "Venue repeated pagination cursor, stopping");
                    return Ok(());
                }
                Some(next) => cursor = Some(next),
                None => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const DAY: i64 = 86_400_000;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Item {
        id: String,
        ts: i64,
    }

    impl HistoryItem for Item {
        fn dedup_key(&self) -> String {
            self.id.clone()
        }
    }

    /// Serves items by timestamp, two per page, and records every call.
    #[derive(Default)]
    struct FakeSource {
        items: Vec<Item>,
        reject_wider_than: Option<i64>,
        repeat_cursor: bool,
        calls: Mutex<Vec<(TimeRange, Option<String>)>>,
    }

    impl FakeSource {
        fn with_items(timestamps: &[i64]) -> Self {
            Self {
                items: timestamps
                    .iter()
                    .map(|ts| Item {
                        id: format!("id-{ts}"),
                        ts: *ts,
                    })
                    .collect(),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<(TimeRange, Option<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for FakeSource {
        type Item = Item;

        async fn fetch_page(
            &self,
            range: TimeRange,
            cursor: Option<&str>,
        ) -> Result<Page<Item>, ConnectorError> {
            self.calls
                .lock()
                .unwrap()
                .push((range, cursor.map(str::to_string)));
            if let Some(limit) = self.reject_wider_than {
                if range.span().is_none_or(|span| span > limit) {
                    return Err(ConnectorError::new(ErrorCode::TimeRangeExceeded, "too wide"));
                }
            }
            let matching: Vec<Item> = self
                .items
                .iter()
                .filter(|i| range.start.is_none_or(|s| i.ts >= s))
                .filter(|i| range.end.is_none_or(|e| i.ts <= e))
                .cloned()
                .collect();
            let offset: usize = if self.repeat_cursor {
                0
            } else {
                cursor.map_or(0, |c| c.parse().unwrap())
            };
            let page: Vec<Item> = matching.iter().skip(offset).take(2).cloned().collect();
            let next = offset + page.len();
            let next_cursor = if self.repeat_cursor {
                Some("same".to_string())
            } else if next < matching.len() {
                Some(next.to_string())
            } else {
                None
            };
            Ok(Page {
                items: page,
                next_cursor,
            })
        }
    }

    #[tokio::test]
    async fn single_request_follows_cursor() {
        let source = FakeSource::with_items(&[1, 2, 3, 4, 5]);
        let query = HistoryQuery {
            since: Some(0),
            until: Some(10),
            ..HistoryQuery::default()
        };
        let items = WindowedFetcher::default().fetch(&query, 100, &source).await.unwrap();
        assert_eq!(items.len(), 5);
        let calls = source.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].1, None);
        assert_eq!(calls[1].1.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn span_over_window_rejected_before_any_call() {
        let source = FakeSource::with_items(&[1]);
        let query = HistoryQuery {
            since: Some(0),
            until: Some(MAX_WINDOW_MS + 1),
            ..HistoryQuery::default()
        };
        let err = WindowedFetcher::default().fetch(&query, 0, &source).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ParameterInvalid);
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn span_over_window_chunks_with_auto_clip() {
        let t0 = 1_000 * DAY;
        let source = FakeSource::with_items(&[t0 + DAY, t0 + 10 * DAY, t0 + 20 * DAY]);
        let query = HistoryQuery {
            since: Some(t0),
            until: Some(t0 + 30 * DAY),
            auto_clip: true,
            ..HistoryQuery::default()
        };
        let items = WindowedFetcher::default().fetch(&query, 0, &source).await.unwrap();
        assert_eq!(items.len(), 3);
        assert!(source.calls().iter().all(|(r, _)| r.span().unwrap() <= MAX_WINDOW_MS));
    }

    #[tokio::test]
    async fn venue_rejection_falls_back_to_chunks() {
        let now = 30 * DAY;
        let mut source = FakeSource::with_items(&[DAY, 15 * DAY, 29 * DAY]);
        source.reject_wider_than = Some(MAX_WINDOW_MS);
        let query = HistoryQuery {
            until: Some(now),
            auto_clip: true,
            ..HistoryQuery::default()
        };
        let items = WindowedFetcher::default().fetch(&query, now, &source).await.unwrap();
        assert_eq!(items.len(), 3);
        let calls = source.calls();
        assert_eq!(calls[0].0.start, None);
        assert_eq!(calls[1].0.end, Some(now));
    }

    #[tokio::test]
    async fn venue_rejection_without_auto_clip_propagates() {
        let mut source = FakeSource::with_items(&[1]);
        source.reject_wider_than = Some(MAX_WINDOW_MS);
        let query = HistoryQuery {
            until: Some(10),
            ..HistoryQuery::default()
        };
        let err = WindowedFetcher::default().fetch(&query, 10, &source).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::TimeRangeExceeded);
    }

    #[tokio::test]
    async fn chunked_end_to_start_covers_range() {
        let t0 = 1_000 * DAY;
        let until = t0 + 30 * DAY;
        let source = FakeSource::default();
        let query = HistoryQuery {
            since: Some(t0),
            until: Some(until),
            loop_interval: Some(MAX_WINDOW_MS),
            direction: Some(WindowDirection::EndToStart),
            ..HistoryQuery::default()
        };
        WindowedFetcher::default().fetch(&query, 0, &source).await.unwrap();
        let calls = source.calls();
        assert_eq!(calls.first().unwrap().0.end, Some(until));
        assert_eq!(calls.last().unwrap().0.start, Some(t0));
        for pair in calls.windows(2) {
            assert_eq!(pair[1].0.end, pair[0].0.start);
        }
    }

    #[tokio::test]
    async fn duplicate_on_window_boundary_kept_once() {
        let t0 = 1_000 * DAY;
        let boundary = t0 + 2 * DAY;
        let source = FakeSource::with_items(&[t0 + DAY, boundary, t0 + 3 * DAY]);
        let query = HistoryQuery {
            since: Some(t0),
            until: Some(t0 + 4 * DAY),
            loop_interval: Some(2 * DAY),
            ..HistoryQuery::default()
        };
        let items = WindowedFetcher::default().fetch(&query, 0, &source).await.unwrap();
        let boundary_hits = items.iter().filter(|i| i.ts == boundary).count();
        assert_eq!(boundary_hits, 1);
        assert_eq!(items.len(), 3);
    }

    #[tokio::test]
    async fn cursor_reset_for_each_window() {
        let source = FakeSource::with_items(&[1, 2, 3, 11, 12, 13]);
        let query = HistoryQuery {
            since: Some(0),
            until: Some(20),
            loop_interval: Some(10),
            direction: Some(WindowDirection::StartToEnd),
            ..HistoryQuery::default()
        };
        WindowedFetcher::default().fetch(&query, 0, &source).await.unwrap();
        let first_of_second_window = source
            .calls()
            .into_iter()
            .find(|(r, _)| r.start == Some(10))
            .unwrap();
        assert_eq!(first_of_second_window.1, None);
    }

    #[tokio::test]
    async fn stops_at_limit() {
        let source = FakeSource::with_items(&[1, 2, 3, 4, 5, 6]);
        let query = HistoryQuery {
            since: Some(0),
            until: Some(10),
            limit: Some(3),
            ..HistoryQuery::default()
        };
        let items = WindowedFetcher::default().fetch(&query, 0, &source).await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn repeated_cursor_stops_pagination() {
        let mut source = FakeSource::with_items(&[1, 2, 3, 4]);
        source.repeat_cursor = true;
        let query = HistoryQuery {
            since: Some(0),
            until: Some(10),
            ..HistoryQuery::default()
        };
        let items = WindowedFetcher::default().fetch(&query, 0, &source).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn start_to_end_requires_since() {
        let source = FakeSource::default();
        let query = HistoryQuery {
            loop_interval: Some(DAY),
            direction: Some(WindowDirection::StartToEnd),
            ..HistoryQuery::default()
        };
        let err = WindowedFetcher::default().fetch(&query, 10 * DAY, &source).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ParameterMissing);
        assert_eq!(err.context_value("field"), Some("since"));
    }

    #[tokio::test]
    async fn oversized_interval_clamped_or_rejected() {
        let source = FakeSource::default();
        let mut query = HistoryQuery {
            since: Some(0),
            until: Some(DAY),
            loop_interval: Some(MAX_WINDOW_MS * 2),
            ..HistoryQuery::default()
        };
        let err = WindowedFetcher::default().fetch(&query, 0, &source).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ParameterInvalid);

        query.auto_clip = true;
        WindowedFetcher::default().fetch(&query, 0, &source).await.unwrap();
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn since_after_until_rejected() {
        let source = FakeSource::default();
        let query = HistoryQuery {
            since: Some(10),
            until: Some(5),
            ..HistoryQuery::default()
        };
        assert!(WindowedFetcher::default().fetch(&query, 0, &source).await.is_err());
    }
}
