//! Time windows for bounded history queries.

use serde::{Deserialize, Serialize};

use crate::domain::intent::WindowDirection;

/// Maximum span of one history request on the venue (7 days).
pub const MAX_WINDOW_MS: i64 = 604_800_000;

/// Time range of one request, in epoch milliseconds.
///
/// Either bound may be left open, in which case the venue applies its own
/// default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// `startTime`.
    pub start: Option<i64>,
    /// `endTime`.
    pub end: Option<i64>,
}

impl TimeRange {
    /// Closed range.
    #[must_use]
    pub const fn closed(start: i64, end: i64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Span in milliseconds when both bounds are set.
    #[must_use]
    pub fn span(&self) -> Option<i64> {
        Some(self.end? - self.start?)
    }
}

/// Walks `[floor, ceiling]` in contiguous sub-windows of at most `interval`.
///
/// Adjacent windows share their boundary millisecond, so an item stamped
/// exactly on it can come back twice; the fetcher deduplicates.
#[derive(Debug, Clone)]
pub struct WindowIter {
    floor: i64,
    ceiling: i64,
    interval: i64,
    direction: WindowDirection,
    cursor: i64,
    done: bool,
}

impl WindowIter {
    /// Create a walker. `interval` must be positive.
    #[must_use]
    pub const fn new(floor: i64, ceiling: i64, interval: i64, direction: WindowDirection) -> Self {
        let cursor = match direction {
            WindowDirection::EndToStart => ceiling,
            WindowDirection::StartToEnd => floor,
        };
        Self {
            floor,
            ceiling,
            interval,
            direction,
            cursor,
            done: interval <= 0 || floor > ceiling,
        }
    }
}

impl Iterator for WindowIter {
    type Item = TimeRange;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let window = match self.direction {
            WindowDirection::EndToStart => {
                let end = self.cursor;
                let start = end.saturating_sub(self.interval).max(self.floor);
                self.cursor = start;
                self.done = start <= self.floor;
                TimeRange::closed(start, end)
            }
            WindowDirection::StartToEnd => {
                let start = self.cursor;
                let end = start.saturating_add(self.interval).min(self.ceiling);
                self.cursor = end;
                self.done = end >= self.ceiling;
                TimeRange::closed(start, end)
            }
        };
        Some(window)
    }
}
