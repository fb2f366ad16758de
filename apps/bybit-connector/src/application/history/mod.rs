//! Windowed history fetching.

mod fetcher;
mod window;

pub use fetcher::{HistoryItem, HistoryQuery, Page, PageSource, WindowedFetcher};
pub use window::{MAX_WINDOW_MS, TimeRange, WindowIter};
