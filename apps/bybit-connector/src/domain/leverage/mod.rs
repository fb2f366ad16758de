//! Leverage brackets, maintenance margin and the leverage cache.

mod bracket;
mod cache;
mod table;

pub use bracket::{LeverageBracket, LeverageLadder, RiskLimitRow, build_ladders};
pub use cache::LeverageCache;
pub use table::LeverageBracketTable;
