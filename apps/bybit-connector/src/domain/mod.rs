//! Domain layer.
//!
//! Value objects and pure logic. Nothing here performs I/O.

pub mod intent;
pub mod leverage;
pub mod market;
pub mod records;
pub mod value_objects;

pub use intent::{OrderIntent, OrderOptions, QueryOptions, WindowDirection};
pub use leverage::{
    LeverageBracket, LeverageBracketTable, LeverageCache, LeverageLadder, RiskLimitRow,
    build_ladders,
};
pub use market::{MarketCategory, MarketDescriptor, MarketLimits, MarketPrecision};
pub use records::{Fee, NormalizedIncome, NormalizedOrder, NormalizedTrade, Position};
pub use value_objects::{OrderSide, OrderStatus, OrderType, PositionSide, TimeInForce};
