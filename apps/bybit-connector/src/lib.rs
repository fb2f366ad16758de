// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Bybit Connector - Order & Risk Translation Engine
//!
//! Translates venue-neutral order intents into Bybit v5 request parameters,
//! decodes the venue's responses into normalized records, walks history
//! endpoints under the 7-day window limit, and maintains leverage bracket
//! ladders for maintenance-margin queries.
//!
//! # Architecture (Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: value objects and pure logic
//!   - `intent`: order intent and query option bags
//!   - `market`: market descriptor and category
//!   - `records`: normalized order, trade, income and position
//!   - `leverage`: bracket ladders, the shared bracket table, leverage cache
//!
//! - **Application**: ports and orchestration
//!   - `ports`: transport, market registry, precision, clock, accounts
//!   - `history`: windowed, deduplicating, cursor-paginated fetcher
//!
//! - **Infrastructure**: adapters
//!   - `bybit`: compiler, decoders, parser, error policy, `BybitConnector`
//!   - `memory`: in-memory registries and a scripted transport
//!   - `precision`, `clock`: default port implementations

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Ports and the history fetcher.
pub mod application;

/// Infrastructure layer - Bybit adapter and in-memory adapters.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// YAML configuration.
pub mod config;

/// Error types.
pub mod error;

/// Tracing setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::{
    Fee, LeverageBracket, LeverageBracketTable, LeverageCache, LeverageLadder, MarketCategory,
    MarketDescriptor, NormalizedIncome, NormalizedOrder, NormalizedTrade, OrderIntent,
    OrderOptions, OrderSide, OrderStatus, OrderType, Position, PositionSide, QueryOptions,
    RiskLimitRow, TimeInForce, WindowDirection, build_ladders,
};

// Application re-exports
pub use application::history::{HistoryQuery, MAX_WINDOW_MS, WindowedFetcher};
pub use application::ports::{
    AccountRegistryPort, CallOptions, ClockPort, Endpoint, MarketRegistryPort, PrecisionPort,
    RequestParams, TransportError, TransportPort,
};

// Infrastructure re-exports
pub use infrastructure::bybit::{BybitConnector, ConnectorPorts};
pub use infrastructure::{
    FixedClock, InMemoryAccountRegistry, InMemoryMarketRegistry, ScriptedTransport, SystemClock,
    TickSizePrecision,
};

// Cross-cutting re-exports
pub use config::{ConnectorConfig, load_config, load_config_from_string};
pub use error::{ConnectorError, ErrorCode};
pub use telemetry::init_tracing;
