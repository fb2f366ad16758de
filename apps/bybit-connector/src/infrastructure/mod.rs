//! Infrastructure Layer
//!
//! Adapters for the ports defined in the application layer:
//!
//! - `bybit/`: Bybit v5 compiler, decoders, parser and connector service
//! - `precision`: tick/step rounding from the market descriptor
//! - `clock`: system and fixed clocks
//! - `memory/`: in-memory registries and a scripted transport

pub mod bybit;
pub mod clock;
pub mod memory;
pub mod precision;

pub use clock::{FixedClock, SystemClock};
pub use memory::{InMemoryAccountRegistry, InMemoryMarketRegistry, RecordedCall, ScriptedTransport};
pub use precision::TickSizePrecision;
