//! In-memory adapters.

mod registry;
mod transport;

pub use registry::{InMemoryAccountRegistry, InMemoryMarketRegistry};
pub use transport::{RecordedCall, ScriptedTransport};
