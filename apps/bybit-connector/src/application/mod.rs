//! Application Layer
//!
//! - **Ports**: interfaces for the transport, registries, precision and clock
//! - **History**: the windowed, cursor-paginated history fetcher

pub mod history;
pub mod ports;

pub use history::*;
pub use ports::*;
