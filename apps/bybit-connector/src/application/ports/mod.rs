//! Application Ports
//!
//! Interfaces the connector drives. Adapters live in infrastructure.

mod account_registry_port;
mod clock_port;
mod market_registry_port;
mod precision_port;
mod transport_port;

pub use account_registry_port::AccountRegistryPort;
pub use clock_port::ClockPort;
pub use market_registry_port::MarketRegistryPort;
pub use precision_port::PrecisionPort;
pub use transport_port::{
    CallOptions, Endpoint, HttpMethod, ParamValue, RequestParams, TransportError, TransportPort,
    format_decimal,
};
