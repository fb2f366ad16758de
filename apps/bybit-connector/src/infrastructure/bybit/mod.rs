//! Bybit v5 Adapter
//!
//! Translation between venue-neutral intents and the Bybit v5 REST API:
//! - Parameter compiler with per-category field rules
//! - Explicit per-record-shape response decoders
//! - Response parser producing normalized records
//! - `retCode` classification and the idempotent-success allow-list
//! - `BybitConnector`, the service exposing every operation

pub mod api_types;
pub mod category_rules;
pub mod compiler;
pub mod connector;
pub mod error;
pub mod parser;
pub mod request;

pub use compiler::{compile_amend, compile_cancel, compile_cancel_all, compile_create};
pub use connector::{BybitConnector, ConnectorPorts};
pub use error::{IDEMPOTENT_CODES, VenueErrorPolicy, classify_ret_code};
pub use parser::{parse_income, parse_order, parse_position, parse_trade};
pub use request::{CompiledRequest, OrderRequestBuilder};
