//! Order value objects.

mod order_side;
mod order_status;
mod order_type;
mod position_side;
mod time_in_force;

pub use order_side::OrderSide;
pub use order_status::OrderStatus;
pub use order_type::OrderType;
pub use position_side::{
    POSITION_IDX_HEDGE_LONG, POSITION_IDX_HEDGE_SHORT, POSITION_IDX_ONE_WAY, PositionSide,
};
pub use time_in_force::TimeInForce;
