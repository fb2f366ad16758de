//! Tick/step precision from the market descriptor.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::application::ports::PrecisionPort;
use crate::domain::market::MarketDescriptor;

/// Rounds prices to the nearest tick and truncates sizes to the step.
///
/// Truncating sizes never produces an order larger than requested.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickSizePrecision;

fn to_nearest(value: Decimal, tick: Decimal) -> Decimal {
    if tick <= Decimal::ZERO {
        return value;
    }
    (value / tick).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero) * tick
}

fn truncate_to(value: Decimal, step: Decimal) -> Decimal {
    if step <= Decimal::ZERO {
        return value;
    }
    (value / step).trunc() * step
}

impl PrecisionPort for TickSizePrecision {
    fn round_price(&self, market: &MarketDescriptor, value: Decimal) -> Decimal {
        to_nearest(value, market.precision.price)
    }

    fn round_amount(&self, market: &MarketDescriptor, value: Decimal) -> Decimal {
        truncate_to(value, market.precision.amount)
    }

    fn round_cost(&self, market: &MarketDescriptor, value: Decimal) -> Decimal {
        match market.precision.cost {
            Some(step) => truncate_to(value, step),
            None => truncate_to(value, market.precision.price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::MarketCategory;
    use rust_decimal_macros::dec;

    fn market() -> MarketDescriptor {
        MarketDescriptor::new("ETH/USDT", "ETHUSDT", MarketCategory::Spot, "ETH", "USDT")
            .with_precision(dec!(0.01), dec!(0.0001))
    }

    #[test]
    fn price_rounds_to_nearest_tick() {
        let p = TickSizePrecision;
        assert_eq!(p.round_price(&market(), dec!(1234.565)), dec!(1234.57));
        assert_eq!(p.round_price(&market(), dec!(1234.564)), dec!(1234.56));
    }

    #[test]
    fn amount_truncates_to_step() {
        let p = TickSizePrecision;
        assert_eq!(p.round_amount(&market(), dec!(0.12349)), dec!(0.1234));
    }

    #[test]
    fn cost_uses_cost_step_when_known() {
        let p = TickSizePrecision;
        assert_eq!(p.round_cost(&market(), dec!(10.129)), dec!(10.12));
        let with_cost = market().with_cost_precision(dec!(1));
        assert_eq!(p.round_cost(&with_cost, dec!(10.9)), dec!(10));
    }

    #[test]
    fn zero_tick_leaves_value() {
        let p = TickSizePrecision;
        let market = market().with_precision(dec!(0), dec!(0));
        assert_eq!(p.round_price(&market, dec!(1.23456)), dec!(1.23456));
    }
}
