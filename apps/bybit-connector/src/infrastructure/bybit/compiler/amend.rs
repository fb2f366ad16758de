//! `EditOrder` compilation.

use rust_decimal::Decimal;

use super::order::apply_exits;
use super::{requested_fields, resolve_triggers};
use crate::application::ports::{Endpoint, PrecisionPort};
use crate::domain::intent::OrderIntent;
use crate::domain::market::MarketDescriptor;
use crate::error::ConnectorError;
use crate::infrastructure::bybit::category_rules::check_fields;
use crate::infrastructure::bybit::request::{CompiledRequest, OrderRequestBuilder};

/// Compile an amendment of a resting order.
///
/// Only fields the intent actually sets are sent; an amendment with nothing
/// to change still reaches the venue, which rejects it.
pub fn compile_amend(
    order_id: Option<&str>,
    intent: &OrderIntent,
    market: &MarketDescriptor,
    precision: &dyn PrecisionPort,
) -> Result<CompiledRequest, ConnectorError> {
    let options = &intent.options;
    check_fields(market.category, requested_fields(options))?;

    let mut builder = OrderRequestBuilder::new(market, precision);
    builder.order_ref(order_id, options.client_order_id.as_deref())?;

    if intent.amount > Decimal::ZERO {
        super::order::ensure_above_step("amount", intent.amount, builder.rounded_amount(intent.amount))?;
        builder.quantity(intent.amount);
    }
    if let Some(price) = intent.price.filter(|p| *p > Decimal::ZERO) {
        builder.price(price);
    }

    let triggers = resolve_triggers(intent, false)?;
    if let Some(trigger) = triggers.trigger {
        let trigger_by = market
            .is_contract()
            .then_some(options.trigger_by.as_deref())
            .flatten();
        builder.trigger(trigger, None, trigger_by);
    }
    apply_exits(&mut builder, &triggers);

    if let Some(iv) = options.order_iv {
        builder.extra_decimal("orderIv", iv);
    }

    Ok(builder.build(Endpoint::AmendOrder))
}
