//! `CreateOrder` compilation.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::{
    Triggers, bybit_order_type_from, infer_trigger_direction, requested_fields,
    resolve_position_idx, resolve_triggers,
};
use crate::application::ports::{Endpoint, PrecisionPort};
use crate::domain::intent::{OrderIntent, OrderOptions};
use crate::domain::market::{MarketCategory, MarketDescriptor};
use crate::domain::value_objects::{OrderType, TimeInForce};
use crate::error::ConnectorError;
use crate::infrastructure::bybit::category_rules::check_fields;
use crate::infrastructure::bybit::request::{CompiledRequest, ExitKind, OrderRequestBuilder};

const SLIPPAGE_TYPES: [&str; 2] = ["TickSize", "Percent"];

/// Compile an order placement.
///
/// Trailing stops compile to a trading-stop request against the position
/// instead of an order.
pub fn compile_create(
    intent: &OrderIntent,
    market: &MarketDescriptor,
    precision: &dyn PrecisionPort,
) -> Result<CompiledRequest, ConnectorError> {
    let options = &intent.options;
    check_fields(market.category, requested_fields(options))?;
    check_trailing(intent)?;
    if intent.order_type.is_trailing() {
        return compile_trailing_stop(intent, market, precision);
    }

    let price = intent.price.filter(|p| *p > Decimal::ZERO);
    let venue_type = bybit_order_type_from(intent.order_type, price);
    let is_market = venue_type == "Market";

    let post_only = options.post_only
        || intent.order_type == OrderType::LimitMaker
        || options.time_in_force == Some(TimeInForce::PostOnly);
    if post_only && is_market {
        return Err(ConnectorError::parameter_conflict("postOnly", "orderType"));
    }
    check_slippage(options, is_market)?;

    let triggers = resolve_triggers(intent, true)?;
    let reduce_only = options.reduce_only || options.close_position;
    if reduce_only {
        if let Some(field) = triggers.first_exit_field() {
            return Err(ConnectorError::parameter_conflict("reduceOnly", field));
        }
    }

    let mut builder = OrderRequestBuilder::new(market, precision);
    builder.side(intent.side).order_type(venue_type);

    size(&mut builder, intent, is_market)?;

    if !is_market {
        let price = price.ok_or_else(|| ConnectorError::parameter_missing("price"))?;
        builder.price(price);
    }

    if post_only {
        builder.time_in_force(TimeInForce::PostOnly);
    } else if let Some(tif) = options.time_in_force {
        builder.time_in_force(tif);
    }

    apply_trigger(&mut builder, intent, triggers.trigger)?;
    apply_exits(&mut builder, &triggers);

    if market.is_contract() {
        builder.position_idx(resolve_position_idx(options)?);
    }
    builder
        .flag("reduceOnly", reduce_only)
        .flag("closeOnTrigger", options.close_on_trigger || options.close_position);

    match options.client_order_id.as_deref() {
        Some(id) => {
            builder.client_order_id(id);
        }
        // option orders must carry a link id
        None if market.category == MarketCategory::Option => {
            builder.client_order_id(&Uuid::new_v4().to_string());
        }
        None => {}
    }

    apply_extras(&mut builder, options);

    Ok(builder.build(Endpoint::CreateOrder))
}

fn check_trailing(intent: &OrderIntent) -> Result<(), ConnectorError> {
    let options = &intent.options;
    if !intent.order_type.is_trailing() {
        let stray = [
            (options.trailing_delta.is_some(), "trailingDelta"),
            (options.activation_price.is_some(), "activationPrice"),
            (options.callback_rate.is_some(), "callbackRate"),
        ];
        if let Some((_, field)) = stray.into_iter().find(|(set, _)| *set) {
            return Err(ConnectorError::parameter_invalid(
                field,
                format!("{field} requires the trailingStopMarket order type"),
            ));
        }
        return Ok(());
    }
    if options.callback_rate.is_some() {
        return Err(ConnectorError::not_supported(
            "callbackRate",
            "percentage trailing stops are not available, use trailingDelta",
        ));
    }
    if options.trailing_delta.is_none_or(|d| d <= Decimal::ZERO) {
        return Err(ConnectorError::parameter_missing("trailingDelta"));
    }
    Ok(())
}

fn compile_trailing_stop(
    intent: &OrderIntent,
    market: &MarketDescriptor,
    precision: &dyn PrecisionPort,
) -> Result<CompiledRequest, ConnectorError> {
    if !market.is_contract() {
        return Err(ConnectorError::unsupported_market(
            &market.symbol,
            "trailing stops are only available on contract markets",
        ));
    }
    let options = &intent.options;
    let mut builder = OrderRequestBuilder::new(market, precision);
    if let Some(delta) = options.trailing_delta {
        builder.set_price("trailingStop", delta);
    }
    if let Some(activation) = options.activation_price {
        builder.set_price("activePrice", activation);
    }
    builder
        .tpsl_mode("Full")
        .position_idx(resolve_position_idx(options)?);
    Ok(builder.build(Endpoint::TradingStop))
}

fn check_slippage(options: &OrderOptions, is_market: bool) -> Result<(), ConnectorError> {
    let kind = options.slippage_tolerance_type.as_deref();
    let value = options.slippage_tolerance;
    if kind.is_none() && value.is_none() {
        return Ok(());
    }
    if !is_market {
        return Err(ConnectorError::parameter_invalid(
            "slippageTolerance",
            "slippage tolerance only applies to market orders",
        ));
    }
    let kind = kind.ok_or_else(|| ConnectorError::parameter_missing("slippageToleranceType"))?;
    if value.is_none() {
        return Err(ConnectorError::parameter_missing("slippageTolerance"));
    }
    if !SLIPPAGE_TYPES.contains(&kind) {
        return Err(ConnectorError::parameter_invalid(
            "slippageToleranceType",
            format!("slippageToleranceType must be TickSize or Percent, got '{kind}'"),
        ));
    }
    Ok(())
}

fn size(
    builder: &mut OrderRequestBuilder<'_>,
    intent: &OrderIntent,
    is_market: bool,
) -> Result<(), ConnectorError> {
    let options = &intent.options;
    if options.close_position {
        builder.zero_quantity();
        return Ok(());
    }

    let amount = Some(intent.amount).filter(|a| *a > Decimal::ZERO);
    if builder.market().is_spot() && is_market {
        match (options.cost.filter(|c| *c > Decimal::ZERO), amount) {
            (Some(cost), _) => {
                ensure_above_step("cost", cost, builder.rounded_cost(cost))?;
                builder.quote_quantity(cost)
            }
            (None, Some(amount)) => {
                ensure_above_step("amount", amount, builder.rounded_amount(amount))?;
                builder.base_quantity(amount)
            }
            (None, None) => return Err(ConnectorError::parameter_missing("amount")),
        };
        return Ok(());
    }

    if options.cost.is_some() {
        return Err(ConnectorError::parameter_invalid(
            "cost",
            "cost sizing is only valid for spot market orders",
        ));
    }
    let amount = amount.ok_or_else(|| {
        ConnectorError::parameter_invalid(
            "amount",
            format!("amount must be positive, got {}", intent.amount),
        )
    })?;
    ensure_above_step("amount", amount, builder.rounded_amount(amount))?;
    builder.quantity(amount);
    Ok(())
}

/// Reject a positive size that truncates to zero at the market's step.
pub(super) fn ensure_above_step(
    field: &str,
    value: Decimal,
    rounded: Decimal,
) -> Result<(), ConnectorError> {
    if rounded <= Decimal::ZERO {
        return Err(ConnectorError::parameter_invalid(
            field,
            format!("{field} {value} is below the market's size step"),
        ));
    }
    Ok(())
}

fn apply_trigger(
    builder: &mut OrderRequestBuilder<'_>,
    intent: &OrderIntent,
    trigger: Option<Decimal>,
) -> Result<(), ConnectorError> {
    let Some(trigger) = trigger else {
        return Ok(());
    };
    let options = &intent.options;
    let category = builder.market().category;
    match category {
        MarketCategory::Option => Err(ConnectorError::not_supported(
            "triggerPrice",
            "conditional orders are not available on option markets",
        )),
        MarketCategory::Spot => {
            builder.trigger(trigger, None, None);
            if options.order_filter.is_none() {
                builder.extra("orderFilter", "StopOrder");
            }
            Ok(())
        }
        MarketCategory::Linear | MarketCategory::Inverse => {
            let direction = match options.trigger_direction {
                Some(direction @ (1 | 2)) => direction,
                Some(other) => {
                    return Err(ConnectorError::parameter_invalid(
                        "triggerDirection",
                        format!("triggerDirection must be 1 or 2, got {other}"),
                    ));
                }
                None => infer_trigger_direction(intent.order_type, intent.side),
            };
            builder.trigger(trigger, Some(direction), options.trigger_by.as_deref());
            Ok(())
        }
    }
}

pub(super) fn apply_exits(builder: &mut OrderRequestBuilder<'_>, triggers: &Triggers<'_>) {
    if triggers.take_profit.is_set() {
        builder.exit_leg(ExitKind::TakeProfit, &triggers.take_profit);
    }
    if triggers.stop_loss.is_set() {
        builder.exit_leg(ExitKind::StopLoss, &triggers.stop_loss);
    }
    if let Some(mode) = triggers.tpsl_mode {
        builder.tpsl_mode(mode);
    }
}

fn apply_extras(builder: &mut OrderRequestBuilder<'_>, options: &OrderOptions) {
    if let Some(filter) = options.order_filter.as_deref() {
        builder.extra("orderFilter", filter);
    }
    if let Some(is_leverage) = options.is_leverage {
        builder.extra_int("isLeverage", i64::from(is_leverage));
    }
    if let Some(mmp) = options.mmp {
        builder.flag("mmp", mmp);
    }
    if let Some(iv) = options.order_iv {
        builder.extra_decimal("orderIv", iv);
    }
    if let Some(side_type) = options.bbo_side_type.as_deref() {
        builder.extra("bboSideType", side_type);
    }
    if let Some(level) = options.bbo_level {
        builder.extra("bboLevel", &level.to_string());
    }
    if let (Some(kind), Some(value)) = (
        options.slippage_tolerance_type.as_deref(),
        options.slippage_tolerance,
    ) {
        builder
            .extra("slippageToleranceType", kind)
            .extra_decimal("slippageTolerance", value);
    }
    if let Some(smp) = options.smp_type.as_deref() {
        builder.extra("smpType", smp);
    }
}
