//! Request builder for order endpoints.
//!
//! Setters are grouped by field family. Every price and quantity goes
//! through the precision port and is sent as a decimal string.

use rust_decimal::Decimal;

use crate::application::ports::{Endpoint, PrecisionPort, RequestParams};
use crate::domain::market::MarketDescriptor;
use crate::domain::value_objects::{OrderSide, TimeInForce};
use crate::error::ConnectorError;

/// A compiled request, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRequest {
    /// Target endpoint.
    pub endpoint: Endpoint,
    /// Parameters.
    pub params: RequestParams,
}

/// Attached take-profit or stop-loss leg.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExitLeg<'a> {
    /// Trigger price.
    pub trigger: Option<Decimal>,
    /// Limit price for a limit exit.
    pub limit_price: Option<Decimal>,
    /// `Market` or `Limit`.
    pub order_type: Option<&'a str>,
    /// Trigger price source.
    pub trigger_by: Option<&'a str>,
}

impl ExitLeg<'_> {
    /// Whether any field is set.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.trigger.is_some()
            || self.limit_price.is_some()
            || self.order_type.is_some()
            || self.trigger_by.is_some()
    }
}

/// Which exit leg a setter targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// Take-profit.
    TakeProfit,
    /// Stop-loss.
    StopLoss,
}

impl ExitKind {
    const fn keys(self) -> [&'static str; 4] {
        match self {
            Self::TakeProfit => ["takeProfit", "tpLimitPrice", "tpOrderType", "tpTriggerBy"],
            Self::StopLoss => ["stopLoss", "slLimitPrice", "slOrderType", "slTriggerBy"],
        }
    }
}

/// Builds the parameters of one order request.
pub struct OrderRequestBuilder<'a> {
    market: &'a MarketDescriptor,
    precision: &'a dyn PrecisionPort,
    params: RequestParams,
}

impl<'a> OrderRequestBuilder<'a> {
    /// Start a request with `category` and `symbol` set.
    #[must_use]
    pub fn new(market: &'a MarketDescriptor, precision: &'a dyn PrecisionPort) -> Self {
        let mut params = RequestParams::new();
        params
            .set_str("category", market.category.as_str())
            .set_str("symbol", market.id.as_str());
        Self {
            market,
            precision,
            params,
        }
    }

    /// Market this request targets.
    #[must_use]
    pub const fn market(&self) -> &MarketDescriptor {
        self.market
    }

    // ---- identity --------------------------------------------------------

    /// `side`.
    pub fn side(&mut self, side: OrderSide) -> &mut Self {
        self.params.set_str("side", side.as_venue());
        self
    }

    /// `orderType`.
    pub fn order_type(&mut self, venue_type: &str) -> &mut Self {
        self.params.set_str("orderType", venue_type);
        self
    }

    /// `orderId` or `orderLinkId`; at least one is required.
    pub fn order_ref(
        &mut self,
        order_id: Option<&str>,
        client_order_id: Option<&str>,
    ) -> Result<&mut Self, ConnectorError> {
        match (order_id.filter(|s| !s.is_empty()), client_order_id.filter(|s| !s.is_empty())) {
            (Some(id), _) => self.params.set_str("orderId", id),
            (None, Some(link)) => self.params.set_str("orderLinkId", link),
            (None, None) => return Err(ConnectorError::parameter_missing("id")),
        };
        Ok(self)
    }

    /// `orderLinkId`.
    pub fn client_order_id(&mut self, id: &str) -> &mut Self {
        self.params.set_str("orderLinkId", id);
        self
    }

    // ---- size and price --------------------------------------------------

    /// `qty` in base units, rounded to the step size.
    pub fn quantity(&mut self, amount: Decimal) -> &mut Self {
        let rounded = self.rounded_amount(amount);
        self.params.set_decimal("qty", rounded);
        self
    }

    /// `qty` in quote units for spot market orders.
    pub fn quote_quantity(&mut self, cost: Decimal) -> &mut Self {
        let rounded = self.rounded_cost(cost);
        self.params
            .set_decimal("qty", rounded)
            .set_str("marketUnit", "quoteCoin");
        self
    }

    /// `qty` in base units with an explicit `marketUnit=baseCoin`.
    pub fn base_quantity(&mut self, amount: Decimal) -> &mut Self {
        self.quantity(amount);
        self.params.set_str("marketUnit", "baseCoin");
        self
    }

    /// `amount` truncated to the market's step.
    #[must_use]
    pub fn rounded_amount(&self, amount: Decimal) -> Decimal {
        self.precision.round_amount(self.market, amount)
    }

    /// `cost` truncated to the market's cost step.
    #[must_use]
    pub fn rounded_cost(&self, cost: Decimal) -> Decimal {
        self.precision.round_cost(self.market, cost)
    }

    /// `qty="0"` for close-position orders.
    pub fn zero_quantity(&mut self) -> &mut Self {
        self.params.set_str("qty", "0");
        self
    }

    /// `price`, rounded to the tick size.
    pub fn price(&mut self, price: Decimal) -> &mut Self {
        self.set_price("price", price)
    }

    /// Any price-like field, rounded to the tick size.
    pub fn set_price(&mut self, key: &str, price: Decimal) -> &mut Self {
        let rounded = self.precision.round_price(self.market, price);
        self.params.set_decimal(key, rounded);
        self
    }

    /// `timeInForce`.
    pub fn time_in_force(&mut self, tif: TimeInForce) -> &mut Self {
        self.params.set_str("timeInForce", tif.as_venue());
        self
    }

    // ---- trigger ---------------------------------------------------------

    /// `triggerPrice`, plus `triggerDirection` and `triggerBy` when given.
    pub fn trigger(
        &mut self,
        price: Decimal,
        direction: Option<u8>,
        trigger_by: Option<&str>,
    ) -> &mut Self {
        self.set_price("triggerPrice", price);
        if let Some(direction) = direction {
            self.params.set_int("triggerDirection", i64::from(direction));
        }
        self.params.set_opt_str("triggerBy", trigger_by);
        self
    }

    // ---- take-profit / stop-loss -----------------------------------------

    /// Attach one exit leg.
    pub fn exit_leg(&mut self, kind: ExitKind, leg: &ExitLeg<'_>) -> &mut Self {
        let [trigger_key, limit_key, type_key, by_key] = kind.keys();
        if let Some(trigger) = leg.trigger {
            self.set_price(trigger_key, trigger);
        }
        if let Some(limit) = leg.limit_price {
            self.set_price(limit_key, limit);
        }
        self.params.set_opt_str(type_key, leg.order_type);
        self.params.set_opt_str(by_key, leg.trigger_by);
        self
    }

    /// `tpslMode`.
    pub fn tpsl_mode(&mut self, mode: &str) -> &mut Self {
        self.params.set_str("tpslMode", mode);
        self
    }

    // ---- flags and extras ------------------------------------------------

    /// `positionIdx`.
    pub fn position_idx(&mut self, idx: u8) -> &mut Self {
        self.params.set_int("positionIdx", i64::from(idx));
        self
    }

    /// Boolean flag, only sent when true.
    pub fn flag(&mut self, key: &str, value: bool) -> &mut Self {
        if value {
            self.params.set_bool(key, true);
        }
        self
    }

    /// Free-form string field.
    pub fn extra(&mut self, key: &str, value: &str) -> &mut Self {
        self.params.set_str(key, value);
        self
    }

    /// Free-form integer field.
    pub fn extra_int(&mut self, key: &str, value: i64) -> &mut Self {
        self.params.set_int(key, value);
        self
    }

    /// Free-form decimal field, unrounded.
    pub fn extra_decimal(&mut self, key: &str, value: Decimal) -> &mut Self {
        self.params.set_decimal(key, value);
        self
    }

    /// Finish into a request for `endpoint`.
    #[must_use]
    pub fn build(self, endpoint: Endpoint) -> CompiledRequest {
        CompiledRequest {
            endpoint,
            params: self.params,
        }
    }
}
