//! Leverage brackets built from the venue risk-limit table.
//!
//! Each bracket covers the notional range `(floor, capacity]`. The
//! cumulative offset `cum` makes the maintenance margin continuous across
//! tiers:
//!
//! ```text
//! margin(n) = ratio_i * n - cum_i
//! cum_i     = sum over j < i of (capacity_j - floor_j) * ratio_j
//! ```

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::ConnectorError;

/// One row of the risk-limit table, symbol already resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskLimitRow {
    /// Unified symbol.
    pub symbol: String,
    /// Notional capacity of this tier.
    pub risk_limit_value: Decimal,
    /// Maintenance margin as a fraction.
    pub maintenance_margin: Decimal,
    /// Maximum leverage at this tier.
    pub max_leverage: Decimal,
}

/// One tier of a ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeverageBracket {
    /// 1-based tier index.
    pub tier: usize,
    /// Notional floor (previous tier's capacity).
    pub floor: Decimal,
    /// Notional capacity.
    pub capacity: Decimal,
    /// Maintenance margin ratio as a fraction.
    pub maint_margin_ratio: Decimal,
    /// Initial leverage multiple.
    pub initial_leverage: u32,
    /// Cumulative margin offset at the floor.
    pub cum: Decimal,
}

/// Ordered brackets for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeverageLadder {
    symbol: String,
    brackets: Vec<LeverageBracket>,
}

impl LeverageLadder {
    /// Build a ladder from the rows of one symbol.
    ///
    /// Rows are sorted ascending by capacity; rows with non-positive
    /// capacity are skipped.
    #[must_use]
    pub fn from_rows(symbol: impl Into<String>, mut rows: Vec<RiskLimitRow>) -> Self {
        rows.sort_by(|a, b| a.risk_limit_value.cmp(&b.risk_limit_value));

        let mut brackets = Vec::with_capacity(rows.len());
        let mut floor = Decimal::ZERO;
        let mut cum = Decimal::ZERO;

        for row in rows {
            let capacity = row.risk_limit_value;
            if capacity <= Decimal::ZERO {
                continue;
            }
            let ratio = row.maintenance_margin;
            brackets.push(LeverageBracket {
                tier: brackets.len() + 1,
                floor,
                capacity,
                maint_margin_ratio: ratio,
                initial_leverage: row.max_leverage.round().to_u32().unwrap_or(0),
                cum,
            });
            cum += (capacity - floor) * ratio;
            floor = capacity;
        }

        Self {
            symbol: symbol.into(),
            brackets,
        }
    }

    /// Symbol this ladder belongs to.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Brackets in ascending order.
    #[must_use]
    pub fn brackets(&self) -> &[LeverageBracket] {
        &self.brackets
    }

    /// Bracket with the highest floor strictly below the notional.
    fn bracket_for(&self, notional: Decimal) -> Option<&LeverageBracket> {
        let mut matched = None;
        for bracket in &self.brackets {
            if notional <= bracket.floor {
                break;
            }
            matched = Some(bracket);
        }
        matched
    }

    /// Maintenance margin required at the given notional.
    pub fn maint_margin(&self, notional: Decimal) -> Result<Decimal, ConnectorError> {
        let bracket = self.bracket_for(notional).ok_or_else(|| {
            ConnectorError::parameter_invalid(
                "notional",
                format!("notional {notional} is below every bracket of {}", self.symbol),
            )
            .with_context("symbol", self.symbol.clone())
        })?;
        Ok(bracket.maint_margin_ratio * notional - bracket.cum)
    }

    /// Maximum leverage at the given notional; zero when no bracket matches.
    #[must_use]
    pub fn max_leverage(&self, notional: Decimal) -> u32 {
        self.bracket_for(notional)
            .map_or(0, |bracket| bracket.initial_leverage)
    }
}

/// Group rows by symbol and build one ladder per symbol.
#[must_use]
pub fn build_ladders(rows: impl IntoIterator<Item = RiskLimitRow>) -> HashMap<String, LeverageLadder> {
    let mut grouped: HashMap<String, Vec<RiskLimitRow>> = HashMap::new();
    for row in rows {
        grouped.entry(row.symbol.clone()).or_default().push(row);
    }
    grouped
        .into_iter()
        .map(|(symbol, rows)| {
            let ladder = LeverageLadder::from_rows(symbol.clone(), rows);
            (symbol, ladder)
        })
        .collect()
}
