//! Shared bracket table.
//!
//! Readers take a snapshot (`Arc<LeverageLadder>`) under the read lock.
//! Reloads replace ladders one symbol at a time under the write lock, so a
//! reader sees either the previous ladder of a symbol or the new one, never
//! a half-built ladder. Symbols absent from a reload keep their old ladder.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use rust_decimal::Decimal;

use super::bracket::LeverageLadder;
use crate::error::ConnectorError;

/// Concurrent map of symbol to leverage ladder.
#[derive(Debug, Default)]
pub struct LeverageBracketTable {
    ladders: RwLock<HashMap<String, Arc<LeverageLadder>>>,
}

impl LeverageBracketTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the ladder of every symbol present in `ladders`.
    ///
    /// Returns the number of symbols replaced.
    pub fn replace(&self, ladders: HashMap<String, LeverageLadder>) -> usize {
        let mut table = self
            .ladders
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let count = ladders.len();
        for (symbol, ladder) in ladders {
            table.insert(symbol, Arc::new(ladder));
        }
        count
    }

    /// Snapshot of one symbol's ladder.
    #[must_use]
    pub fn ladder(&self, symbol: &str) -> Option<Arc<LeverageLadder>> {
        self.ladders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(symbol)
            .cloned()
    }

    /// Whether a ladder is loaded for the symbol.
    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.ladders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(symbol)
    }

    /// Number of loaded symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ladders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maintenance margin for `symbol` at `notional`.
    pub fn maint_margin(&self, symbol: &str, notional: Decimal) -> Result<Decimal, ConnectorError> {
        self.require(symbol)?.maint_margin(notional)
    }

    /// Maximum leverage for `symbol` at `notional`; zero when unknown.
    #[must_use]
    pub fn max_leverage(&self, symbol: &str, notional: Decimal) -> u32 {
        self.ladder(symbol)
            .map_or(0, |ladder| ladder.max_leverage(notional))
    }

    fn require(&self, symbol: &str) -> Result<Arc<LeverageLadder>, ConnectorError> {
        self.ladder(symbol).ok_or_else(|| {
            ConnectorError::data_not_found(format!("no leverage brackets loaded for {symbol}"))
                .with_context("symbol", symbol)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::leverage::bracket::{RiskLimitRow, build_ladders};
    use crate::error::ErrorCode;
    use rust_decimal_macros::dec;
    use std::thread;

    fn rows(symbol: &str, ratio: Decimal) -> Vec<RiskLimitRow> {
        vec![
            RiskLimitRow {
                symbol: symbol.to_string(),
                risk_limit_value: dec!(100),
                maintenance_margin: ratio,
                max_leverage: dec!(100),
            },
            RiskLimitRow {
                symbol: symbol.to_string(),
                risk_limit_value: dec!(200),
                maintenance_margin: ratio * dec!(2),
                max_leverage: dec!(50),
            },
        ]
    }

    #[test]
    fn missing_symbol_is_data_not_found() {
        let table = LeverageBracketTable::new();
        let err = table.maint_margin("BTC/USDT:USDT", dec!(150)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DataNotFound);
        assert_eq!(err.context_value("symbol"), Some("BTC/USDT:USDT"));
        assert_eq!(table.max_leverage("BTC/USDT:USDT", dec!(150)), 0);
    }

    #[test]
    fn maint_margin_through_table() {
        let table = LeverageBracketTable::new();
        table.replace(build_ladders(rows("BTC/USDT:USDT", dec!(0.01))));
        assert_eq!(table.maint_margin("BTC/USDT:USDT", dec!(150)).unwrap(), dec!(2.0));
        assert_eq!(table.max_leverage("BTC/USDT:USDT", dec!(150)), 50);
    }

    #[test]
    fn replace_is_key_by_key() {
        let table = LeverageBracketTable::new();
        let mut first = build_ladders(rows("A", dec!(0.01)));
        first.extend(build_ladders(rows("B", dec!(0.01))));
        table.replace(first);

        let replaced = table.replace(build_ladders(rows("A", dec!(0.02))));
        assert_eq!(replaced, 1);
        assert_eq!(table.len(), 2);
        assert!(table.contains("B"));
        assert_eq!(table.maint_margin("A", dec!(50)).unwrap(), dec!(1.00));
        assert_eq!(table.maint_margin("B", dec!(50)).unwrap(), dec!(0.50));
    }

    #[test]
    fn readers_keep_their_snapshot() {
        let table = LeverageBracketTable::new();
        table.replace(build_ladders(rows("A", dec!(0.01))));
        let snapshot = table.ladder("A").unwrap();
        table.replace(build_ladders(rows("A", dec!(0.05))));
        assert_eq!(snapshot.brackets()[0].maint_margin_ratio, dec!(0.01));
        assert_eq!(table.ladder("A").unwrap().brackets()[0].maint_margin_ratio, dec!(0.05));
    }

    #[test]
    fn concurrent_readers_see_complete_ladders() {
        let table = Arc::new(LeverageBracketTable::new());
        table.replace(build_ladders(rows("A", dec!(0.01))));

        let writer = {
            let table = Arc::clone(&table);
            thread::spawn(move || {
                for i in 1..50 {
                    table.replace(build_ladders(rows("A", Decimal::new(i, 3))));
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let table = Arc::clone(&table);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let ladder = table.ladder("A").unwrap();
                        assert_eq!(ladder.brackets().len(), 2);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
