//! Transaction-log records.

use super::{non_empty, resolve_symbol};
use crate::application::ports::MarketRegistryPort;
use crate::domain::market::MarketCategory;
use crate::domain::records::NormalizedIncome;
use crate::infrastructure::bybit::api_types::TransactionLogRecord;

/// Map a venue transaction type to an income type.
#[must_use]
pub fn normalize_income_type(kind: &str) -> String {
    match kind {
        "SETTLEMENT" => "funding".to_string(),
        "TRADE" => "trade".to_string(),
        "TRANSFER_IN" | "TRANSFER_OUT" => "transfer".to_string(),
        "LIQUIDATION" => "liquidation".to_string(),
        "DELIVERY" => "delivery".to_string(),
        "BONUS" => "bonus".to_string(),
        "FEE_REFUND" => "rebate".to_string(),
        "INTEREST" => "interest".to_string(),
        other => other.to_ascii_lowercase(),
    }
}

/// Normalize one transaction-log entry.
///
/// `category` is used when the record does not name its own. Entries for
/// other symbols are dropped when `requested_symbol` is set.
#[must_use]
pub fn parse_income(
    record: &TransactionLogRecord,
    category: MarketCategory,
    registry: &dyn MarketRegistryPort,
    requested_symbol: Option<&str>,
) -> Option<NormalizedIncome> {
    let category = record.category.parse::<MarketCategory>().unwrap_or(category);
    let symbol = (!record.symbol.is_empty())
        .then(|| resolve_symbol(registry, &record.symbol, category));

    if let Some(requested) = requested_symbol {
        if symbol.as_deref() != Some(requested) {
            return None;
        }
    }

    Some(NormalizedIncome {
        symbol,
        income_type: normalize_income_type(&record.kind),
        income: record.change.unwrap_or_default(),
        asset: registry.currency_code_for(&record.currency),
        timestamp: record.transaction_time,
        transaction_id: record.id.clone(),
        trade_id: non_empty(&record.trade_id),
    })
}
