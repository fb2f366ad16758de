//! Position records.

use super::{positive, resolve_symbol};
use crate::application::ports::MarketRegistryPort;
use crate::domain::market::MarketCategory;
use crate::domain::records::Position;
use crate::domain::value_objects::PositionSide;
use crate::infrastructure::bybit::api_types::PositionRecord;

/// Normalize one position record.
#[must_use]
pub fn parse_position(
    record: &PositionRecord,
    category: MarketCategory,
    registry: &dyn MarketRegistryPort,
) -> Position {
    let position_idx = record
        .position_idx
        .and_then(|idx| u8::try_from(idx).ok())
        .unwrap_or_default();
    let side = match record.side.as_str() {
        "Buy" => Some(PositionSide::Long),
        "Sell" => Some(PositionSide::Short),
        // flat hedge-mode legs still report their index
        _ => PositionSide::from_position_idx(position_idx)
            .filter(|side| *side != PositionSide::Both),
    };

    Position {
        symbol: resolve_symbol(registry, &record.symbol, category),
        side,
        position_idx,
        contracts: record.size.unwrap_or_default().abs(),
        entry_price: positive(record.avg_price),
        mark_price: positive(record.mark_price),
        notional: record.position_value,
        leverage: positive(record.leverage),
        liquidation_price: positive(record.liq_price),
        unrealized_pnl: record.unrealised_pnl,
        timestamp: record.created_time,
        last_update_timestamp: record.updated_time,
    }
}
