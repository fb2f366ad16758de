//! Position side and venue position index.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConnectorError;

/// One-way mode position index.
pub const POSITION_IDX_ONE_WAY: u8 = 0;
/// Hedge mode long position index.
pub const POSITION_IDX_HEDGE_LONG: u8 = 1;
/// Hedge mode short position index.
pub const POSITION_IDX_HEDGE_SHORT: u8 = 2;

/// Abstract position side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    /// Hedge-mode long leg.
    Long,
    /// Hedge-mode short leg.
    Short,
    /// One-way (net) position.
    Both,
}

impl PositionSide {
    /// Venue `positionIdx`.
    #[must_use]
    pub const fn position_idx(&self) -> u8 {
        match self {
            Self::Long => POSITION_IDX_HEDGE_LONG,
            Self::Short => POSITION_IDX_HEDGE_SHORT,
            Self::Both => POSITION_IDX_ONE_WAY,
        }
    }

    /// Inverse of [`Self::position_idx`].
    #[must_use]
    pub const fn from_position_idx(idx: u8) -> Option<Self> {
        match idx {
            POSITION_IDX_ONE_WAY => Some(Self::Both),
            POSITION_IDX_HEDGE_LONG => Some(Self::Long),
            POSITION_IDX_HEDGE_SHORT => Some(Self::Short),
            _ => None,
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// `net`, `both` and the empty string all mean one-way mode.
impl FromStr for PositionSide {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            "" | "net" | "both" => Ok(Self::Both),
            other => Err(ConnectorError::parameter_invalid(
                "positionSide",
                format!("unknown position side '{other}'"),
            )),
        }
    }
}
