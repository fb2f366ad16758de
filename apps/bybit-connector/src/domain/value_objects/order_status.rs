//! Normalized order status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized order status.
///
/// Venue values that have no mapping are kept verbatim in `Unrecognized` so
/// callers can still observe them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    /// Resting, untriggered or triggered but unfilled.
    Open,
    /// Partially filled and still working.
    PartFilled,
    /// Completely filled.
    Filled,
    /// Canceled, deactivated, or partially filled then canceled.
    Canceled,
    /// Rejected by the venue.
    Rejected,
    /// Raw venue value without a mapping.
    Unrecognized(String),
}

impl OrderStatus {
    /// Map a venue `orderStatus` value.
    #[must_use]
    pub fn from_venue(value: &str) -> Self {
        match value {
            "New" | "Untriggered" | "Triggered" | "Created" | "Active" => Self::Open,
            "PartiallyFilled" => Self::PartFilled,
            "Filled" => Self::Filled,
            "Cancelled" | "PartiallyFilledCanceled" | "Deactivated" => Self::Canceled,
            "Rejected" => Self::Rejected,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Returns true if the order can no longer fill.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Canceled | Self::Rejected)
    }

    /// Normalized name, or the raw venue value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::PartFilled => "partFilled",
            Self::Filled => "filled",
            Self::Canceled => "canceled",
            Self::Rejected => "rejected",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
