//! Time in force.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConnectorError;

/// Time in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    /// Good till canceled.
    Gtc,
    /// Immediate or cancel.
    Ioc,
    /// Fill or kill.
    Fok,
    /// Maker only.
    PostOnly,
}

impl TimeInForce {
    /// Venue wire value.
    #[must_use]
    pub const fn as_venue(&self) -> &'static str {
        match self {
            Self::Gtc => "GTC",
            Self::Ioc => "IOC",
            Self::Fok => "FOK",
            Self::PostOnly => "PostOnly",
        }
    }

    /// Parse a venue value, returning `None` for unknown strings.
    #[must_use]
    pub fn from_venue(value: &str) -> Option<Self> {
        match value {
            "GTC" => Some(Self::Gtc),
            "IOC" => Some(Self::Ioc),
            "FOK" => Some(Self::Fok),
            "PostOnly" => Some(Self::PostOnly),
            _ => None,
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_venue())
    }
}

impl FromStr for TimeInForce {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GTC" => Ok(Self::Gtc),
            "IOC" => Ok(Self::Ioc),
            "FOK" => Ok(Self::Fok),
            "PO" | "POSTONLY" => Ok(Self::PostOnly),
            _ => Err(ConnectorError::parameter_invalid(
                "timeInForce",
                format!("unknown time in force '{s}'"),
            )),
        }
    }
}
