//! Bybit `retCode` classification.

use crate::application::ports::TransportError;
use crate::error::{ConnectorError, ErrorCode};

use super::api_types::Envelope;

/// Codes meaning "already in the requested state".
///
/// - `110043`: leverage not modified
/// - `100028`: operation locked for a unified/portfolio-margin account
pub const IDEMPOTENT_CODES: &[i64] = &[110_043, 100_028];

/// Map a venue code to an error code.
#[must_use]
pub fn classify_ret_code(code: i64, message: &str) -> ErrorCode {
    match code {
        10001 if mentions_time_range(message) => ErrorCode::TimeRangeExceeded,
        10001 | 110_003 | 110_013 | 110_017 | 170_130 | 170_136 => ErrorCode::ParameterInvalid,
        10003 | 10004 | 10005 | 10007 | 10009 | 10010 | 33004 => ErrorCode::Unauthorized,
        10006 | 10018 => ErrorCode::RateLimited,
        10016 => ErrorCode::Transport,
        110_001 | 110_008 | 110_010 | 170_213 => ErrorCode::NotFound,
        110_004 | 110_006 | 110_007 | 110_012 | 110_044 | 110_045 | 170_131 => {
            ErrorCode::InsufficientFunds
        }
        181_001 | 181_002 | 10029 | 170_121 => ErrorCode::UnsupportedMarket,
        _ if mentions_time_range(message) => ErrorCode::TimeRangeExceeded,
        _ => ErrorCode::BusinessRejected,
    }
}

fn mentions_time_range(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("7 days") || lower.contains("time range") || lower.contains("time interval")
}

/// Venue error policy: classification plus the idempotent allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueErrorPolicy {
    idempotent: Vec<i64>,
}

impl Default for VenueErrorPolicy {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl VenueErrorPolicy {
    /// Built-in allow-list extended with `extra` codes.
    #[must_use]
    pub fn new(extra: &[i64]) -> Self {
        let mut idempotent = IDEMPOTENT_CODES.to_vec();
        for code in extra {
            if !idempotent.contains(code) {
                idempotent.push(*code);
            }
        }
        Self { idempotent }
    }

    /// Whether the error carries an allow-listed venue code.
    #[must_use]
    pub fn is_idempotent(&self, err: &ConnectorError) -> bool {
        err.context_value("ret_code")
            .and_then(|code| code.parse::<i64>().ok())
            .is_some_and(|code| self.idempotent.contains(&code))
    }

    /// Typed error for a coded venue failure.
    #[must_use]
    pub fn venue_error(&self, code: i64, message: &str) -> ConnectorError {
        ConnectorError::venue(classify_ret_code(code, message), code, message)
    }

    /// Fail unless the envelope reports success.
    pub fn ensure_success(&self, envelope: &Envelope) -> Result<(), ConnectorError> {
        if envelope.is_success() {
            return Ok(());
        }
        Err(self.venue_error(envelope.ret_code, &envelope.ret_msg))
    }

    /// Convert a transport failure, classifying coded venue errors.
    #[must_use]
    pub fn from_transport(&self, err: TransportError) -> ConnectorError {
        match err {
            TransportError::Venue { code, message } => self.venue_error(code, &message),
            other => ConnectorError::from(other),
        }
    }
}
