//! Time-series sample model
//!
//! A sample is one `(timestamp, value)` observation for a series key. The
//! snapshot files and the legacy in-memory representation both encode a
//! sample as text, `"<epochMillis>,<decimalValue>"`, so the struct converts
//! to and from that form. The value is kept as a string-encoded decimal:
//! rounding happens once at collection time and the persisted digits are
//! never re-interpreted.

use std::fmt;
use std::str::FromStr;

use crate::error::CollectError;

/// One `(timestamp, value)` observation.
///
/// Ordering within a series is by construction (pollers append in collection
/// order); it is not enforced here. The merge step decides what to do when
/// timestamps overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Unix timestamp in milliseconds.
    pub timestamp_ms: i64,
    /// String-encoded decimal value, formatted at collection time.
    pub value: String,
}

/// An ordered sequence of samples for one series key.
pub type Series = Vec<Sample>;

impl Sample {
    /// Create a sample from a timestamp and an already-formatted value.
    pub fn new(timestamp_ms: i64, value: impl Into<String>) -> Self {
        Self {
            timestamp_ms,
            value: value.into(),
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.timestamp_ms, self.value)
    }
}

impl FromStr for Sample {
    type Err = CollectError;

    /// Parse the `"<epochMillis>,<decimalValue>"` text form.
    ///
    /// Only the leading timestamp is interpreted; everything after the first
    /// comma is the value verbatim, so compound values survive a round-trip.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ts, value) = s.split_once(',').ok_or_else(|| {
            CollectError::parse_msg(format!("sample {:?} has no comma separator", s))
        })?;
        let timestamp_ms = ts.parse::<i64>().map_err(|e| {
            CollectError::parse_msg(format!("sample {:?} has bad timestamp: {}", s, e))
        })?;
        Ok(Sample {
            timestamp_ms,
            value: value.to_string(),
        })
    }
}

/// Parse just the leading timestamp of a sample string.
///
/// The merge step only compares timestamps; it never needs the value, and the
/// legacy snapshot format allows compound values with embedded commas.
pub fn leading_timestamp(sample: &str) -> crate::error::Result<i64> {
    let ts = sample.split(',').next().unwrap_or(sample);
    ts.parse::<i64>().map_err(|e| {
        CollectError::parse_msg(format!("sample {:?} has bad timestamp: {}", sample, e))
    })
}
