//! Civil date-time values in the provider's wire format.
//!
//! The API exchanges timestamps as `YYYY-MM-DD HH:MM:SS` strings without an
//! offset (the provider's local time). [`WireTimestamp`] carries such a value
//! and is the only timestamp type the canonical field extractor accepts.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Wire rendering of a timestamp: `2015-04-21 20:00:00`.
pub const WIRE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A date-time rendered as `YYYY-MM-DD HH:MM:SS` on the wire.
///
/// # Serialization
///
/// Serialized as the formatted string, e.g.
///
/// ```json
/// "2015-04-21 20:00:00"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct WireTimestamp(NaiveDateTime);

impl WireTimestamp {
    /// Wraps a naive date-time.
    #[must_use]
    pub const fn new(value: NaiveDateTime) -> Self {
        Self(value)
    }

    /// Returns the wrapped date-time.
    #[must_use]
    pub const fn as_naive(&self) -> &NaiveDateTime {
        &self.0
    }
}

impl From<NaiveDateTime> for WireTimestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

impl Display for WireTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(WIRE_TIME_FORMAT))
    }
}

impl FromStr for WireTimestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDateTime::parse_from_str(s.trim(), WIRE_TIME_FORMAT).map(Self)
    }
}

impl Serialize for WireTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WireTimestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom("timestamp must be formatted as YYYY-MM-DD HH:MM:SS")
        })
    }
}
