// crates/compliance-gate-core/src/core/time.rs
// ============================================================================
// Module: Compliance Gate Time Model
// Description: Canonical timestamp representation for results, evidence, and seals.
// Purpose: Provide millisecond timestamps with a stable RFC 3339 string form.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Timestamps are stored as unix epoch milliseconds and serialize as RFC 3339
//! strings so that hashed records carry ISO-8601 times. The core never reads
//! the wall clock directly; runtime components obtain time through an
//! injected [`crate::interfaces::Clock`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::Error as _;
use serde::ser::Error as _;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp used in gate results, evidence, and seal records.
///
/// # Invariants
/// - Values are unix epoch milliseconds (UTC).
/// - Ordering is chronological, which evidence-chain monotonicity relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Formats the timestamp as an RFC 3339 string.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError`] when the value is outside the representable range.
    pub fn to_rfc3339(self) -> Result<String, TimestampError> {
        let nanos = i128::from(self.0) * 1_000_000;
        let datetime = OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .map_err(|err| TimestampError(err.to_string()))?;
        datetime.format(&Rfc3339).map_err(|err| TimestampError(err.to_string()))
    }

    /// Parses an RFC 3339 string into a timestamp (sub-millisecond precision is dropped).
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError`] when the input is not valid RFC 3339.
    pub fn parse_rfc3339(value: &str) -> Result<Self, TimestampError> {
        let datetime =
            OffsetDateTime::parse(value, &Rfc3339).map_err(|err| TimestampError(err.to_string()))?;
        let millis = datetime.unix_timestamp_nanos() / 1_000_000;
        i64::try_from(millis)
            .map(Self)
            .map_err(|_| TimestampError("timestamp out of range".to_string()))
    }
}

/// Timestamp conversion failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampError(String);

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid timestamp: {}", self.0)
    }
}

impl std::error::Error for TimestampError {}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = self.to_rfc3339().map_err(S::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse_rfc3339(&text).map_err(D::Error::custom)
    }
}
