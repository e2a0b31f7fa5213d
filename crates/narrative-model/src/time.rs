//! Timestamp and duration conventions
//!
//! All timestamps are UTC. The wire form is RFC 3339 with a `Z` suffix and
//! exactly nine fractional digits: rendering then parsing is exact, and
//! rendered strings sort in time order.

use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, Utc};

use crate::error::ModelError;

/// Smallest strictly-positive increment used to close half-open windows
#[must_use]
pub fn min_increment() -> Duration {
    Duration::microseconds(1)
}

/// Render a timestamp as fixed-width ISO-8601
#[must_use]
pub fn to_iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse an ISO-8601 timestamp
///
/// Offsets are normalized to UTC. A timestamp without offset is read as UTC.
///
/// # Errors
/// Returns [`ModelError::InvalidTimestamp`] if the string is not ISO-8601
pub fn parse_iso(s: &str) -> Result<DateTime<Utc>, ModelError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| ModelError::InvalidTimestamp {
            value: s.to_string(),
            reason: e.to_string(),
        })
}

/// Duration as fractional seconds
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn seconds_f64(d: Duration) -> f64 {
    d.num_seconds() as f64 + f64::from(d.subsec_nanos()) / 1e9
}

/// Build a duration from fractional seconds
///
/// # Errors
/// Returns [`ModelError::InvalidArgument`] for non-finite or out-of-range input
#[allow(clippy::cast_possible_truncation)]
pub fn duration_from_secs_f64(secs: f64) -> Result<Duration, ModelError> {
    if !secs.is_finite() {
        return Err(ModelError::InvalidArgument(format!(
            "duration must be finite, got {secs}"
        )));
    }
    let nanos = (secs * 1e9).round();
    if nanos.abs() >= i64::MAX as f64 {
        return Err(ModelError::InvalidArgument(format!(
            "duration out of range: {secs}s"
        )));
    }
    Ok(Duration::nanoseconds(nanos as i64))
}

/// Exact textual form of a duration (`seconds.nanoseconds`)
///
/// Used inside hash inputs, where float rounding would be a source of
/// nondeterminism.
#[must_use]
pub fn canonical_duration(d: Duration) -> String {
    if d < Duration::zero() {
        let abs = -d;
        format!("-{}.{:09}", abs.num_seconds(), abs.subsec_nanos())
    } else {
        format!("{}.{:09}", d.num_seconds(), d.subsec_nanos())
    }
}

/// Serde adapter for `DateTime<Utc>` fields using [`to_iso`] / [`parse_iso`]
pub mod iso {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize as ISO-8601
    ///
    /// # Errors
    /// Propagates serializer errors
    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::to_iso(ts))
    }

    /// Deserialize from ISO-8601
    ///
    /// # Errors
    /// Fails on strings that are not ISO-8601
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_iso(&s).map_err(serde::de::Error::custom)
    }
}
