//! Error types for the data model
//!
//! Two families of failure exist here:
//! - invalid arguments (bad durations, malformed strings), rejected before
//!   anything is built
//! - invariant violations (ordering, containment), which signal bad input
//!   data and are never silently corrected

use chrono::{DateTime, Utc};

/// Errors raised while constructing model values
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Argument outside its accepted domain
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Events are not sorted by timestamp
    #[error(
        "events must be chronologically ordered: event {index} ({previous}) occurs after event {next_index} ({next})",
        next_index = .index + 1
    )]
    NotChronological {
        index: usize,
        previous: DateTime<Utc>,
        next: DateTime<Utc>,
    },

    /// An event lies outside the `[start, end)` bounds of its container
    #[error("event {index} at {timestamp} lies outside [{start}, {end})")]
    EventOutsideWindow {
        index: usize,
        timestamp: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Interval bounds are reversed (or empty where emptiness is not allowed)
    #[error("invalid bounds: start {start} is not before end {end}")]
    InvalidBounds {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A timestamp string could not be parsed
    #[error("invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

impl ModelError {
    /// Create invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Whether this error signals a caller bug in the supplied data
    #[inline]
    #[must_use]
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::NotChronological { .. } | Self::EventOutsideWindow { .. } | Self::InvalidBounds { .. }
        )
    }
}

/// Result alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn not_chronological_display_names_both_indices() {
        let previous = Utc.with_ymd_and_hms(2024, 1, 1, 12, 10, 0).unwrap();
        let next = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let err = ModelError::NotChronological { index: 3, previous, next };
        let msg = err.to_string();
        assert!(msg.contains("event 3"));
        assert!(msg.contains("event 4"));
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn invalid_argument_is_not_invariant_violation() {
        let err = ModelError::invalid_argument("gap_threshold must be positive");
        assert_eq!(err.to_string(), "invalid argument: gap_threshold must be positive");
        assert!(!err.is_invariant_violation());
    }
}
