//! Half-open time windows

use chrono::{DateTime, Duration, Utc};

use crate::error::{ModelError, ModelResult};
use crate::time::to_iso;

/// A `[start, end)` interval with an optional position in a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    index: Option<i64>,
}

impl TimeWindow {
    /// Create a window
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidBounds`] unless `end > start`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, index: Option<i64>) -> ModelResult<Self> {
        if end <= start {
            return Err(ModelError::InvalidBounds { start, end });
        }
        Ok(Self { start, end, index })
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    #[inline]
    #[must_use]
    pub fn index(&self) -> Option<i64> {
        self.index
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// `start <= ts < end`
    #[inline]
    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(idx) => write!(f, "[{}, {}) #{idx}", to_iso(&self.start), to_iso(&self.end)),
            None => write!(f, "[{}, {})", to_iso(&self.start), to_iso(&self.end)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn rejects_empty_and_reversed() {
        assert!(TimeWindow::new(base(), base(), None).is_err());
        assert!(TimeWindow::new(base() + Duration::seconds(1), base(), None).is_err());
    }

    #[test]
    fn contains_is_half_open() {
        let window = TimeWindow::new(base(), base() + Duration::seconds(60), Some(0)).unwrap();
        assert!(window.contains(base()));
        assert!(window.contains(base() + Duration::seconds(59)));
        assert!(!window.contains(base() + Duration::seconds(60)));
        assert_eq!(window.duration(), Duration::seconds(60));
    }

    #[test]
    fn display_includes_index() {
        let window = TimeWindow::new(base(), base() + Duration::seconds(1), Some(2)).unwrap();
        assert_eq!(window.to_string(), "[2024-01-01T00:00:00Z, 2024-01-01T00:00:01Z) #2");
    }
}
