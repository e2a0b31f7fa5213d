//! Chronologically-ordered emotion timelines
//!
//! An [`EmotionTimeline`] is the immutable input to every derivation. Its
//! fingerprint is structural: it covers event count, total duration and the
//! gap sequence, and deliberately ignores labels, scores and subject. Two
//! timelines with the same temporal shape are cache-equivalent.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use crate::error::{ModelError, ModelResult};
use crate::event::EmotionEvent;
use crate::hash::Fingerprint;
use crate::identity::{private, Identified};
use crate::time::canonical_duration;

/// Immutable, chronologically-ordered events of one subject
///
/// # Invariants
/// - events are sorted by timestamp, non-decreasing
/// - immutable after construction
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionTimeline {
    subject_id: String,
    events: Vec<EmotionEvent>,
    metadata: Option<serde_json::Value>,
}

impl EmotionTimeline {
    /// Create a timeline from already-ordered events
    ///
    /// # Errors
    /// Returns [`ModelError::NotChronological`] at the first out-of-order pair
    pub fn new(subject_id: impl Into<String>, events: Vec<EmotionEvent>) -> ModelResult<Self> {
        check_chronological(&events)?;
        Ok(Self {
            subject_id: subject_id.into(),
            events,
            metadata: None,
        })
    }

    /// Create a timeline from unordered events
    ///
    /// Events are sorted by timestamp with a stable sort, so events sharing a
    /// timestamp keep their relative input order.
    #[must_use]
    pub fn from_events(
        subject_id: impl Into<String>,
        mut events: Vec<EmotionEvent>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        events.sort_by_key(|e| e.timestamp);
        Self {
            subject_id: subject_id.into(),
            events,
            metadata,
        }
    }

    /// Empty timeline for a subject
    #[inline]
    #[must_use]
    pub fn empty(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            events: Vec::new(),
            metadata: None,
        }
    }

    /// Attach timeline-level metadata
    #[inline]
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    #[inline]
    #[must_use]
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    #[inline]
    #[must_use]
    pub fn events(&self) -> &[EmotionEvent] {
        &self.events
    }

    #[inline]
    #[must_use]
    pub fn metadata(&self) -> Option<&serde_json::Value> {
        self.metadata.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamp of the first event
    #[inline]
    #[must_use]
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.events.first().map(|e| e.timestamp)
    }

    /// Timestamp of the last event
    #[inline]
    #[must_use]
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.events.last().map(|e| e.timestamp)
    }

    /// Span from first to last event; `None` with fewer than two events
    #[must_use]
    pub fn time_span(&self) -> Option<Duration> {
        if self.events.len() < 2 {
            return None;
        }
        Some(self.events[self.events.len() - 1].timestamp - self.events[0].timestamp)
    }

    /// Total duration, zero for empty and single-event timelines
    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.time_span().unwrap_or_else(Duration::zero)
    }

    /// Gaps between consecutive events (N events give N-1 gaps)
    #[must_use]
    pub fn time_gaps(&self) -> Vec<Duration> {
        self.events
            .windows(2)
            .map(|pair| pair[1].timestamp - pair[0].timestamp)
            .collect()
    }

    /// Structural fingerprint
    ///
    /// `sha256("{count}:{duration}:{sha256(gaps)}")`, truncated. Durations use
    /// the exact `seconds.nanoseconds` form.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        let mut gap_hasher = Sha256::new();
        for gap in self.time_gaps() {
            gap_hasher.update(canonical_duration(gap).as_bytes());
            gap_hasher.update(b",");
        }
        let gaps_hex = hex::encode(gap_hasher.finalize());
        let content = format!(
            "{}:{}:{}",
            self.events.len(),
            canonical_duration(self.duration()),
            gaps_hex
        );
        Fingerprint::compute_str(&content)
    }
}

fn check_chronological(events: &[EmotionEvent]) -> ModelResult<()> {
    for (index, pair) in events.windows(2).enumerate() {
        if pair[0].timestamp > pair[1].timestamp {
            return Err(ModelError::NotChronological {
                index,
                previous: pair[0].timestamp,
                next: pair[1].timestamp,
            });
        }
    }
    Ok(())
}

impl private::Sealed for EmotionTimeline {}

impl Identified for EmotionTimeline {
    const TYPE_ID: &'static str = "timeline";

    fn identifier(&self) -> Fingerprint {
        self.fingerprint()
    }
}
