//! Temporal episodes
//!
//! An [`Episode`] is one `[start, end)` window together with the events that
//! fall inside it. Unlike the timeline fingerprint, the episode identifier is
//! content-sensitive: it covers the bounds and every event's timestamp, label
//! and score. [`Episode::bounds_key`] offers the bounds-only view for callers
//! that need to group episodes sharing a window.

use chrono::{DateTime, Duration, Utc};

use crate::error::{ModelError, ModelResult};
use crate::event::EmotionEvent;
use crate::hash::Fingerprint;
use crate::identity::{private, Identified};
use crate::time::{seconds_f64, to_iso};

/// Immutable time window plus contained observations
///
/// # Invariants
/// - `start <= end`
/// - every event timestamp lies in `[start, end)`
/// - events are chronologically ordered
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    events: Vec<EmotionEvent>,
    source_subject_id: Option<String>,
}

impl Episode {
    /// Create an episode, validating bounds, containment and ordering
    ///
    /// # Errors
    /// - [`ModelError::InvalidBounds`] if `start > end`
    /// - [`ModelError::EventOutsideWindow`] for the first event outside `[start, end)`
    /// - [`ModelError::NotChronological`] for the first out-of-order pair
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        events: Vec<EmotionEvent>,
        source_subject_id: Option<String>,
    ) -> ModelResult<Self> {
        if start > end {
            return Err(ModelError::InvalidBounds { start, end });
        }
        for (index, event) in events.iter().enumerate() {
            if event.timestamp < start || event.timestamp >= end {
                return Err(ModelError::EventOutsideWindow {
                    index,
                    timestamp: event.timestamp,
                    start,
                    end,
                });
            }
        }
        for (index, pair) in events.windows(2).enumerate() {
            if pair[0].timestamp > pair[1].timestamp {
                return Err(ModelError::NotChronological {
                    index,
                    previous: pair[0].timestamp,
                    next: pair[1].timestamp,
                });
            }
        }
        Ok(Self {
            start,
            end,
            events,
            source_subject_id,
        })
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
    pub fn events(&self) -> &[EmotionEvent] {
        &self.events
    }

    #[inline]
    #[must_use]
    pub fn source_subject_id(&self) -> Option<&str> {
        self.source_subject_id.as_deref()
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

    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Duration in fractional seconds
    #[inline]
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        seconds_f64(self.duration())
    }

    /// `start <= ts < end`
    #[inline]
    #[must_use]
    pub fn contains_timestamp(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }

    /// Content-sensitive identifier
    ///
    /// Hashes `start:end` followed by `:timestamp:label_len:label:score` per
    /// event, with `-` for a missing score. The length prefix keeps labels
    /// containing `:` from running into the next field.
    #[must_use]
    pub fn episode_id(&self) -> Fingerprint {
        let mut content = format!("{}:{}", to_iso(&self.start), to_iso(&self.end));
        for event in &self.events {
            let score = event.score.map_or_else(|| "-".to_string(), |s| s.to_string());
            content.push_str(&format!(
                ":{}:{}:{}:{}",
                to_iso(&event.timestamp),
                event.emotion_label.len(),
                event.emotion_label,
                score
            ));
        }
        Fingerprint::compute_str(&content)
    }

    /// Bounds-only key: start, end and subject, ignoring events
    #[must_use]
    pub fn bounds_key(&self) -> Fingerprint {
        let content = format!(
            "bounds:{}:{}:{}",
            to_iso(&self.start),
            to_iso(&self.end),
            self.source_subject_id.as_deref().unwrap_or_default()
        );
        Fingerprint::compute_str(&content)
    }
}

impl private::Sealed for Episode {}

impl Identified for Episode {
    const TYPE_ID: &'static str = "episode";

    fn identifier(&self) -> Fingerprint {
        self.episode_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn at(minutes: i64, label: &str) -> EmotionEvent {
        EmotionEvent::new(base() + Duration::minutes(minutes), label)
    }

    fn hour_episode(events: Vec<EmotionEvent>, subject: Option<&str>) -> Episode {
        Episode::new(base(), base() + Duration::hours(1), events, subject.map(String::from)).unwrap()
    }

    #[test]
    fn valid_episode() {
        let episode = hour_episode(vec![at(0, "a"), at(30, "b")], Some("s"));
        assert_eq!(episode.len(), 2);
        assert!((episode.duration_secs() - 3600.0).abs() < f64::EPSILON);
        assert_eq!(episode.source_subject_id(), Some("s"));
    }

    #[test]
    fn empty_episode_allowed() {
        assert!(hour_episode(vec![], None).is_empty());
    }

    #[test]
    fn start_after_end_rejected() {
        let result = Episode::new(base() + Duration::hours(1), base(), vec![], None);
        assert!(matches!(result, Err(ModelError::InvalidBounds { .. })));
    }

    #[test]
    fn event_before_start_rejected() {
        let result = Episode::new(base(), base() + Duration::hours(1), vec![at(-1, "a")], None);
        assert!(matches!(result, Err(ModelError::EventOutsideWindow { index: 0, .. })));
    }

    #[test]
    fn event_at_end_rejected() {
        let result = Episode::new(base(), base() + Duration::hours(1), vec![at(60, "a")], None);
        assert!(matches!(result, Err(ModelError::EventOutsideWindow { .. })));
    }

    #[test]
    fn unordered_events_rejected() {
        let result = Episode::new(base(), base() + Duration::hours(1), vec![at(20, "a"), at(10, "b")], None);
        assert!(matches!(result, Err(ModelError::NotChronological { index: 0, .. })));
    }

    #[test]
    fn contains_timestamp_half_open() {
        let episode = hour_episode(vec![], None);
        assert!(episode.contains_timestamp(base()));
        assert!(!episode.contains_timestamp(base() + Duration::hours(1)));
    }

    #[test]
    fn episode_id_deterministic_and_32_hex() {
        let episode = hour_episode(vec![at(5, "a")], None);
        assert_eq!(episode.episode_id(), episode.episode_id());
        assert_eq!(episode.episode_id().to_string().len(), 32);
    }

    #[test]
    fn episode_id_differs_for_different_bounds() {
        let e1 = hour_episode(vec![], None);
        let e2 = Episode::new(base() + Duration::hours(1), base() + Duration::hours(2), vec![], None).unwrap();
        assert_ne!(e1.episode_id(), e2.episode_id());
    }

    // Same window, different events: the identifier is content-sensitive,
    // while the bounds key treats the two as the same window.
    #[test]
    fn same_bounds_different_content_distinct_ids_equal_bounds_key() {
        let e1 = hour_episode(vec![at(10, "neutral")], Some("s"));
        let e2 = hour_episode(vec![at(10, "happy"), at(20, "sad")], Some("s"));
        assert_ne!(e1.episode_id(), e2.episode_id());
        assert_eq!(e1.bounds_key(), e2.bounds_key());
    }

    #[test]
    fn score_participates_in_episode_id() {
        let e1 = hour_episode(vec![at(10, "neutral").with_score(0.2)], None);
        let e2 = hour_episode(vec![at(10, "neutral").with_score(0.9)], None);
        let e3 = hour_episode(vec![at(10, "neutral")], None);
        assert_ne!(e1.episode_id(), e2.episode_id());
        assert_ne!(e1.episode_id(), e3.episode_id());
    }

    #[test]
    fn delimiters_inside_labels_do_not_collide() {
        let two = hour_episode(vec![at(0, "a"), at(10, "b")], None);
        let glued_label = format!("a:{}:b", to_iso(&(base() + Duration::minutes(10))));
        let one = hour_episode(vec![at(0, &glued_label)], None);
        assert_ne!(two.episode_id(), one.episode_id());

        let scored = hour_episode(vec![at(0, "x").with_score(0.5)], None);
        let unscored = hour_episode(vec![at(0, "x:0.5")], None);
        assert_ne!(scored.episode_id(), unscored.episode_id());
    }

    #[test]
    fn source_and_metadata_do_not_affect_episode_id() {
        let e1 = hour_episode(vec![at(10, "neutral")], Some("subject1"));
        let e2 = hour_episode(
            vec![at(10, "neutral").with_source("cam").with_metadata(serde_json::json!({"x": 1}))],
            Some("subject2"),
        );
        assert_eq!(e1.episode_id(), e2.episode_id());
        assert_ne!(e1.bounds_key(), e2.bounds_key());
    }
}
