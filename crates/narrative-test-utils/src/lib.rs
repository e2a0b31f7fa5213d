//! Testing utilities for the narrative workspace
//!
//! Shared fixtures: a fixed base instant, minute-offset events, timelines,
//! episodes and graphs.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use narrative_analytics::{build_graph, segment_to_episodes, TemporalNarrativeGraph};
use narrative_model::{EmotionEvent, EmotionTimeline, Episode};

pub const SUBJECT: &str = "subject-1";

/// 2024-01-01T00:00:00Z
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn at_minutes(minutes: i64) -> DateTime<Utc> {
    base_time() + Duration::minutes(minutes)
}

pub fn event_at(minutes: i64, label: &str) -> EmotionEvent {
    EmotionEvent::new(at_minutes(minutes), label)
}

/// Timeline of `neutral` events at the given minute offsets
pub fn timeline_at_minutes(subject: &str, offsets: &[i64]) -> EmotionTimeline {
    let events = offsets.iter().map(|m| event_at(*m, "neutral")).collect();
    EmotionTimeline::new(subject, events).unwrap()
}

/// Four events at minutes 0, 1, 31 and 32 with mixed labels and scores
pub fn two_session_timeline() -> EmotionTimeline {
    let events = vec![
        event_at(0, "neutral"),
        event_at(1, "positive").with_score(0.8),
        event_at(31, "neutral").with_source("caption_model"),
        event_at(32, "negative").with_score(0.4),
    ];
    EmotionTimeline::new(SUBJECT, events).unwrap()
}

/// Episode without events spanning `[start_min, end_min)`
pub fn span(start_min: i64, end_min: i64) -> Episode {
    Episode::new(at_minutes(start_min), at_minutes(end_min), vec![], None).unwrap()
}

/// Episodes of [`two_session_timeline`] under a ten minute gap threshold
pub fn two_session_episodes() -> Vec<Episode> {
    segment_to_episodes(&two_session_timeline(), Duration::minutes(10)).unwrap()
}

/// Three episodes: two overlapping and one touching the second
pub fn sample_graph() -> TemporalNarrativeGraph {
    build_graph(vec![span(0, 120), span(60, 180), span(180, 240)], Duration::zero(), false).unwrap()
}
