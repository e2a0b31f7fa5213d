//! A single emotion observation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One emotion observation tied to a timestamp
///
/// The label is free-form and never interpreted. `metadata` is an opaque JSON
/// value carried through untouched. Optional fields are omitted on the wire
/// when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionEvent {
    /// When the emotion was observed
    #[serde(with = "crate::time::iso")]
    pub timestamp: DateTime<Utc>,

    /// Emotion category, e.g. `positive`
    pub emotion_label: String,

    /// Intensity or confidence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Origin of the observation, e.g. `caption_model`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,

    /// Opaque caller-supplied context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl EmotionEvent {
    /// Create event with label only
    #[inline]
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, emotion_label: impl Into<String>) -> Self {
        Self {
            timestamp,
            emotion_label: emotion_label.into(),
            score: None,
            source_id: None,
            metadata: None,
        }
    }

    /// With intensity score
    #[inline]
    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// With source identifier
    #[inline]
    #[must_use]
    pub fn with_source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    /// With opaque metadata
    #[inline]
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
