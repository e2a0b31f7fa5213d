//! Raw observation ingestion
//!
//! Observations arrive from an external source (post captions, model output)
//! as a JSON array, in any order.

use chrono::{DateTime, Utc};
use narrative_model::EmotionEvent;
use serde::{Deserialize, Serialize};

use crate::error::NarrativeResult;

/// One raw observation as supplied by a data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(with = "narrative_model::time::iso")]
    pub timestamp: DateTime<Utc>,
    pub emotion_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Observation {
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

    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }
}

impl From<Observation> for EmotionEvent {
    fn from(obs: Observation) -> Self {
        Self {
            timestamp: obs.timestamp,
            emotion_label: obs.emotion_label,
            score: obs.score,
            source_id: obs.source_id,
            metadata: obs.metadata,
        }
    }
}

/// Parse a JSON array of observations
///
/// # Errors
/// Returns [`crate::NarrativeError::Input`] for malformed JSON, missing
/// required fields or unparseable timestamps
pub fn parse_observations(json: &str) -> NarrativeResult<Vec<Observation>> {
    Ok(serde_json::from_str(json)?)
}
