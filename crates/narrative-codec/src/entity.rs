//! Per-entity encoders and decoders
//!
//! Data layouts (optional fields omitted when absent, never `null`):
//!
//! | Entity | `data` |
//! |--------|--------|
//! | timeline | `{subject_id, events, metadata?}` |
//! | episode | `{start_time, end_time, events, source_subject_id?}` |
//! | graph | `{nodes: [episode data], edges: [{source_index, target_index, relation}], adjacency_threshold_seconds?}` |
//!
//! Events are `{timestamp, emotion_label, score?, source_id?, metadata?}`.

use chrono::{DateTime, Utc};
use narrative_analytics::{
    FrontendGraphPayload, NarrativeEdge, ProximityRelation, TemporalNarrativeGraph,
};
use narrative_model::time::{duration_from_secs_f64, seconds_f64};
use narrative_model::{EmotionEvent, EmotionTimeline, Episode, Identified};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::canonical::to_canonical_string;
use crate::error::{CodecError, CodecResult};
use crate::payload::SerializedPayload;

/// Entity with a payload `data` layout
///
/// Implemented for [`EmotionTimeline`], [`Episode`] and
/// [`TemporalNarrativeGraph`]. The fingerprint stored alongside the data is
/// always [`Identified::identifier`].
pub trait EntityCodec: Identified + Sized {
    /// Build the `data` value
    ///
    /// # Errors
    /// Returns [`CodecError::InvalidField`] for values JSON cannot carry
    fn encode_data(&self) -> CodecResult<Value>;

    /// Rebuild the entity from `data`, re-validating every invariant
    ///
    /// # Errors
    /// Returns any [`CodecError`] describing why `data` is unusable
    fn decode_data(data: &Value) -> CodecResult<Self>;
}

/// Wrap `entity` in a payload keyed by its identifier
///
/// # Errors
/// Propagates [`EntityCodec::encode_data`] failures
pub fn serialize<T: EntityCodec>(entity: &T) -> CodecResult<SerializedPayload> {
    Ok(SerializedPayload::new(entity.identifier(), entity.encode_data()?))
}

/// Rebuild an entity and verify it against the payload fingerprint
///
/// # Errors
/// - [`CodecError::UnsupportedSchema`] for a foreign schema version
/// - [`CodecError::FingerprintMismatch`] if the rebuilt entity hashes differently
/// - anything [`EntityCodec::decode_data`] reports
pub fn deserialize<T: EntityCodec>(payload: &SerializedPayload) -> CodecResult<T> {
    payload.check_schema()?;
    let entity = T::decode_data(&payload.data)?;
    let actual = entity.identifier();
    if actual != payload.fingerprint {
        warn!(
            kind = T::TYPE_ID,
            expected = %payload.fingerprint,
            %actual,
            "payload fingerprint mismatch"
        );
        return Err(CodecError::FingerprintMismatch {
            expected: payload.fingerprint,
            actual,
        });
    }
    Ok(entity)
}

/// Canonical JSON text of a frontend payload
///
/// # Errors
/// Returns [`CodecError::Json`] if a float is not representable
pub fn frontend_to_json(payload: &FrontendGraphPayload) -> CodecResult<String> {
    to_canonical_string(payload)
}

#[derive(Serialize, Deserialize)]
struct TimelineData {
    subject_id: String,
    events: Vec<EmotionEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<Value>,
}

#[derive(Serialize, Deserialize)]
struct EpisodeData {
    #[serde(with = "narrative_model::time::iso")]
    start_time: DateTime<Utc>,
    #[serde(with = "narrative_model::time::iso")]
    end_time: DateTime<Utc>,
    events: Vec<EmotionEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_subject_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct EdgeData {
    source_index: usize,
    target_index: usize,
    relation: ProximityRelation,
}

#[derive(Serialize, Deserialize)]
struct GraphData {
    nodes: Vec<EpisodeData>,
    edges: Vec<EdgeData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    adjacency_threshold_seconds: Option<f64>,
}

impl EpisodeData {
    fn from_episode(episode: &Episode) -> CodecResult<Self> {
        check_scores(episode.events())?;
        Ok(Self {
            start_time: episode.start(),
            end_time: episode.end(),
            events: episode.events().to_vec(),
            source_subject_id: episode.source_subject_id().map(str::to_string),
        })
    }

    fn into_episode(self) -> CodecResult<Episode> {
        Ok(Episode::new(
            self.start_time,
            self.end_time,
            self.events,
            self.source_subject_id,
        )?)
    }
}

/// JSON has no NaN or infinity; refuse rather than emit `null`
fn check_scores(events: &[EmotionEvent]) -> CodecResult<()> {
    match events.iter().filter_map(|e| e.score).find(|s| !s.is_finite()) {
        Some(score) => Err(CodecError::invalid_field(
            "score",
            format!("must be finite, got {score}"),
        )),
        None => Ok(()),
    }
}

fn decode<T: DeserializeOwned>(data: &Value, required: &[&'static str]) -> CodecResult<T> {
    let object = data
        .as_object()
        .ok_or_else(|| CodecError::invalid_field("data", "expected a JSON object"))?;
    if let Some(missing) = required.iter().find(|f| !object.contains_key(**f)) {
        return Err(CodecError::MissingField(*missing));
    }
    Ok(serde_json::from_value(data.clone())?)
}

impl EntityCodec for EmotionTimeline {
    fn encode_data(&self) -> CodecResult<Value> {
        check_scores(self.events())?;
        let data = TimelineData {
            subject_id: self.subject_id().to_string(),
            events: self.events().to_vec(),
            metadata: self.metadata().cloned(),
        };
        Ok(serde_json::to_value(data)?)
    }

    fn decode_data(data: &Value) -> CodecResult<Self> {
        let data: TimelineData = decode(data, &["subject_id", "events"])?;
        let timeline = EmotionTimeline::new(data.subject_id, data.events)?;
        Ok(match data.metadata {
            Some(metadata) => timeline.with_metadata(metadata),
            None => timeline,
        })
    }
}

impl EntityCodec for Episode {
    fn encode_data(&self) -> CodecResult<Value> {
        Ok(serde_json::to_value(EpisodeData::from_episode(self)?)?)
    }

    fn decode_data(data: &Value) -> CodecResult<Self> {
        let data: EpisodeData = decode(data, &["start_time", "end_time", "events"])?;
        data.into_episode()
    }
}

impl EntityCodec for TemporalNarrativeGraph {
    fn encode_data(&self) -> CodecResult<Value> {
        let nodes = self
            .nodes()
            .iter()
            .map(EpisodeData::from_episode)
            .collect::<CodecResult<Vec<_>>>()?;
        let edges = self
            .edges()
            .iter()
            .map(|e| EdgeData {
                source_index: e.source_index(),
                target_index: e.target_index(),
                relation: e.relation(),
            })
            .collect();
        let data = GraphData {
            nodes,
            edges,
            adjacency_threshold_seconds: self.adjacency_threshold().map(seconds_f64),
        };
        Ok(serde_json::to_value(data)?)
    }

    fn decode_data(data: &Value) -> CodecResult<Self> {
        let data: GraphData = decode(data, &["nodes", "edges"])?;
        let nodes = data
            .nodes
            .into_iter()
            .map(EpisodeData::into_episode)
            .collect::<CodecResult<Vec<_>>>()?;
        let edges = data
            .edges
            .into_iter()
            .map(|e| NarrativeEdge::new(e.source_index, e.target_index, e.relation))
            .collect::<Result<Vec<_>, _>>()?;
        let threshold = match data.adjacency_threshold_seconds {
            Some(secs) if secs < 0.0 => {
                return Err(CodecError::invalid_field(
                    "adjacency_threshold_seconds",
                    format!("must be non-negative, got {secs}"),
                ));
            }
            Some(secs) => Some(duration_from_secs_f64(secs)?),
            None => None,
        };
        Ok(TemporalNarrativeGraph::new(nodes, edges, threshold)?)
    }
}
