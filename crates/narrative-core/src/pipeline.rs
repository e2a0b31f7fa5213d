//! Narrative pipeline - the composition root
//!
//! Owns the configuration and the single [`StructuralCache`] instance, and
//! runs observations through segmentation, graph construction and the
//! frontend projection. Derived payloads are cached by fingerprint:
//! timelines under their structural fingerprint, graphs under their graph id.

use chrono::Duration;
use narrative_analytics::{
    build_frontend_payload, build_graph, segment_to_episodes, FrontendGraphPayload,
    TemporalNarrativeGraph,
};
use narrative_codec::{deserialize, serialize, EntityCodec};
use narrative_model::{EmotionEvent, EmotionTimeline, Episode, Fingerprint};
use narrative_store::{ContentAddressedStore, StructuralCache};
use tracing::{debug, instrument};

use crate::config::NarrativeConfig;
use crate::error::{NarrativeError, NarrativeResult};
use crate::observation::Observation;

/// End-to-end derivation with caching
#[derive(Debug, Clone)]
pub struct NarrativePipeline {
    config: NarrativeConfig,
    gap_threshold: Duration,
    adjacency_threshold: Duration,
    cache: StructuralCache,
}

impl NarrativePipeline {
    /// Validate `config` and open the store it names
    ///
    /// # Errors
    /// - [`NarrativeError::Config`] for invalid settings
    /// - [`NarrativeError::Store`] if the storage root cannot be created
    pub fn new(config: NarrativeConfig) -> NarrativeResult<Self> {
        config.validate()?;
        let store = ContentAddressedStore::new(&config.storage_root)?;
        let cache = StructuralCache::new(store, config.memory_capacity);
        Self::with_cache(config, cache)
    }

    /// Build around an existing cache
    ///
    /// `config.storage_root` and `config.memory_capacity` are not consulted.
    ///
    /// # Errors
    /// Returns [`NarrativeError::Config`] for invalid thresholds
    pub fn with_cache(config: NarrativeConfig, cache: StructuralCache) -> NarrativeResult<Self> {
        config.validate()?;
        Ok(Self {
            gap_threshold: config.gap_threshold()?,
            adjacency_threshold: config.adjacency_threshold()?,
            config,
            cache,
        })
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &NarrativeConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn cache(&self) -> &StructuralCache {
        &self.cache
    }

    /// Sort observations into a timeline for `subject`
    #[must_use]
    #[instrument(skip_all, fields(subject = %subject, observations = observations.len()))]
    pub fn timeline(&self, subject: &str, observations: Vec<Observation>) -> EmotionTimeline {
        let events: Vec<EmotionEvent> = observations.into_iter().map(EmotionEvent::from).collect();
        EmotionTimeline::from_events(subject, events, None)
    }

    /// Segment a timeline into episodes at the configured gap threshold
    ///
    /// # Errors
    /// Propagates segmentation failures
    #[instrument(skip_all, fields(subject = timeline.subject_id(), events = timeline.len()))]
    pub fn episodes(&self, timeline: &EmotionTimeline) -> NarrativeResult<Vec<Episode>> {
        let episodes = segment_to_episodes(timeline, self.gap_threshold)?;
        debug!(episodes = episodes.len(), "segmented timeline");
        Ok(episodes)
    }

    /// Build the proximity graph at the configured adjacency threshold
    ///
    /// # Errors
    /// Propagates graph construction failures
    #[instrument(skip_all, fields(episodes = episodes.len()))]
    pub fn graph(&self, episodes: Vec<Episode>) -> NarrativeResult<TemporalNarrativeGraph> {
        Ok(build_graph(
            episodes,
            self.adjacency_threshold,
            self.config.include_disjoint_edges,
        )?)
    }

    /// Derive, cache and project a timeline
    ///
    /// Stores the timeline payload and the graph payload, then returns the
    /// frontend projection of the graph. Re-running on the same data rewrites
    /// nothing and yields an identical payload.
    ///
    /// # Errors
    /// Propagates derivation, encoding and storage failures
    #[instrument(skip_all, fields(subject = timeline.subject_id(), fingerprint = %timeline.fingerprint()))]
    pub fn frontend(&self, timeline: &EmotionTimeline) -> NarrativeResult<FrontendGraphPayload> {
        self.cache_entity(timeline)?;
        let graph = self.graph(self.episodes(timeline)?)?;
        let graph_id = self.cache_entity(&graph)?;
        debug!(%graph_id, nodes = graph.node_count(), edges = graph.edge_count(), "derived narrative graph");
        Ok(build_frontend_payload(&graph))
    }

    /// Observations straight to the frontend projection
    ///
    /// # Errors
    /// See [`Self::frontend`]
    pub fn derive(&self, subject: &str, observations: Vec<Observation>) -> NarrativeResult<FrontendGraphPayload> {
        let timeline = self.timeline(subject, observations);
        self.frontend(&timeline)
    }

    /// Previously derived graph, if cached
    ///
    /// # Errors
    /// Propagates storage failures and payloads that fail verification
    pub fn cached_graph(&self, graph_id: &Fingerprint) -> NarrativeResult<Option<TemporalNarrativeGraph>> {
        self.cached(graph_id)
    }

    /// Previously stored timeline, if cached
    ///
    /// # Errors
    /// Propagates storage failures and payloads that fail verification
    pub fn cached_timeline(&self, fingerprint: &Fingerprint) -> NarrativeResult<Option<EmotionTimeline>> {
        self.cached(fingerprint)
    }

    fn cached<T: EntityCodec>(&self, fingerprint: &Fingerprint) -> NarrativeResult<Option<T>> {
        self.cache
            .get(fingerprint)?
            .map(|payload| deserialize(&payload).map_err(NarrativeError::from))
            .transpose()
    }

    fn cache_entity<T: EntityCodec>(&self, entity: &T) -> NarrativeResult<Fingerprint> {
        let fingerprint = entity.identifier();
        self.cache
            .try_get_or_compute::<_, NarrativeError>(&fingerprint, || Ok(serialize(entity)?))?;
        Ok(fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use narrative_test_utils::at_minutes;

    fn pipeline(dir: &tempfile::TempDir) -> NarrativePipeline {
        let config = NarrativeConfig::new()
            .with_gap_threshold_secs(600.0)
            .with_storage_root(dir.path());
        NarrativePipeline::new(config).unwrap()
    }

    fn observations() -> Vec<Observation> {
        vec![
            Observation::new(at_minutes(31), "neutral"),
            Observation::new(at_minutes(0), "neutral"),
            Observation::new(at_minutes(32), "negative").with_score(0.3),
            Observation::new(at_minutes(1), "positive"),
        ]
    }

    #[test]
    fn timeline_sorts_observations() {
        let dir = tempfile::tempdir().unwrap();
        let timeline = pipeline(&dir).timeline("s", observations());
        assert_eq!(timeline.len(), 4);
        assert_eq!(timeline.start_time(), Some(at_minutes(0)));
        assert_eq!(timeline.subject_id(), "s");
    }

    #[test]
    fn frontend_caches_timeline_and_graph() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(&dir);
        let timeline = pipeline.timeline("s", observations());

        let payload = pipeline.frontend(&timeline).unwrap();
        assert_eq!(payload.node_count, 2);

        let graph = pipeline.cached_graph(&payload.graph_id).unwrap().unwrap();
        assert_eq!(graph.graph_id(), payload.graph_id);
        let cached = pipeline.cached_timeline(&timeline.fingerprint()).unwrap().unwrap();
        assert_eq!(cached, timeline);
        assert_eq!(pipeline.cache().store().fingerprints().unwrap().len(), 2);
    }

    #[test]
    fn rerun_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(&dir);
        let first = pipeline.derive("s", observations()).unwrap();
        let mut reversed = observations();
        reversed.reverse();
        let second = pipeline.derive("s", reversed).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_graph_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(pipeline(&dir).cached_graph(&Fingerprint::compute_str("x")).unwrap().is_none());
    }

    #[test]
    fn invalid_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = NarrativeConfig::new().with_storage_root(dir.path()).with_memory_capacity(0);
        assert!(matches!(NarrativePipeline::new(config), Err(NarrativeError::Config(_))));
    }
}
