//! End-to-end scenarios across model, analytics, codec and store

use chrono::Duration;
use narrative_analytics::{build_frontend_payload, classify, temporal_overlap, ProximityRelation};
use narrative_codec::{frontend_to_json, SerializedPayload};
use narrative_core::prelude::*;
use narrative_core::parse_observations;
use narrative_store::{ContentAddressedStore, StructuralCache};
use narrative_test_utils::at_minutes;
use pretty_assertions::assert_eq;

const OBSERVATIONS: &str = r#"[
    {"timestamp": "2024-01-01T00:32:00Z", "emotion_label": "negative", "score": 0.4},
    {"timestamp": "2024-01-01T00:00:00.000000000Z", "emotion_label": "neutral"},
    {"timestamp": "2024-01-01T00:31:00Z", "emotion_label": "neutral", "source_id": "caption_model"},
    {"timestamp": "2024-01-01T00:01:00Z", "emotion_label": "positive", "score": 0.8}
]"#;

fn pipeline(dir: &tempfile::TempDir, adjacency_secs: f64) -> NarrativePipeline {
    let config = NarrativeConfig::new()
        .with_gap_threshold_secs(600.0)
        .with_adjacency_threshold_secs(adjacency_secs)
        .with_storage_root(dir.path());
    NarrativePipeline::new(config).unwrap()
}

#[test]
fn two_sessions_from_raw_json() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(&dir, 1800.0);

    let payload = pipeline.derive("subject-1", parse_observations(OBSERVATIONS).unwrap()).unwrap();

    assert_eq!(payload.node_count, 2);
    assert_eq!(payload.edge_count, 1);
    assert_eq!(payload.nodes[0].start_time_iso, "2024-01-01T00:00:00.000000000Z");
    assert_eq!(payload.nodes[0].end_time_iso, "2024-01-01T00:01:00.000001000Z");
    assert_eq!(payload.nodes[1].event_count, 2);
    assert_eq!(payload.edges[0].relation, ProximityRelation::Adjacent);
    assert_eq!((payload.edges[0].source_index, payload.edges[0].target_index), (0, 1));
}

#[test]
fn zero_threshold_keeps_sessions_apart() {
    let dir = tempfile::tempdir().unwrap();
    let payload = pipeline(&dir, 0.0)
        .derive("subject-1", parse_observations(OBSERVATIONS).unwrap())
        .unwrap();
    assert_eq!(payload.node_count, 2);
    assert_eq!(payload.edge_count, 0);
}

#[test]
fn overlapping_hours() {
    let a = Episode::new(at_minutes(0), at_minutes(120), vec![], None).unwrap();
    let b = Episode::new(at_minutes(60), at_minutes(180), vec![], None).unwrap();
    let overlap = temporal_overlap(&a, &b);
    assert!(overlap > 0.0 && overlap < 1.0);
    assert_eq!(classify(&a, &b, Duration::zero()).unwrap(), ProximityRelation::Overlapping);
}

#[test]
fn frontend_json_is_byte_identical_across_runs() {
    let first_dir = tempfile::tempdir().unwrap();
    let second_dir = tempfile::tempdir().unwrap();

    let first = pipeline(&first_dir, 1800.0)
        .derive("subject-1", parse_observations(OBSERVATIONS).unwrap())
        .unwrap();
    let mut shuffled = parse_observations(OBSERVATIONS).unwrap();
    shuffled.rotate_left(1);
    let second = pipeline(&second_dir, 1800.0).derive("subject-1", shuffled).unwrap();

    assert_eq!(frontend_to_json(&first).unwrap(), frontend_to_json(&second).unwrap());
}

#[test]
fn cached_graph_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let graph_id = pipeline(&dir, 1800.0)
        .derive("subject-1", parse_observations(OBSERVATIONS).unwrap())
        .unwrap()
        .graph_id;

    let reopened = pipeline(&dir, 1800.0);
    let graph = reopened.cached_graph(&graph_id).unwrap().unwrap();
    assert_eq!(graph.graph_id(), graph_id);
    assert_eq!(build_frontend_payload(&graph).graph_id, graph_id);
}

#[test]
fn shared_cache_injection() {
    let dir = tempfile::tempdir().unwrap();
    let cache = StructuralCache::new(ContentAddressedStore::new(dir.path()).unwrap(), 16);
    let config = NarrativeConfig::new().with_gap_threshold_secs(600.0);

    let a = NarrativePipeline::with_cache(config.clone(), cache.clone()).unwrap();
    let b = NarrativePipeline::with_cache(config, cache.clone()).unwrap();

    let payload = a.derive("subject-1", parse_observations(OBSERVATIONS).unwrap()).unwrap();
    assert!(b.cached_graph(&payload.graph_id).unwrap().is_some());
    assert!(cache.is_valid(&payload.graph_id));
}

#[test]
fn tampered_record_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(&dir, 1800.0);
    let payload = pipeline.derive("subject-1", parse_observations(OBSERVATIONS).unwrap()).unwrap();

    let store = pipeline.cache().store();
    let path = store.path_for(&payload.graph_id);
    let mut record = SerializedPayload::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
    record.data["nodes"][0]["events"][0]["emotion_label"] = serde_json::json!("joy");
    std::fs::write(&path, record.to_json().unwrap()).unwrap();
    pipeline.cache().clear_memory_cache();

    assert!(matches!(
        pipeline.cached_graph(&payload.graph_id),
        Err(NarrativeError::Codec(narrative_codec::CodecError::FingerprintMismatch { .. }))
    ));
}

#[test]
fn invalidation_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(&dir, 1800.0);
    let payload = pipeline.derive("subject-1", parse_observations(OBSERVATIONS).unwrap()).unwrap();

    let cache = pipeline.cache();
    assert!(cache.invalidate(&payload.graph_id).unwrap());
    assert!(pipeline.cached_graph(&payload.graph_id).unwrap().is_none());

    assert_eq!(cache.store().clear().unwrap(), 1);
    cache.clear_memory_cache();
    assert!(cache.store().fingerprints().unwrap().is_empty());
}

#[test]
fn empty_input_yields_empty_payload() {
    let dir = tempfile::tempdir().unwrap();
    let payload = pipeline(&dir, 0.0).derive("nobody", vec![]).unwrap();
    assert_eq!(payload.node_count, 0);
    assert!(payload.edges.is_empty());
}
