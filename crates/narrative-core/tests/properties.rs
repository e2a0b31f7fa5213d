//! Property tests over the whole derivation chain

use chrono::Duration;
use narrative_analytics::{build_frontend_payload, build_graph, classify, segment_by_gaps, segment_to_episodes};
use narrative_codec::{deserialize, serialize};
use narrative_model::{EmotionEvent, EmotionTimeline, Episode, Identified};
use narrative_test_utils::at_minutes;
use proptest::prelude::*;

fn events() -> impl Strategy<Value = Vec<EmotionEvent>> {
    prop::collection::vec((0i64..600, "[a-z]{1,8}", proptest::option::of(0.0f64..1.0)), 0..24).prop_map(|raw| {
        raw.into_iter()
            .map(|(minute, label, score)| {
                let event = EmotionEvent::new(at_minutes(minute), label);
                match score {
                    Some(score) => event.with_score(score),
                    None => event,
                }
            })
            .collect()
    })
}

fn timeline() -> impl Strategy<Value = EmotionTimeline> {
    events().prop_map(|events| EmotionTimeline::from_events("subject", events, None))
}

proptest! {
    #[test]
    fn fingerprint_is_deterministic(t in timeline()) {
        prop_assert_eq!(t.fingerprint(), t.clone().fingerprint());
    }

    #[test]
    fn fingerprint_ignores_labels_and_scores(t in timeline()) {
        let relabelled: Vec<EmotionEvent> = t
            .events()
            .iter()
            .map(|e| EmotionEvent::new(e.timestamp, "other"))
            .collect();
        let other = EmotionTimeline::new("another-subject", relabelled).unwrap();
        prop_assert_eq!(t.fingerprint(), other.fingerprint());
    }

    #[test]
    fn segmentation_preserves_events(t in timeline(), gap in 1i64..120) {
        let segments = segment_by_gaps(&t, Duration::minutes(gap)).unwrap();
        let total: usize = segments.iter().map(|s| s.timeline.len()).sum();
        prop_assert_eq!(total, t.len());
    }

    #[test]
    fn episodes_contain_their_events(t in timeline(), gap in 1i64..120) {
        for episode in segment_to_episodes(&t, Duration::minutes(gap)).unwrap() {
            for event in episode.events() {
                prop_assert!(episode.start() <= event.timestamp && event.timestamp < episode.end());
            }
        }
    }

    #[test]
    fn classification_symmetric(t in timeline(), gap in 1i64..60, threshold in 0i64..60) {
        let episodes = segment_to_episodes(&t, Duration::minutes(gap)).unwrap();
        for a in &episodes {
            for b in &episodes {
                let threshold = Duration::minutes(threshold);
                prop_assert_eq!(classify(a, b, threshold).unwrap(), classify(b, a, threshold).unwrap());
            }
        }
    }

    #[test]
    fn graph_id_independent_of_episode_order(t in timeline(), gap in 1i64..60, rotate in 0usize..8) {
        let episodes = segment_to_episodes(&t, Duration::minutes(gap)).unwrap();
        let mut rotated = episodes.clone();
        if !rotated.is_empty() {
            let by = rotate % rotated.len();
            rotated.rotate_left(by);
        }
        let a = build_graph(episodes, Duration::minutes(30), false).unwrap();
        let b = build_graph(rotated, Duration::minutes(30), false).unwrap();
        prop_assert_eq!(a.graph_id(), b.graph_id());
        prop_assert_eq!(build_frontend_payload(&a), build_frontend_payload(&b));
    }

    #[test]
    fn serialization_round_trip(t in timeline(), gap in 1i64..60) {
        let back: EmotionTimeline = deserialize(&serialize(&t).unwrap()).unwrap();
        prop_assert_eq!(back.identifier(), t.identifier());

        let episodes = segment_to_episodes(&t, Duration::minutes(gap)).unwrap();
        for episode in &episodes {
            let back: Episode = deserialize(&serialize(episode).unwrap()).unwrap();
            prop_assert_eq!(back.identifier(), episode.identifier());
        }

        let graph = build_graph(episodes, Duration::zero(), true).unwrap();
        let back: narrative_analytics::TemporalNarrativeGraph = deserialize(&serialize(&graph).unwrap()).unwrap();
        prop_assert_eq!(back.identifier(), graph.identifier());
    }
}
