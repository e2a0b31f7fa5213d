//! Narrative Analytics
//!
//! Pure derivations over the narrative data model:
//!
//! - [`segment_by_gaps`] / [`segment_to_episodes`]: gap-based segmentation
//! - [`segment_fixed_windows`] / [`align_timelines_to_windows`]: fixed-width
//!   windows shared across subjects
//! - [`temporal_distance`] / [`proximity_matrix`]: presence/absence
//!   comparison of timelines over shared windows
//! - [`classify`]: overlapping / adjacent / disjoint episode relations
//! - [`build_graph`]: exhaustive pairwise narrative graph
//! - [`build_frontend_payload`]: canonical, order-independent projection
//!
//! Nothing here performs I/O or holds shared state; all functions are safe
//! to call concurrently on independent inputs.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod compare;
mod error;
mod frontend;
mod graph;
mod proximity;
mod segment;

pub use compare::{proximity_matrix, temporal_distance};
pub use error::{AnalyticsError, AnalyticsResult};
pub use frontend::{build_frontend_payload, edge_id, FrontendEdge, FrontendGraphPayload, FrontendNode};
pub use graph::{build_graph, NarrativeEdge, TemporalNarrativeGraph};
pub use proximity::{are_adjacent, classify, temporal_gap, temporal_overlap, ProximityRelation};
pub use segment::{
    align_timelines_to_windows, segment_by_gaps, segment_fixed_windows, segment_to_episodes, Segment,
    MAX_FIXED_WINDOWS,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use narrative_model::{EmotionEvent, EmotionTimeline};

    #[test]
    fn four_events_split_into_two_episodes() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let events = [0, 1, 31, 32]
            .into_iter()
            .map(|m| EmotionEvent::new(base + Duration::minutes(m), "neutral"))
            .collect();
        let timeline = EmotionTimeline::new("subject", events).unwrap();

        let episodes = segment_to_episodes(&timeline, Duration::minutes(10)).unwrap();
        assert_eq!(episodes.len(), 2);
        assert!(episodes.iter().all(|e| e.len() == 2));

        // Windows end one microsecond after their last event, leaving the two
        // runs just under 30 minutes apart.
        let gap = temporal_gap(&episodes[0], &episodes[1]);
        assert_eq!(gap, Duration::minutes(30) - narrative_model::time::min_increment());

        let strict = build_graph(episodes.clone(), Duration::zero(), false).unwrap();
        assert_eq!(strict.edge_count(), 0);
        let with_disjoint = build_graph(episodes.clone(), Duration::zero(), true).unwrap();
        assert_eq!(with_disjoint.edges_by_relation(ProximityRelation::Disjoint).len(), 1);

        let graph = build_graph(episodes, gap, false).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges()[0].relation(), ProximityRelation::Adjacent);
    }

    #[test]
    fn touching_episodes_adjacent_at_zero_threshold() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let a = narrative_model::Episode::new(base, base + Duration::minutes(30), vec![], None).unwrap();
        let b = narrative_model::Episode::new(base + Duration::minutes(30), base + Duration::minutes(60), vec![], None).unwrap();

        let graph = build_graph(vec![a, b], Duration::zero(), false).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges()[0].relation(), ProximityRelation::Adjacent);
    }

    #[test]
    fn two_hour_episodes_overlap() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let a = narrative_model::Episode::new(base, base + Duration::hours(2), vec![], None).unwrap();
        let b = narrative_model::Episode::new(base + Duration::hours(1), base + Duration::hours(3), vec![], None).unwrap();

        let overlap = temporal_overlap(&a, &b);
        assert!(overlap > 0.0 && overlap < 1.0);
        assert_eq!(classify(&a, &b, Duration::zero()).unwrap(), ProximityRelation::Overlapping);

        let payload = build_frontend_payload(&build_graph(vec![b, a], Duration::zero(), false).unwrap());
        assert_eq!(payload.edge_count, 1);
        assert_eq!((payload.edges[0].source_index, payload.edges[0].target_index), (0, 1));
    }
}
