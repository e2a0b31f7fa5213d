//! Narrative Codec
//!
//! Canonical serialization of narrative entities into schema-versioned
//! [`SerializedPayload`]s and back.
//!
//! # Guarantees
//!
//! - Encoding is deterministic: sorted keys, compact separators
//! - Optional fields are omitted, never written as `null`
//! - Decoding re-validates every model invariant and checks that the rebuilt
//!   entity hashes to the payload fingerprint
//!
//! # Example
//!
//! ```rust,ignore
//! use narrative_codec::{deserialize, serialize};
//!
//! let payload = serialize(&timeline)?;
//! let json = payload.to_json()?;
//! let back: EmotionTimeline = deserialize(&SerializedPayload::from_json(&json)?)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod canonical;
mod entity;
mod error;
mod payload;

pub use canonical::{canonicalize, to_canonical_string};
pub use entity::{deserialize, frontend_to_json, serialize, EntityCodec};
pub use error::{CodecError, CodecResult};
pub use payload::SerializedPayload;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use narrative_analytics::TemporalNarrativeGraph;
    use narrative_model::{EmotionTimeline, Episode, Identified};
    use narrative_test_utils::{sample_graph, two_session_episodes, two_session_timeline};

    fn through_text<T: EntityCodec>(entity: &T) -> T {
        let json = serialize(entity).unwrap().to_json().unwrap();
        deserialize(&SerializedPayload::from_json(&json).unwrap()).unwrap()
    }

    #[test]
    fn identifiers_survive_text_round_trip() {
        let timeline = two_session_timeline();
        assert_eq!(through_text(&timeline).identifier(), timeline.identifier());

        for episode in two_session_episodes() {
            let back: Episode = through_text(&episode);
            assert_eq!(back.identifier(), episode.identifier());
        }

        let graph = sample_graph();
        let back: TemporalNarrativeGraph = through_text(&graph);
        assert_eq!(back.identifier(), graph.identifier());
    }

    #[test]
    fn payload_kinds_are_not_interchangeable() {
        let payload = serialize(&two_session_timeline()).unwrap();
        assert!(deserialize::<Episode>(&payload).is_err());
        assert!(deserialize::<EmotionTimeline>(&payload).is_ok());
    }
}
