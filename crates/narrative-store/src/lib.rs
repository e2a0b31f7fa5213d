//! Narrative Store
//!
//! Persistence for [`SerializedPayload`](narrative_codec::SerializedPayload)s:
//!
//! - [`ContentAddressedStore`]: one file per fingerprint, atomic publish,
//!   idempotent writes
//! - [`StructuralCache`]: moka memory layer in front of the store, with
//!   single-flight `get_or_compute`
//!
//! Missing records are `None`, never errors. Nothing is retried here.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod cache;
mod error;
mod store;

pub use cache::{CacheStats, StructuralCache, DEFAULT_MEMORY_CAPACITY};
pub use error::{StoreError, StoreResult};
pub use store::ContentAddressedStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use narrative_analytics::TemporalNarrativeGraph;
    use narrative_codec::{deserialize, serialize};
    use narrative_test_utils::sample_graph;

    #[test]
    fn graph_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let graph = sample_graph();
        let graph_id = {
            let cache = StructuralCache::new(ContentAddressedStore::new(dir.path()).unwrap(), DEFAULT_MEMORY_CAPACITY);
            cache.put(serialize(&graph).unwrap()).unwrap()
        };

        let reopened = StructuralCache::new(ContentAddressedStore::new(dir.path()).unwrap(), DEFAULT_MEMORY_CAPACITY);
        let payload = reopened.get(&graph_id).unwrap().unwrap();
        let restored: TemporalNarrativeGraph = deserialize(&payload).unwrap();
        assert_eq!(restored.graph_id(), graph.graph_id());
    }
}
