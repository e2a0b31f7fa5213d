//! Structural cache using moka
//!
//! An in-memory layer in front of a [`ContentAddressedStore`]. Reads check
//! memory first and fall back to disk, repopulating memory on a durable hit.
//! Writes go through to both layers.

use std::sync::Arc;

use moka::sync::Cache;
use narrative_codec::{CodecError, SerializedPayload};
use narrative_model::Fingerprint;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::store::ContentAddressedStore;

/// Default number of payloads kept in memory
pub const DEFAULT_MEMORY_CAPACITY: u64 = 10_000;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of payloads held in memory
    pub entry_count: u64,
}

/// Two-layer payload cache
///
/// Cloning is cheap and clones share both layers. Construct once at the
/// composition root and pass it to whatever needs it.
#[derive(Debug, Clone)]
pub struct StructuralCache {
    store: ContentAddressedStore,
    memory: Cache<Fingerprint, SerializedPayload>,
}

impl StructuralCache {
    /// Create cache over `store` holding up to `memory_capacity` payloads
    #[inline]
    #[must_use]
    pub fn new(store: ContentAddressedStore, memory_capacity: u64) -> Self {
        Self {
            store,
            memory: Cache::new(memory_capacity),
        }
    }

    /// Durable layer
    #[inline]
    #[must_use]
    pub fn store(&self) -> &ContentAddressedStore {
        &self.store
    }

    /// Look up a payload in memory, then on disk
    ///
    /// # Errors
    /// Propagates durable read failures; absence is `Ok(None)`
    pub fn get(&self, fingerprint: &Fingerprint) -> StoreResult<Option<SerializedPayload>> {
        if let Some(payload) = self.memory.get(fingerprint) {
            return Ok(Some(payload));
        }
        let loaded = self.store.load(fingerprint)?;
        if let Some(payload) = &loaded {
            debug!(%fingerprint, "repopulated memory from durable store");
            self.memory.insert(*fingerprint, payload.clone());
        }
        Ok(loaded)
    }

    /// Write `payload` to disk and memory
    ///
    /// # Errors
    /// Propagates durable write failures; memory is untouched on failure
    pub fn put(&self, payload: SerializedPayload) -> StoreResult<Fingerprint> {
        let fingerprint = self.store.store(&payload)?;
        self.memory.insert(fingerprint, payload);
        Ok(fingerprint)
    }

    /// Return the cached payload or compute, store and return it
    ///
    /// Among concurrent callers for the same fingerprint, `compute` runs at
    /// most once; the others wait for and share its result.
    ///
    /// # Errors
    /// - durable read or write failures
    /// - [`CodecError::FingerprintMismatch`] if `compute` returns a payload
    ///   for another fingerprint
    pub fn get_or_compute<F>(&self, fingerprint: &Fingerprint, compute: F) -> StoreResult<SerializedPayload>
    where
        F: FnOnce() -> SerializedPayload,
    {
        self.try_get_or_compute::<_, StoreError>(fingerprint, || Ok(compute()))
    }

    /// Fallible [`Self::get_or_compute`]
    ///
    /// A failed computation caches nothing and its error reaches the caller
    /// that ran it. Callers that were waiting on that computation receive
    /// the error's message as [`StoreError::Compute`], converted into `E`.
    ///
    /// # Errors
    /// Returns the computation's error, or a store error converted into `E`
    pub fn try_get_or_compute<F, E>(&self, fingerprint: &Fingerprint, compute: F) -> Result<SerializedPayload, E>
    where
        F: FnOnce() -> Result<SerializedPayload, E>,
        E: From<StoreError> + std::fmt::Display + Send + Sync + 'static,
    {
        let fingerprint = *fingerprint;
        self.memory
            .try_get_with::<_, E>(fingerprint, || {
                if let Some(payload) = self.store.load(&fingerprint)? {
                    debug!(%fingerprint, "served from durable store");
                    return Ok(payload);
                }
                let payload = compute()?;
                if payload.fingerprint != fingerprint {
                    return Err(E::from(StoreError::Codec(CodecError::FingerprintMismatch {
                        expected: fingerprint,
                        actual: payload.fingerprint,
                    })));
                }
                self.store.store(&payload)?;
                debug!(%fingerprint, "computed and stored payload");
                Ok(payload)
            })
            .map_err(|shared: Arc<E>| {
                Arc::try_unwrap(shared)
                    .unwrap_or_else(|shared| E::from(StoreError::Compute(shared.to_string())))
            })
    }

    /// Whether either layer holds `fingerprint`
    #[must_use]
    pub fn is_valid(&self, fingerprint: &Fingerprint) -> bool {
        self.memory.contains_key(fingerprint) || self.store.exists(fingerprint)
    }

    /// Remove `fingerprint` from both layers, reporting whether anything was removed
    ///
    /// # Errors
    /// Propagates durable delete failures
    pub fn invalidate(&self, fingerprint: &Fingerprint) -> StoreResult<bool> {
        let in_memory = self.memory.remove(fingerprint).is_some();
        let on_disk = self.store.invalidate(fingerprint)?;
        if in_memory || on_disk {
            info!(%fingerprint, in_memory, on_disk, "invalidated cache entry");
        }
        Ok(in_memory || on_disk)
    }

    /// Drop the memory layer only; durable records stay
    pub fn clear_memory_cache(&self) {
        self.memory.invalidate_all();
        self.memory.run_pending_tasks();
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.memory.run_pending_tasks();
        CacheStats {
            entry_count: self.memory.entry_count(),
        }
    }
}
