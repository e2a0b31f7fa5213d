//! Pipeline configuration
//!
//! Loaded from TOML. Every field is optional in the file and falls back to
//! its default:
//!
//! ```toml
//! gap_threshold_secs = 1800.0
//! adjacency_threshold_secs = 0.0
//! include_disjoint_edges = false
//! storage_root = "./narrative-cache"
//! memory_capacity = 10000
//! ```

use std::path::{Path, PathBuf};

use chrono::Duration;
use narrative_model::time::duration_from_secs_f64;
use narrative_store::DEFAULT_MEMORY_CAPACITY;
use serde::{Deserialize, Serialize};

use crate::error::{NarrativeError, NarrativeResult};

/// Narrative pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NarrativeConfig {
    /// Split episodes at gaps of at least this many seconds
    pub gap_threshold_secs: f64,
    /// Episodes at most this far apart are adjacent
    pub adjacency_threshold_secs: f64,
    /// Emit edges for disjoint episode pairs too
    pub include_disjoint_edges: bool,
    /// Directory of the content-addressed store
    pub storage_root: PathBuf,
    /// Payloads kept in the memory layer
    pub memory_capacity: u64,
}

impl NarrativeConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate TOML text
    ///
    /// # Errors
    /// Returns [`NarrativeError::Config`] for malformed TOML, unknown keys
    /// or values rejected by [`Self::validate`]
    pub fn from_toml_str(text: &str) -> NarrativeResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| NarrativeError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Returns [`NarrativeError::Io`] if the file cannot be read, otherwise
    /// as [`Self::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> NarrativeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| NarrativeError::io_error(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML
    ///
    /// # Errors
    /// Returns [`NarrativeError::Config`] if a value has no TOML form
    pub fn to_toml_string(&self) -> NarrativeResult<String> {
        toml::to_string(self).map_err(|e| NarrativeError::config(e.to_string()))
    }

    /// Check value domains
    ///
    /// # Errors
    /// Returns [`NarrativeError::Config`] for a non-positive gap threshold, a
    /// negative adjacency threshold or a zero memory capacity
    pub fn validate(&self) -> NarrativeResult<()> {
        if !(self.gap_threshold_secs.is_finite() && self.gap_threshold_secs > 0.0) {
            return Err(NarrativeError::config(format!(
                "gap_threshold_secs must be positive, got {}",
                self.gap_threshold_secs
            )));
        }
        if !(self.adjacency_threshold_secs.is_finite() && self.adjacency_threshold_secs >= 0.0) {
            return Err(NarrativeError::config(format!(
                "adjacency_threshold_secs must be non-negative, got {}",
                self.adjacency_threshold_secs
            )));
        }
        if self.memory_capacity == 0 {
            return Err(NarrativeError::config("memory_capacity must be at least 1"));
        }
        Ok(())
    }

    /// Gap threshold as a duration
    ///
    /// # Errors
    /// Returns [`NarrativeError::Model`] if the value is out of range
    pub fn gap_threshold(&self) -> NarrativeResult<Duration> {
        Ok(duration_from_secs_f64(self.gap_threshold_secs)?)
    }

    /// Adjacency threshold as a duration
    ///
    /// # Errors
    /// Returns [`NarrativeError::Model`] if the value is out of range
    pub fn adjacency_threshold(&self) -> NarrativeResult<Duration> {
        Ok(duration_from_secs_f64(self.adjacency_threshold_secs)?)
    }

    /// With gap threshold in seconds
    #[inline]
    #[must_use]
    pub fn with_gap_threshold_secs(mut self, secs: f64) -> Self {
        self.gap_threshold_secs = secs;
        self
    }

    /// With adjacency threshold in seconds
    #[inline]
    #[must_use]
    pub fn with_adjacency_threshold_secs(mut self, secs: f64) -> Self {
        self.adjacency_threshold_secs = secs;
        self
    }

    /// With disjoint edges included or not
    #[inline]
    #[must_use]
    pub fn with_disjoint_edges(mut self, include: bool) -> Self {
        self.include_disjoint_edges = include;
        self
    }

    /// With storage root
    #[inline]
    #[must_use]
    pub fn with_storage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.storage_root = root.into();
        self
    }

    /// With memory capacity
    #[inline]
    #[must_use]
    pub fn with_memory_capacity(mut self, capacity: u64) -> Self {
        self.memory_capacity = capacity;
        self
    }
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            gap_threshold_secs: 1800.0,
            adjacency_threshold_secs: 0.0,
            include_disjoint_edges: false,
            storage_root: PathBuf::from("./narrative-cache"),
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = NarrativeConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.gap_threshold().unwrap(), Duration::minutes(30));
        assert_eq!(config.adjacency_threshold().unwrap(), Duration::zero());
        assert!(!config.include_disjoint_edges);
        assert_eq!(config.memory_capacity, 10_000);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(NarrativeConfig::from_toml_str("").unwrap(), NarrativeConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let config = NarrativeConfig::from_toml_str(
            r#"
            gap_threshold_secs = 600.0
            include_disjoint_edges = true
            storage_root = "/var/cache/narrative"
            "#,
        )
        .unwrap();
        assert_eq!(config.gap_threshold().unwrap(), Duration::minutes(10));
        assert!(config.include_disjoint_edges);
        assert_eq!(config.storage_root, PathBuf::from("/var/cache/narrative"));
        assert_eq!(config.adjacency_threshold_secs, 0.0);
    }

    #[test]
    fn rejects_bad_values() {
        for text in [
            "gap_threshold_secs = 0.0",
            "gap_threshold_secs = -5.0",
            "adjacency_threshold_secs = -1.0",
            "memory_capacity = 0",
            "unknown_key = 1",
            "gap_threshold_secs = \"soon\"",
        ] {
            assert!(
                matches!(NarrativeConfig::from_toml_str(text), Err(NarrativeError::Config(_))),
                "accepted {text}"
            );
        }
    }

    #[test]
    fn builders() {
        let config = NarrativeConfig::new()
            .with_gap_threshold_secs(60.0)
            .with_adjacency_threshold_secs(5.0)
            .with_disjoint_edges(true)
            .with_storage_root("/tmp/x")
            .with_memory_capacity(3);
        assert!(config.validate().is_ok());
        assert_eq!(config.adjacency_threshold().unwrap(), Duration::seconds(5));
        assert_eq!(config.memory_capacity, 3);
        assert!(NarrativeConfig::new().with_gap_threshold_secs(f64::NAN).validate().is_err());
    }

    #[test]
    fn toml_round_trip_and_load() {
        let config = NarrativeConfig::new().with_gap_threshold_secs(90.0).with_disjoint_edges(true);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narrative.toml");
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();
        assert_eq!(NarrativeConfig::load(&path).unwrap(), config);

        assert!(matches!(
            NarrativeConfig::load(dir.path().join("missing.toml")),
            Err(NarrativeError::Io { .. })
        ));
    }
}
