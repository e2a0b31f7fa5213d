//! Error types for durable storage and caching

use narrative_codec::CodecError;
use std::path::PathBuf;

/// Errors raised by the store and the cache
///
/// A missing record is never an error; lookups return `Option`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem operation failed
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Publishing a fully written temporary file failed
    #[error("failed to publish {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored bytes are not a valid payload
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Caller-supplied computation failed
    #[error("compute failed: {0}")]
    Compute(String),

    /// Text is not a fingerprint usable as a record name
    #[error("invalid fingerprint '{0}': expected lowercase hex")]
    InvalidFingerprint(String),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
