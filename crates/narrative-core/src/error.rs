//! Error types for the narrative pipeline

use narrative_analytics::AnalyticsError;
use narrative_codec::CodecError;
use narrative_model::ModelError;
use narrative_store::StoreError;
use std::path::PathBuf;

/// Main pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    /// Invalid or inconsistent configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading an input file failed
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed observation input
    #[error("invalid observations: {0}")]
    Input(#[from] serde_json::Error),

    /// Model invariant violated
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Derivation failed
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    /// Encoding or decoding failed
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Durable storage failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl NarrativeError {
    /// Create configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the caller supplied bad data rather than hitting an
    /// environmental failure
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Input(_) | Self::Model(_) | Self::Analytics(_)
        )
    }
}

/// Result alias for pipeline operations
pub type NarrativeResult<T> = Result<T, NarrativeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors() {
        assert!(NarrativeError::config("x").is_caller_error());
        assert!(NarrativeError::from(ModelError::invalid_argument("x")).is_caller_error());
        let io = NarrativeError::io_error("/nope", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(!io.is_caller_error());
        assert!(io.to_string().starts_with("io error reading /nope"));
    }
}
