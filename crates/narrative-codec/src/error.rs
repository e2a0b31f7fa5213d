//! Error types for the codec
//!
//! Covers both directions of the boundary:
//! - encoding (entity → payload)
//! - decoding (payload → entity), including schema and fingerprint checks

use narrative_analytics::AnalyticsError;
use narrative_model::{Fingerprint, ModelError};

/// Errors raised while encoding or decoding payloads
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Malformed JSON or a shape serde could not map
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Required field absent from the payload data
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    /// Field present but its value is unusable
    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Payload written by an incompatible schema
    #[error("unsupported schema version '{found}' (supported: '{supported}')")]
    UnsupportedSchema { found: String, supported: &'static str },

    /// Reconstructed entity does not hash to the stored fingerprint
    #[error("fingerprint mismatch: payload says {expected}, content hashes to {actual}")]
    FingerprintMismatch {
        expected: Fingerprint,
        actual: Fingerprint,
    },

    /// Decoded data violates a model invariant
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Decoded data violates a graph invariant
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

impl CodecError {
    /// Create invalid-field error
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Result alias for codec operations
pub type CodecResult<T> = Result<T, CodecError>;
