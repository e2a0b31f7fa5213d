//! Error types for derivations

use narrative_model::ModelError;

/// Errors raised by segmentation, classification and graph construction
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// Threshold or other argument outside its domain
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Node index does not exist in the graph
    #[error("node index {index} out of bounds for graph with {len} nodes")]
    NodeOutOfBounds { index: usize, len: usize },

    /// Edge endpoints violate canonical ordering
    #[error("edge source_index must be less than target_index: {source_index} >= {target_index}")]
    InvalidEdge {
        source_index: usize,
        target_index: usize,
    },

    /// Model construction failed
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

impl AnalyticsError {
    /// Create invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result alias for analytics operations
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_edge_display() {
        let err = AnalyticsError::InvalidEdge {
            source_index: 2,
            target_index: 1,
        };
        assert_eq!(
            err.to_string(),
            "edge source_index must be less than target_index: 2 >= 1"
        );
    }

    #[test]
    fn model_error_converts() {
        let err: AnalyticsError = ModelError::invalid_argument("x").into();
        assert!(matches!(err, AnalyticsError::Model(_)));
    }
}
