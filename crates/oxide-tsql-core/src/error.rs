//! Error types for statement compilation.

use thiserror::Error;

/// Errors raised while compiling a statement.
///
/// Every variant aborts compilation of the current statement; there is no
/// partial recovery and no retry at this layer.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The query asks for something this engine tier cannot do. The message
    /// names the specific capability.
    #[error("{feature} is not supported on this database backend")]
    UnsupportedFeature {
        /// The unsupported capability.
        feature: String,
    },

    /// The caller's query tree is malformed for this statement kind.
    #[error("invalid query: {0}")]
    InvalidQueryShape(String),

    /// An operation that requires an active transaction was requested
    /// outside one.
    #[error("transaction required: {0}")]
    TransactionState(String),
}

impl CompileError {
    /// Builds an [`CompileError::UnsupportedFeature`] naming `feature`.
    #[must_use]
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::UnsupportedFeature {
            feature: feature.into(),
        }
    }
}

/// Result type alias for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_names_feature() {
        let err = CompileError::unsupported("SKIP LOCKED");
        assert_eq!(
            err.to_string(),
            "SKIP LOCKED is not supported on this database backend"
        );
    }
}
