use thiserror::Error;

/// Errors from embedding store operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding not found for item '{0}'")]
    NotFound(String),

    #[error("vector encoding error: {0}")]
    Encoding(String),

    #[error("invalid embedding dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("storage error: {0}")]
    Store(String),
}

impl EmbeddingError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, EmbeddingError::NotFound(_))
    }
}

/// Errors from collaborator repositories (feedback store, neighbor cache).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors surfaced by the candidate aggregator.
///
/// Per-seed neighbor lookup failures are logged and never appear here.
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("failed to load user feedback: {0}")]
    Feedback(#[source] RepositoryError),

    #[error("recommendation cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_error_display() {
        let err = EmbeddingError::NotFound("item1".to_string());
        assert_eq!(err.to_string(), "embedding not found for item 'item1'");
        assert!(err.is_not_found());

        let err = EmbeddingError::InvalidDimension {
            expected: 3,
            actual: 2,
        };
        assert!(err.to_string().contains("expected 3"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_recommend_error_wraps_repository_error() {
        let err = RecommendError::Feedback(RepositoryError::Query("timeout".to_string()));
        assert_eq!(
            err.to_string(),
            "failed to load user feedback: query error: timeout"
        );
    }
}
