//! Error kinds. Sub-errors are per-concern (`StorageError`, `EmbeddingError`,
//! `RetrievalError`); `TribalError` aggregates them at the crate boundary so
//! that the memory service facade never needs to match on library-specific
//! error types. Every public operation returns `TribalResult<T>`.

mod embedding_error;
mod retrieval_error;
mod storage_error;

pub use embedding_error::EmbeddingError;
pub use retrieval_error::RetrievalError;
pub use storage_error::StorageError;

pub type TribalResult<T> = Result<T, TribalError>;

#[derive(Debug, thiserror::Error)]
pub enum TribalError {
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    #[error("memory {id} not found")]
    NotFound { id: String },

    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TribalError {
    pub fn validation(reason: impl Into<String>) -> Self {
        TribalError::Validation {
            reason: reason.into(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        TribalError::NotFound { id: id.into() }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        TribalError::Configuration {
            reason: reason.into(),
        }
    }

    /// Whether callers may usefully retry the underlying operation.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            TribalError::Embedding(EmbeddingError::TransientExhausted { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_carries_id() {
        let err = TribalError::not_found("abc-123");
        assert!(err.to_string().contains("abc-123"));
    }

    #[test]
    fn validation_carries_reason() {
        let err = TribalError::validation("empty content");
        assert!(err.to_string().contains("empty content"));
    }

    #[test]
    fn storage_error_converts_to_tribal_error() {
        let storage_err = StorageError::Sqlite {
            message: "disk full".into(),
        };
        let tribal_err: TribalError = storage_err.into();
        assert!(matches!(tribal_err, TribalError::Storage(_)));
    }

    #[test]
    fn embedding_error_converts_to_tribal_error() {
        let emb_err = EmbeddingError::DimensionMismatch {
            expected: 1024,
            actual: 384,
        };
        let tribal_err: TribalError = emb_err.into();
        assert!(matches!(tribal_err, TribalError::Embedding(_)));
    }

    #[test]
    fn retrieval_error_converts_to_tribal_error() {
        let ret_err = RetrievalError::InvalidParameter {
            name: "limit".into(),
            reason: "must be positive".into(),
        };
        let tribal_err: TribalError = ret_err.into();
        assert!(matches!(tribal_err, TribalError::Retrieval(_)));
    }

    #[test]
    fn serialization_error_converts_to_tribal_error() {
        let json_err = serde_json::from_str::<String>("not valid json").unwrap_err();
        let tribal_err: TribalError = json_err.into();
        assert!(matches!(tribal_err, TribalError::Serialization(_)));
    }

    #[test]
    fn transient_exhausted_embedding_error_is_retriable() {
        let err: TribalError = EmbeddingError::TransientExhausted {
            attempts: 3,
            reason: "timeout".into(),
        }
        .into();
        assert!(err.is_retriable());
    }

    #[test]
    fn validation_error_is_not_retriable() {
        assert!(!TribalError::validation("bad input").is_retriable());
    }
}
