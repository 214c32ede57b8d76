/// Errors raised by the hybrid retrieval pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("query embedding failed: {reason}")]
    EmbeddingFailed { reason: String },

    #[error("graph expansion failed: {reason}")]
    GraphExpansionFailed { reason: String },

    #[error("invalid retrieval parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
}
