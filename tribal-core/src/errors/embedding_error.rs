/// Errors raised by embedding providers.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("transient failure after {attempts} attempts: {reason}")]
    TransientExhausted { attempts: u32, reason: String },

    #[error("remote provider returned {status}: {body}")]
    PermanentRemote { status: u16, body: String },

    #[error("empty input after whitespace collapse")]
    EmptyInput,

    #[error("model load failed at {path}: {reason}")]
    ModelLoadFailed { path: String, reason: String },
}
