use crate::errors::EmbeddingError;

/// Text to unit-normalized vector, with a batch variant. Built-in providers
/// output L2-normalized vectors; batch ordering is preserved by contract.
/// Implementations are synchronous (network/model calls block the calling
/// thread); async callers wrap invocations in `spawn_blocking`.
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimensions(&self) -> usize;

    fn model_name(&self) -> &str;

    /// Cosine similarity in [-1, 1]. Assumes both vectors are unit length;
    /// callers passing raw vectors get an unnormalized dot product instead.
    fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
    }
}
