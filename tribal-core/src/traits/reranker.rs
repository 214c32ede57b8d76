use crate::errors::RetrievalError;

/// A candidate entering the reranking stage. Carries enough of the memory
/// entry's metadata for heuristic scoring without depending on the full
/// `MemoryEntry` type (which lives alongside vector/BM25-specific fields).
#[derive(Debug, Clone)]
pub struct RerankCandidate {
    pub id: String,
    pub content: String,
    pub tags: Vec<String>,
    pub score: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// `rerank(query, candidates, top_k) -> [result]`. Implementations:
/// Noop (unchanged order, truncate), Heuristic (recency/tag/length boost),
/// Cross-encoder (learned pairwise scoring).
pub trait Reranker: Send + Sync {
    fn rerank(
        &self,
        query: &str,
        candidates: Vec<RerankCandidate>,
        top_k: usize,
    ) -> Result<Vec<RerankCandidate>, RetrievalError>;
}
