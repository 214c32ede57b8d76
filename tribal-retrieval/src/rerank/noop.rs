use tribal_core::errors::RetrievalError;
use tribal_core::traits::{RerankCandidate, Reranker};

/// Pass-through reranker. Used for `rerank_mode = "none"`.
#[derive(Debug, Default)]
pub struct NoopReranker;

impl Reranker for NoopReranker {
    fn rerank(
        &self,
        _query: &str,
        mut candidates: Vec<RerankCandidate>,
        top_k: usize,
    ) -> Result<Vec<RerankCandidate>, RetrievalError> {
        candidates.truncate(top_k);
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn candidate(id: &str, score: f64) -> RerankCandidate {
        RerankCandidate {
            id: id.to_string(),
            content: "content".to_string(),
            tags: vec![],
            score,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn truncates_without_reordering() {
        let reranker = NoopReranker;
        let candidates = vec![candidate("a", 0.1), candidate("b", 0.9), candidate("c", 0.5)];
        let out = reranker.rerank("q", candidates, 2).unwrap();
        let ids: Vec<&str> = out.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn top_k_larger_than_input_returns_everything() {
        let reranker = NoopReranker;
        let candidates = vec![candidate("a", 0.1)];
        let out = reranker.rerank("q", candidates, 10).unwrap();
        assert_eq!(out.len(), 1);
    }
}
