use tribal_core::errors::RetrievalError;
use tribal_core::traits::{RerankCandidate, Reranker};

/// A learned `(query, content)` pair scorer. No in-process cross-encoder
/// model is bundled; callers that have one (ONNX, a hosted endpoint, …)
/// implement this seam and hand it to `CrossEncoderReranker`.
pub trait PairScorer: Send + Sync {
    fn score(&self, query: &str, content: &str) -> f64;
}

/// Replaces each candidate's score with the pair scorer's output, then
/// sorts descending. The candidate's original score is discarded entirely,
/// matching the original: a cross-encoder judges relevance directly rather
/// than blending with upstream retrieval scores.
pub struct CrossEncoderReranker {
    scorer: Box<dyn PairScorer>,
}

impl CrossEncoderReranker {
    pub fn new(scorer: Box<dyn PairScorer>) -> Self {
        Self { scorer }
    }
}

impl Reranker for CrossEncoderReranker {
    fn rerank(
        &self,
        query: &str,
        candidates: Vec<RerankCandidate>,
        top_k: usize,
    ) -> Result<Vec<RerankCandidate>, RetrievalError> {
        if candidates.is_empty() {
            return Ok(vec![]);
        }

        let mut scored: Vec<RerankCandidate> = candidates
            .into_iter()
            .map(|mut candidate| {
                candidate.score = self.scorer.score(query, &candidate.content);
                candidate
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct ReverseLengthScorer;
    impl PairScorer for ReverseLengthScorer {
        fn score(&self, _query: &str, content: &str) -> f64 {
            -(content.len() as f64)
        }
    }

    fn candidate(id: &str, content: &str) -> RerankCandidate {
        RerankCandidate {
            id: id.to_string(),
            content: content.to_string(),
            tags: vec![],
            score: 0.0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn scores_are_fully_replaced_by_the_scorer() {
        let reranker = CrossEncoderReranker::new(Box::new(ReverseLengthScorer));
        let candidates = vec![candidate("long", "aaaaaaaaaa"), candidate("short", "a")];
        let out = reranker.rerank("q", candidates, 2).unwrap();
        assert_eq!(out[0].id, "short");
        assert_eq!(out[0].score, -1.0);
    }

    #[test]
    fn empty_candidates_short_circuits() {
        let reranker = CrossEncoderReranker::new(Box::new(ReverseLengthScorer));
        assert!(reranker.rerank("q", vec![], 5).unwrap().is_empty());
    }
}
