use chrono::Utc;

use tribal_core::errors::RetrievalError;
use tribal_core::traits::{RerankCandidate, Reranker};

const SHORT_CONTENT_PENALTY: f64 = -0.05;
const LONG_CONTENT_PENALTY: f64 = -0.03;

/// Recency + tag-match + length-penalty boost, applied multiplicatively to
/// the candidate's incoming score: `final = original_score * (1 + boost)`.
#[derive(Debug, Clone)]
pub struct HeuristicReranker {
    pub recency_decay_days: f64,
    pub tag_boost_weight: f64,
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for HeuristicReranker {
    fn default() -> Self {
        Self {
            recency_decay_days: 30.0,
            tag_boost_weight: 0.1,
            min_length: 10,
            max_length: 2000,
        }
    }
}

impl Reranker for HeuristicReranker {
    fn rerank(
        &self,
        query: &str,
        candidates: Vec<RerankCandidate>,
        top_k: usize,
    ) -> Result<Vec<RerankCandidate>, RetrievalError> {
        if candidates.is_empty() {
            return Ok(vec![]);
        }

        let query_terms: std::collections::HashSet<String> =
            query.to_lowercase().split_whitespace().map(str::to_string).collect();
        let now = Utc::now();

        let mut scored: Vec<(f64, usize, RerankCandidate)> = candidates
            .into_iter()
            .enumerate()
            .map(|(i, candidate)| {
                let mut boost = 0.0;

                let age_days = (now - candidate.created_at).num_seconds() as f64 / 86400.0;
                boost += (-age_days / self.recency_decay_days).exp();

                if !candidate.tags.is_empty() {
                    let tag_lower: std::collections::HashSet<String> =
                        candidate.tags.iter().map(|t| t.to_lowercase()).collect();
                    let matches = query_terms.iter().filter(|t| tag_lower.contains(*t)).count();
                    if matches > 0 {
                        boost += self.tag_boost_weight * matches as f64;
                    }
                }

                let content_length = candidate.content.chars().count();
                if content_length < self.min_length {
                    boost += SHORT_CONTENT_PENALTY;
                } else if content_length > self.max_length {
                    boost += LONG_CONTENT_PENALTY;
                }

                let final_score = candidate.score * (1.0 + boost);
                (final_score, i, candidate)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(final_score, _, mut candidate)| {
                candidate.score = final_score;
                candidate
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn candidate(id: &str, score: f64, tags: Vec<&str>, content: &str, age_days: i64) -> RerankCandidate {
        RerankCandidate {
            id: id.to_string(),
            content: content.to_string(),
            tags: tags.into_iter().map(str::to_string).collect(),
            score,
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    #[test]
    fn empty_candidates_returns_empty() {
        let reranker = HeuristicReranker::default();
        assert!(reranker.rerank("q", vec![], 5).unwrap().is_empty());
    }

    #[test]
    fn fresher_memory_outranks_older_at_equal_base_score() {
        let reranker = HeuristicReranker::default();
        let candidates = vec![
            candidate("old", 0.5, vec![], "some reasonably long piece of content here", 365),
            candidate("new", 0.5, vec![], "some reasonably long piece of content here", 0),
        ];
        let out = reranker.rerank("q", candidates, 2).unwrap();
        assert_eq!(out[0].id, "new");
    }

    #[test]
    fn matching_tag_boosts_score_above_nonmatching() {
        let reranker = HeuristicReranker::default();
        let candidates = vec![
            candidate("untagged", 0.5, vec![], "some reasonably long piece of content here", 0),
            candidate("tagged", 0.5, vec!["rust"], "some reasonably long piece of content here", 0),
        ];
        let out = reranker.rerank("rust programming", candidates, 2).unwrap();
        assert_eq!(out[0].id, "tagged");
    }

    #[test]
    fn very_short_content_is_penalized() {
        let reranker = HeuristicReranker::default();
        let candidates = vec![
            candidate("short", 0.5, vec![], "hi", 0),
            candidate("normal", 0.5, vec![], "some reasonably long piece of content here", 0),
        ];
        let out = reranker.rerank("q", candidates, 2).unwrap();
        assert_eq!(out[0].id, "normal");
    }

    #[test]
    fn ties_preserve_original_order() {
        let reranker = HeuristicReranker {
            recency_decay_days: 30.0,
            tag_boost_weight: 0.0,
            min_length: 0,
            max_length: usize::MAX,
        };
        let now = Utc::now();
        let candidates = vec![
            RerankCandidate { id: "first".into(), content: "x".into(), tags: vec![], score: 0.5, created_at: now },
            RerankCandidate { id: "second".into(), content: "x".into(), tags: vec![], score: 0.5, created_at: now },
        ];
        let out = reranker.rerank("q", candidates, 2).unwrap();
        assert_eq!(out[0].id, "first");
        assert_eq!(out[1].id, "second");
    }
}
