use crate::errors::StorageError;

#[derive(Debug, Clone)]
pub struct Bm25Hit {
    pub id: String,
    /// The engine's signed rank; more negative means a stronger match.
    pub rank: f64,
}

/// An inverted index over `content || " " || tags joined` using BM25
/// scoring. Query strings are sanitized internally; a residual syntax
/// error after sanitization yields an empty result rather than propagating.
pub trait Bm25Store: Send + Sync {
    /// Replace any prior entry for `id`.
    fn index(&self, id: &str, content: &str, tags: &[String]) -> Result<(), StorageError>;

    fn delete(&self, id: &str) -> Result<(), StorageError>;

    fn search(&self, query: &str, limit: usize) -> Result<Vec<Bm25Hit>, StorageError>;

    fn count(&self) -> Result<usize, StorageError>;
}

/// Maps a BM25 engine rank into `[0, 1]` for hybrid merge, per
/// `bm25_score = 1 / (1 + |rank|)`.
pub fn normalize_bm25_rank(rank: f64) -> f64 {
    1.0 / (1.0 + rank.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rank_normalizes_to_one() {
        assert_eq!(normalize_bm25_rank(0.0), 1.0);
    }

    #[test]
    fn normalized_rank_stays_in_unit_interval() {
        for rank in [-50.0, -1.0, 0.0, 1.0, 50.0] {
            let n = normalize_bm25_rank(rank);
            assert!((0.0..=1.0).contains(&n));
        }
    }
}
