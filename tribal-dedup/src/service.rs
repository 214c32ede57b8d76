use tribal_core::config::DedupConfig;
use tribal_core::errors::StorageError;
use tribal_core::traits::{StoreFilters, VectorStore};

/// Candidate surfaced by `find_similar` or inside a `DuplicateReport`.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateMatch {
    pub id: String,
    pub similarity: f64,
    pub content_preview: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DuplicateReport {
    pub is_duplicate: bool,
    pub is_near_duplicate: bool,
    pub top_match: Option<DuplicateMatch>,
    pub candidates: Vec<DuplicateMatch>,
}

const REPORT_SCAN_THRESHOLD: f64 = 0.7;
const REPORT_CANDIDATE_LIMIT: usize = 5;
const PREVIEW_CHARS: usize = 100;
const TOP_MATCH_PREVIEW_CHARS: usize = 200;

fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

/// Semantic duplicate detection gating `remember`. Operates purely on
/// embeddings against the configured vector store; thresholds come from
/// `DedupConfig`, already validated at startup (`near <= exact`).
pub struct DeduplicationService<'a> {
    vector_store: &'a dyn VectorStore,
    exact_threshold: f64,
    near_threshold: f64,
}

impl<'a> DeduplicationService<'a> {
    pub fn new(vector_store: &'a dyn VectorStore, exact_threshold: f64, near_threshold: f64) -> Self {
        Self { vector_store, exact_threshold, near_threshold }
    }

    pub fn from_config(vector_store: &'a dyn VectorStore, config: &DedupConfig) -> Self {
        Self::new(vector_store, config.exact_threshold, config.near_threshold)
    }

    /// `(true, existing_id)` iff vector recall at `min_similarity =
    /// exact_threshold` returns any result. `threshold` overrides the
    /// configured exact threshold for this call only.
    pub fn is_duplicate(
        &self,
        embedding: &[f32],
        threshold: Option<f64>,
    ) -> Result<(bool, Option<String>), StorageError> {
        let threshold = threshold.unwrap_or(self.exact_threshold);
        let results = self
            .vector_store
            .recall(embedding, 1, threshold, &StoreFilters::default())?;
        Ok(match results.into_iter().next() {
            Some(hit) if hit.similarity_score >= threshold => (true, Some(hit.entry.id)),
            _ => (false, None),
        })
    }

    /// `(id, similarity)` pairs above `threshold` (default: the configured
    /// near threshold), up to `limit`.
    pub fn find_similar(
        &self,
        embedding: &[f32],
        threshold: Option<f64>,
        limit: usize,
    ) -> Result<Vec<(String, f64)>, StorageError> {
        let threshold = threshold.unwrap_or(self.near_threshold);
        let results = self
            .vector_store
            .recall(embedding, limit, threshold, &StoreFilters::default())?;
        Ok(results.into_iter().map(|r| (r.entry.id, r.similarity_score)).collect())
    }

    /// Scans a fixed, generous similarity floor (0.7) regardless of the
    /// configured thresholds, so the report can distinguish exact from
    /// near from unrelated in one pass.
    pub fn get_duplicate_report(&self, embedding: &[f32]) -> Result<DuplicateReport, StorageError> {
        let results = self.vector_store.recall(
            embedding,
            REPORT_CANDIDATE_LIMIT,
            REPORT_SCAN_THRESHOLD,
            &StoreFilters::default(),
        )?;

        let Some(top) = results.first() else {
            return Ok(DuplicateReport::default());
        };

        let top_match = DuplicateMatch {
            id: top.entry.id.clone(),
            similarity: top.similarity_score,
            content_preview: truncate_chars(&top.entry.content, TOP_MATCH_PREVIEW_CHARS),
        };

        let candidates = results
            .iter()
            .map(|r| DuplicateMatch {
                id: r.entry.id.clone(),
                similarity: r.similarity_score,
                content_preview: truncate_chars(&r.entry.content, PREVIEW_CHARS),
            })
            .collect();

        Ok(DuplicateReport {
            is_duplicate: top.similarity_score >= self.exact_threshold,
            is_near_duplicate: top.similarity_score >= self.near_threshold,
            top_match: Some(top_match),
            candidates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tribal_core::errors::StorageError as SErr;
    use tribal_core::model::{MemoryEntry, SourceType};
    use tribal_core::traits::{RecallResult, StoreStats};

    struct FakeStore {
        hits: Mutex<Vec<RecallResult>>,
    }

    impl VectorStore for FakeStore {
        fn store(&self, entry: MemoryEntry) -> Result<String, SErr> {
            Ok(entry.id)
        }
        fn upsert(&self, entry: MemoryEntry) -> Result<String, SErr> {
            Ok(entry.id)
        }
        fn get(&self, _id: &str) -> Result<Option<MemoryEntry>, SErr> {
            Ok(None)
        }
        fn delete(&self, _id: &str) -> Result<bool, SErr> {
            Ok(false)
        }
        fn recall(
            &self,
            _query_vec: &[f32],
            limit: usize,
            min_similarity: f64,
            _filters: &StoreFilters,
        ) -> Result<Vec<RecallResult>, SErr> {
            let mut hits: Vec<RecallResult> = self
                .hits
                .lock()
                .unwrap()
                .iter()
                .filter(|h| h.similarity_score >= min_similarity)
                .cloned()
                .collect();
            hits.truncate(limit);
            Ok(hits)
        }
        fn list(&self, _limit: usize, _offset: usize, _filters: &StoreFilters) -> Result<Vec<MemoryEntry>, SErr> {
            Ok(vec![])
        }
        fn count(&self, _filters: &StoreFilters) -> Result<usize, SErr> {
            Ok(0)
        }
        fn get_stats(&self) -> Result<StoreStats, SErr> {
            Ok(StoreStats::default())
        }
    }

    fn hit(id: &str, similarity: f64, content: &str) -> RecallResult {
        let mut entry = MemoryEntry::new(content, "agent-1", SourceType::UserExplicit);
        entry.id = id.to_string();
        RecallResult { entry, similarity_score: similarity }
    }

    fn store_with(hits: Vec<RecallResult>) -> FakeStore {
        FakeStore { hits: Mutex::new(hits) }
    }

    #[test]
    fn is_duplicate_true_when_top_hit_meets_exact_threshold() {
        let store = store_with(vec![hit("m1", 0.99, "hello world")]);
        let service = DeduplicationService::new(&store, 0.98, 0.90);
        let (dup, id) = service.is_duplicate(&[1.0], None).unwrap();
        assert!(dup);
        assert_eq!(id, Some("m1".to_string()));
    }

    #[test]
    fn is_duplicate_false_when_no_hits_reach_threshold() {
        let store = store_with(vec![]);
        let service = DeduplicationService::new(&store, 0.98, 0.90);
        let (dup, id) = service.is_duplicate(&[1.0], None).unwrap();
        assert!(!dup);
        assert!(id.is_none());
    }

    #[test]
    fn find_similar_uses_near_threshold_by_default() {
        let store = store_with(vec![hit("m1", 0.92, "a"), hit("m2", 0.5, "b")]);
        let service = DeduplicationService::new(&store, 0.98, 0.90);
        let similar = service.find_similar(&[1.0], None, 10).unwrap();
        assert_eq!(similar, vec![("m1".to_string(), 0.92)]);
    }

    #[test]
    fn report_on_empty_store_has_all_flags_false() {
        let store = store_with(vec![]);
        let service = DeduplicationService::new(&store, 0.98, 0.90);
        let report = service.get_duplicate_report(&[1.0]).unwrap();
        assert!(!report.is_duplicate);
        assert!(!report.is_near_duplicate);
        assert!(report.top_match.is_none());
        assert!(report.candidates.is_empty());
    }

    #[test]
    fn report_flags_near_but_not_exact_duplicate() {
        let store = store_with(vec![hit("m1", 0.93, "some content")]);
        let service = DeduplicationService::new(&store, 0.98, 0.90);
        let report = service.get_duplicate_report(&[1.0]).unwrap();
        assert!(!report.is_duplicate);
        assert!(report.is_near_duplicate);
        assert_eq!(report.top_match.unwrap().id, "m1");
    }

    #[test]
    fn long_content_preview_is_truncated_with_ellipsis() {
        let long_content = "a".repeat(500);
        let store = store_with(vec![hit("m1", 0.99, &long_content)]);
        let service = DeduplicationService::new(&store, 0.98, 0.90);
        let report = service.get_duplicate_report(&[1.0]).unwrap();
        let preview = &report.top_match.unwrap().content_preview;
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), TOP_MATCH_PREVIEW_CHARS + 3);
    }

    #[test]
    fn from_config_reads_thresholds_from_dedup_config() {
        let store = store_with(vec![]);
        let mut config = DedupConfig::default();
        config.exact_threshold = 0.95;
        config.near_threshold = 0.80;
        let service = DeduplicationService::from_config(&store, &config);
        assert_eq!(service.exact_threshold, 0.95);
        assert_eq!(service.near_threshold, 0.80);
    }
}
