use crate::errors::StorageError;
use crate::model::{MemoryEntry, SourceType};

/// Filters recognized by `recall` and `list`. Any-match on `tags`
/// (set intersection), exact match on `source_instance`/`source_type`.
#[derive(Debug, Clone, Default)]
pub struct StoreFilters {
    pub tags: Vec<String>,
    pub source_instance: Option<String>,
    pub source_type: Option<SourceType>,
}

#[derive(Debug, Clone)]
pub struct RecallResult {
    pub entry: MemoryEntry,
    pub similarity_score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    pub total: usize,
    pub by_source_type: std::collections::HashMap<String, usize>,
    pub by_tag: std::collections::HashMap<String, usize>,
    pub by_instance: std::collections::HashMap<String, usize>,
    pub corrections: usize,
}

/// Insert/get/delete/list/search by vector similarity and metadata filters.
/// Two implementations exist: an in-memory map-backed store and a
/// SQLite-backed persistent store with a brute-force cosine scan.
pub trait VectorStore: Send + Sync {
    /// Insert. Rejects embeddings whose length does not equal the
    /// configured dimension. Does not overwrite an existing id; use
    /// `upsert` for replace semantics.
    fn store(&self, entry: MemoryEntry) -> Result<String, StorageError>;

    /// Insert or replace, clearing any tombstone for the id.
    fn upsert(&self, entry: MemoryEntry) -> Result<String, StorageError>;

    /// Returns `None` for tombstoned or absent ids.
    fn get(&self, id: &str) -> Result<Option<MemoryEntry>, StorageError>;

    /// Soft delete (tombstone + timestamp). Returns `false` if the id was
    /// already absent or already tombstoned.
    fn delete(&self, id: &str) -> Result<bool, StorageError>;

    /// Up to `limit` entries with similarity >= `min_similarity`, sorted by
    /// similarity descending.
    fn recall(
        &self,
        query_vec: &[f32],
        limit: usize,
        min_similarity: f64,
        filters: &StoreFilters,
    ) -> Result<Vec<RecallResult>, StorageError>;

    fn list(
        &self,
        limit: usize,
        offset: usize,
        filters: &StoreFilters,
    ) -> Result<Vec<MemoryEntry>, StorageError>;

    fn count(&self, filters: &StoreFilters) -> Result<usize, StorageError>;

    /// Must iterate lazily for large corpora; the persistent implementation
    /// must not materialize embeddings into memory during aggregation.
    fn get_stats(&self) -> Result<StoreStats, StorageError>;
}
