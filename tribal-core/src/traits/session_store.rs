use chrono::{DateTime, Utc};

use crate::errors::StorageError;
use crate::model::SessionChunk;

#[derive(Debug, Clone)]
pub struct SessionSearchResult {
    pub chunk_id: String,
    pub session_id: String,
    pub instance_id: String,
    pub content: String,
    pub similarity_score: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub chunk_index: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SessionStoreStats {
    pub total_chunks: usize,
    pub distinct_sessions: usize,
    pub earliest_chunk_time: Option<DateTime<Utc>>,
    pub latest_chunk_time: Option<DateTime<Utc>>,
}

/// Persistence for chunked session transcripts. Two implementations exist:
/// an in-memory map-backed store and a SQLite-backed persistent store.
pub trait SessionStore: Send + Sync {
    fn store_chunk(&self, chunk: SessionChunk) -> Result<(), StorageError>;

    /// The next `chunk_index` for `session_id`: one past the current
    /// high-water mark, or 0 if the session has no chunks yet.
    fn next_chunk_index(&self, session_id: &str) -> Result<u64, StorageError>;

    /// Up to `limit` chunks with similarity >= `min_relevance`, sorted by
    /// similarity descending. Filters to `session_id` when given.
    fn search(
        &self,
        query_vec: &[f32],
        session_id: Option<&str>,
        limit: usize,
        min_relevance: f64,
    ) -> Result<Vec<SessionSearchResult>, StorageError>;

    /// Drop all chunks with `end_time < now - retention_days`. Returns the
    /// number of chunks removed.
    fn cleanup(&self, retention_days: i64) -> Result<usize, StorageError>;

    fn get_stats(&self) -> Result<SessionStoreStats, StorageError>;
}
