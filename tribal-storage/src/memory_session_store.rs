//! `DashMap`-backed `SessionStore` for tests and small deployments, the same
//! shape as `InMemoryVectorStore`.

use chrono::{Duration, Utc};
use dashmap::DashMap;

use tribal_core::errors::StorageError;
use tribal_core::model::SessionChunk;
use tribal_core::sanitize::validate_id_shape;
use tribal_core::traits::{SessionSearchResult, SessionStore, SessionStoreStats};

use crate::conversions::cosine_similarity;

#[derive(Default)]
pub struct InMemorySessionStore {
    chunks: DashMap<String, SessionChunk>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            chunks: DashMap::new(),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn store_chunk(&self, chunk: SessionChunk) -> Result<(), StorageError> {
        validate_id_shape(&chunk.chunk_id)?;
        validate_id_shape(&chunk.session_id)?;
        self.chunks.insert(chunk.chunk_id.clone(), chunk);
        Ok(())
    }

    fn next_chunk_index(&self, session_id: &str) -> Result<u64, StorageError> {
        validate_id_shape(session_id)?;
        let max = self
            .chunks
            .iter()
            .filter(|kv| kv.value().session_id == session_id)
            .map(|kv| kv.value().chunk_index)
            .max();
        Ok(max.map(|m| m + 1).unwrap_or(0))
    }

    fn search(
        &self,
        query_vec: &[f32],
        session_id: Option<&str>,
        limit: usize,
        min_relevance: f64,
    ) -> Result<Vec<SessionSearchResult>, StorageError> {
        if let Some(sid) = session_id {
            validate_id_shape(sid)?;
        }
        let query_norm_sq: f64 = query_vec.iter().map(|x| (*x as f64) * (*x as f64)).sum();
        if query_norm_sq == 0.0 {
            return Ok(vec![]);
        }

        let mut scored: Vec<SessionSearchResult> = self
            .chunks
            .iter()
            .filter(|kv| session_id.map(|sid| kv.value().session_id == sid).unwrap_or(true))
            .filter_map(|kv| {
                let chunk = kv.value();
                let embedding = chunk.embedding.as_ref()?;
                if embedding.len() != query_vec.len() {
                    return None;
                }
                let sim = cosine_similarity(query_vec, embedding);
                if sim >= min_relevance {
                    Some(SessionSearchResult {
                        chunk_id: chunk.chunk_id.clone(),
                        session_id: chunk.session_id.clone(),
                        instance_id: chunk.instance_id.clone(),
                        content: chunk.content.clone(),
                        similarity_score: sim,
                        start_time: chunk.start_time,
                        end_time: chunk.end_time,
                        chunk_index: chunk.chunk_index,
                    })
                } else {
                    None
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);
        Ok(scored)
    }

    fn cleanup(&self, retention_days: i64) -> Result<usize, StorageError> {
        let cutoff = Utc::now() - Duration::days(retention_days);
        let stale: Vec<String> = self
            .chunks
            .iter()
            .filter(|kv| kv.value().end_time < cutoff)
            .map(|kv| kv.key().clone())
            .collect();
        let removed = stale.len();
        for key in stale {
            self.chunks.remove(&key);
        }
        Ok(removed)
    }

    fn get_stats(&self) -> Result<SessionStoreStats, StorageError> {
        let mut stats = SessionStoreStats::default();
        let mut sessions = std::collections::HashSet::new();
        for kv in self.chunks.iter() {
            let chunk = kv.value();
            stats.total_chunks += 1;
            sessions.insert(chunk.session_id.clone());
            stats.earliest_chunk_time = Some(
                stats
                    .earliest_chunk_time
                    .map_or(chunk.start_time, |t| t.min(chunk.start_time)),
            );
            stats.latest_chunk_time = Some(
                stats
                    .latest_chunk_time
                    .map_or(chunk.end_time, |t| t.max(chunk.end_time)),
            );
        }
        stats.distinct_sessions = sessions.len();
        Ok(stats)
    }
}
