//! Delta-ingests a growing message transcript into ≈400-token,
//! ≈50-token-overlap chunks, embeds each, and persists it through a
//! [`SessionStore`].

use std::sync::Arc;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use tribal_core::constants::{
    MAX_OVERLAP_BACKTRACK_MESSAGES, OVERLAP_TOKENS, TARGET_CHUNK_TOKENS, WORDS_PER_TOKEN,
};
use tribal_core::errors::{StorageError, TribalError, TribalResult};
use tribal_core::model::SessionChunk;
use tribal_core::sanitize::validate_id_shape;
use tribal_core::traits::{EmbeddingProvider, SessionSearchResult, SessionStore};

/// One transcript line to be folded into a chunk.
#[derive(Debug, Clone)]
pub struct SessionMessage {
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl SessionMessage {
    fn word_count(&self) -> usize {
        self.content.split_whitespace().count() + 1 // + role prefix token
    }

    fn rendered(&self) -> String {
        format!("{}: {}", self.role, self.content)
    }
}

fn target_words() -> usize {
    ((TARGET_CHUNK_TOKENS as f64) * WORDS_PER_TOKEN).round() as usize
}

fn overlap_words() -> usize {
    ((OVERLAP_TOKENS as f64) * WORDS_PER_TOKEN).round() as usize
}

/// Greedily groups `messages` into role-prefixed windows targeting
/// `target_words()`, backing up by up to `MAX_OVERLAP_BACKTRACK_MESSAGES`
/// trailing messages between windows so consecutive chunks share context.
fn group_into_windows(messages: &[SessionMessage]) -> Vec<Vec<SessionMessage>> {
    if messages.is_empty() {
        return vec![];
    }

    let target = target_words();
    let overlap = overlap_words();
    let n = messages.len();
    let mut windows = Vec::new();
    let mut start = 0usize;

    while start < n {
        let mut end = start;
        let mut words = 0usize;
        while end < n {
            words += messages[end].word_count();
            if words >= target {
                break;
            }
            end += 1;
        }
        let end = end.min(n - 1);
        windows.push(messages[start..=end].to_vec());

        if end == n - 1 {
            break;
        }

        let mut next_start = end + 1;
        let mut backtracked = 0usize;
        let mut backtracked_words = 0usize;
        for idx in (start..=end).rev() {
            if backtracked >= MAX_OVERLAP_BACKTRACK_MESSAGES || backtracked_words >= overlap {
                break;
            }
            backtracked_words += messages[idx].word_count();
            backtracked += 1;
            next_start = idx;
        }
        start = next_start.max(start + 1);
    }

    windows
}

pub struct SessionChunker {
    store: Arc<dyn SessionStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    last_ingested_index: DashMap<String, usize>,
    next_index_cache: Mutex<std::collections::HashMap<String, u64>>,
}

impl SessionChunker {
    pub fn new(store: Arc<dyn SessionStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            store,
            embedder,
            last_ingested_index: DashMap::new(),
            next_index_cache: Mutex::new(std::collections::HashMap::new()),
        }
    }

    fn take_next_index(&self, session_id: &str) -> TribalResult<u64> {
        let mut cache = self.next_index_cache.lock().unwrap();
        if let Some(next) = cache.get_mut(session_id) {
            let value = *next;
            *next += 1;
            return Ok(value);
        }
        let seeded = self.store.next_chunk_index(session_id)?;
        cache.insert(session_id.to_string(), seeded + 1);
        Ok(seeded)
    }

    /// Ingest only the messages past this session's `last_ingested_index`,
    /// chunk them, embed each chunk, and persist it. Returns the newly
    /// created chunks (empty if nothing new).
    pub fn ingest(
        &self,
        session_id: &str,
        instance_id: &str,
        messages: &[SessionMessage],
    ) -> TribalResult<Vec<SessionChunk>> {
        validate_id_shape(session_id).map_err(TribalError::from)?;

        let already_ingested = self
            .last_ingested_index
            .get(session_id)
            .map(|v| *v)
            .unwrap_or(0);
        if already_ingested >= messages.len() {
            return Ok(vec![]);
        }

        let delta = &messages[already_ingested..];
        let windows = group_into_windows(delta);

        let mut chunks = Vec::with_capacity(windows.len());
        for window in windows {
            let Some(first) = window.first() else { continue };
            let Some(last) = window.last() else { continue };
            let content = window.iter().map(SessionMessage::rendered).collect::<Vec<_>>().join("\n");
            let embedding = self.embedder.embed(&content).ok();
            let chunk_index = self.take_next_index(session_id)?;

            let chunk = SessionChunk {
                chunk_id: Uuid::new_v4().to_string(),
                session_id: session_id.to_string(),
                instance_id: instance_id.to_string(),
                content,
                embedding,
                start_time: first.timestamp,
                end_time: last.timestamp,
                chunk_index,
            };
            self.store.store_chunk(chunk.clone())?;
            chunks.push(chunk);
        }

        self.last_ingested_index.insert(session_id.to_string(), messages.len());
        Ok(chunks)
    }

    pub fn search(
        &self,
        query: &str,
        session_id: Option<&str>,
        limit: usize,
        min_relevance: f64,
    ) -> TribalResult<Vec<SessionSearchResult>> {
        if let Some(sid) = session_id {
            validate_id_shape(sid).map_err(TribalError::from)?;
        }
        let query_vec = match self.embedder.embed(query) {
            Ok(v) => v,
            Err(_) => return Ok(vec![]),
        };
        Ok(self.store.search(&query_vec, session_id, limit, min_relevance)?)
    }

    pub fn cleanup(&self, retention_days: i64) -> Result<usize, StorageError> {
        self.store.cleanup(retention_days)
    }

    pub fn get_stats(&self) -> Result<tribal_core::traits::SessionStoreStats, StorageError> {
        self.store.get_stats()
    }
}
