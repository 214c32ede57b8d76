//! Persistent `SessionStore`: brute-force cosine scan over `session_chunks`,
//! the same shape as the vector store's recall query.

use chrono::{Duration, Utc};
use rusqlite::{params, OptionalExtension, Row};

use tribal_core::errors::StorageError;
use tribal_core::model::SessionChunk;
use tribal_core::sanitize::validate_id_shape;
use tribal_core::traits::{SessionSearchResult, SessionStore, SessionStoreStats};

use crate::conversions::{bytes_to_f32_vec, cosine_similarity, f32_vec_to_bytes};
use crate::sqlite_err;
use crate::sqlite_store::SqliteStore;

fn row_to_chunk(row: &Row) -> rusqlite::Result<(SessionChunk, Option<Vec<u8>>)> {
    let vector_blob: Option<Vec<u8>> = row.get("vector")?;
    let chunk = SessionChunk {
        chunk_id: row.get("chunk_id")?,
        session_id: row.get("session_id")?,
        instance_id: row.get("instance_id")?,
        content: row.get("content")?,
        embedding: vector_blob.clone().map(|b| bytes_to_f32_vec(&b)),
        start_time: row.get("start_time")?,
        end_time: row.get("end_time")?,
        chunk_index: row.get::<_, i64>("chunk_index")? as u64,
    };
    Ok((chunk, vector_blob))
}

impl SessionStore for SqliteStore {
    fn store_chunk(&self, chunk: SessionChunk) -> Result<(), StorageError> {
        validate_id_shape(&chunk.chunk_id)?;
        validate_id_shape(&chunk.session_id)?;
        let vector_blob = chunk.embedding.as_deref().map(f32_vec_to_bytes);
        let dims = chunk.embedding.as_ref().map(|v| v.len() as i64);
        self.with_writer(|conn| {
            conn.execute(
                "INSERT INTO session_chunks
                    (chunk_id, session_id, instance_id, content, vector, dimensions,
                     start_time, end_time, chunk_index)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(chunk_id) DO UPDATE SET
                    content = excluded.content,
                    vector = excluded.vector,
                    dimensions = excluded.dimensions,
                    start_time = excluded.start_time,
                    end_time = excluded.end_time,
                    chunk_index = excluded.chunk_index",
                params![
                    chunk.chunk_id,
                    chunk.session_id,
                    chunk.instance_id,
                    chunk.content,
                    vector_blob,
                    dims,
                    chunk.start_time,
                    chunk.end_time,
                    chunk.chunk_index as i64,
                ],
            )
            .map_err(sqlite_err)?;
            Ok(())
        })
    }

    fn next_chunk_index(&self, session_id: &str) -> Result<u64, StorageError> {
        validate_id_shape(session_id)?;
        self.with_reader(|conn| {
            let max: Option<i64> = conn
                .query_row(
                    "SELECT MAX(chunk_index) FROM session_chunks WHERE session_id = ?1",
                    params![session_id],
                    |r| r.get(0),
                )
                .optional()
                .map_err(sqlite_err)?
                .flatten();
            Ok(max.map(|m| m as u64 + 1).unwrap_or(0))
        })
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

        let rows = self.with_reader(|conn| {
            let (sql, use_filter) = if session_id.is_some() {
                ("SELECT * FROM session_chunks WHERE session_id = ?1", true)
            } else {
                ("SELECT * FROM session_chunks", false)
            };
            let mut stmt = conn.prepare(sql).map_err(sqlite_err)?;
            let mut out = Vec::new();
            if use_filter {
                let mapped = stmt
                    .query_map(params![session_id.unwrap()], row_to_chunk)
                    .map_err(sqlite_err)?;
                for r in mapped {
                    out.push(r.map_err(sqlite_err)?);
                }
            } else {
                let mapped = stmt.query_map([], row_to_chunk).map_err(sqlite_err)?;
                for r in mapped {
                    out.push(r.map_err(sqlite_err)?);
                }
            }
            Ok(out)
        })?;

        let mut scored = Vec::new();
        for (chunk, _) in rows {
            let Some(embedding) = &chunk.embedding else {
                continue;
            };
            if embedding.len() != query_vec.len() {
                continue;
            }
            let sim = cosine_similarity(query_vec, embedding);
            if sim >= min_relevance {
                scored.push(SessionSearchResult {
                    chunk_id: chunk.chunk_id,
                    session_id: chunk.session_id,
                    instance_id: chunk.instance_id,
                    content: chunk.content,
                    similarity_score: sim,
                    start_time: chunk.start_time,
                    end_time: chunk.end_time,
                    chunk_index: chunk.chunk_index,
                });
            }
        }
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
        self.with_writer(|conn| {
            let changed = conn
                .execute(
                    "DELETE FROM session_chunks WHERE end_time < ?1",
                    params![cutoff],
                )
                .map_err(sqlite_err)?;
            Ok(changed)
        })
    }

    fn get_stats(&self) -> Result<SessionStoreStats, StorageError> {
        self.with_reader(|conn| {
            let total: i64 = conn
                .query_row("SELECT COUNT(*) FROM session_chunks", [], |r| r.get(0))
                .map_err(sqlite_err)?;
            let distinct: i64 = conn
                .query_row(
                    "SELECT COUNT(DISTINCT session_id) FROM session_chunks",
                    [],
                    |r| r.get(0),
                )
                .map_err(sqlite_err)?;
            let earliest = conn
                .query_row("SELECT MIN(start_time) FROM session_chunks", [], |r| r.get(0))
                .optional()
                .map_err(sqlite_err)?
                .flatten();
            let latest = conn
                .query_row("SELECT MAX(end_time) FROM session_chunks", [], |r| r.get(0))
                .optional()
                .map_err(sqlite_err)?
                .flatten();
            Ok(SessionStoreStats {
                total_chunks: total as usize,
                distinct_sessions: distinct as usize,
                earliest_chunk_time: earliest,
                latest_chunk_time: latest,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn chunk(session_id: &str, index: u64, vec: Vec<f32>, end_time: chrono::DateTime<Utc>) -> SessionChunk {
        SessionChunk {
            chunk_id: format!("{session_id}-{index}"),
            session_id: session_id.to_string(),
            instance_id: "agent-1".to_string(),
            content: format!("chunk {index}"),
            embedding: Some(vec),
            start_time: end_time,
            end_time,
            chunk_index: index,
        }
    }

    #[test]
    fn next_chunk_index_is_zero_for_new_session_and_increments_after_store() {
        let store = new_store();
        assert_eq!(store.next_chunk_index("sess-1").unwrap(), 0);
        store.store_chunk(chunk("sess-1", 0, vec![1.0, 0.0], Utc::now())).unwrap();
        assert_eq!(store.next_chunk_index("sess-1").unwrap(), 1);
    }

    #[test]
    fn search_filters_by_session_id() {
        let store = new_store();
        store.store_chunk(chunk("sess-1", 0, vec![1.0, 0.0], Utc::now())).unwrap();
        store.store_chunk(chunk("sess-2", 0, vec![1.0, 0.0], Utc::now())).unwrap();

        let results = store.search(&[1.0, 0.0], Some("sess-1"), 10, 0.0).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].session_id, "sess-1");
    }

    #[test]
    fn cleanup_drops_chunks_older_than_retention() {
        let store = new_store();
        let old_time = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        store.store_chunk(chunk("sess-1", 0, vec![1.0], old_time)).unwrap();
        store.store_chunk(chunk("sess-1", 1, vec![1.0], Utc::now())).unwrap();

        let removed = store.cleanup(90).unwrap();
        assert_eq!(removed, 1);

        let stats = store.get_stats().unwrap();
        assert_eq!(stats.total_chunks, 1);
    }

    #[test]
    fn get_stats_counts_distinct_sessions() {
        let store = new_store();
        store.store_chunk(chunk("sess-1", 0, vec![1.0], Utc::now())).unwrap();
        store.store_chunk(chunk("sess-2", 0, vec![1.0], Utc::now())).unwrap();
        let stats = store.get_stats().unwrap();
        assert_eq!(stats.total_chunks, 2);
        assert_eq!(stats.distinct_sessions, 2);
    }
}
