//! Persistent `VectorStore` implementation: brute-force cosine scan over a
//! BLOB-encoded embedding column. A real ANN index is a drop-in replacement
//! behind the same trait; see DESIGN.md.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use tribal_core::errors::StorageError;
use tribal_core::model::MemoryEntry;
use tribal_core::sanitize::validate_id_shape;
use tribal_core::traits::{RecallResult, StoreFilters, StoreStats, VectorStore};

use crate::conversions::{
    bytes_to_f32_vec, cosine_similarity, f32_vec_to_bytes, source_type_from_str,
    source_type_to_str,
};
use crate::sqlite_err;
use crate::sqlite_store::SqliteStore;

fn row_to_entry(row: &Row) -> rusqlite::Result<MemoryEntry> {
    let tags_json: String = row.get("tags")?;
    let related_json: String = row.get("related_to")?;
    let vector_blob: Option<Vec<u8>> = row.get("vector")?;
    Ok(MemoryEntry {
        id: row.get("id")?,
        content: row.get("content")?,
        embedding: vector_blob.map(|b| bytes_to_f32_vec(&b)),
        source_instance: row.get("source_instance")?,
        source_type: source_type_from_str(&row.get::<_, String>("source_type")?),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        tags: serde_json::from_str::<Vec<String>>(&tags_json)
            .unwrap_or_default()
            .into_iter()
            .collect(),
        context: row.get("context")?,
        confidence: row.get::<_, f64>("confidence")?.into(),
        supersedes: row.get("supersedes")?,
        related_to: serde_json::from_str::<Vec<String>>(&related_json)
            .unwrap_or_default()
            .into_iter()
            .collect(),
        deleted: row.get::<_, i64>("deleted")? != 0,
    })
}

/// The embedding length already committed by any other live row, excluding
/// `exclude_id` so an upsert can freely rewrite its own row. `None` means no
/// row has an embedding yet.
fn configured_dimensions(conn: &Connection, exclude_id: &str) -> Result<Option<i64>, StorageError> {
    conn.query_row(
        "SELECT dimensions FROM memories WHERE dimensions IS NOT NULL AND id != ?1 LIMIT 1",
        params![exclude_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(sqlite_err)
}

fn insert_row(conn: &Connection, entry: &MemoryEntry, upsert: bool) -> Result<(), StorageError> {
    validate_id_shape(&entry.id)?;
    let vector_blob = entry.embedding.as_deref().map(f32_vec_to_bytes);
    let dims = entry.embedding.as_ref().map(|v| v.len() as i64);

    if let Some(actual) = dims {
        if let Some(expected) = configured_dimensions(conn, &entry.id)? {
            if actual != expected {
                return Err(StorageError::DimensionMismatch {
                    expected: expected as usize,
                    actual: actual as usize,
                });
            }
        }
    }

    let tags_json = serde_json::to_string(&entry.tags.iter().collect::<Vec<_>>())
        .map_err(|e| StorageError::Sqlite { message: e.to_string() })?;
    let related_json = serde_json::to_string(&entry.related_to.iter().collect::<Vec<_>>())
        .map_err(|e| StorageError::Sqlite { message: e.to_string() })?;
    let content_hash = entry.content_hash().to_hex().to_string();

    let sql = if upsert {
        "INSERT INTO memories
            (id, content, vector, dimensions, source_instance, source_type,
             created_at, updated_at, tags, context, confidence, supersedes,
             related_to, deleted, content_hash)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 0, ?14)
         ON CONFLICT(id) DO UPDATE SET
            content = excluded.content,
            vector = excluded.vector,
            dimensions = excluded.dimensions,
            source_instance = excluded.source_instance,
            source_type = excluded.source_type,
            updated_at = excluded.updated_at,
            tags = excluded.tags,
            context = excluded.context,
            confidence = excluded.confidence,
            supersedes = excluded.supersedes,
            related_to = excluded.related_to,
            deleted = 0,
            content_hash = excluded.content_hash"
    } else {
        "INSERT INTO memories
            (id, content, vector, dimensions, source_instance, source_type,
             created_at, updated_at, tags, context, confidence, supersedes,
             related_to, deleted, content_hash)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 0, ?14)"
    };

    conn.execute(
        sql,
        params![
            entry.id,
            entry.content,
            vector_blob,
            dims,
            entry.source_instance,
            source_type_to_str(entry.source_type),
            entry.created_at,
            entry.updated_at,
            tags_json,
            entry.context,
            entry.confidence.value(),
            entry.supersedes,
            related_json,
            content_hash,
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

impl VectorStore for SqliteStore {
    fn store(&self, entry: MemoryEntry) -> Result<String, StorageError> {
        let id = entry.id.clone();
        self.with_writer(|conn| insert_row(conn, &entry, false))?;
        Ok(id)
    }

    fn upsert(&self, entry: MemoryEntry) -> Result<String, StorageError> {
        let id = entry.id.clone();
        self.with_writer(|conn| insert_row(conn, &entry, true))?;
        Ok(id)
    }

    fn get(&self, id: &str) -> Result<Option<MemoryEntry>, StorageError> {
        validate_id_shape(id)?;
        self.with_reader(|conn| {
            conn.query_row(
                "SELECT * FROM memories WHERE id = ?1 AND deleted = 0",
                params![id],
                |row| row_to_entry(row),
            )
            .optional()
            .map_err(sqlite_err)
        })
    }

    fn delete(&self, id: &str) -> Result<bool, StorageError> {
        validate_id_shape(id)?;
        let now = Utc::now();
        self.with_writer(|conn| {
            let changed = conn
                .execute(
                    "UPDATE memories SET deleted = 1, updated_at = ?2 WHERE id = ?1 AND deleted = 0",
                    params![id, now],
                )
                .map_err(sqlite_err)?;
            Ok(changed > 0)
        })
    }

    fn recall(
        &self,
        query_vec: &[f32],
        limit: usize,
        min_similarity: f64,
        filters: &StoreFilters,
    ) -> Result<Vec<RecallResult>, StorageError> {
        let query_norm_sq: f64 = query_vec.iter().map(|x| (*x as f64) * (*x as f64)).sum();
        if query_norm_sq == 0.0 {
            return Ok(vec![]);
        }
        let query_len = query_vec.len();

        let rows = self.with_reader(|conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM memories WHERE deleted = 0")
                .map_err(sqlite_err)?;
            let mut out = Vec::new();
            let mapped = stmt
                .query_map([], |row| row_to_entry(row))
                .map_err(sqlite_err)?;
            for r in mapped {
                out.push(r.map_err(sqlite_err)?);
            }
            Ok(out)
        })?;

        let mut scored: Vec<RecallResult> = Vec::new();
        for entry in rows {
            let Some(embedding) = &entry.embedding else {
                continue;
            };
            if embedding.len() != query_len {
                continue;
            }
            if let Some(instance) = &filters.source_instance {
                if &entry.source_instance != instance {
                    continue;
                }
            }
            if let Some(source_type) = filters.source_type {
                if entry.source_type != source_type {
                    continue;
                }
            }
            if !filters.tags.is_empty() && !filters.tags.iter().any(|t| entry.tags.contains(t)) {
                continue;
            }
            let sim = cosine_similarity(query_vec, embedding);
            if sim >= min_similarity {
                scored.push(RecallResult {
                    entry,
                    similarity_score: sim,
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

    fn list(
        &self,
        limit: usize,
        offset: usize,
        filters: &StoreFilters,
    ) -> Result<Vec<MemoryEntry>, StorageError> {
        let all = self.with_reader(|conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM memories WHERE deleted = 0 ORDER BY created_at ASC")
                .map_err(sqlite_err)?;
            let mapped = stmt.query_map([], |row| row_to_entry(row)).map_err(sqlite_err)?;
            let mut out = Vec::new();
            for r in mapped {
                out.push(r.map_err(sqlite_err)?);
            }
            Ok(out)
        })?;

        let filtered: Vec<MemoryEntry> = all
            .into_iter()
            .filter(|e| entry_matches_filters(e, filters))
            .collect();
        Ok(filtered.into_iter().skip(offset).take(limit).collect())
    }

    fn count(&self, filters: &StoreFilters) -> Result<usize, StorageError> {
        Ok(self
            .list(usize::MAX, 0, filters)
            .map(|v| v.len())
            .unwrap_or(0))
    }

    fn get_stats(&self) -> Result<StoreStats, StorageError> {
        self.with_reader(|conn| {
            let total: i64 = conn
                .query_row("SELECT COUNT(*) FROM memories WHERE deleted = 0", [], |r| r.get(0))
                .map_err(sqlite_err)?;
            let corrections: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM memories WHERE deleted = 0 AND source_type = 'correction'",
                    [],
                    |r| r.get(0),
                )
                .map_err(sqlite_err)?;

            let mut by_source_type = std::collections::HashMap::new();
            let mut stmt = conn
                .prepare(
                    "SELECT source_type, COUNT(*) FROM memories WHERE deleted = 0 GROUP BY source_type",
                )
                .map_err(sqlite_err)?;
            let rows = stmt
                .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))
                .map_err(sqlite_err)?;
            for row in rows {
                let (k, v) = row.map_err(sqlite_err)?;
                by_source_type.insert(k, v as usize);
            }

            let mut by_instance = std::collections::HashMap::new();
            let mut stmt = conn
                .prepare(
                    "SELECT source_instance, COUNT(*) FROM memories WHERE deleted = 0 GROUP BY source_instance",
                )
                .map_err(sqlite_err)?;
            let rows = stmt
                .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))
                .map_err(sqlite_err)?;
            for row in rows {
                let (k, v) = row.map_err(sqlite_err)?;
                by_instance.insert(k, v as usize);
            }

            let mut by_tag = std::collections::HashMap::new();
            let mut stmt = conn
                .prepare(
                    "SELECT je.value, COUNT(*) FROM memories m, json_each(m.tags) je
                     WHERE m.deleted = 0 GROUP BY je.value",
                )
                .map_err(sqlite_err)?;
            let rows = stmt
                .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))
                .map_err(sqlite_err)?;
            for row in rows {
                let (k, v) = row.map_err(sqlite_err)?;
                by_tag.insert(k, v as usize);
            }

            Ok(StoreStats {
                total: total as usize,
                by_source_type,
                by_tag,
                by_instance,
                corrections: corrections as usize,
            })
        })
    }
}

fn entry_matches_filters(entry: &MemoryEntry, filters: &StoreFilters) -> bool {
    if let Some(instance) = &filters.source_instance {
        if &entry.source_instance != instance {
            return false;
        }
    }
    if let Some(source_type) = filters.source_type {
        if entry.source_type != source_type {
            return false;
        }
    }
    if !filters.tags.is_empty() && !filters.tags.iter().any(|t| entry.tags.contains(t)) {
        return false;
    }
    true
}
