//! `DashMap`-backed `VectorStore` for tests and small deployments: no disk,
//! no schema, the same tombstone-on-delete / clear-on-upsert semantics as
//! the persistent store.

use dashmap::DashMap;

use tribal_core::errors::StorageError;
use tribal_core::model::MemoryEntry;
use tribal_core::sanitize::validate_id_shape;
use tribal_core::traits::{RecallResult, StoreFilters, StoreStats, VectorStore};

use crate::conversions::{cosine_similarity, source_type_to_str};

/// A live entry plus its tombstone flag. Tombstoned rows stay in the map so
/// `delete` is idempotent and `upsert` can resurrect them without a second
/// lookup path.
struct Slot {
    entry: MemoryEntry,
    deleted: bool,
}

#[derive(Default)]
pub struct InMemoryVectorStore {
    entries: DashMap<String, Slot>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// The embedding length already committed to this store, taken from any
    /// other live entry that carries one. `None` means no entry has an
    /// embedding yet, so any length is still acceptable.
    fn configured_dimensions(&self, excluding_id: &str) -> Option<usize> {
        self.entries.iter().find_map(|kv| {
            if kv.key() == excluding_id {
                return None;
            }
            kv.value().entry.embedding.as_ref().map(|v| v.len())
        })
    }

    fn check_dimensions(&self, entry: &MemoryEntry) -> Result<(), StorageError> {
        if let Some(embedding) = &entry.embedding {
            if let Some(expected) = self.configured_dimensions(&entry.id) {
                if embedding.len() != expected {
                    return Err(StorageError::DimensionMismatch {
                        expected,
                        actual: embedding.len(),
                    });
                }
            }
        }
        Ok(())
    }

    fn matches(entry: &MemoryEntry, filters: &StoreFilters) -> bool {
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
}

impl VectorStore for InMemoryVectorStore {
    fn store(&self, entry: MemoryEntry) -> Result<String, StorageError> {
        validate_id_shape(&entry.id)?;
        self.check_dimensions(&entry)?;
        let id = entry.id.clone();
        self.entries.entry(id.clone()).or_insert(Slot {
            entry,
            deleted: false,
        });
        Ok(id)
    }

    fn upsert(&self, entry: MemoryEntry) -> Result<String, StorageError> {
        validate_id_shape(&entry.id)?;
        self.check_dimensions(&entry)?;
        let id = entry.id.clone();
        self.entries.insert(
            id.clone(),
            Slot {
                entry,
                deleted: false,
            },
        );
        Ok(id)
    }

    fn get(&self, id: &str) -> Result<Option<MemoryEntry>, StorageError> {
        validate_id_shape(id)?;
        Ok(self
            .entries
            .get(id)
            .filter(|slot| !slot.deleted)
            .map(|slot| slot.entry.clone()))
    }

    fn delete(&self, id: &str) -> Result<bool, StorageError> {
        validate_id_shape(id)?;
        match self.entries.get_mut(id) {
            Some(mut slot) if !slot.deleted => {
                slot.deleted = true;
                slot.entry.deleted = true;
                slot.entry.updated_at = chrono::Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
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

        let mut scored: Vec<RecallResult> = self
            .entries
            .iter()
            .filter(|kv| !kv.value().deleted)
            .filter_map(|kv| {
                let entry = &kv.value().entry;
                let embedding = entry.embedding.as_ref()?;
                if embedding.len() != query_vec.len() {
                    return None;
                }
                if !Self::matches(entry, filters) {
                    return None;
                }
                let sim = cosine_similarity(query_vec, embedding);
                if sim >= min_similarity {
                    Some(RecallResult {
                        entry: entry.clone(),
                        similarity_score: sim,
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

    fn list(
        &self,
        limit: usize,
        offset: usize,
        filters: &StoreFilters,
    ) -> Result<Vec<MemoryEntry>, StorageError> {
        let mut all: Vec<MemoryEntry> = self
            .entries
            .iter()
            .filter(|kv| !kv.value().deleted)
            .map(|kv| kv.value().entry.clone())
            .filter(|e| Self::matches(e, filters))
            .collect();
        all.sort_by_key(|e| e.created_at);
        Ok(all.into_iter().skip(offset).take(limit).collect())
    }

    fn count(&self, filters: &StoreFilters) -> Result<usize, StorageError> {
        Ok(self
            .entries
            .iter()
            .filter(|kv| !kv.value().deleted)
            .map(|kv| kv.value().entry.clone())
            .filter(|e| Self::matches(e, filters))
            .count())
    }

    fn get_stats(&self) -> Result<StoreStats, StorageError> {
        let mut stats = StoreStats::default();
        for kv in self.entries.iter() {
            let slot = kv.value();
            if slot.deleted {
                continue;
            }
            let entry = &slot.entry;
            stats.total += 1;
            if matches!(entry.source_type, tribal_core::model::SourceType::Correction) {
                stats.corrections += 1;
            }
            *stats
                .by_source_type
                .entry(source_type_to_str(entry.source_type).to_string())
                .or_insert(0) += 1;
            *stats
                .by_instance
                .entry(entry.source_instance.clone())
                .or_insert(0) += 1;
            for tag in &entry.tags {
                *stats.by_tag.entry(tag.clone()).or_insert(0) += 1;
            }
        }
        Ok(stats)
    }
}
