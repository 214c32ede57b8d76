//! Filtered export into, and structural parsing of, the portable bundle
//! wire format.

use chrono::{DateTime, Utc};
use tracing::debug;

use tribal_core::constants::EXPORT_LIST_LIMIT;
use tribal_core::errors::{StorageError, TribalError, TribalResult};
use tribal_core::model::{BundleManifest, EmbeddingMetadata, PortableBundle};
use tribal_core::traits::{StoreFilters, VectorStore};

/// Filters applied at export time. Tag matching is pushed down to the
/// store; date-range matching happens in memory afterward since no
/// `VectorStore` implementation indexes `created_at` directly.
#[derive(Debug, Clone, Default)]
pub struct ExportFilter {
    pub tags: Vec<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

/// Collect entries from `store`, apply `filters`, and wrap them in a
/// `PortableBundle` manifested with `embedding_metadata`.
pub fn export_memories(
    store: &dyn VectorStore,
    embedding_metadata: EmbeddingMetadata,
    filters: &ExportFilter,
    schema_version: &str,
) -> Result<PortableBundle, StorageError> {
    let store_filters = StoreFilters {
        tags: filters.tags.clone(),
        ..Default::default()
    };

    let mut entries = store.list(EXPORT_LIST_LIMIT, 0, &store_filters)?;

    if let Some(from) = filters.date_from {
        entries.retain(|e| e.created_at >= from);
    }
    if let Some(to) = filters.date_to {
        entries.retain(|e| e.created_at <= to);
    }

    debug!(count = entries.len(), "exporting entries into portable bundle");

    let manifest = BundleManifest {
        schema_version: schema_version.to_string(),
        embedding: embedding_metadata,
        memory_count: entries.len(),
        exported_at: Utc::now(),
    };

    Ok(PortableBundle { manifest, entries })
}

/// Parse a bundle from JSON, aborting with a clear error on any structural
/// failure rather than importing a partially-valid bundle.
pub fn parse_bundle(json: &str) -> TribalResult<PortableBundle> {
    let bundle: PortableBundle = serde_json::from_str(json)?;

    if bundle.manifest.schema_version.trim().is_empty() {
        return Err(TribalError::validation("bundle manifest is missing a schema_version"));
    }
    if bundle.manifest.memory_count != bundle.entries.len() {
        return Err(TribalError::validation(format!(
            "bundle manifest claims {} entries but contains {}",
            bundle.manifest.memory_count,
            bundle.entries.len()
        )));
    }

    Ok(bundle)
}

/// Serialize a bundle to pretty-printed JSON.
pub fn serialize_bundle(bundle: &PortableBundle) -> TribalResult<String> {
    Ok(serde_json::to_string_pretty(bundle)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tribal_core::model::{MemoryEntry, SourceType};

    struct FakeStore {
        entries: Vec<MemoryEntry>,
    }

    impl VectorStore for FakeStore {
        fn store(&self, _entry: MemoryEntry) -> Result<String, StorageError> {
            unimplemented!()
        }
        fn upsert(&self, _entry: MemoryEntry) -> Result<String, StorageError> {
            unimplemented!()
        }
        fn get(&self, _id: &str) -> Result<Option<MemoryEntry>, StorageError> {
            unimplemented!()
        }
        fn delete(&self, _id: &str) -> Result<bool, StorageError> {
            unimplemented!()
        }
        fn recall(
            &self,
            _query_vec: &[f32],
            _limit: usize,
            _min_similarity: f64,
            _filters: &StoreFilters,
        ) -> Result<Vec<tribal_core::traits::RecallResult>, StorageError> {
            unimplemented!()
        }
        fn list(
            &self,
            _limit: usize,
            _offset: usize,
            _filters: &StoreFilters,
        ) -> Result<Vec<MemoryEntry>, StorageError> {
            Ok(self.entries.clone())
        }
        fn count(&self, _filters: &StoreFilters) -> Result<usize, StorageError> {
            Ok(self.entries.len())
        }
        fn get_stats(&self) -> Result<tribal_core::traits::StoreStats, StorageError> {
            unimplemented!()
        }
    }

    fn metadata() -> EmbeddingMetadata {
        EmbeddingMetadata {
            model_name: "mock".into(),
            dimensions: 4,
            provider: "local".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn export_applies_date_range_filter_in_memory() {
        let old = MemoryEntry::new("ancient", "agent-1", SourceType::UserExplicit);
        let mut old = old;
        old.created_at = Utc::now() - chrono::Duration::days(365);
        let recent = MemoryEntry::new("fresh", "agent-1", SourceType::UserExplicit);

        let store = FakeStore {
            entries: vec![old, recent.clone()],
        };
        let filters = ExportFilter {
            tags: vec![],
            date_from: Some(Utc::now() - chrono::Duration::days(1)),
            date_to: None,
        };

        let bundle = export_memories(&store, metadata(), &filters, "1.0").unwrap();
        assert_eq!(bundle.entries.len(), 1);
        assert_eq!(bundle.entries[0].id, recent.id);
        assert_eq!(bundle.manifest.memory_count, 1);
    }

    #[test]
    fn export_with_no_filters_passes_every_entry_through() {
        let entries = vec![
            MemoryEntry::new("a", "agent-1", SourceType::UserExplicit),
            MemoryEntry::new("b", "agent-1", SourceType::UserExplicit),
        ];
        let store = FakeStore { entries };
        let bundle = export_memories(&store, metadata(), &ExportFilter::default(), "1.0").unwrap();
        assert_eq!(bundle.entries.len(), 2);
    }

    #[test]
    fn parse_bundle_round_trips_through_json() {
        let store = FakeStore {
            entries: vec![MemoryEntry::new("hello", "agent-1", SourceType::UserExplicit)],
        };
        let bundle = export_memories(&store, metadata(), &ExportFilter::default(), "1.0").unwrap();
        let json = serialize_bundle(&bundle).unwrap();
        let parsed = parse_bundle(&json).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.manifest.schema_version, "1.0");
    }

    #[test]
    fn parse_bundle_rejects_malformed_json() {
        let err = parse_bundle("{ not json").unwrap_err();
        assert!(matches!(err, TribalError::Serialization(_)));
    }

    #[test]
    fn parse_bundle_rejects_mismatched_memory_count() {
        let store = FakeStore {
            entries: vec![MemoryEntry::new("hello", "agent-1", SourceType::UserExplicit)],
        };
        let bundle = export_memories(&store, metadata(), &ExportFilter::default(), "1.0").unwrap();
        let mut json: serde_json::Value = serde_json::from_str(&serialize_bundle(&bundle).unwrap()).unwrap();
        json["manifest"]["memory_count"] = serde_json::json!(99);
        let err = parse_bundle(&json.to_string()).unwrap_err();
        assert!(matches!(err, TribalError::Validation { .. }));
    }
}
