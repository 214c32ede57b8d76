//! The memory service facade: `remember` / `recall` / `correct` / `forget`
//! / `get` / `get_stats` / `recall_entity` / `export` / `import`, each
//! implemented synchronously and exposed asynchronously via
//! `spawn_blocking`, matching the cooperative single-threaded-per-request
//! scheduling model the stores are built to tolerate.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument};

use tribal_core::config::TribalConfig;
use tribal_core::constants::GRAPH_2HOP_SCORE;
use tribal_core::errors::{TribalError, TribalResult};
use tribal_core::model::{EmbeddingMetadata, MemoryEntry, PortableBundle, SourceType};
use tribal_core::traits::{
    Bm25Store, EmbeddingProvider, EntityExtractor, GraphStore, Reranker, SessionStore, StoreStats, VectorStore,
};
use tribal_dedup::DeduplicationService;
use tribal_portability::{export_memories, import_bundle, ExportFilter, ImportOptions, ImportSummary};
use tribal_retrieval::{retrieve, RetrievalDeps, RetrievalMethod, RetrievalRequest, RetrievalResult};
use tribal_session::SessionChunker;

/// Outcome of a `remember` call.
#[derive(Debug, Clone, Default)]
pub struct RememberOutcome {
    pub success: bool,
    pub memory_id: Option<String>,
    pub duplicate_of: Option<String>,
    pub error: Option<String>,
}

/// Outcome of a `correct` call.
#[derive(Debug, Clone, Default)]
pub struct CorrectOutcome {
    pub success: bool,
    pub memory_id: Option<String>,
    pub error: Option<String>,
}

fn validate_content(content: &str) -> TribalResult<String> {
    let trimmed = content.trim().to_string();
    if trimmed.is_empty() {
        return Err(TribalError::validation("content must be non-empty after trimming"));
    }
    Ok(trimmed)
}

pub struct MemoryService {
    config: TribalConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    bm25_store: Option<Arc<dyn Bm25Store>>,
    graph_store: Option<Arc<dyn GraphStore>>,
    extractor: Arc<dyn EntityExtractor>,
    reranker: Arc<dyn Reranker>,
    session_chunker: Arc<SessionChunker>,
}

impl MemoryService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: TribalConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
        bm25_store: Option<Arc<dyn Bm25Store>>,
        graph_store: Option<Arc<dyn GraphStore>>,
        extractor: Arc<dyn EntityExtractor>,
        reranker: Arc<dyn Reranker>,
        session_chunker: Arc<SessionChunker>,
    ) -> Self {
        Self {
            config,
            embedder,
            vector_store,
            bm25_store,
            graph_store,
            extractor,
            reranker,
            session_chunker,
        }
    }

    pub fn config(&self) -> &TribalConfig {
        &self.config
    }

    pub fn session_chunker(&self) -> &Arc<SessionChunker> {
        &self.session_chunker
    }

    /// Shared by `remember` and `correct`: embed, optionally dedup-check,
    /// store into vector + BM25 + graph, in that order.
    fn write_entry(&self, mut entry: MemoryEntry, skip_dedup: bool) -> TribalResult<RememberOutcome> {
        let embedding = match self.embedder.embed(&entry.content) {
            Ok(v) => v,
            Err(err) => {
                return Ok(RememberOutcome {
                    success: false,
                    error: Some(err.to_string()),
                    ..Default::default()
                });
            }
        };
        entry.embedding = Some(embedding.clone());

        if !skip_dedup && self.config.dedup.enabled {
            let dedup = DeduplicationService::from_config(self.vector_store.as_ref(), &self.config.dedup);
            let (is_dup, existing_id) = dedup.is_duplicate(&embedding, None)?;
            if is_dup {
                return Ok(RememberOutcome {
                    success: false,
                    duplicate_of: existing_id,
                    ..Default::default()
                });
            }
        }

        let id = self.vector_store.store(entry.clone())?;

        if let Some(bm25) = &self.bm25_store {
            bm25.index(&id, &entry.content, &entry.tags.iter().cloned().collect::<Vec<_>>())?;
        }

        if let Some(graph) = &self.graph_store {
            let (entities, relationships) = self.extractor.extract_with_relationships(&entry.content);
            debug!(entity_count = entities.len(), relationship_count = relationships.len(), memory_id = %id, "indexing extracted entities");
            for entity in &entities {
                graph.add_entity(entity, &id)?;
            }
            for rel in &relationships {
                graph.add_relationship(rel, &id)?;
            }
        }

        Ok(RememberOutcome {
            success: true,
            memory_id: Some(id),
            ..Default::default()
        })
    }

    #[instrument(skip(self, content))]
    pub fn remember_sync(
        &self,
        content: &str,
        source_type: SourceType,
        context: Option<String>,
        tags: HashSet<String>,
        skip_dedup: bool,
    ) -> TribalResult<RememberOutcome> {
        let content = match validate_content(content) {
            Ok(c) => c,
            Err(err) => {
                return Ok(RememberOutcome {
                    success: false,
                    error: Some(err.to_string()),
                    ..Default::default()
                })
            }
        };

        let mut entry = MemoryEntry::new(content, &self.config.instance_id, source_type);
        entry.context = context;
        entry.tags = tags;

        self.write_entry(entry, skip_dedup)
    }

    pub async fn remember(
        self: &Arc<Self>,
        content: String,
        source_type: SourceType,
        context: Option<String>,
        tags: HashSet<String>,
        skip_dedup: bool,
    ) -> TribalResult<RememberOutcome> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.remember_sync(&content, source_type, context, tags, skip_dedup))
            .await
            .map_err(|e| TribalError::configuration(format!("remember task panicked: {e}")))?
    }

    pub fn recall_sync(&self, request: RetrievalRequest) -> TribalResult<Vec<RetrievalResult>> {
        let deps = RetrievalDeps {
            embedder: self.embedder.as_ref(),
            vector_store: self.vector_store.as_ref(),
            bm25_store: self.bm25_store.as_deref(),
            graph_store: self.graph_store.as_deref(),
            query_extractor: Some(self.extractor.as_ref()),
            reranker: self.reranker.as_ref(),
        };
        Ok(retrieve(&request, &self.config.retrieval, &deps)?)
    }

    pub async fn recall(self: &Arc<Self>, request: RetrievalRequest) -> TribalResult<Vec<RetrievalResult>> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.recall_sync(request))
            .await
            .map_err(|e| TribalError::configuration(format!("recall task panicked: {e}")))?
    }

    pub fn correct_sync(
        &self,
        original_id: &str,
        corrected_content: &str,
        context: Option<String>,
    ) -> TribalResult<CorrectOutcome> {
        let original = self.vector_store.get(original_id)?;
        let Some(original) = original else {
            return Ok(CorrectOutcome {
                success: false,
                error: Some(format!("original memory {original_id} not found")),
                ..Default::default()
            });
        };

        let content = match validate_content(corrected_content) {
            Ok(c) => c,
            Err(err) => {
                return Ok(CorrectOutcome {
                    success: false,
                    error: Some(err.to_string()),
                    ..Default::default()
                })
            }
        };

        let mut entry = MemoryEntry::new(content, &self.config.instance_id, SourceType::Correction);
        entry.supersedes = Some(original_id.to_string());
        entry.related_to.insert(original_id.to_string());
        entry.tags = original.tags.clone();
        entry.context = context.or(original.context.clone());

        // Corrections must not be rejected for resembling the memory they
        // supersede, so dedup is always skipped here.
        let outcome = self.write_entry(entry, true)?;
        Ok(CorrectOutcome {
            success: outcome.success,
            memory_id: outcome.memory_id,
            error: outcome.error,
        })
    }

    pub async fn correct(
        self: &Arc<Self>,
        original_id: String,
        corrected_content: String,
        context: Option<String>,
    ) -> TribalResult<CorrectOutcome> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.correct_sync(&original_id, &corrected_content, context))
            .await
            .map_err(|e| TribalError::configuration(format!("correct task panicked: {e}")))?
    }

    pub fn forget_sync(&self, id: &str) -> TribalResult<bool> {
        let tombstoned = self.vector_store.delete(id)?;
        if let Some(bm25) = &self.bm25_store {
            bm25.delete(id)?;
        }
        if let Some(graph) = &self.graph_store {
            graph.delete_memory(id)?;
        }
        Ok(tombstoned)
    }

    pub async fn forget(self: &Arc<Self>, id: String) -> TribalResult<bool> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.forget_sync(&id))
            .await
            .map_err(|e| TribalError::configuration(format!("forget task panicked: {e}")))?
    }

    pub fn get_sync(&self, id: &str) -> TribalResult<Option<MemoryEntry>> {
        Ok(self.vector_store.get(id)?)
    }

    pub async fn get(self: &Arc<Self>, id: String) -> TribalResult<Option<MemoryEntry>> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.get_sync(&id))
            .await
            .map_err(|e| TribalError::configuration(format!("get task panicked: {e}")))?
    }

    pub fn get_stats_sync(&self) -> TribalResult<StoreStats> {
        Ok(self.vector_store.get_stats()?)
    }

    pub async fn get_stats(self: &Arc<Self>) -> TribalResult<StoreStats> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.get_stats_sync())
            .await
            .map_err(|e| TribalError::configuration(format!("get_stats task panicked: {e}")))?
    }

    /// entities -> memory ids -> entries, each tagged `retrieval_method =
    /// entity` with the fixed graph-expansion score. Empty when no graph
    /// store is configured.
    pub fn recall_entity_sync(&self, entity_name: &str, hops: usize, limit: usize) -> TribalResult<Vec<RetrievalResult>> {
        let Some(graph) = &self.graph_store else {
            return Ok(vec![]);
        };

        let connected = graph.find_connected(entity_name, hops, true)?;
        let mut seen_ids = HashSet::new();
        let mut results = Vec::new();

        for entity in &connected {
            for memory_id in graph.get_memories_for_entity(&entity.name)? {
                if !seen_ids.insert(memory_id.clone()) {
                    continue;
                }
                match self.vector_store.get(&memory_id)? {
                    Some(entry) if !entry.deleted => {
                        results.push(RetrievalResult {
                            entry,
                            score: GRAPH_2HOP_SCORE,
                            retrieval_method: RetrievalMethod::Entity,
                            retrieval_time_ms: 0,
                        });
                    }
                    _ => continue,
                }
                if results.len() >= limit {
                    return Ok(results);
                }
            }
        }

        Ok(results)
    }

    pub async fn recall_entity(self: &Arc<Self>, entity_name: String, hops: usize, limit: usize) -> TribalResult<Vec<RetrievalResult>> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.recall_entity_sync(&entity_name, hops, limit))
            .await
            .map_err(|e| TribalError::configuration(format!("recall_entity task panicked: {e}")))?
    }

    /// The embedding metadata this instance stamps into export manifests
    /// and compares incoming bundles against on import.
    pub fn embedding_metadata(&self) -> EmbeddingMetadata {
        EmbeddingMetadata {
            model_name: self.config.embedding.model.clone(),
            dimensions: self.config.embedding.dimensions,
            provider: self.config.embedding.provider.clone(),
            created_at: chrono::Utc::now(),
        }
    }

    pub fn export_sync(&self, filters: &ExportFilter) -> TribalResult<PortableBundle> {
        Ok(export_memories(self.vector_store.as_ref(), self.embedding_metadata(), filters, "1.0")?)
    }

    pub async fn export(self: &Arc<Self>, filters: ExportFilter) -> TribalResult<PortableBundle> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.export_sync(&filters))
            .await
            .map_err(|e| TribalError::configuration(format!("export task panicked: {e}")))?
    }

    pub fn import_sync(&self, bundle: &PortableBundle, options: &ImportOptions) -> ImportSummary {
        import_bundle(bundle, self.vector_store.as_ref(), &self.embedding_metadata(), options)
    }

    pub async fn import(self: &Arc<Self>, bundle: PortableBundle, options: ImportOptions) -> TribalResult<ImportSummary> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.import_sync(&bundle, &options))
            .await
            .map_err(|e| TribalError::configuration(format!("import task panicked: {e}")))
    }
}
