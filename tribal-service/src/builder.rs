//! Constructs a [`crate::service::MemoryService`] from a [`TribalConfig`],
//! wiring concrete store/provider/extractor implementations behind the
//! trait objects the retrieval and dedup crates depend on.

use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use tribal_core::config::TribalConfig;
use tribal_core::errors::{TribalError, TribalResult};
use tribal_core::traits::{Bm25Store, EntityExtractor, GraphStore, Reranker, SessionStore, VectorStore};
use tribal_embeddings::create_provider;
use tribal_extraction::{ExtractionContext, HybridEntityExtractor, NerEntityExtractor, RegexEntityExtractor, RuleBasedNerTagger};
use tribal_retrieval::rerank::create_reranker;
use tribal_session::SessionChunker;
use tribal_storage::{InMemorySessionStore, InMemoryVectorStore, SqliteStore};

use crate::service::MemoryService;

/// Opens the configured vector/BM25/graph storage. `"sqlite"` opens a
/// `SqliteStore` backing all three traits from one engine; anything else
/// (including an unrecognized provider name) falls back to the map-backed
/// `InMemoryVectorStore`, which does not carry BM25 or graph capability.
/// A persistent-open failure downgrades to the in-memory store with a
/// warning rather than failing construction, per the storage backend's
/// documented failure contract.
fn open_storage(config: &TribalConfig) -> (Arc<dyn VectorStore>, Option<Arc<dyn Bm25Store>>, Option<Arc<dyn GraphStore>>) {
    if config.storage.provider == "sqlite" {
        match SqliteStore::open(Path::new(&config.storage.path), config.storage.read_pool_size) {
            Ok(store) => {
                let store = Arc::new(store);
                return (store.clone(), Some(store.clone()), Some(store));
            }
            Err(err) => {
                warn!(error = %err, path = %config.storage.path, "failed to open persistent storage, downgrading to in-memory");
            }
        }
    }
    (Arc::new(InMemoryVectorStore::new()), None, None)
}

/// Opens the configured session store. Same downgrade contract as
/// `open_storage`: a persistent-open failure never fails construction.
fn open_session_store(config: &TribalConfig) -> Arc<dyn SessionStore> {
    if config.session.provider == "sqlite" {
        match SqliteStore::open(Path::new(&config.session.path), config.storage.read_pool_size) {
            Ok(store) => return Arc::new(store),
            Err(err) => {
                warn!(error = %err, path = %config.session.path, "failed to open persistent session storage, downgrading to in-memory");
            }
        }
    }
    Arc::new(InMemorySessionStore::new())
}

fn build_extractor() -> Arc<dyn EntityExtractor> {
    let ner = NerEntityExtractor::new(Arc::new(RuleBasedNerTagger::new()));
    Arc::new(HybridEntityExtractor::new(Some(ner), ExtractionContext::default()))
}

fn build_reranker(config: &TribalConfig) -> TribalResult<Arc<dyn Reranker>> {
    // No cross-encoder model is fetchable from a Rust build; "cross-encoder"
    // and "auto" both degrade exactly as `create_reranker` already defines.
    let reranker = create_reranker(&config.retrieval.rerank_mode, None)
        .map_err(|e| TribalError::configuration(e.to_string()))?;
    Ok(Arc::from(reranker))
}

/// Builds a fully-wired `MemoryService` from validated configuration.
pub struct ServiceBuilder {
    config: TribalConfig,
}

impl ServiceBuilder {
    pub fn new(config: TribalConfig) -> Self {
        Self { config }
    }

    pub fn build(self) -> TribalResult<MemoryService> {
        self.config.validate()?;

        let embedder: Arc<dyn tribal_core::traits::EmbeddingProvider> = create_provider(&self.config.embedding).into();
        let (vector_store, bm25_store, graph_store) = open_storage(&self.config);
        let session_store = open_session_store(&self.config);
        let extractor = build_extractor();
        let reranker = build_reranker(&self.config)?;
        let session_chunker = Arc::new(SessionChunker::new(session_store.clone(), embedder.clone()));

        Ok(MemoryService::new(
            self.config,
            embedder,
            vector_store,
            bm25_store,
            graph_store,
            extractor,
            reranker,
            session_chunker,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_an_in_memory_service() {
        let service = ServiceBuilder::new(TribalConfig::default()).build();
        assert!(service.is_ok());
    }

    #[test]
    fn invalid_config_is_rejected_before_any_store_opens() {
        let mut config = TribalConfig::default();
        config.instance_id = "   ".to_string();
        assert!(ServiceBuilder::new(config).build().is_err());
    }

    #[test]
    fn unreadable_sqlite_path_downgrades_to_in_memory_instead_of_failing() {
        let mut config = TribalConfig::default();
        config.storage.provider = "sqlite".to_string();
        config.storage.path = "/nonexistent-directory-xyz/tribal.db".to_string();
        let service = ServiceBuilder::new(config).build();
        assert!(service.is_ok());
    }
}
