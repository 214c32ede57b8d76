//! Capability interfaces. Embedding providers, vector stores, rerankers,
//! and entity extractors are all variant-typed behind these traits;
//! configuration selects a single implementation at startup and there is
//! no dynamic swapping in steady state.

pub mod bm25_store;
pub mod embedding;
pub mod extractor;
pub mod graph_store;
pub mod reranker;
pub mod session_store;
pub mod vector_store;

pub use bm25_store::{normalize_bm25_rank, Bm25Hit, Bm25Store};
pub use embedding::EmbeddingProvider;
pub use extractor::EntityExtractor;
pub use graph_store::GraphStore;
pub use reranker::{RerankCandidate, Reranker};
pub use session_store::{SessionSearchResult, SessionStore, SessionStoreStats};
pub use vector_store::{RecallResult, StoreFilters, StoreStats, VectorStore};
