use tribal_core::config::RetrievalConfig;
use tribal_core::model::{MemoryEntry, SourceType};
use tribal_core::traits::{EmbeddingProvider, VectorStore};
use tribal_embeddings::MockProvider;
use tribal_retrieval::{retrieve, NoopReranker, RetrievalDeps, RetrievalMethod, RetrievalRequest};
use tribal_storage::{InMemoryVectorStore, SqliteStore};

fn seeded_entry(store: &dyn VectorStore, embedder: &dyn EmbeddingProvider, content: &str) -> MemoryEntry {
    let mut entry = MemoryEntry::new(content, "agent-1", SourceType::UserExplicit);
    entry.embedding = Some(embedder.embed(content).unwrap());
    store.store(entry.clone()).unwrap();
    entry
}

#[test]
fn recall_finds_the_closest_memory_by_vector_similarity() {
    let store = InMemoryVectorStore::new();
    let embedder = MockProvider::new(128);

    seeded_entry(&store, &embedder, "rust ownership and borrowing rules");
    seeded_entry(&store, &embedder, "favorite pizza toppings this week");

    let reranker = NoopReranker;
    let deps = RetrievalDeps {
        embedder: &embedder,
        vector_store: &store,
        bm25_store: None,
        graph_store: None,
        query_extractor: None,
        reranker: &reranker,
    };
    let request = RetrievalRequest {
        query: "rust borrowing".to_string(),
        limit: 5,
        min_relevance: 0.0,
        tags: vec![],
        graph_expansion: false,
    };
    let results = retrieve(&request, &RetrievalConfig::default(), &deps).unwrap();
    assert!(!results.is_empty());
    assert!(results[0].entry.content.contains("ownership"));
    assert_eq!(results[0].retrieval_method, RetrievalMethod::Vector);
}

#[test]
fn sqlite_backed_store_participates_in_the_same_pipeline() {
    let store = SqliteStore::open_in_memory().unwrap();
    let embedder = MockProvider::new(64);

    seeded_entry(&store, &embedder, "auth-service depends on postgresql");

    let reranker = NoopReranker;
    let deps = RetrievalDeps {
        embedder: &embedder,
        vector_store: &store,
        bm25_store: None,
        graph_store: None,
        query_extractor: None,
        reranker: &reranker,
    };
    let request = RetrievalRequest {
        query: "auth-service postgresql".to_string(),
        limit: 5,
        min_relevance: 0.0,
        tags: vec![],
        graph_expansion: false,
    };
    let results = retrieve(&request, &RetrievalConfig::default(), &deps).unwrap();
    assert_eq!(results.len(), 1);
}

#[test]
fn min_relevance_above_every_candidates_similarity_yields_nothing() {
    let store = InMemoryVectorStore::new();
    let embedder = MockProvider::new(32);
    seeded_entry(&store, &embedder, "unrelated content about gardening");

    let reranker = NoopReranker;
    let deps = RetrievalDeps {
        embedder: &embedder,
        vector_store: &store,
        bm25_store: None,
        graph_store: None,
        query_extractor: None,
        reranker: &reranker,
    };
    let request = RetrievalRequest {
        query: "completely different topic entirely".to_string(),
        limit: 5,
        min_relevance: 0.999,
        tags: vec![],
        graph_expansion: false,
    };
    let results = retrieve(&request, &RetrievalConfig::default(), &deps).unwrap();
    assert!(results.is_empty());
}
