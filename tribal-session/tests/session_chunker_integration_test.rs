use std::sync::Arc;

use chrono::Utc;

use tribal_embeddings::MockProvider;
use tribal_session::{SessionChunker, SessionMessage};
use tribal_storage::{InMemorySessionStore, SqliteStore};

fn long_transcript(n: usize) -> Vec<SessionMessage> {
    (0..n)
        .map(|i| SessionMessage {
            role: if i % 2 == 0 { "user".to_string() } else { "assistant".to_string() },
            content: format!("message number {i} discussing the deployment pipeline and auth service"),
            timestamp: Utc::now() + chrono::Duration::seconds(i as i64),
        })
        .collect()
}

#[test]
fn chunks_a_long_transcript_and_makes_it_searchable_against_in_memory_store() {
    let store = Arc::new(InMemorySessionStore::new());
    let embedder = Arc::new(MockProvider::new(64));
    let chunker = SessionChunker::new(store, embedder);

    let messages = long_transcript(60);
    let chunks = chunker.ingest("session-one", "agent-1", &messages).unwrap();
    assert!(chunks.len() > 1);

    let results = chunker.search("deployment pipeline", Some("session-one"), 5, 0.0).unwrap();
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.session_id == "session-one"));
}

#[test]
fn sqlite_backed_store_persists_chunks_across_searches() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let embedder = Arc::new(MockProvider::new(64));
    let chunker = SessionChunker::new(store, embedder);

    let messages = long_transcript(30);
    chunker.ingest("session-two", "agent-1", &messages).unwrap();

    let stats = chunker.get_stats().unwrap();
    assert!(stats.total_chunks > 0);
    assert_eq!(stats.distinct_sessions, 1);
}

#[test]
fn cleanup_removes_chunks_past_retention() {
    let store = Arc::new(InMemorySessionStore::new());
    let embedder = Arc::new(MockProvider::new(64));
    let chunker = SessionChunker::new(store, embedder);

    let messages = long_transcript(10);
    chunker.ingest("session-three", "agent-1", &messages).unwrap();

    let removed = chunker.cleanup(90).unwrap();
    assert_eq!(removed, 0, "fresh chunks should survive a 90-day retention window");
}
