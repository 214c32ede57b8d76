//! # tribal-storage
//!
//! SQLite-backed vector store, BM25 full-text store, entity/relationship
//! graph store, and session chunk store, plus in-memory implementations for
//! tests and small deployments. The persistent stores share one
//! `SqliteStore` engine built on a single writer connection plus a
//! round-robin read pool, matching the reader/writer split used throughout
//! this workspace's storage layer.

pub mod conversions;
pub mod memory_session_store;
pub mod memory_vector_store;
pub mod pool;
pub mod queries;
pub mod schema;
pub mod sqlite_store;

pub use memory_session_store::InMemorySessionStore;
pub use memory_vector_store::InMemoryVectorStore;
pub use sqlite_store::SqliteStore;

pub(crate) fn sqlite_err(e: rusqlite::Error) -> tribal_core::errors::StorageError {
    tribal_core::errors::StorageError::Sqlite {
        message: e.to_string(),
    }
}
