//! # tribal-embeddings
//!
//! The `EmbeddingProvider` implementations: a remote HTTP provider, a
//! local in-process provider, and a deterministic mock used by tests and
//! the default configuration. Retry/backoff and byte-budget truncation
//! live here, shared by any provider that talks over the network.

pub mod providers;
pub mod retry;
pub mod truncate;

pub use providers::{create_provider, LocalProvider, MockProvider, RemoteProvider};
