//! # tribal-service
//!
//! The memory service facade that ties the vector store, BM25 store,
//! graph store, dedup gate, retrieval pipeline, session chunker, and
//! portability layer together behind `remember` / `recall` / `correct` /
//! `forget` / `get` / `get_stats` / `recall_entity` / `export` / `import`.
//! `ServiceBuilder`
//! constructs one from a `TribalConfig`; `get_or_init_service` exposes a
//! process-wide lazily-built singleton for callers (an MCP server, a CLI)
//! that only need one instance per process.

mod builder;
mod handle;
mod service;

pub use builder::ServiceBuilder;
pub use handle::get_or_init_service;
pub use service::{CorrectOutcome, MemoryService, RememberOutcome};
