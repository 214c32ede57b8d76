//! System-wide constants shared across crates.

/// Crate version, surfaced in stats and diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default vector similarity threshold below which a dedup candidate is not
/// considered a near-duplicate.
pub const DEFAULT_NEAR_THRESHOLD: f64 = 0.90;

/// Default vector similarity threshold at or above which a dedup candidate
/// is considered an exact duplicate.
pub const DEFAULT_EXACT_THRESHOLD: f64 = 0.98;

/// Default candidate-pool multiplier applied to a caller's `limit` before
/// hybrid merge and rerank narrow it back down.
pub const DEFAULT_POOL_MULTIPLIER: usize = 4;

/// Default number of graph hops considered during graph expansion.
pub const DEFAULT_GRAPH_HOPS: usize = 2;

/// Score assigned to a candidate admitted only via graph expansion.
pub const GRAPH_2HOP_SCORE: f64 = 0.70;

/// Hard ceiling on graph BFS iterations, regardless of requested hop count.
pub const MAX_HOP_ITERATIONS: usize = 100;

/// Minimum entity name length accepted by the entity validator.
pub const MIN_ENTITY_NAME_LENGTH: usize = 3;

/// Maximum entity name length accepted by the entity validator.
pub const MAX_ENTITY_NAME_LENGTH: usize = 100;

/// Target token count per session chunk.
pub const TARGET_CHUNK_TOKENS: usize = 400;

/// Approximate words-per-token ratio used to size chunks without a real
/// tokenizer.
pub const WORDS_PER_TOKEN: f64 = 0.75;

/// Target token overlap between consecutive session chunks.
pub const OVERLAP_TOKENS: usize = 50;

/// Maximum number of messages a chunk boundary may back up by when building
/// the overlap region.
pub const MAX_OVERLAP_BACKTRACK_MESSAGES: usize = 2;

/// Default SQLite read-connection pool size for persistent stores.
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

/// Maximum SQLite read-connection pool size for persistent stores.
pub const MAX_READ_POOL_SIZE: usize = 8;

/// Regex-shape whitelist for any identifier used in a string-equality
/// filter against a persistent backend. Alphanumerics and hyphens only.
pub const ID_SHAPE_PATTERN: &str = r"^[a-zA-Z0-9\-]+$";

/// Upper bound on entries fetched from a vector store in one export pass.
pub const EXPORT_LIST_LIMIT: usize = 100_000;
