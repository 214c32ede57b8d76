//! # tribal-core
//!
//! Foundation crate for the tribal memory system: the `MemoryEntry` data
//! model and its satellite records, the capability traits every other
//! crate implements or consumes, error types, configuration, constants,
//! and the id-shape sanitizer shared by every persistent backend.

pub mod confidence;
pub mod config;
pub mod constants;
pub mod errors;
pub mod model;
pub mod sanitize;
pub mod traits;

pub use confidence::Confidence;
pub use config::TribalConfig;
pub use errors::{TribalError, TribalResult};
pub use model::{
    BundleManifest, DatePrecision, EmbeddingMetadata, Entity, EntityType, MemoryEntry,
    PortableBundle, RelationType, Relationship, SessionChunk, SourceType, TemporalFact,
    TemporalRelationKind,
};
