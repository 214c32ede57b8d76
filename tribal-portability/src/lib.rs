//! # tribal-portability
//!
//! Export memories into, and conflict-aware import from, the
//! [`tribal_core::model::PortableBundle`] wire format. Export filters by
//! tag (pushed to the store) and date range (applied in memory); import
//! resolves id collisions per a `ConflictResolution` and handles embedding
//! model mismatches per a `ReembeddingStrategy`.

mod bundle;
mod import;

pub use bundle::{export_memories, parse_bundle, serialize_bundle, ExportFilter};
pub use import::{import_bundle, ConflictResolution, ImportOptions, ImportSummary, ReembeddingStrategy};
