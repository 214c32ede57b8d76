//! # tribal-dedup
//!
//! Semantic deduplication gate applied to every `remember` call unless the
//! caller opts out: exact-duplicate detection, near-duplicate search, and a
//! combined report, all driven off vector similarity alone.

pub mod service;

pub use service::{DeduplicationService, DuplicateMatch, DuplicateReport};
