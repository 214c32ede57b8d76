//! # tribal-session
//!
//! Delta-ingests growing session transcripts into ≈400-token windows with
//! ≈50-token overlap, embeds and persists them through a
//! [`tribal_core::traits::SessionStore`]. Concrete stores (in-memory,
//! SQLite-backed) live in `tribal-storage`; this crate only depends on the
//! trait.

mod chunker;

pub use chunker::{SessionChunker, SessionMessage};
