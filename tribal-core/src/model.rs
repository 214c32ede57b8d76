//! The canonical data model: `MemoryEntry` and the records it accumulates
//! around it (entities, relationships, temporal facts, session chunks, and
//! the portable bundle wire format).

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::confidence::Confidence;

/// How a memory entry came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    UserExplicit,
    AutoCapture,
    Correction,
    CrossInstance,
    Legacy,
    Unknown,
}

impl Default for SourceType {
    fn default() -> Self {
        SourceType::Unknown
    }
}

/// The canonical record stored by the vector store and mirrored into the
/// BM25 and graph stores. See the persistent schema in the vector store
/// module for the on-disk column layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: String,
    pub content: String,
    pub embedding: Option<Vec<f32>>,
    pub source_instance: String,
    pub source_type: SourceType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: HashSet<String>,
    pub context: Option<String>,
    pub confidence: Confidence,
    pub supersedes: Option<String>,
    pub related_to: HashSet<String>,
    #[serde(default)]
    pub deleted: bool,
}

impl MemoryEntry {
    /// Build a fresh entry. `content` is trimmed; callers must validate it
    /// is non-empty before calling this (the facade does).
    pub fn new(content: impl Into<String>, source_instance: impl Into<String>, source_type: SourceType) -> Self {
        let now = Utc::now();
        let id = uuid::Uuid::new_v4().to_string();
        Self {
            id,
            content: content.into().trim().to_string(),
            embedding: None,
            source_instance: source_instance.into(),
            source_type,
            created_at: now,
            updated_at: now,
            tags: HashSet::new(),
            context: None,
            confidence: Confidence::default(),
            supersedes: None,
            related_to: HashSet::new(),
            deleted: false,
        }
    }

    pub fn content_hash(&self) -> blake3::Hash {
        blake3::hash(self.content.trim().as_bytes())
    }
}

/// The kind of thing an extracted entity refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Service,
    Technology,
    Database,
    Worker,
    Cache,
    Gateway,
    Server,
    Client,
    Person,
    Place,
    Organization,
    Date,
    Event,
    Product,
    Concept,
}

/// A node in the entity/relationship graph. Identity is the lower-cased
/// `name` within a single graph store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub entity_type: EntityType,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Entity {
    pub fn identity_key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// The kind of relation between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    Uses,
    ConnectsTo,
    StoresIn,
    DependsOn,
    Calls,
    Handles,
}

/// An edge in the entity/relationship graph. Identity is the triple
/// `(source_name, target_name, relation_type)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub source_name: String,
    pub target_name: String,
    pub relation_type: RelationType,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// The kind of temporal relation a `TemporalFact` expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalRelationKind {
    OccurredOn,
    MentionedDate,
}

/// The precision at which a resolved date is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePrecision {
    Day,
    Month,
    Year,
}

/// A date or event reference attached to a memory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalFact {
    pub subject: String,
    pub relation: TemporalRelationKind,
    /// ISO-formatted resolved date, precision given by `precision`.
    pub resolved_date: String,
    pub original_expression: String,
    pub precision: DatePrecision,
    pub confidence: Confidence,
}

/// A window of a session transcript, chunked to a target token budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionChunk {
    pub chunk_id: String,
    pub session_id: String,
    pub instance_id: String,
    pub content: String,
    pub embedding: Option<Vec<f32>>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub chunk_index: u64,
}

/// Embedding provenance recorded in a portable bundle's manifest, used to
/// decide whether imported embeddings are compatible with the target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingMetadata {
    pub model_name: String,
    pub dimensions: usize,
    pub provider: String,
    pub created_at: DateTime<Utc>,
}

impl EmbeddingMetadata {
    /// Two metadata records are compatible when the model name and
    /// dimensions agree; provider may differ.
    pub fn compatible_with(&self, other: &EmbeddingMetadata) -> bool {
        self.model_name == other.model_name && self.dimensions == other.dimensions
    }
}

/// The manifest header of a portable bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleManifest {
    pub schema_version: String,
    pub embedding: EmbeddingMetadata,
    pub memory_count: usize,
    pub exported_at: DateTime<Utc>,
}

/// The stable wire format for export/import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortableBundle {
    pub manifest: BundleManifest,
    pub entries: Vec<MemoryEntry>,
}
