use chrono::{DateTime, Utc};

use crate::errors::StorageError;
use crate::model::{Entity, Relationship, TemporalFact};

/// Entity and edge persistence, N-hop traversal, and temporal facts. The
/// persistent implementation opens one long-lived connection, enables
/// write-ahead logging, and protects operations with a reentrant lock;
/// schema DDL is idempotent and runs at startup under that lock.
pub trait GraphStore: Send + Sync {
    /// Upsert by name, preserving the existing type when one is already on
    /// record, and associate the entity with `memory_id`.
    fn add_entity(&self, entity: &Entity, memory_id: &str) -> Result<(), StorageError>;

    /// Upsert both endpoints (inferring types for unknown ones), upsert the
    /// triple, and associate the relationship with `memory_id`.
    fn add_relationship(&self, rel: &Relationship, memory_id: &str) -> Result<(), StorageError>;

    fn get_entities_for_memory(&self, memory_id: &str) -> Result<Vec<Entity>, StorageError>;

    fn get_memories_for_entity(&self, name: &str) -> Result<Vec<String>, StorageError>;

    /// Outgoing edges from `name`.
    fn get_relationships_for_entity(&self, name: &str) -> Result<Vec<Relationship>, StorageError>;

    /// Breadth-first traversal via undirected relationship incidence,
    /// bounded by `min(hops, MAX_HOP_ITERATIONS)`. Entity names are always
    /// passed as bound parameters, never interpolated into query text.
    fn find_connected(
        &self,
        name: &str,
        hops: usize,
        include_source: bool,
    ) -> Result<Vec<Entity>, StorageError>;

    /// Drop all associations for `memory_id`, then prune orphan
    /// relationships and orphan entities.
    fn delete_memory(&self, memory_id: &str) -> Result<(), StorageError>;

    fn add_temporal_fact(&self, fact: &TemporalFact, memory_id: &str) -> Result<(), StorageError>;

    fn get_temporal_facts_for_memory(
        &self,
        memory_id: &str,
    ) -> Result<Vec<TemporalFact>, StorageError>;

    /// Prefix match on `resolved_date`.
    fn get_memories_for_date(&self, date_prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Inclusive bounds.
    fn get_memories_in_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<String>, StorageError>;
}
