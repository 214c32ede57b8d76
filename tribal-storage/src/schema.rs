//! Idempotent schema DDL, run once under the writer lock at startup.

use rusqlite::Connection;
use tracing::info;

use tribal_core::errors::StorageError;

use crate::sqlite_err;

pub fn initialize(conn: &Connection) -> Result<(), StorageError> {
    info!("applying tribal-storage schema");
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS memories (
            id TEXT PRIMARY KEY,
            content TEXT NOT NULL,
            vector BLOB,
            dimensions INTEGER,
            source_instance TEXT NOT NULL,
            source_type TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            tags TEXT NOT NULL DEFAULT '[]',
            context TEXT,
            confidence REAL NOT NULL DEFAULT 1.0,
            supersedes TEXT,
            related_to TEXT NOT NULL DEFAULT '[]',
            deleted INTEGER NOT NULL DEFAULT 0,
            content_hash TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_memories_deleted ON memories(deleted);
        CREATE INDEX IF NOT EXISTS idx_memories_source_instance ON memories(source_instance);
        CREATE INDEX IF NOT EXISTS idx_memories_source_type ON memories(source_type);
        CREATE INDEX IF NOT EXISTS idx_memories_content_hash ON memories(content_hash);

        CREATE VIRTUAL TABLE IF NOT EXISTS memories_fts USING fts5(
            id UNINDEXED,
            content,
            tags
        );

        CREATE TABLE IF NOT EXISTS entities (
            name TEXT PRIMARY KEY,
            entity_type TEXT NOT NULL,
            metadata TEXT NOT NULL DEFAULT '{}'
        );

        CREATE TABLE IF NOT EXISTS entity_memories (
            entity_name TEXT NOT NULL REFERENCES entities(name) ON DELETE CASCADE,
            memory_id TEXT NOT NULL,
            PRIMARY KEY (entity_name, memory_id)
        );
        CREATE INDEX IF NOT EXISTS idx_entity_memories_memory ON entity_memories(memory_id);

        CREATE TABLE IF NOT EXISTS relationships (
            source_name TEXT NOT NULL,
            target_name TEXT NOT NULL,
            relation_type TEXT NOT NULL,
            metadata TEXT NOT NULL DEFAULT '{}',
            PRIMARY KEY (source_name, target_name, relation_type)
        );
        CREATE INDEX IF NOT EXISTS idx_relationships_source ON relationships(source_name);
        CREATE INDEX IF NOT EXISTS idx_relationships_target ON relationships(target_name);

        CREATE TABLE IF NOT EXISTS relationship_memories (
            source_name TEXT NOT NULL,
            target_name TEXT NOT NULL,
            relation_type TEXT NOT NULL,
            memory_id TEXT NOT NULL,
            PRIMARY KEY (source_name, target_name, relation_type, memory_id)
        );
        CREATE INDEX IF NOT EXISTS idx_relationship_memories_memory ON relationship_memories(memory_id);

        CREATE TABLE IF NOT EXISTS temporal_facts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            memory_id TEXT NOT NULL,
            subject TEXT NOT NULL,
            relation TEXT NOT NULL,
            resolved_date TEXT NOT NULL,
            original_expression TEXT NOT NULL,
            precision TEXT NOT NULL,
            confidence REAL NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_temporal_facts_memory ON temporal_facts(memory_id);
        CREATE INDEX IF NOT EXISTS idx_temporal_facts_date ON temporal_facts(resolved_date);

        CREATE TABLE IF NOT EXISTS session_chunks (
            chunk_id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL,
            instance_id TEXT NOT NULL,
            content TEXT NOT NULL,
            vector BLOB,
            dimensions INTEGER,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            chunk_index INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_session_chunks_session ON session_chunks(session_id);
        CREATE INDEX IF NOT EXISTS idx_session_chunks_end_time ON session_chunks(end_time);
        ",
    )
    .map_err(sqlite_err)?;
    Ok(())
}
