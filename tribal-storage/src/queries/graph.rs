//! Persistent `GraphStore` implementation: entities, relationships, and
//! temporal facts over a handful of indexed tables, with a bounded BFS for
//! `find_connected`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection};

use tribal_core::constants::MAX_HOP_ITERATIONS;
use tribal_core::errors::StorageError;
use tribal_core::model::{DatePrecision, Entity, Relationship, TemporalFact};
use tribal_core::traits::GraphStore;

use crate::conversions::{
    entity_type_from_str, entity_type_to_str, precision_from_str, precision_to_str,
    relation_type_from_str, relation_type_to_str, temporal_relation_from_str,
    temporal_relation_to_str,
};
use crate::sqlite_err;
use crate::sqlite_store::SqliteStore;

fn infer_entity_type_for_unknown() -> tribal_core::model::EntityType {
    tribal_core::model::EntityType::Concept
}

impl GraphStore for SqliteStore {
    fn add_entity(&self, entity: &Entity, memory_id: &str) -> Result<(), StorageError> {
        let key = entity.identity_key();
        self.with_writer(|conn| {
            conn.execute(
                "INSERT INTO entities (name, entity_type, metadata)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(name) DO UPDATE SET metadata = excluded.metadata",
                params![
                    key,
                    entity_type_to_str(entity.entity_type),
                    entity.metadata.to_string()
                ],
            )
            .map_err(sqlite_err)?;
            conn.execute(
                "INSERT OR IGNORE INTO entity_memories (entity_name, memory_id) VALUES (?1, ?2)",
                params![key, memory_id],
            )
            .map_err(sqlite_err)?;
            Ok(())
        })
    }

    fn add_relationship(&self, rel: &Relationship, memory_id: &str) -> Result<(), StorageError> {
        let source_key = rel.source_name.to_lowercase();
        let target_key = rel.target_name.to_lowercase();
        self.with_writer(|conn| {
            for key in [&source_key, &target_key] {
                conn.execute(
                    "INSERT OR IGNORE INTO entities (name, entity_type, metadata) VALUES (?1, ?2, '{}')",
                    params![key, entity_type_to_str(infer_entity_type_for_unknown())],
                )
                .map_err(sqlite_err)?;
            }
            conn.execute(
                "INSERT INTO relationships (source_name, target_name, relation_type, metadata)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(source_name, target_name, relation_type) DO UPDATE SET
                    metadata = excluded.metadata",
                params![
                    source_key,
                    target_key,
                    relation_type_to_str(rel.relation_type),
                    rel.metadata.to_string()
                ],
            )
            .map_err(sqlite_err)?;
            conn.execute(
                "INSERT OR IGNORE INTO relationship_memories
                    (source_name, target_name, relation_type, memory_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    source_key,
                    target_key,
                    relation_type_to_str(rel.relation_type),
                    memory_id
                ],
            )
            .map_err(sqlite_err)?;
            Ok(())
        })
    }

    fn get_entities_for_memory(&self, memory_id: &str) -> Result<Vec<Entity>, StorageError> {
        self.with_reader(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT e.name, e.entity_type, e.metadata FROM entities e
                     JOIN entity_memories em ON em.entity_name = e.name
                     WHERE em.memory_id = ?1",
                )
                .map_err(sqlite_err)?;
            let rows = stmt
                .query_map(params![memory_id], row_to_entity)
                .map_err(sqlite_err)?;
            let mut out = Vec::new();
            for r in rows {
                out.push(r.map_err(sqlite_err)?);
            }
            Ok(out)
        })
    }

    fn get_memories_for_entity(&self, name: &str) -> Result<Vec<String>, StorageError> {
        let key = name.to_lowercase();
        self.with_reader(|conn| {
            let mut stmt = conn
                .prepare("SELECT memory_id FROM entity_memories WHERE entity_name = ?1")
                .map_err(sqlite_err)?;
            let rows = stmt
                .query_map(params![key], |r| r.get::<_, String>(0))
                .map_err(sqlite_err)?;
            let mut out = Vec::new();
            for r in rows {
                out.push(r.map_err(sqlite_err)?);
            }
            Ok(out)
        })
    }

    fn get_relationships_for_entity(&self, name: &str) -> Result<Vec<Relationship>, StorageError> {
        let key = name.to_lowercase();
        self.with_reader(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT source_name, target_name, relation_type, metadata FROM relationships
                     WHERE source_name = ?1",
                )
                .map_err(sqlite_err)?;
            let rows = stmt
                .query_map(params![key], row_to_relationship)
                .map_err(sqlite_err)?;
            let mut out = Vec::new();
            for r in rows {
                out.push(r.map_err(sqlite_err)?);
            }
            Ok(out)
        })
    }

    fn find_connected(
        &self,
        name: &str,
        hops: usize,
        include_source: bool,
    ) -> Result<Vec<Entity>, StorageError> {
        let start = name.to_lowercase();
        let bounded_hops = hops.min(MAX_HOP_ITERATIONS);

        self.with_reader(|conn| {
            let mut visited: HashSet<String> = HashSet::new();
            visited.insert(start.clone());
            let mut frontier: Vec<String> = vec![start.clone()];

            for _ in 0..bounded_hops {
                if frontier.is_empty() {
                    break;
                }
                let next = expand_frontier(conn, &frontier)?;
                frontier = next
                    .into_iter()
                    .filter(|n| visited.insert(n.clone()))
                    .collect();
            }

            if !include_source {
                visited.remove(&start);
            }

            if visited.is_empty() {
                return Ok(vec![]);
            }

            let names: Vec<String> = visited.into_iter().collect();
            let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{i}")).collect();
            let sql = format!(
                "SELECT name, entity_type, metadata FROM entities WHERE name IN ({})",
                placeholders.join(",")
            );
            let mut stmt = conn.prepare(&sql).map_err(sqlite_err)?;
            let rows = stmt
                .query_map(params_from_iter(names.iter()), row_to_entity)
                .map_err(sqlite_err)?;
            let mut out = Vec::new();
            for r in rows {
                out.push(r.map_err(sqlite_err)?);
            }
            Ok(out)
        })
    }

    fn delete_memory(&self, memory_id: &str) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute(
                "DELETE FROM entity_memories WHERE memory_id = ?1",
                params![memory_id],
            )
            .map_err(sqlite_err)?;
            conn.execute(
                "DELETE FROM relationship_memories WHERE memory_id = ?1",
                params![memory_id],
            )
            .map_err(sqlite_err)?;
            conn.execute(
                "DELETE FROM relationships
                 WHERE NOT EXISTS (
                    SELECT 1 FROM relationship_memories rm
                    WHERE rm.source_name = relationships.source_name
                      AND rm.target_name = relationships.target_name
                      AND rm.relation_type = relationships.relation_type
                 )",
                [],
            )
            .map_err(sqlite_err)?;
            conn.execute(
                "DELETE FROM entities
                 WHERE NOT EXISTS (SELECT 1 FROM entity_memories em WHERE em.entity_name = entities.name)
                   AND NOT EXISTS (SELECT 1 FROM relationships r WHERE r.source_name = entities.name OR r.target_name = entities.name)",
                [],
            )
            .map_err(sqlite_err)?;
            Ok(())
        })
    }

    fn add_temporal_fact(&self, fact: &TemporalFact, memory_id: &str) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute(
                "INSERT INTO temporal_facts
                    (memory_id, subject, relation, resolved_date, original_expression, precision, confidence)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    memory_id,
                    fact.subject,
                    temporal_relation_to_str(fact.relation),
                    fact.resolved_date,
                    fact.original_expression,
                    precision_to_str(fact.precision),
                    fact.confidence.value()
                ],
            )
            .map_err(sqlite_err)?;
            Ok(())
        })
    }

    fn get_temporal_facts_for_memory(
        &self,
        memory_id: &str,
    ) -> Result<Vec<TemporalFact>, StorageError> {
        self.with_reader(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT subject, relation, resolved_date, original_expression, precision, confidence
                     FROM temporal_facts WHERE memory_id = ?1",
                )
                .map_err(sqlite_err)?;
            let rows = stmt
                .query_map(params![memory_id], row_to_temporal_fact)
                .map_err(sqlite_err)?;
            let mut out = Vec::new();
            for r in rows {
                out.push(r.map_err(sqlite_err)?);
            }
            Ok(out)
        })
    }

    fn get_memories_for_date(&self, date_prefix: &str) -> Result<Vec<String>, StorageError> {
        let pattern = format!("{date_prefix}%");
        self.with_reader(|conn| {
            let mut stmt = conn
                .prepare("SELECT DISTINCT memory_id FROM temporal_facts WHERE resolved_date LIKE ?1")
                .map_err(sqlite_err)?;
            let rows = stmt
                .query_map(params![pattern], |r| r.get::<_, String>(0))
                .map_err(sqlite_err)?;
            let mut out = Vec::new();
            for r in rows {
                out.push(r.map_err(sqlite_err)?);
            }
            Ok(out)
        })
    }

    fn get_memories_in_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<String>, StorageError> {
        let start_str = start.format("%Y-%m-%d").to_string();
        let end_str = end.format("%Y-%m-%d").to_string();
        self.with_reader(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT DISTINCT memory_id FROM temporal_facts
                     WHERE resolved_date >= ?1 AND resolved_date <= ?2",
                )
                .map_err(sqlite_err)?;
            let rows = stmt
                .query_map(params![start_str, end_str], |r| r.get::<_, String>(0))
                .map_err(sqlite_err)?;
            let mut out = Vec::new();
            for r in rows {
                out.push(r.map_err(sqlite_err)?);
            }
            Ok(out)
        })
    }
}

fn expand_frontier(conn: &Connection, frontier: &[String]) -> Result<Vec<String>, StorageError> {
    let placeholders: Vec<String> = (1..=frontier.len()).map(|i| format!("?{i}")).collect();
    let in_list = placeholders.join(",");
    let sql = format!(
        "SELECT target_name FROM relationships WHERE source_name IN ({in_list})
         UNION
         SELECT source_name FROM relationships WHERE target_name IN ({in_list})"
    );
    // The IN-list appears twice; bind the frontier values twice in order.
    let mut bound: Vec<String> = Vec::with_capacity(frontier.len() * 2);
    bound.extend(frontier.iter().cloned());
    bound.extend(frontier.iter().cloned());

    let mut stmt = conn.prepare(&sql).map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params_from_iter(bound.iter()), |r| r.get::<_, String>(0))
        .map_err(sqlite_err)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(sqlite_err)?);
    }
    Ok(out)
}

fn row_to_entity(row: &rusqlite::Row) -> rusqlite::Result<Entity> {
    let name: String = row.get(0)?;
    let entity_type_str: String = row.get(1)?;
    let metadata_str: String = row.get(2)?;
    Ok(Entity {
        name,
        entity_type: entity_type_from_str(&entity_type_str),
        metadata: serde_json::from_str(&metadata_str).unwrap_or(serde_json::Value::Null),
    })
}

fn row_to_relationship(row: &rusqlite::Row) -> rusqlite::Result<Relationship> {
    let source_name: String = row.get(0)?;
    let target_name: String = row.get(1)?;
    let relation_type_str: String = row.get(2)?;
    let metadata_str: String = row.get(3)?;
    Ok(Relationship {
        source_name,
        target_name,
        relation_type: relation_type_from_str(&relation_type_str)
            .unwrap_or(tribal_core::model::RelationType::Uses),
        metadata: serde_json::from_str(&metadata_str).unwrap_or(serde_json::Value::Null),
    })
}

fn row_to_temporal_fact(row: &rusqlite::Row) -> rusqlite::Result<TemporalFact> {
    let subject: String = row.get(0)?;
    let relation_str: String = row.get(1)?;
    let resolved_date: String = row.get(2)?;
    let original_expression: String = row.get(3)?;
    let precision_str: String = row.get(4)?;
    let confidence: f64 = row.get(5)?;
    Ok(TemporalFact {
        subject,
        relation: temporal_relation_from_str(&relation_str),
        resolved_date,
        original_expression,
        precision: precision_from_str(&precision_str),
        confidence: confidence.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tribal_core::model::{EntityType, RelationType};

    fn new_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn entity(name: &str, ty: EntityType) -> Entity {
        Entity {
            name: name.to_string(),
            entity_type: ty,
            metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn add_entity_then_get_for_memory() {
        let store = new_store();
        store.add_entity(&entity("auth-service", EntityType::Service), "m1").unwrap();
        let found = store.get_entities_for_memory("m1").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "auth-service");
    }

    #[test]
    fn find_connected_zero_hops_returns_empty_without_source() {
        let store = new_store();
        let rel = Relationship {
            source_name: "auth-service".into(),
            target_name: "postgresql".into(),
            relation_type: RelationType::Uses,
            metadata: serde_json::Value::Null,
        };
        store.add_relationship(&rel, "m1").unwrap();
        let found = store.find_connected("auth-service", 0, false).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn find_connected_one_hop_returns_neighbor() {
        let store = new_store();
        let rel = Relationship {
            source_name: "auth-service".into(),
            target_name: "postgresql".into(),
            relation_type: RelationType::Uses,
            metadata: serde_json::Value::Null,
        };
        store.add_relationship(&rel, "m1").unwrap();
        let found = store.find_connected("auth-service", 1, false).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "postgresql");
    }

    #[test]
    fn delete_memory_prunes_orphan_entities() {
        let store = new_store();
        store.add_entity(&entity("solo", EntityType::Concept), "m1").unwrap();
        store.delete_memory("m1").unwrap();
        assert!(store.get_entities_for_memory("m1").unwrap().is_empty());
        assert!(store.get_memories_for_entity("solo").unwrap().is_empty());
    }

    #[test]
    fn temporal_facts_round_trip() {
        let store = new_store();
        let fact = TemporalFact {
            subject: "launch".into(),
            relation: tribal_core::model::TemporalRelationKind::OccurredOn,
            resolved_date: "2026-01-15".into(),
            original_expression: "last January".into(),
            precision: DatePrecision::Day,
            confidence: 0.9.into(),
        };
        store.add_temporal_fact(&fact, "m1").unwrap();
        let found = store.get_temporal_facts_for_memory("m1").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].resolved_date, "2026-01-15");
    }

    #[test]
    fn get_memories_for_date_prefix_matches() {
        let store = new_store();
        let fact = TemporalFact {
            subject: "launch".into(),
            relation: tribal_core::model::TemporalRelationKind::OccurredOn,
            resolved_date: "2026-01-15".into(),
            original_expression: "last January".into(),
            precision: DatePrecision::Day,
            confidence: 0.9.into(),
        };
        store.add_temporal_fact(&fact, "m1").unwrap();
        let found = store.get_memories_for_date("2026-01").unwrap();
        assert_eq!(found, vec!["m1".to_string()]);
    }
}
