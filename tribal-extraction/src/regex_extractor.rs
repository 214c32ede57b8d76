//! Pattern-based extraction for software-architecture terms: kebab-case
//! service names, a closed technology vocabulary, and verb-phrase
//! relationship patterns between them.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use tribal_core::model::{Entity, EntityType, RelationType, Relationship};
use tribal_core::traits::EntityExtractor;

use crate::validator::{validate_entity, validate_relationship};

fn service_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)\b([a-z][a-z0-9]*-(?:[a-z0-9]+-)*(?:service|api|worker|db|cache|server|client|gateway|proxy|database)|[a-z][a-z0-9]*(?:-[a-z0-9]+){2,}|[a-z][a-z0-9]*-[a-z0-9]{4,})\b",
        )
        .expect("static service pattern is valid")
    })
}

fn technologies() -> &'static HashSet<&'static str> {
    static TECH: OnceLock<HashSet<&'static str>> = OnceLock::new();
    TECH.get_or_init(|| {
        [
            "postgresql", "postgres", "mysql", "mongodb", "redis", "memcached", "elasticsearch",
            "kafka", "rabbitmq", "nginx", "docker", "kubernetes", "aws", "gcp", "azure",
            "terraform", "ansible", "jenkins", "github", "python", "javascript", "typescript",
            "rust", "go", "java", "node", "react", "vue", "angular", "django", "flask", "fastapi",
            "express", "graphql", "rest", "grpc", "websocket", "http", "https", "sqlite",
            "lancedb", "chromadb", "pinecone", "weaviate", "openai", "anthropic", "ollama",
            "huggingface", "pgbouncer", "haproxy", "traefik", "envoy",
        ]
        .into_iter()
        .collect()
    })
}

struct RelationPattern {
    regex_fn: fn() -> &'static Regex,
    relation_type: RelationType,
}

macro_rules! relation_pattern {
    ($name:ident, $re:literal) => {
        fn $name() -> &'static Regex {
            static PATTERN: OnceLock<Regex> = OnceLock::new();
            PATTERN.get_or_init(|| Regex::new($re).expect("static relationship pattern is valid"))
        }
    };
}

relation_pattern!(pattern_uses, r"(?i)(\S+)\s+uses\s+(\S+)");
relation_pattern!(pattern_connects_to, r"(?i)(\S+)\s+connects?\s+to\s+(\S+)");
relation_pattern!(pattern_stores_in, r"(?i)(\S+)\s+stores?\s+(?:data\s+)?in\s+(\S+)");
relation_pattern!(pattern_depends_on, r"(?i)(\S+)\s+depends?\s+on\s+(\S+)");
relation_pattern!(pattern_talks_to, r"(?i)(\S+)\s+talks?\s+to\s+(\S+)");
relation_pattern!(pattern_calls, r"(?i)(\S+)\s+calls?\s+(\S+)");
relation_pattern!(pattern_handles, r"(?i)(\S+)\s+handles?\s+(\S+)");

fn relationship_patterns() -> &'static [RelationPattern] {
    static PATTERNS: OnceLock<Vec<RelationPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            RelationPattern { regex_fn: pattern_uses, relation_type: RelationType::Uses },
            RelationPattern { regex_fn: pattern_connects_to, relation_type: RelationType::ConnectsTo },
            RelationPattern { regex_fn: pattern_stores_in, relation_type: RelationType::StoresIn },
            RelationPattern { regex_fn: pattern_depends_on, relation_type: RelationType::DependsOn },
            RelationPattern { regex_fn: pattern_talks_to, relation_type: RelationType::ConnectsTo },
            RelationPattern { regex_fn: pattern_calls, relation_type: RelationType::Calls },
            RelationPattern { regex_fn: pattern_handles, relation_type: RelationType::Handles },
        ]
    })
}

fn infer_service_type(name: &str) -> EntityType {
    let lower = name.to_lowercase();
    if lower.contains("-db") || lower.contains("-database") {
        EntityType::Database
    } else if lower.contains("-api") || lower.contains("-service") {
        EntityType::Service
    } else if lower.contains("-worker") || lower.contains("-job") {
        EntityType::Worker
    } else if lower.contains("-cache") {
        EntityType::Cache
    } else if lower.contains("-gateway") || lower.contains("-proxy") {
        EntityType::Gateway
    } else if lower.contains("-server") {
        EntityType::Server
    } else if lower.contains("-client") {
        EntityType::Client
    } else {
        EntityType::Service
    }
}

fn infer_type(name: &str) -> EntityType {
    if technologies().contains(name.to_lowercase().as_str()) {
        EntityType::Technology
    } else if service_pattern().is_match(name) {
        infer_service_type(name)
    } else {
        EntityType::Concept
    }
}

fn looks_like_entity(name: &str) -> bool {
    if name.chars().count() < tribal_core::constants::MIN_ENTITY_NAME_LENGTH {
        return false;
    }
    if technologies().contains(name.to_lowercase().as_str()) {
        return true;
    }
    if service_pattern().is_match(name) {
        return true;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => name.chars().all(|c| c.is_alphanumeric()),
        _ => false,
    }
}

/// Recognizes kebab-case service names and a closed technology vocabulary;
/// relationship extraction requires both endpoints to independently pass
/// the entity validator.
#[derive(Debug, Default)]
pub struct RegexEntityExtractor;

impl RegexEntityExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_raw(&self, text: &str) -> Vec<Entity> {
        if text.trim().is_empty() {
            return vec![];
        }

        let mut entities = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for capture in service_pattern().captures_iter(text) {
            let name = capture.get(1).unwrap().as_str();
            let key = name.to_lowercase();
            if name.chars().count() >= tribal_core::constants::MIN_ENTITY_NAME_LENGTH && !seen.contains(&key) {
                seen.insert(key);
                entities.push(Entity {
                    name: name.to_string(),
                    entity_type: infer_service_type(name),
                    metadata: serde_json::Value::Null,
                });
            }
        }

        let word_pattern = {
            static WORDS: OnceLock<Regex> = OnceLock::new();
            WORDS.get_or_init(|| Regex::new(r"\b\w+\b").unwrap())
        };
        for word_match in word_pattern.find_iter(text) {
            let word = word_match.as_str();
            let lower = word.to_lowercase();
            if technologies().contains(lower.as_str()) && !seen.contains(&lower) {
                seen.insert(lower);
                entities.push(Entity {
                    name: word.to_string(),
                    entity_type: EntityType::Technology,
                    metadata: serde_json::Value::Null,
                });
            }
        }

        entities
    }
}

impl EntityExtractor for RegexEntityExtractor {
    fn extract(&self, text: &str) -> Vec<Entity> {
        self.extract_raw(text).into_iter().filter(validate_entity).collect()
    }

    fn extract_with_relationships(&self, text: &str) -> (Vec<Entity>, Vec<Relationship>) {
        let mut entities = self.extract_raw(text);
        let mut entity_names: HashSet<String> = entities.iter().map(|e| e.name.to_lowercase()).collect();
        let mut relationships = Vec::new();

        for pattern in relationship_patterns() {
            let regex = (pattern.regex_fn)();
            for capture in regex.captures_iter(text) {
                let source_raw = capture.get(1).unwrap().as_str().trim_matches(['.', ',', ';', ':']);
                let target_raw = capture.get(2).unwrap().as_str().trim_matches(['.', ',', ';', ':']);

                let source_known = entity_names.contains(&source_raw.to_lowercase());
                let target_known = entity_names.contains(&target_raw.to_lowercase());
                let source_valid = source_known || looks_like_entity(source_raw);
                let target_valid = target_known || looks_like_entity(target_raw);

                if !(source_valid && target_valid) {
                    continue;
                }

                let source_entity = Entity {
                    name: source_raw.to_string(),
                    entity_type: infer_type(source_raw),
                    metadata: serde_json::Value::Null,
                };
                let target_entity = Entity {
                    name: target_raw.to_string(),
                    entity_type: infer_type(target_raw),
                    metadata: serde_json::Value::Null,
                };

                if !validate_relationship(&source_entity, &target_entity) {
                    continue;
                }

                relationships.push(Relationship {
                    source_name: source_raw.to_string(),
                    target_name: target_raw.to_string(),
                    relation_type: pattern.relation_type,
                    metadata: serde_json::Value::Null,
                });

                if !source_known {
                    entity_names.insert(source_raw.to_lowercase());
                    entities.push(source_entity);
                }
                if !target_known {
                    entity_names.insert(target_raw.to_lowercase());
                    entities.push(target_entity);
                }
            }
        }

        let entities = entities.into_iter().filter(validate_entity).collect();
        (entities, relationships)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_nothing() {
        let extractor = RegexEntityExtractor::new();
        assert!(extractor.extract("").is_empty());
        assert!(extractor.extract("   ").is_empty());
    }

    #[test]
    fn recognizes_kebab_case_service_name() {
        let extractor = RegexEntityExtractor::new();
        let entities = extractor.extract("the auth-service is down again");
        assert!(entities.iter().any(|e| e.name == "auth-service" && e.entity_type == EntityType::Service));
    }

    #[test]
    fn recognizes_known_technology_preserving_case() {
        let extractor = RegexEntityExtractor::new();
        let entities = extractor.extract("we migrated from MySQL to PostgreSQL last week");
        assert!(entities.iter().any(|e| e.name == "MySQL"));
        assert!(entities.iter().any(|e| e.name == "PostgreSQL"));
    }

    #[test]
    fn relationship_requires_both_endpoints_to_validate() {
        let extractor = RegexEntityExtractor::new();
        let (_, relationships) = extractor.extract_with_relationships("auth-service depends on postgresql");
        assert_eq!(relationships.len(), 1);
        assert_eq!(relationships[0].relation_type, RelationType::DependsOn);
        assert_eq!(relationships[0].source_name, "auth-service");
        assert_eq!(relationships[0].target_name, "postgresql");
    }

    #[test]
    fn talks_to_maps_to_connects_to() {
        let extractor = RegexEntityExtractor::new();
        let (_, relationships) = extractor.extract_with_relationships("auth-service talks to billing-api");
        assert_eq!(relationships[0].relation_type, RelationType::ConnectsTo);
    }

    #[test]
    fn relationship_with_unrecognizable_endpoint_is_dropped() {
        let extractor = RegexEntityExtractor::new();
        let (_, relationships) = extractor.extract_with_relationships("it uses it");
        assert!(relationships.is_empty());
    }

    #[test]
    fn no_relationship_emitted_without_a_verb_phrase() {
        let extractor = RegexEntityExtractor::new();
        let (entities, relationships) = extractor.extract_with_relationships("auth-service and billing-api are both services");
        assert!(!entities.is_empty());
        assert!(relationships.is_empty());
    }
}
