//! Entity and relationship validation, applied before anything reaches the
//! graph store. Every extractor routes its candidates through here.

use std::collections::HashSet;
use std::sync::OnceLock;

use tribal_core::constants::{MAX_ENTITY_NAME_LENGTH, MIN_ENTITY_NAME_LENGTH};
use tribal_core::model::{Entity, EntityType};

fn stopwords() -> &'static HashSet<&'static str> {
    static STOPWORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    STOPWORDS.get_or_init(|| {
        [
            "THE", "AND", "OR", "FOR", "BUT", "WOULD", "BEFORE", "AFTER", "WITH", "FROM", "INTO",
            "THIS", "THAT", "THESE", "THOSE", "HAVE", "HAS", "HAD", "WILL", "SHALL", "CAN",
            "COULD", "SHOULD", "MUST", "NOT", "ARE", "WAS", "WERE", "BEEN",
        ]
        .into_iter()
        .collect()
    })
}

fn common_concept_words() -> &'static HashSet<&'static str> {
    static WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    WORDS.get_or_init(|| {
        [
            "time", "day", "way", "thing", "people", "work", "life", "world", "year", "place",
            "case", "fact", "group", "problem", "idea", "area", "money", "part", "word", "point",
        ]
        .into_iter()
        .collect()
    })
}

/// Length, character-class, stopword, and common-word checks applied to
/// every candidate entity regardless of which extractor produced it.
pub fn validate_entity(entity: &Entity) -> bool {
    let name = entity.name.trim();
    let len = name.chars().count();
    if len < MIN_ENTITY_NAME_LENGTH || len > MAX_ENTITY_NAME_LENGTH {
        return false;
    }
    if name.is_empty() {
        return false;
    }
    if !name.chars().any(|c| c.is_alphabetic()) {
        return false;
    }
    if name.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if stopwords().contains(name.to_uppercase().as_str()) {
        return false;
    }
    if entity.entity_type == EntityType::Concept
        && !name.contains(char::is_whitespace)
        && common_concept_words().contains(name.to_lowercase().as_str())
    {
        return false;
    }
    true
}

/// Both endpoints must independently validate, and must differ under
/// case-insensitive comparison (an entity cannot relate to itself).
pub fn validate_relationship(source: &Entity, target: &Entity) -> bool {
    if !validate_entity(source) || !validate_entity(target) {
        return false;
    }
    source.name.to_lowercase() != target.name.to_lowercase()
}
