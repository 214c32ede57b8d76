use crate::model::{Entity, Relationship};

/// Shared by the regex, NER, and hybrid extractors.
pub trait EntityExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Vec<Entity>;

    fn extract_with_relationships(&self, text: &str) -> (Vec<Entity>, Vec<Relationship>);
}
