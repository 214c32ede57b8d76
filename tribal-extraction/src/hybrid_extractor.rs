//! Union of the regex and NER extractors with case-insensitive dedup.
//! Relationship emission is gated by `ExtractionContext`: personal
//! conversation text never yields relationships, regardless of content,
//! because the regex relationship patterns are tuned for architecture talk
//! and produce false positives on ordinary sentences.

use std::collections::HashSet;

use tribal_core::model::{Entity, Relationship};
use tribal_core::traits::EntityExtractor;

use crate::ner_extractor::NerEntityExtractor;
use crate::regex_extractor::RegexEntityExtractor;

/// The domain of the text being extracted from, set at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionContext {
    /// Everyday conversation. Entities are still extracted but no
    /// relationships are emitted.
    Personal,
    /// System architecture discussion. Relationship patterns run.
    Software,
}

impl Default for ExtractionContext {
    fn default() -> Self {
        ExtractionContext::Personal
    }
}

fn merge_entities(regex_entities: Vec<Entity>, ner_entities: Vec<Entity>) -> Vec<Entity> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();
    for entity in regex_entities.into_iter().chain(ner_entities) {
        let key = entity.name.to_lowercase();
        if seen.insert(key) {
            merged.push(entity);
        }
    }
    merged
}

pub struct HybridEntityExtractor {
    regex: RegexEntityExtractor,
    ner: Option<NerEntityExtractor>,
    context: ExtractionContext,
}

impl HybridEntityExtractor {
    pub fn new(ner: Option<NerEntityExtractor>, context: ExtractionContext) -> Self {
        Self { regex: RegexEntityExtractor::new(), ner, context }
    }
}

impl EntityExtractor for HybridEntityExtractor {
    fn extract(&self, text: &str) -> Vec<Entity> {
        let regex_entities = self.regex.extract(text);
        let ner_entities = self.ner.as_ref().map(|n| n.extract(text)).unwrap_or_default();
        let merged = merge_entities(regex_entities, ner_entities);
        tracing::debug!(count = merged.len(), "hybrid extraction found entities");
        merged
    }

    fn extract_with_relationships(&self, text: &str) -> (Vec<Entity>, Vec<Relationship>) {
        let (regex_entities, relationships) = match self.context {
            ExtractionContext::Software => self.regex.extract_with_relationships(text),
            ExtractionContext::Personal => (self.regex.extract(text), vec![]),
        };
        let ner_entities = self.ner.as_ref().map(|n| n.extract(text)).unwrap_or_default();
        let merged = merge_entities(regex_entities, ner_entities);
        tracing::debug!(
            entities = merged.len(),
            relationships = relationships.len(),
            context = ?self.context,
            "hybrid extraction complete"
        );
        (merged, relationships)
    }
}
