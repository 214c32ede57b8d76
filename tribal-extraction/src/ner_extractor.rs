//! Entities from an external NLU tagger: people, places, organizations,
//! dates, events, products. Emits no relationships — the tagger doesn't
//! produce them.

use std::collections::HashSet;
use std::sync::Arc;

use tribal_core::model::{Entity, EntityType, Relationship};
use tribal_core::traits::EntityExtractor;

use crate::ner_postprocess::{classify_person, strip_person_title, PersonVerdict};
use crate::ner_tagger::{NerLabel, NerTagger};
use crate::validator::validate_entity;

fn label_to_entity_type(label: NerLabel) -> EntityType {
    match label {
        NerLabel::Person => EntityType::Person,
        NerLabel::Place => EntityType::Place,
        NerLabel::Organization => EntityType::Organization,
        NerLabel::Date => EntityType::Date,
        NerLabel::Event => EntityType::Event,
        NerLabel::Product => EntityType::Product,
    }
}

pub struct NerEntityExtractor {
    tagger: Arc<dyn NerTagger>,
}

impl NerEntityExtractor {
    pub fn new(tagger: Arc<dyn NerTagger>) -> Self {
        Self { tagger }
    }
}

impl EntityExtractor for NerEntityExtractor {
    fn extract(&self, text: &str) -> Vec<Entity> {
        if text.trim().is_empty() {
            return vec![];
        }

        let mut entities = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for span in self.tagger.tag(text) {
            let (name, entity_type) = if span.label == NerLabel::Person {
                let stripped = strip_person_title(&span.text);
                match classify_person(&stripped) {
                    PersonVerdict::Reject => continue,
                    PersonVerdict::Keep => (stripped, EntityType::Person),
                    PersonVerdict::ReclassifyAsProduct => (stripped, EntityType::Product),
                }
            } else {
                (span.text.clone(), label_to_entity_type(span.label))
            };

            let key = name.to_lowercase();
            if seen.contains(&key) {
                continue;
            }

            let entity = Entity { name, entity_type, metadata: serde_json::Value::Null };
            if validate_entity(&entity) {
                seen.insert(key);
                entities.push(entity);
            }
        }

        entities
    }

    fn extract_with_relationships(&self, text: &str) -> (Vec<Entity>, Vec<Relationship>) {
        (self.extract(text), vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ner_tagger::NerSpan;

    struct FixedTagger {
        spans: Vec<NerSpan>,
    }
    impl NerTagger for FixedTagger {
        fn tag(&self, _text: &str) -> Vec<NerSpan> {
            self.spans.clone()
        }
    }

    #[test]
    fn empty_text_short_circuits_without_calling_the_tagger() {
        let tagger = Arc::new(FixedTagger {
            spans: vec![NerSpan { text: "Sarah".into(), label: NerLabel::Person }],
        });
        let extractor = NerEntityExtractor::new(tagger);
        assert!(extractor.extract("   ").is_empty());
    }

    #[test]
    fn person_title_is_stripped() {
        let tagger = Arc::new(FixedTagger {
            spans: vec![NerSpan { text: "Dr. Thompson".into(), label: NerLabel::Person }],
        });
        let extractor = NerEntityExtractor::new(tagger);
        let entities = extractor.extract("text");
        assert_eq!(entities[0].name, "Thompson");
        assert_eq!(entities[0].entity_type, EntityType::Person);
    }

    #[test]
    fn product_model_number_person_span_is_rejected() {
        let tagger = Arc::new(FixedTagger {
            spans: vec![NerSpan { text: "Model3".into(), label: NerLabel::Person }],
        });
        let extractor = NerEntityExtractor::new(tagger);
        assert!(extractor.extract("text").is_empty());
    }

    #[test]
    fn brand_mention_person_span_is_reclassified_as_product() {
        let tagger = Arc::new(FixedTagger {
            spans: vec![NerSpan { text: "iPhone 15 Pro".into(), label: NerLabel::Person }],
        });
        let extractor = NerEntityExtractor::new(tagger);
        let entities = extractor.extract("text");
        assert_eq!(entities[0].entity_type, EntityType::Product);
    }

    #[test]
    fn non_person_spans_pass_through_with_mapped_type() {
        let tagger = Arc::new(FixedTagger {
            spans: vec![NerSpan { text: "Brookside".into(), label: NerLabel::Place }],
        });
        let extractor = NerEntityExtractor::new(tagger);
        let entities = extractor.extract("text");
        assert_eq!(entities[0].entity_type, EntityType::Place);
    }

    #[test]
    fn no_relationships_are_ever_emitted() {
        let tagger = Arc::new(FixedTagger {
            spans: vec![NerSpan { text: "Sarah".into(), label: NerLabel::Person }],
        });
        let extractor = NerEntityExtractor::new(tagger);
        let (_, relationships) = extractor.extract_with_relationships("text");
        assert!(relationships.is_empty());
    }

    #[test]
    fn duplicate_names_are_deduplicated_case_insensitively() {
        let tagger = Arc::new(FixedTagger {
            spans: vec![
                NerSpan { text: "Sarah".into(), label: NerLabel::Person },
                NerSpan { text: "sarah".into(), label: NerLabel::Person },
            ],
        });
        let extractor = NerEntityExtractor::new(tagger);
        assert_eq!(extractor.extract("text").len(), 1);
    }
}
