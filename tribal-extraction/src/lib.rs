//! Entity and relationship extraction from memory content.
//!
//! Three extractors share [`tribal_core::traits::EntityExtractor`]:
//! [`RegexEntityExtractor`] recognizes kebab-case service names and a
//! closed technology vocabulary; [`NerEntityExtractor`] wraps an external
//! NLU tagger via the [`NerTagger`] seam; [`HybridEntityExtractor`] unions
//! both and gates relationship emission by [`ExtractionContext`].

mod hybrid_extractor;
mod ner_extractor;
mod ner_postprocess;
mod ner_tagger;
mod regex_extractor;
mod validator;

pub use hybrid_extractor::{ExtractionContext, HybridEntityExtractor};
pub use ner_extractor::NerEntityExtractor;
pub use ner_postprocess::{classify_person, strip_person_title, PersonVerdict};
pub use ner_tagger::{NerLabel, NerSpan, NerTagger, RuleBasedNerTagger};
pub use regex_extractor::RegexEntityExtractor;
pub use validator::{validate_entity, validate_relationship};
