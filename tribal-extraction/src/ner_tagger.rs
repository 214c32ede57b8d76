//! The seam between `NerEntityExtractor` and whatever natural-language
//! tagger a deployment wires in. No in-process NER model ships here;
//! callers with spaCy, a hosted NER endpoint, or similar implement
//! `NerTagger` directly. [`RuleBasedNerTagger`] is the deterministic
//! fallback used when nothing richer is configured.

use std::sync::OnceLock;

use regex::Regex;

/// The entity types an NER tagger is expected to recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NerLabel {
    Person,
    Place,
    Organization,
    Date,
    Event,
    Product,
}

#[derive(Debug, Clone)]
pub struct NerSpan {
    pub text: String,
    pub label: NerLabel,
}

pub trait NerTagger: Send + Sync {
    fn tag(&self, text: &str) -> Vec<NerSpan>;
}

fn org_suffix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b([A-Z][\w&]*(?:\s+[A-Z][\w&]*)*\s+(?:Inc|Corp|LLC|Ltd|Co)\.?)\b").unwrap()
    })
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)\b((?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2}(?:st|nd|rd|th)?(?:,\s*\d{4})?|\d{4}-\d{2}-\d{2})\b",
        )
        .unwrap()
    })
}

fn proper_noun_run_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+){1,3})\b").unwrap())
}

/// Capitalization and suffix heuristics only, no statistical model.
/// Organizations and dates are matched first since they overlap with the
/// generic proper-noun pattern; whatever's left is tagged `Person`.
#[derive(Debug, Default)]
pub struct RuleBasedNerTagger;

impl RuleBasedNerTagger {
    pub fn new() -> Self {
        Self
    }
}

impl NerTagger for RuleBasedNerTagger {
    fn tag(&self, text: &str) -> Vec<NerSpan> {
        let mut spans = Vec::new();
        let mut claimed: Vec<(usize, usize)> = Vec::new();

        for capture in org_suffix_pattern().captures_iter(text) {
            let m = capture.get(1).unwrap();
            claimed.push((m.start(), m.end()));
            spans.push(NerSpan { text: m.as_str().to_string(), label: NerLabel::Organization });
        }

        for capture in date_pattern().captures_iter(text) {
            let m = capture.get(1).unwrap();
            claimed.push((m.start(), m.end()));
            spans.push(NerSpan { text: m.as_str().to_string(), label: NerLabel::Date });
        }

        for capture in proper_noun_run_pattern().captures_iter(text) {
            let m = capture.get(1).unwrap();
            let overlaps = claimed.iter().any(|&(s, e)| m.start() < e && s < m.end());
            if !overlaps {
                spans.push(NerSpan { text: m.as_str().to_string(), label: NerLabel::Person });
            }
        }

        spans
    }
}
