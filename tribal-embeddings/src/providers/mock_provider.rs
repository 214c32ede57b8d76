//! Deterministic, word-composition-based embeddings for tests: no network,
//! no model weights, vectors that reflect word overlap closely enough to
//! exercise similarity-dependent code paths.

use std::collections::HashMap;

use tribal_core::errors::EmbeddingError;
use tribal_core::traits::EmbeddingProvider;

use crate::truncate::truncate_to_byte_budget;

const MAX_INPUT_BYTES: usize = 8192;

pub struct MockProvider {
    dimensions: usize,
}

impl MockProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn hash_term(term: &str, dims: usize) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h as usize) % dims
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .collect()
    }

    fn word_overlap_vector(&self, text: &str) -> Vec<f32> {
        let truncated = truncate_to_byte_budget(text, MAX_INPUT_BYTES);
        let tokens = Self::tokenize(truncated);
        let mut vec = vec![0.0f32; self.dimensions];
        if tokens.is_empty() {
            return vec;
        }

        let mut tf: HashMap<String, f32> = HashMap::new();
        for tok in &tokens {
            *tf.entry(tok.clone()).or_default() += 1.0;
        }
        let total = tokens.len() as f32;

        for (term, count) in &tf {
            let bucket = Self::hash_term(term, self.dimensions);
            vec[bucket] += count / total;
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }
}

impl EmbeddingProvider for MockProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        Ok(self.word_overlap_vector(&collapsed))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        "mock-word-overlap"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_rejected() {
        let p = MockProvider::new(64);
        assert!(matches!(p.embed("   "), Err(EmbeddingError::EmptyInput)));
    }

    #[test]
    fn produces_configured_dimensions() {
        let p = MockProvider::new(384);
        let v = p.embed("hello world test").unwrap();
        assert_eq!(v.len(), 384);
    }

    #[test]
    fn output_is_unit_normalized() {
        let p = MockProvider::new(128);
        let v = p.embed("rust programming language").unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn deterministic_across_calls() {
        let p = MockProvider::new(128);
        assert_eq!(p.embed("same text").unwrap(), p.embed("same text").unwrap());
    }

    #[test]
    fn shared_words_raise_similarity_over_unrelated_text() {
        let p = MockProvider::new(256);
        let a = p.embed("the auth service uses postgresql").unwrap();
        let b = p.embed("the auth service talks to postgresql").unwrap();
        let c = p.embed("cooking pasta with tomato sauce").unwrap();
        let sim_ab = p.similarity(&a, &b);
        let sim_ac = p.similarity(&a, &c);
        assert!(sim_ab > sim_ac);
    }

    #[test]
    fn batch_matches_individual_embeds() {
        let p = MockProvider::new(64);
        let texts = vec!["alpha beta".to_string(), "gamma delta".to_string()];
        let batch = p.embed_batch(&texts).unwrap();
        for (i, text) in texts.iter().enumerate() {
            assert_eq!(batch[i], p.embed(text).unwrap());
        }
    }
}
