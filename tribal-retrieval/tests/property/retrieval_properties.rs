use std::collections::HashMap;

use proptest::prelude::*;
use tribal_retrieval::hybrid_merge;

proptest! {
    #[test]
    fn merged_score_never_exceeds_the_weight_sum(
        vector_score in 0.0f64..=1.0,
        bm25_score in 0.0f64..=1.0,
        vector_weight in 0.0f64..=2.0,
        bm25_weight in 0.0f64..=2.0,
    ) {
        let vector = HashMap::from([("a".to_string(), vector_score)]);
        let bm25 = HashMap::from([("a".to_string(), bm25_score)]);
        let merged = hybrid_merge(&vector, &bm25, vector_weight, bm25_weight);
        let (_, score) = &merged[0];
        prop_assert!(*score <= vector_weight + bm25_weight + 1e-9);
        prop_assert!(*score >= 0.0);
    }

    #[test]
    fn output_is_sorted_descending(
        scores in prop::collection::hash_map("[a-z]{1,6}", 0.0f64..=1.0, 1..12),
    ) {
        let empty = HashMap::new();
        let merged = hybrid_merge(&scores, &empty, 1.0, 0.0);
        for window in merged.windows(2) {
            prop_assert!(window[0].1 >= window[1].1);
        }
    }

    #[test]
    fn union_size_never_exceeds_sum_of_both_inputs(
        vector_ids in prop::collection::hash_set("[a-z]{1,4}", 0..8),
        bm25_ids in prop::collection::hash_set("[a-z]{1,4}", 0..8),
    ) {
        let vector: HashMap<String, f64> = vector_ids.iter().map(|id| (id.clone(), 0.5)).collect();
        let bm25: HashMap<String, f64> = bm25_ids.iter().map(|id| (id.clone(), 0.5)).collect();
        let merged = hybrid_merge(&vector, &bm25, 0.6, 0.4);
        prop_assert!(merged.len() <= vector.len() + bm25.len());
    }
}
