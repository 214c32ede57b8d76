//! Weighted hybrid merge of vector and BM25 candidate sets.

use std::collections::HashMap;

/// `final(id) = wv * V.get(id, 0) + wt * B.get(id, 0)` over the union of
/// both candidate sets, sorted by `final` descending. Neither weight may be
/// negative; `TribalConfig::validate` rejects configs where both are zero,
/// but an empty union still yields an empty merge regardless.
pub fn hybrid_merge(
    vector: &HashMap<String, f64>,
    bm25: &HashMap<String, f64>,
    vector_weight: f64,
    bm25_weight: f64,
) -> Vec<(String, f64)> {
    let mut ids: Vec<&String> = vector.keys().chain(bm25.keys()).collect();
    ids.sort();
    ids.dedup();

    let mut merged: Vec<(String, f64)> = ids
        .into_iter()
        .map(|id| {
            let v = vector.get(id).copied().unwrap_or(0.0);
            let b = bm25.get(id).copied().unwrap_or(0.0);
            (id.clone(), vector_weight * v + bm25_weight * b)
        })
        .collect();

    merged.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    merged
}
