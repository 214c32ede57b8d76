//! The end-to-end hybrid retrieval pipeline: embed, vector recall, BM25
//! merge, optional graph expansion, superseded filtering, rerank, truncate.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use tribal_core::config::RetrievalConfig;
use tribal_core::constants::GRAPH_2HOP_SCORE;
use tribal_core::errors::RetrievalError;
use tribal_core::model::MemoryEntry;
use tribal_core::traits::{
    normalize_bm25_rank, Bm25Store, EmbeddingProvider, EntityExtractor, GraphStore,
    RerankCandidate, Reranker, StoreFilters, VectorStore,
};

use crate::merge::hybrid_merge;

/// Below this, a raw `min_relevance` of 0 would let vector recall return
/// everything in the store; the pipeline floors it instead.
const LOW_SIMILARITY_FLOOR: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMethod {
    Vector,
    Graph,
    Hybrid,
    Entity,
}

#[derive(Debug, Clone)]
pub struct RetrievalResult {
    pub entry: MemoryEntry,
    pub score: f64,
    pub retrieval_method: RetrievalMethod,
    pub retrieval_time_ms: u64,
}

#[derive(Debug, Clone)]
pub struct RetrievalRequest {
    pub query: String,
    pub limit: usize,
    pub min_relevance: f64,
    pub tags: Vec<String>,
    pub graph_expansion: bool,
}

/// Everything the pipeline needs, assembled by the caller (the memory
/// service facade wires concrete implementations; tests wire fakes).
pub struct RetrievalDeps<'a> {
    pub embedder: &'a dyn EmbeddingProvider,
    pub vector_store: &'a dyn VectorStore,
    pub bm25_store: Option<&'a dyn Bm25Store>,
    pub graph_store: Option<&'a dyn GraphStore>,
    pub query_extractor: Option<&'a dyn EntityExtractor>,
    pub reranker: &'a dyn Reranker,
}

fn tags_pass(entry: &MemoryEntry, requested: &HashSet<String>) -> bool {
    requested.is_empty() || entry.tags.iter().any(|t| requested.contains(t))
}

pub fn retrieve(
    request: &RetrievalRequest,
    config: &RetrievalConfig,
    deps: &RetrievalDeps,
) -> Result<Vec<RetrievalResult>, RetrievalError> {
    let start = Instant::now();

    if request.limit == 0 {
        return Err(RetrievalError::InvalidParameter {
            name: "limit".to_string(),
            reason: "must be positive".to_string(),
        });
    }

    // Step 1: embed the query. Failure degrades to an empty result rather
    // than propagating — the caller already has a `recall` contract that
    // never errors on a bad embedding call.
    let query_vec = match deps.embedder.embed(&request.query) {
        Ok(v) => v,
        Err(_) => return Ok(vec![]),
    };

    let requested_tags: HashSet<String> = request.tags.iter().cloned().collect();
    let filters = StoreFilters {
        tags: request.tags.clone(),
        source_instance: None,
        source_type: None,
    };
    let pool_limit = request.limit.saturating_mul(config.pool_multiplier.max(1));
    let min_similarity = request.min_relevance.max(LOW_SIMILARITY_FLOOR);

    // Step 2: vector recall.
    let vector_hits = deps
        .vector_store
        .recall(&query_vec, pool_limit, min_similarity, &filters)
        .map_err(|e| RetrievalError::InvalidParameter {
            name: "vector_recall".to_string(),
            reason: e.to_string(),
        })?;

    let mut entries: HashMap<String, MemoryEntry> = HashMap::new();
    let mut vector_scores: HashMap<String, f64> = HashMap::new();
    for hit in vector_hits {
        vector_scores.insert(hit.entry.id.clone(), hit.similarity_score);
        entries.insert(hit.entry.id.clone(), hit.entry);
    }

    // Step 3: BM25, merged with configured weights.
    let mut bm25_scores: HashMap<String, f64> = HashMap::new();
    if let Some(bm25) = deps.bm25_store {
        if config.bm25_weight > 0.0 {
            let hits = bm25
                .search(&request.query, pool_limit)
                .map_err(|e| RetrievalError::InvalidParameter {
                    name: "bm25_search".to_string(),
                    reason: e.to_string(),
                })?;
            for hit in hits {
                bm25_scores.insert(hit.id.clone(), normalize_bm25_rank(hit.rank));
                entries.entry(hit.id.clone()).or_insert_with(|| {
                    deps.vector_store.get(&hit.id).ok().flatten().unwrap_or_else(|| {
                        MemoryEntry::new("", "", tribal_core::model::SourceType::Unknown)
                    })
                });
            }
        }
    }

    let merged = hybrid_merge(&vector_scores, &bm25_scores, config.vector_weight, config.bm25_weight);

    let mut scores: HashMap<String, f64> = HashMap::new();
    let mut methods: HashMap<String, RetrievalMethod> = HashMap::new();
    for (id, score) in merged {
        scores.insert(id.clone(), score);
        methods.insert(id, RetrievalMethod::Vector);
    }

    // Step 4: graph expansion.
    if request.graph_expansion && config.graph_expansion_enabled {
        if let (Some(graph), Some(extractor)) = (deps.graph_store, deps.query_extractor) {
            let query_entities = extractor.extract(&request.query);
            tracing::debug!(entity_count = query_entities.len(), "query-time entity extraction");
            let mut reachable_memory_ids: HashSet<String> = HashSet::new();

            for entity in &query_entities {
                let connected = graph
                    .find_connected(&entity.name, config.graph_hops, true)
                    .map_err(|e| RetrievalError::GraphExpansionFailed { reason: e.to_string() })?;
                for reached in &connected {
                    let memory_ids = graph
                        .get_memories_for_entity(&reached.name)
                        .map_err(|e| RetrievalError::GraphExpansionFailed { reason: e.to_string() })?;
                    reachable_memory_ids.extend(memory_ids);
                }
            }

            for id in reachable_memory_ids {
                if scores.contains_key(&id) {
                    methods.insert(id, RetrievalMethod::Hybrid);
                    continue;
                }
                if GRAPH_2HOP_SCORE < request.min_relevance {
                    continue;
                }
                let entry = match deps.vector_store.get(&id) {
                    Ok(Some(e)) if !e.deleted => e,
                    _ => continue,
                };
                if !tags_pass(&entry, &requested_tags) {
                    continue;
                }
                entries.insert(id.clone(), entry);
                scores.insert(id.clone(), GRAPH_2HOP_SCORE);
                methods.insert(id, RetrievalMethod::Graph);
            }
        }
    }

    // Step 5: superseded filtering. Any id that another present result
    // supersedes is dropped; ties between an original and its correction
    // always favor the correction because the original is unconditionally
    // removed here.
    let superseded_ids: HashSet<String> = entries
        .values()
        .filter_map(|e| e.supersedes.clone())
        .collect();

    let mut candidates: Vec<RerankCandidate> = scores
        .iter()
        .filter(|(id, _)| !superseded_ids.contains(*id))
        .filter_map(|(id, score)| {
            entries.get(id).map(|entry| RerankCandidate {
                id: id.clone(),
                content: entry.content.clone(),
                tags: entry.tags.iter().cloned().collect(),
                score: *score,
                created_at: entry.created_at,
            })
        })
        .collect();
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    // Step 6: rerank, which also performs step 7's truncation.
    let reranked = deps.reranker.rerank(&request.query, candidates, request.limit)?;

    let elapsed_ms = start.elapsed().as_millis() as u64;
    Ok(reranked
        .into_iter()
        .filter_map(|c| {
            entries.remove(&c.id).map(|entry| RetrievalResult {
                entry,
                score: c.score,
                retrieval_method: methods.get(&c.id).copied().unwrap_or(RetrievalMethod::Vector),
                retrieval_time_ms: elapsed_ms,
            })
        })
        .collect())
}
