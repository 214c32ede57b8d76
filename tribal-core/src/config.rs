//! Runtime configuration. Loading a config file from disk is out of scope;
//! callers build a `TribalConfig` from their own environment-variable
//! reading (see the `TRIBAL_MEMORY_*` namespace) and pass the struct in.

use serde::{Deserialize, Serialize};

use crate::errors::TribalError;

fn default_instance_id() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// "remote", "local", or "mock".
    pub provider: String,
    pub model: String,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub dimensions: usize,
    pub batch_size: usize,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub max_backoff_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            model: "mock-embed".to_string(),
            api_key: None,
            api_base: None,
            dimensions: 256,
            batch_size: 32,
            timeout_ms: 10_000,
            max_retries: 3,
            max_backoff_ms: 8_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// "memory" or "sqlite".
    pub provider: String,
    pub path: String,
    pub read_pool_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: "memory".to_string(),
            path: "tribal_memory.db".to_string(),
            read_pool_size: crate::constants::DEFAULT_READ_POOL_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub enabled: bool,
    pub exact_threshold: f64,
    pub near_threshold: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            exact_threshold: crate::constants::DEFAULT_EXACT_THRESHOLD,
            near_threshold: crate::constants::DEFAULT_NEAR_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub vector_weight: f64,
    pub bm25_weight: f64,
    pub pool_multiplier: usize,
    pub graph_expansion_enabled: bool,
    pub graph_hops: usize,
    /// "none", "heuristic", "cross-encoder", or "auto".
    pub rerank_mode: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            vector_weight: 0.6,
            bm25_weight: 0.4,
            pool_multiplier: crate::constants::DEFAULT_POOL_MULTIPLIER,
            graph_expansion_enabled: true,
            graph_hops: crate::constants::DEFAULT_GRAPH_HOPS,
            rerank_mode: "auto".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// "memory" or "sqlite".
    pub provider: String,
    pub path: String,
    pub retention_days: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            provider: "memory".to_string(),
            path: "tribal_sessions.db".to_string(),
            retention_days: 90,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TribalConfig {
    #[serde(default = "default_instance_id")]
    pub instance_id: String,
    pub debug: bool,
    pub embedding: EmbeddingConfig,
    pub storage: StorageConfig,
    pub dedup: DedupConfig,
    pub retrieval: RetrievalConfig,
    pub session: SessionConfig,
}

impl Default for TribalConfig {
    fn default() -> Self {
        Self {
            instance_id: default_instance_id(),
            debug: false,
            embedding: EmbeddingConfig::default(),
            storage: StorageConfig::default(),
            dedup: DedupConfig::default(),
            retrieval: RetrievalConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl TribalConfig {
    /// Enforce the invariants spelled out in the external-interfaces
    /// section: non-empty instance id, positive timeout/batch/dimensions,
    /// matching embedding/store dimensions, and `0 <= near <= exact <= 1`.
    pub fn validate(&self) -> Result<(), TribalError> {
        if self.instance_id.trim().is_empty() {
            return Err(TribalError::configuration("instance_id must not be empty"));
        }
        if self.embedding.dimensions == 0 {
            return Err(TribalError::configuration(
                "embedding.dimensions must be positive",
            ));
        }
        if self.embedding.batch_size == 0 {
            return Err(TribalError::configuration(
                "embedding.batch_size must be positive",
            ));
        }
        if self.embedding.timeout_ms == 0 {
            return Err(TribalError::configuration(
                "embedding.timeout_ms must be positive",
            ));
        }
        if self.embedding.provider == "remote"
            && self.embedding.api_base.is_none()
            && self.embedding.api_key.is_none()
        {
            return Err(TribalError::configuration(
                "remote embedding provider requires api_key or api_base",
            ));
        }
        if !(0.0..=1.0).contains(&self.dedup.near_threshold)
            || !(0.0..=1.0).contains(&self.dedup.exact_threshold)
        {
            return Err(TribalError::configuration(
                "dedup thresholds must lie within [0, 1]",
            ));
        }
        if self.dedup.near_threshold > self.dedup.exact_threshold {
            return Err(TribalError::configuration(
                "dedup.near_threshold must be <= dedup.exact_threshold",
            ));
        }
        if self.retrieval.vector_weight < 0.0 || self.retrieval.bm25_weight < 0.0 {
            return Err(TribalError::configuration(
                "retrieval weights must be non-negative",
            ));
        }
        if self.retrieval.vector_weight == 0.0 && self.retrieval.bm25_weight == 0.0 {
            return Err(TribalError::configuration(
                "at least one of retrieval.vector_weight/bm25_weight must be nonzero",
            ));
        }
        if self.session.retention_days <= 0 {
            return Err(TribalError::configuration(
                "session.retention_days must be positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(TribalConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_instance_id_rejected() {
        let mut cfg = TribalConfig::default();
        cfg.instance_id = "  ".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn near_above_exact_rejected() {
        let mut cfg = TribalConfig::default();
        cfg.dedup.near_threshold = 0.99;
        cfg.dedup.exact_threshold = 0.90;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_weights_rejected() {
        let mut cfg = TribalConfig::default();
        cfg.retrieval.vector_weight = 0.0;
        cfg.retrieval.bm25_weight = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn remote_provider_requires_credentials() {
        let mut cfg = TribalConfig::default();
        cfg.embedding.provider = "remote".to_string();
        assert!(cfg.validate().is_err());
        cfg.embedding.api_base = Some("http://localhost:8080".to_string());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn serde_roundtrip_preserves_overrides() {
        let mut cfg = TribalConfig::default();
        cfg.storage.read_pool_size = 8;
        let json = serde_json::to_string(&cfg).unwrap();
        let roundtripped: TribalConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtripped.storage.read_pool_size, 8);
    }
}
