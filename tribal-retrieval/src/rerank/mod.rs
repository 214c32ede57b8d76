//! Reranking strategies applied after hybrid merge and optional graph
//! expansion, selected by `RetrievalConfig::rerank_mode`.

pub mod cross_encoder;
pub mod heuristic;
pub mod noop;

pub use cross_encoder::{CrossEncoderReranker, PairScorer};
pub use heuristic::HeuristicReranker;
pub use noop::NoopReranker;

use tribal_core::errors::RetrievalError;
use tribal_core::traits::Reranker;

/// Build the configured reranker. `mode` is one of `"none"`, `"heuristic"`,
/// `"cross-encoder"`, or `"auto"`.
///
/// `"cross-encoder"` and `"auto"` need a `PairScorer` to do anything but
/// fall back: `"cross-encoder"` with no scorer is an error (nothing to
/// score with), `"auto"` with no scorer quietly degrades to heuristic, the
/// same way the original falls back when no cross-encoder model is
/// installed.
pub fn create_reranker(
    mode: &str,
    pair_scorer: Option<Box<dyn PairScorer>>,
) -> Result<Box<dyn Reranker>, RetrievalError> {
    match mode {
        "none" => Ok(Box::new(NoopReranker)),
        "heuristic" => Ok(Box::new(HeuristicReranker::default())),
        "cross-encoder" => match pair_scorer {
            Some(scorer) => Ok(Box::new(CrossEncoderReranker::new(scorer))),
            None => Err(RetrievalError::InvalidParameter {
                name: "rerank_mode".to_string(),
                reason: "cross-encoder mode requires a configured PairScorer".to_string(),
            }),
        },
        "auto" => match pair_scorer {
            Some(scorer) => Ok(Box::new(CrossEncoderReranker::new(scorer))),
            None => Ok(Box::new(HeuristicReranker::default())),
        },
        other => Err(RetrievalError::InvalidParameter {
            name: "rerank_mode".to_string(),
            reason: format!("unknown reranking mode: {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_mode_builds_noop() {
        let reranker = create_reranker("none", None).unwrap();
        let out = reranker.rerank("q", vec![], 5).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn auto_without_scorer_falls_back_to_heuristic() {
        assert!(create_reranker("auto", None).is_ok());
    }

    #[test]
    fn cross_encoder_without_scorer_is_an_error() {
        assert!(create_reranker("cross-encoder", None).is_err());
    }

    #[test]
    fn unknown_mode_is_an_error() {
        assert!(create_reranker("nonsense", None).is_err());
    }
}
