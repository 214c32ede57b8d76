//! HTTP embedding provider. Authenticates by bearer token against a
//! configured `/embeddings` endpoint; an optional alternate base URL lets
//! a locally hosted compatible server run without a token at all.

use serde::{Deserialize, Serialize};

use tribal_core::errors::EmbeddingError;
use tribal_core::traits::EmbeddingProvider;

use crate::retry::{AttemptOutcome, RetryPolicy};
use crate::truncate::truncate_to_byte_budget;

const MAX_INPUT_BYTES: usize = 32_000;
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

pub struct RemoteProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    dimensions: usize,
    retry: RetryPolicy,
}

impl RemoteProvider {
    pub fn new(
        model: impl Into<String>,
        dimensions: usize,
        api_key: Option<String>,
        api_base: Option<String>,
        timeout_ms: u64,
        max_retries: u32,
        max_backoff_ms: u64,
    ) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()
            .expect("reqwest client configuration is valid");
        Self {
            client,
            base_url: api_base.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model: model.into(),
            dimensions,
            retry: RetryPolicy::new(max_retries, max_backoff_ms),
        }
    }

    fn post_embeddings(&self, inputs: &[String]) -> AttemptOutcome<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url.trim_end_matches('/'));
        let mut req = self.client.post(&url).json(&EmbeddingRequest {
            model: &self.model,
            input: inputs,
            dimensions: self.dimensions,
        });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = match req.send() {
            Ok(r) => r,
            Err(e) => {
                return AttemptOutcome::Transient {
                    reason: e.to_string(),
                    retry_after: None,
                }
            }
        };

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(std::time::Duration::from_secs);
            return AttemptOutcome::Transient {
                reason: "rate limited (429)".to_string(),
                retry_after,
            };
        }
        if status.is_server_error() {
            return AttemptOutcome::Transient {
                reason: format!("server error {status}"),
                retry_after: None,
            };
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return AttemptOutcome::Permanent {
                status: status.as_u16(),
                body,
            };
        }

        let body: EmbeddingResponse = match response.json() {
            Ok(b) => b,
            Err(e) => {
                return AttemptOutcome::Permanent {
                    status: status.as_u16(),
                    body: format!("malformed response: {e}"),
                }
            }
        };

        let mut ordered: Vec<Option<Vec<f32>>> = vec![None; inputs.len()];
        for datum in body.data {
            if datum.index < ordered.len() {
                ordered[datum.index] = Some(datum.embedding);
            }
        }
        let result: Vec<Vec<f32>> = ordered.into_iter().flatten().collect();
        if result.len() != inputs.len() {
            return AttemptOutcome::Permanent {
                status: status.as_u16(),
                body: "response embedding count did not match input count".to_string(),
            };
        }
        AttemptOutcome::Success(result)
    }
}

impl EmbeddingProvider for RemoteProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.embed_batch(&[text.to_string()])?.remove(0))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        let truncated: Vec<String> = texts
            .iter()
            .map(|t| truncate_to_byte_budget(t, MAX_INPUT_BYTES).to_string())
            .collect();
        if truncated.iter().any(|t| t.trim().is_empty()) {
            return Err(EmbeddingError::EmptyInput);
        }
        self.retry.run(|_| self.post_embeddings(&truncated))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
