//! Exponential backoff for transient embedding-provider failures, with
//! server `Retry-After` honored when present. Synchronous: the remote
//! provider blocks the calling thread for the duration of the whole
//! retry sequence, the same as every other provider call in this crate.

use std::thread::sleep;
use std::time::Duration;

use tracing::warn;

/// The outcome of one provider attempt, as classified by the caller.
pub enum AttemptOutcome<T> {
    Success(T),
    /// Worth retrying — e.g. a timeout or a 5xx/429 response.
    Transient { reason: String, retry_after: Option<Duration> },
    /// Not worth retrying — a 4xx (non-429) or malformed response.
    Permanent { status: u16, body: String },
}

pub struct RetryPolicy {
    pub max_retries: u32,
    pub max_backoff_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            max_backoff_ms,
        }
    }

    /// Run `attempt` up to `max_retries + 1` times, backing off
    /// exponentially between transient failures (doubling from 200ms,
    /// capped at `max_backoff_ms`, overridden by a server `retry_after`
    /// when one is supplied).
    pub fn run<T>(
        &self,
        mut attempt: impl FnMut(u32) -> AttemptOutcome<T>,
    ) -> Result<T, tribal_core::errors::EmbeddingError> {
        use tribal_core::errors::EmbeddingError;

        let mut last_reason = String::new();
        let mut delay_ms: u64 = 200;

        for attempt_no in 0..=self.max_retries {
            match attempt(attempt_no) {
                AttemptOutcome::Success(value) => return Ok(value),
                AttemptOutcome::Permanent { status, body } => {
                    return Err(EmbeddingError::PermanentRemote { status, body });
                }
                AttemptOutcome::Transient { reason, retry_after } => {
                    last_reason = reason;
                    if attempt_no == self.max_retries {
                        break;
                    }
                    let wait = retry_after
                        .map(|d| d.as_millis() as u64)
                        .unwrap_or(delay_ms)
                        .min(self.max_backoff_ms);
                    warn!(attempt = attempt_no, wait_ms = wait, reason = %last_reason, "retrying embedding request");
                    sleep(Duration::from_millis(wait));
                    delay_ms = (delay_ms * 2).min(self.max_backoff_ms);
                }
            }
        }

        Err(EmbeddingError::TransientExhausted {
            attempts: self.max_retries + 1,
            reason: last_reason,
        })
    }
}
