//! Bounded retry with exponential backoff
//!
//! Delay before attempt `n + 1` is `backoff_base_ms * 2^(n - 1)`, capped at
//! `max_backoff_ms`. Failures that report themselves as non-retryable end the
//! loop immediately.

use dndscore_domain::{EntailmentFailure, GenerationFailure};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry settings shared by every external call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1)
    pub max_attempts: u32,

    /// Delay after the first failure
    pub backoff_base_ms: u64,

    /// Upper bound on any single delay
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            backoff_base_ms: 0,
            max_backoff_ms: 0,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32);
        let millis = self
            .backoff_base_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }
}

/// Failures that know whether another attempt is worthwhile
pub trait Retryable {
    /// Whether the operation should be attempted again
    fn is_retryable(&self) -> bool;
}

impl Retryable for GenerationFailure {
    fn is_retryable(&self) -> bool {
        GenerationFailure::is_retryable(self)
    }
}

impl Retryable for EntailmentFailure {
    fn is_retryable(&self) -> bool {
        EntailmentFailure::is_retryable(self)
    }
}

/// Run `operation` until it succeeds, fails non-retryably, or attempts run out
///
/// The last failure is returned when every attempt fails.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, what: &str, mut operation: F) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() || attempt >= max_attempts => return Err(e),
            Err(e) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    operation = what,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Call failed, retrying: {}",
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
