//! Bounded worker pool for external service calls
//!
//! Every call to a model service goes through a [`WorkerPool`]: a permit from a
//! shared semaphore bounds how many calls are in flight across all passages,
//! each attempt is wrapped in a timeout, and failed attempts are retried with
//! the pool's [`RetryPolicy`]. The permit is released between attempts, so a
//! call waiting out its backoff does not occupy a slot.

use crate::retry::{retry, RetryPolicy};
use dndscore_domain::{
    EntailmentFailure, EntailmentJudgment, EntailmentService, GenerationFailure,
    GenerationOptions, TextGenerationService,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Default timeout for one attempt
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared admission control for model calls
///
/// Cloning is cheap; clones share the same permits.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    retry: RetryPolicy,
    call_timeout: Duration,
}

impl WorkerPool {
    /// Create a pool admitting `capacity` concurrent calls (minimum 1)
    pub fn new(capacity: usize, retry: RetryPolicy, call_timeout: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            retry,
            call_timeout,
        }
    }

    /// Maximum concurrent calls
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free slots right now
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Retry policy applied to every call
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Timeout applied to each attempt
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Stop admitting calls; queued and future calls fail with `Closed`
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// Whether [`close`](Self::close) was called
    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }

    /// Generate text with timeout and retry
    pub async fn generate(
        &self,
        service: &dyn TextGenerationService,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationFailure> {
        self.generate_with(service, prompt, options, |text| Ok(text.to_string()))
            .await
    }

    /// Generate text and parse it; a parse error counts as a malformed reply and is retried
    pub async fn generate_with<T, P>(
        &self,
        service: &dyn TextGenerationService,
        prompt: &str,
        options: &GenerationOptions,
        parse: P,
    ) -> Result<T, GenerationFailure>
    where
        T: Send,
        P: Fn(&str) -> Result<T, String> + Sync,
    {
        let parse = &parse;
        retry(&self.retry, "generate", move || async move {
            let text = self
                .admit(
                    service.generate(prompt, options),
                    GenerationFailure::Timeout,
                    GenerationFailure::Closed,
                )
                .await?;
            parse(&text).map_err(GenerationFailure::Malformed)
        })
        .await
    }

    /// Classify `premise` ⊨ `hypothesis` with timeout and retry
    pub async fn classify(
        &self,
        service: &dyn EntailmentService,
        premise: &str,
        hypothesis: &str,
    ) -> Result<EntailmentJudgment, EntailmentFailure> {
        retry(&self.retry, "classify", move || async move {
            self.admit(
                service.classify(premise, hypothesis),
                EntailmentFailure::Timeout,
                EntailmentFailure::Closed,
            )
            .await
        })
        .await
    }

    async fn admit<T, E, Fut>(&self, call: Fut, on_timeout: E, on_closed: E) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(_) => return Err(on_closed),
        };

        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(on_timeout),
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(4, RetryPolicy::default(), DEFAULT_CALL_TIMEOUT)
    }
}
