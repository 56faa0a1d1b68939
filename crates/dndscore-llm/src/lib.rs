//! DnDScore Model Service Layer
//!
//! Implementations of the `TextGenerationService` and `EntailmentService`
//! traits from `dndscore-domain`, plus the call discipline every stage uses to
//! reach them: bounded admission through a [`WorkerPool`], a per-call timeout,
//! and bounded exponential backoff ([`RetryPolicy`]).
//!
//! # Providers
//!
//! - `MockGenerator`: Deterministic, scriptable text generation for testing
//! - `MockEntailment`: Deterministic, scriptable entailment oracle for testing
//! - `OllamaGenerator`: Local Ollama API integration
//! - `HttpEntailmentClient`: NLI inference server over HTTP
//!
//! # Examples
//!
//! ```
//! use dndscore_llm::MockGenerator;
//! use dndscore_domain::{GenerationOptions, TextGenerationService};
//!
//! # tokio_test_block(async {
//! let generator = MockGenerator::new("[\"Paris is in France\"]");
//! let text = generator.generate("any prompt", &GenerationOptions::default()).await.unwrap();
//! assert_eq!(text, "[\"Paris is in France\"]");
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

#![warn(missing_docs)]

pub mod mock_entailment;
pub mod nli;
pub mod ollama;
pub mod pool;
pub mod retry;

use async_trait::async_trait;
use dndscore_domain::{GenerationFailure, GenerationOptions, TextGenerationService};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub use mock_entailment::MockEntailment;
pub use nli::HttpEntailmentClient;
pub use ollama::OllamaGenerator;
pub use pool::WorkerPool;
pub use retry::{retry, RetryPolicy, Retryable};

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error,
    Transient { remaining: usize, then: String },
}

/// Mock text generator for deterministic testing
///
/// Replies are chosen by the first rule whose pattern occurs in the prompt,
/// falling back to a default response. No network calls are made.
///
/// # Examples
///
/// ```
/// use dndscore_llm::MockGenerator;
///
/// let mut generator = MockGenerator::default();
/// generator.add_response("Sentence: Paris", "[\"Paris is the capital of France\"]");
/// generator.add_error("Sentence: broken");
/// assert_eq!(generator.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockGenerator {
    default_response: String,
    rules: Arc<Mutex<Vec<(String, MockReply)>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    latency: Option<Duration>,
    closed: Arc<AtomicBool>,
}

impl MockGenerator {
    /// Create a MockGenerator with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            rules: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            latency: None,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Delay every reply by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Reply with `response` to prompts containing `pattern`
    pub fn add_response(&mut self, pattern: impl Into<String>, response: impl Into<String>) {
        self.push_rule(pattern.into(), MockReply::Text(response.into()));
    }

    /// Fail every prompt containing `pattern`
    pub fn add_error(&mut self, pattern: impl Into<String>) {
        self.push_rule(pattern.into(), MockReply::Error);
    }

    /// Fail the first `times` prompts containing `pattern`, then reply with `then`
    pub fn add_transient_error(
        &mut self,
        pattern: impl Into<String>,
        times: usize,
        then: impl Into<String>,
    ) {
        self.push_rule(
            pattern.into(),
            MockReply::Transient {
                remaining: times,
                then: then.into(),
            },
        );
    }

    /// Number of times generate was called
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Every prompt received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Reset the recorded prompts
    pub fn reset_call_count(&self) {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn push_rule(&mut self, pattern: String, reply: MockReply) {
        self.rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((pattern, reply));
    }

    fn reply_for(&self, prompt: &str) -> Result<String, GenerationFailure> {
        let mut rules = self.rules.lock().unwrap_or_else(PoisonError::into_inner);
        for (pattern, reply) in rules.iter_mut() {
            if !prompt.contains(pattern.as_str()) {
                continue;
            }
            return match reply {
                MockReply::Text(text) => Ok(text.clone()),
                MockReply::Error => Err(GenerationFailure::Unavailable("Mock error".to_string())),
                MockReply::Transient { remaining, then } => {
                    if *remaining > 0 {
                        *remaining -= 1;
                        Err(GenerationFailure::Unavailable("Mock transient error".to_string()))
                    } else {
                        Ok(then.clone())
                    }
                }
            };
        }
        Ok(self.default_response.clone())
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl TextGenerationService for MockGenerator {
    async fn generate(
        &self,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, GenerationFailure> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(GenerationFailure::Closed);
        }
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.reply_for(prompt)
    }

    fn model_name(&self) -> &str {
        "mock"
    }

    async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> GenerationOptions {
        GenerationOptions::default()
    }

    #[tokio::test]
    async fn test_mock_generator_default() {
        let generator = MockGenerator::new("Test response");
        let result = generator.generate("any prompt", &options()).await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_generator_pattern_rules() {
        let mut generator = MockGenerator::default();
        generator.add_response("hello", "world");
        generator.add_response("foo", "bar");

        assert_eq!(generator.generate("say hello", &options()).await.unwrap(), "world");
        assert_eq!(generator.generate("foo?", &options()).await.unwrap(), "bar");
        assert_eq!(
            generator.generate("unknown", &options()).await.unwrap(),
            "Default mock response"
        );
    }

    #[tokio::test]
    async fn test_first_matching_rule_wins() {
        let mut generator = MockGenerator::default();
        generator.add_response("Subclaim: It", "Paris has the Eiffel Tower");
        generator.add_response("Subclaim:", "fallback");

        let reply = generator
            .generate("Subclaim: It has the Eiffel Tower", &options())
            .await
            .unwrap();
        assert_eq!(reply, "Paris has the Eiffel Tower");
    }

    #[tokio::test]
    async fn test_mock_generator_call_count() {
        let generator = MockGenerator::new("test");
        assert_eq!(generator.call_count(), 0);

        generator.generate("prompt1", &options()).await.unwrap();
        generator.generate("prompt2", &options()).await.unwrap();
        assert_eq!(generator.call_count(), 2);
        assert_eq!(generator.prompts(), vec!["prompt1", "prompt2"]);

        generator.reset_call_count();
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_generator_error() {
        let mut generator = MockGenerator::default();
        generator.add_error("bad prompt");

        let result = generator.generate("a bad prompt", &options()).await;
        assert!(matches!(result, Err(GenerationFailure::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_transient_error_recovers() {
        let mut generator = MockGenerator::default();
        generator.add_transient_error("flaky", 2, "ok");

        assert!(generator.generate("flaky", &options()).await.is_err());
        assert!(generator.generate("flaky", &options()).await.is_err());
        assert_eq!(generator.generate("flaky", &options()).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_shutdown_closes_generator() {
        let generator = MockGenerator::new("x");
        generator.shutdown().await;
        let result = generator.generate("p", &options()).await;
        assert_eq!(result, Err(GenerationFailure::Closed));
    }

    #[tokio::test]
    async fn test_mock_generator_clone_shares_state() {
        let generator1 = MockGenerator::new("test");
        let generator2 = generator1.clone();

        generator1.generate("test", &options()).await.unwrap();

        assert_eq!(generator1.call_count(), 1);
        assert_eq!(generator2.call_count(), 1);
    }
}
