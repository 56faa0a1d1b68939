//! Ollama Generator Implementation
//!
//! Text generation against a local Ollama instance (`POST /api/generate`).
//!
//! A generator performs exactly one HTTP request per call. Retries, backoff
//! and the per-call timeout are applied by [`WorkerPool`](crate::WorkerPool),
//! so every stage gets the same call discipline regardless of provider.
//!
//! # Examples
//!
//! ```no_run
//! use dndscore_llm::OllamaGenerator;
//!
//! let generator = OllamaGenerator::new("http://localhost:11434", "llama3.1");
//! ```

use async_trait::async_trait;
use dndscore_domain::{GenerationFailure, GenerationOptions, TextGenerationService};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default HTTP timeout for a single request
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Ollama API client implementing [`TextGenerationService`]
pub struct OllamaGenerator {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    closed: AtomicBool,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "RequestOptions::is_empty")]
    options: RequestOptions<'a>,
}

#[derive(Serialize)]
struct RequestOptions<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    stop: &'a [String],
}

impl RequestOptions<'_> {
    fn is_empty(&self) -> bool {
        self.num_predict.is_none() && self.temperature.is_none() && self.stop.is_empty()
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaGenerator {
    /// Create a generator for `model` served at `endpoint`
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a generator with a custom HTTP timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
            closed: AtomicBool::new(false),
        }
    }

    /// Create a generator against [`DEFAULT_ENDPOINT`]
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Configured endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerationService for OllamaGenerator {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationFailure> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(GenerationFailure::Closed);
        }

        let url = format!("{}/api/generate", self.endpoint);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: RequestOptions {
                num_predict: options.max_tokens,
                temperature: options.temperature,
                stop: &options.stop,
            },
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Ollama generate request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GenerationFailure::Unavailable(format!(
                "Model not available: {}",
                self.model
            )));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenerationFailure::Unavailable(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let parsed = response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| GenerationFailure::Malformed(format!("Failed to parse response: {}", e)))?;

        Ok(parsed.response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

fn map_transport_error(e: reqwest::Error) -> GenerationFailure {
    if e.is_timeout() {
        GenerationFailure::Timeout
    } else {
        GenerationFailure::Unavailable(format!("Request failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_generator_creation() {
        let generator = OllamaGenerator::new("http://localhost:11434/", "llama3.1");
        assert_eq!(generator.endpoint(), "http://localhost:11434");
        assert_eq!(generator.model_name(), "llama3.1");
    }

    #[test]
    fn test_ollama_generator_default_endpoint() {
        let generator = OllamaGenerator::default_endpoint("mistral");
        assert_eq!(generator.endpoint(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_request_serialization_maps_options() {
        let stop = vec!["\n".to_string()];
        let body = GenerateRequest {
            model: "m",
            prompt: "p",
            stream: false,
            options: RequestOptions {
                num_predict: Some(100),
                temperature: Some(0.3),
                stop: &stop,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["options"]["num_predict"], 100);
        assert_eq!(json["options"]["stop"][0], "\n");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_request_serialization_omits_empty_options() {
        let body = GenerateRequest {
            model: "m",
            prompt: "p",
            stream: false,
            options: RequestOptions {
                num_predict: None,
                temperature: None,
                stop: &[],
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("options").is_none());
    }

    #[tokio::test]
    async fn test_closed_generator_rejects_calls() {
        let generator = OllamaGenerator::default_endpoint("m");
        generator.shutdown().await;
        let result = generator.generate("p", &GenerationOptions::default()).await;
        assert_eq!(result, Err(GenerationFailure::Closed));
    }

    #[tokio::test]
    #[ignore] // Requires Ollama to be running
    async fn test_ollama_generate_integration() {
        let generator = OllamaGenerator::default_endpoint("llama3.1");
        let result = generator
            .generate("Say 'hello' and nothing else.", &GenerationOptions::default())
            .await;
        assert!(result.is_ok());
    }
}
