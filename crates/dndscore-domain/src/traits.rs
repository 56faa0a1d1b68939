//! Trait definitions for the external collaborators
//!
//! These traits define the boundary between the pipeline and the model
//! inference services. Implementations live in `dndscore-llm`; components
//! receive them as `Arc<dyn _>` so a single, explicitly initialized client is
//! shared by every stage and torn down once.

use crate::entailment::EntailmentJudgment;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decoding options passed to the text generation service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Maximum number of tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Stop sequences
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

/// Failure of a text generation call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
    /// The call did not finish within its timeout
    #[error("Generation timed out")]
    Timeout,

    /// The service answered with something that could not be used
    #[error("Malformed generation response: {0}")]
    Malformed(String),

    /// The service could not be reached or refused the request
    #[error("Generation service unavailable: {0}")]
    Unavailable(String),

    /// The client was shut down
    #[error("Generation client closed")]
    Closed,
}

impl GenerationFailure {
    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, GenerationFailure::Closed)
    }
}

/// Failure of an entailment classification call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntailmentFailure {
    /// The call did not finish within its timeout
    #[error("Entailment call timed out")]
    Timeout,

    /// The service answered with something that could not be used
    #[error("Malformed entailment response: {0}")]
    Malformed(String),

    /// The service could not be reached or refused the request
    #[error("Entailment service unavailable: {0}")]
    Unavailable(String),

    /// The client was shut down
    #[error("Entailment client closed")]
    Closed,
}

impl EntailmentFailure {
    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, EntailmentFailure::Closed)
    }
}

/// Text generation service (an LLM behind some API)
#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Generate a completion for `prompt`
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationFailure>;

    /// Model identifier, for logging
    fn model_name(&self) -> &str {
        "unknown"
    }

    /// Release any held resources; later calls fail with [`GenerationFailure::Closed`]
    async fn shutdown(&self) {}
}

/// Directional entailment (NLI) classifier
#[async_trait]
pub trait EntailmentService: Send + Sync {
    /// Classify whether `premise` entails `hypothesis`
    async fn classify(
        &self,
        premise: &str,
        hypothesis: &str,
    ) -> Result<EntailmentJudgment, EntailmentFailure>;

    /// Model identifier, for logging
    fn model_name(&self) -> &str {
        "unknown"
    }

    /// Release any held resources; later calls fail with [`EntailmentFailure::Closed`]
    async fn shutdown(&self) {}
}
