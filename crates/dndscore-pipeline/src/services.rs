//! Process-wide model service handles

use crate::config::ServiceConfig;
use crate::error::PipelineError;
use dndscore_domain::{EntailmentService, TextGenerationService};
use dndscore_llm::{HttpEntailmentClient, OllamaGenerator};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The two external collaborators, created once and shared by every stage
#[derive(Clone)]
pub struct Services {
    /// Text generation (decomposition and rewrites)
    pub generator: Arc<dyn TextGenerationService>,
    /// Entailment classification (deduplication and verification)
    pub entailment: Arc<dyn EntailmentService>,
}

impl Services {
    /// Wrap existing service handles
    pub fn new(
        generator: Arc<dyn TextGenerationService>,
        entailment: Arc<dyn EntailmentService>,
    ) -> Self {
        Self {
            generator,
            entailment,
        }
    }

    /// Connect to the HTTP services described by `config`
    ///
    /// No request is made here; unreachable services surface as call
    /// failures during scoring.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, PipelineError> {
        config.validate()?;

        let generator = OllamaGenerator::with_timeout(
            config.generation_endpoint.clone(),
            config.generation_model.clone(),
            Duration::from_secs(config.generation_timeout_secs),
        );
        let entailment = HttpEntailmentClient::with_timeout(
            config.entailment_endpoint.clone(),
            config.entailment_model.clone(),
            Duration::from_secs(config.entailment_timeout_secs),
        );

        info!(
            generator = %generator.model_name(),
            entailment = %entailment.model_name(),
            "Model services configured"
        );
        Ok(Self::new(Arc::new(generator), Arc::new(entailment)))
    }

    /// Shut both clients down; later calls fail with `Closed`
    pub async fn shutdown(&self) {
        self.generator.shutdown().await;
        self.entailment.shutdown().await;
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("generator", &self.generator.model_name())
            .field("entailment", &self.entailment.model_name())
            .finish()
    }
}
