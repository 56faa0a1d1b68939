//! Decomposer: passage -> ordered atomic claims

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_claim_list;
use crate::prompt::DecompositionPromptBuilder;
use crate::segment::segment_sentences;
use dndscore_domain::{Claim, Passage, TextGenerationService};
use dndscore_llm::WorkerPool;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Splits a passage into an ordered sequence of atomic claims
///
/// Each sentence is decomposed separately, with the whole passage as context.
/// Sentence requests run concurrently through the worker pool; ordinals follow
/// sentence order, then order within the sentence.
pub struct Decomposer {
    generator: Arc<dyn TextGenerationService>,
    pool: WorkerPool,
    config: ExtractorConfig,
}

impl Decomposer {
    /// Create a new Decomposer
    pub fn new(
        generator: Arc<dyn TextGenerationService>,
        pool: WorkerPool,
        config: ExtractorConfig,
    ) -> Self {
        Self {
            generator,
            pool,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Decompose `passage` into claims with ordinals `0..n`
    ///
    /// # Errors
    ///
    /// Fails when the passage is empty or too long, when any sentence still
    /// cannot be decomposed after retries, or when no claims come out at all.
    /// The passage is never reported as having zero claims.
    pub async fn decompose(&self, passage: &Passage) -> Result<Vec<Claim>, ExtractorError> {
        if passage.is_blank() {
            return Err(ExtractorError::EmptyPassage);
        }

        let text = passage.text();
        let length = text.chars().count();
        if length > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(length, self.config.max_text_length));
        }

        let sentences = segment_sentences(text);
        info!(
            passage_id = %passage.id(),
            sentences = sentences.len(),
            model = self.generator.model_name(),
            "Decomposing passage"
        );

        let options = self.config.decomposition_options();
        let options = &options;
        let requests = sentences.iter().enumerate().map(|(idx, sentence)| {
            let prompt = DecompositionPromptBuilder::new(text, sentence).build();
            async move {
                debug!(sentence = idx, prompt_len = prompt.len(), "Decomposition request");
                self.pool
                    .generate_with(self.generator.as_ref(), &prompt, options, |response| {
                        parse_claim_list(response).map_err(|e| e.to_string())
                    })
                    .await
                    .map_err(|source| {
                        warn!(sentence = idx, "Sentence decomposition failed: {}", source);
                        ExtractorError::Generation {
                            sentence: idx,
                            source,
                        }
                    })
            }
        });

        let per_sentence = try_join_all(requests).await?;

        let mut claims = Vec::new();
        for (sentence, texts) in sentences.iter().zip(per_sentence) {
            for claim_text in texts {
                let ordinal = claims.len();
                claims.push(Claim::new(claim_text, passage.id().clone(), ordinal, sentence.as_str()));
            }
        }

        if claims.is_empty() {
            warn!(passage_id = %passage.id(), "Decomposition produced no claims");
            return Err(ExtractorError::NoClaims);
        }

        info!(passage_id = %passage.id(), claims = claims.len(), "Decomposition complete");
        Ok(claims)
    }
}
