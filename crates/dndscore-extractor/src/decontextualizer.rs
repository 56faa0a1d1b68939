//! Decontextualizer: rewrites claims into self-contained statements

use crate::config::ExtractorConfig;
use crate::parser::parse_rewrite;
use crate::prompt::DecontextPromptBuilder;
use dndscore_domain::{Claim, Passage, TextGenerationService};
use dndscore_llm::WorkerPool;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Rewrites each claim so it can be understood without its passage
///
/// The stage never fails. A claim whose rewrite cannot be produced keeps its
/// original text and is marked rewrite-degraded.
pub struct Decontextualizer {
    generator: Arc<dyn TextGenerationService>,
    pool: WorkerPool,
    config: ExtractorConfig,
}

impl Decontextualizer {
    /// Create a new Decontextualizer
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

    /// Rewrite one claim using `passage` as context
    pub async fn decontextualize(&self, mut claim: Claim, passage: &Passage) -> Claim {
        let prompt =
            DecontextPromptBuilder::new(passage.text(), claim.sentence(), claim.text()).build();
        let options = self.config.decontext_options();

        let rewrite = self
            .pool
            .generate_with(self.generator.as_ref(), &prompt, &options, |response| {
                parse_rewrite(response).ok_or_else(|| "Empty rewrite".to_string())
            })
            .await;

        match rewrite {
            Ok(text) => {
                debug!(ordinal = claim.ordinal(), "Rewrote claim: {:?} -> {:?}", claim.text(), text);
                claim.apply_rewrite(text);
            }
            Err(e) => {
                warn!(
                    ordinal = claim.ordinal(),
                    "Rewrite failed, keeping original text: {}", e
                );
                claim.mark_rewrite_degraded();
            }
        }
        claim
    }

    /// Rewrite every claim of `passage` concurrently, preserving order
    pub async fn decontextualize_all(&self, claims: Vec<Claim>, passage: &Passage) -> Vec<Claim> {
        let total = claims.len();
        let rewritten = join_all(
            claims
                .into_iter()
                .map(|claim| self.decontextualize(claim, passage)),
        )
        .await;

        let degraded = rewritten.iter().filter(|c| c.is_rewrite_degraded()).count();
        info!(
            passage_id = %passage.id(),
            claims = total,
            degraded,
            "Decontextualization complete"
        );
        rewritten
    }
}
