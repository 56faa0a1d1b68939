//! Informativeness of cluster representatives against bleached claims
//!
//! A bleached claim is a generic statement that holds for almost any subject
//! in the domain ("He is a person", "She was born somewhere"). A claim that one
//! of them already entails says little, so its weight is
//! `-ln(min over bleached b of P(b ⇒ claim))`, which is 0 for trivial claims
//! and grows as the best generic entailment gets weaker.
//!
//! The weight is reported next to each cluster. It does not change the
//! partition or the passage score.

use dndscore_domain::{Claim, ClaimCluster, EntailmentService};
use dndscore_llm::WorkerPool;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// `-ln(min_entailment)`; a probability of 0 maps to 0
pub fn informativeness(min_entailment: f64) -> f64 {
    if min_entailment <= 0.0 || min_entailment >= 1.0 {
        0.0
    } else {
        -min_entailment.ln()
    }
}

/// Weighs claims against a fixed list of bleached claims
pub struct InformativenessScorer {
    entailment: Arc<dyn EntailmentService>,
    pool: WorkerPool,
    bleached_claims: Vec<String>,
}

impl InformativenessScorer {
    /// Create a scorer; blank bleached claims are dropped
    pub fn new(
        entailment: Arc<dyn EntailmentService>,
        pool: WorkerPool,
        bleached_claims: impl IntoIterator<Item = String>,
    ) -> Self {
        let bleached_claims = bleached_claims
            .into_iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();
        Self {
            entailment,
            pool,
            bleached_claims,
        }
    }

    /// True when at least one bleached claim is configured
    pub fn is_enabled(&self) -> bool {
        !self.bleached_claims.is_empty()
    }

    /// Configured bleached claims
    pub fn bleached_claims(&self) -> &[String] {
        &self.bleached_claims
    }

    /// Informativeness of one claim
    ///
    /// `None` when no bleached claims are configured, or when any
    /// bleached-claim query failed after retry.
    pub async fn weigh(&self, claim: &Claim) -> Option<f64> {
        if !self.is_enabled() {
            return None;
        }

        let service = self.entailment.as_ref();
        let judgments = join_all(
            self.bleached_claims
                .iter()
                .map(|bleached| self.pool.classify(service, bleached, claim.text())),
        )
        .await;

        let mut min_entailment = 1.0_f64;
        for judgment in judgments {
            match judgment {
                Ok(j) => min_entailment = min_entailment.min(j.entailment_probability()),
                Err(e) => {
                    warn!(
                        ordinal = claim.ordinal(),
                        error = %e,
                        "Bleached-claim query failed, informativeness unknown"
                    );
                    return None;
                }
            }
        }

        let weight = informativeness(min_entailment);
        debug!(ordinal = claim.ordinal(), min_entailment, weight, "Weighed claim");
        Some(weight)
    }

    /// Informativeness of each cluster's representative, in cluster order
    pub async fn weigh_all(&self, clusters: &[ClaimCluster]) -> Vec<Option<f64>> {
        if !self.is_enabled() {
            return vec![None; clusters.len()];
        }
        join_all(clusters.iter().map(|c| self.weigh(c.representative()))).await
    }
}
