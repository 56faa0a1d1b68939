//! Verifier: cluster representative vs. evidence

use crate::evidence::Evidence;
use dndscore_domain::{
    Claim, ClaimCluster, EntailmentLabel, EntailmentService, Verdict, VerdictLabel, VerifiedCluster,
};
use dndscore_llm::WorkerPool;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Verifier configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Minimum score for an `entails` or `contradicts` judgment to decide a verdict
    pub verification_threshold: f64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            verification_threshold: 0.7,
        }
    }
}

impl VerifierConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.verification_threshold) {
            return Err(format!(
                "verification_threshold must be in [0.0, 1.0], got {}",
                self.verification_threshold
            ));
        }
        Ok(())
    }
}

/// Checks cluster representatives against evidence
///
/// Evidence is the premise and the claim is the hypothesis. With several
/// evidence passages, a supporting passage wins over a contradicting one;
/// a failed call only matters when no passage was decisive.
pub struct Verifier {
    entailment: Arc<dyn EntailmentService>,
    pool: WorkerPool,
    config: VerifierConfig,
}

impl Verifier {
    /// Create a new Verifier
    pub fn new(
        entailment: Arc<dyn EntailmentService>,
        pool: WorkerPool,
        config: VerifierConfig,
    ) -> Self {
        Self {
            entailment,
            pool,
            config,
        }
    }

    /// Verdict for one claim
    pub async fn verify_claim(&self, claim: &Claim, evidence: &Evidence) -> Verdict {
        let passages = evidence.passages();
        if passages.is_empty() {
            debug!(ordinal = claim.ordinal(), "No evidence, claim is unsupported");
            return Verdict::unsupported(0.0);
        }

        let service = self.entailment.as_ref();
        let results = join_all(passages.iter().map(|&(idx, premise)| async move {
            (idx, self.pool.classify(service, premise, claim.text()).await)
        }))
        .await;

        let threshold = self.config.verification_threshold;
        let mut supported: Option<(usize, f64)> = None;
        let mut contradicted: Option<(usize, f64)> = None;
        let mut best_entailment = 0.0_f64;
        let mut failures = 0;

        for (idx, result) in results {
            match result {
                Ok(judgment) => {
                    if judgment.label == EntailmentLabel::Entails {
                        best_entailment = best_entailment.max(judgment.score);
                    }
                    if judgment.entails_at(threshold) {
                        keep_best(&mut supported, idx, judgment.score);
                    } else if judgment.contradicts_at(threshold) {
                        keep_best(&mut contradicted, idx, judgment.score);
                    }
                }
                Err(e) => {
                    warn!(ordinal = claim.ordinal(), evidence = idx, "Verification call failed: {}", e);
                    failures += 1;
                }
            }
        }

        if let Some((idx, score)) = supported {
            Verdict::supported(score, idx)
        } else if let Some((idx, score)) = contradicted {
            Verdict::contradicted(score, idx)
        } else if failures > 0 {
            Verdict::unknown()
        } else {
            Verdict::unsupported(best_entailment)
        }
    }

    /// Verify a cluster through its representative; members inherit the verdict
    pub async fn verify(&self, cluster: ClaimCluster, evidence: &Evidence) -> VerifiedCluster {
        let verdict = self.verify_claim(cluster.representative(), evidence).await;
        debug!(
            cluster = cluster.id(),
            size = cluster.size(),
            verdict = %verdict.label,
            "Verified cluster"
        );
        VerifiedCluster::new(cluster, verdict)
    }

    /// Verify all clusters concurrently, preserving order
    pub async fn verify_all(
        &self,
        clusters: Vec<ClaimCluster>,
        evidence: &Evidence,
    ) -> Vec<VerifiedCluster> {
        let verified = join_all(clusters.into_iter().map(|c| self.verify(c, evidence))).await;

        let unknown = verified
            .iter()
            .filter(|v| v.verdict.label == VerdictLabel::Unknown)
            .count();
        info!(
            clusters = verified.len(),
            evidence_passages = evidence.len(),
            unknown,
            "Verification complete"
        );
        verified
    }
}

fn keep_best(slot: &mut Option<(usize, f64)>, idx: usize, score: f64) {
    match slot {
        Some((_, best)) if *best >= score => {}
        _ => *slot = Some((idx, score)),
    }
}
