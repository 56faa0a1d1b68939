//! Score report - the single artifact emitted per passage
//!
//! A report is self-describing: its [`PassageStatus`] says whether the passage was
//! scored at all, and its [`Degradation`] list says which stages ran in a degraded
//! mode. A score is never reported without both.

use crate::passage::{Passage, PassageId};
use crate::verdict::{Verdict, VerdictLabel};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Whether and how a passage made it through the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PassageStatus {
    /// All stages ran; the score (possibly null) is meaningful
    Scored,

    /// Decomposition failed; the passage is excluded rather than scored as zero claims
    Undecomposed {
        /// Why decomposition failed
        reason: String,
    },

    /// Scoring was cancelled by a shutdown request
    Cancelled,

    /// The per-passage deadline elapsed before scoring finished
    DeadlineExceeded {
        /// Configured deadline in milliseconds
        deadline_ms: u64,
    },

    /// The scoring task terminated abnormally
    Aborted {
        /// Failure description
        reason: String,
    },
}

impl PassageStatus {
    /// Short lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            PassageStatus::Scored => "scored",
            PassageStatus::Undecomposed { .. } => "undecomposed",
            PassageStatus::Cancelled => "cancelled",
            PassageStatus::DeadlineExceeded { .. } => "deadline_exceeded",
            PassageStatus::Aborted { .. } => "aborted",
        }
    }
}

/// A non-fatal failure that degraded one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// Some claims kept their original text because the rewrite failed
    RewriteDegraded {
        /// Ordinals of the affected claims
        ordinals: Vec<usize>,
    },

    /// Some pairwise entailment queries failed; those edges were treated as absent
    EntailmentServiceUnavailable {
        /// Queries that failed after retry
        failed_queries: usize,
        /// Pairs whose equivalence could not be determined
        undetermined_pairs: usize,
        /// Pairs considered
        total_pairs: usize,
    },

    /// Some clusters could not be verified and were excluded from the denominator
    VerificationUnknown {
        /// Affected cluster ids
        cluster_ids: Vec<usize>,
    },

    /// Too many claims for pairwise deduplication; all clusters are singletons
    ClaimCapExceeded {
        /// Claims in the passage
        claim_count: usize,
        /// Configured cap
        cap: usize,
    },
}

impl Degradation {
    /// Short lowercase name of the degradation kind
    pub fn kind(&self) -> &'static str {
        match self {
            Degradation::RewriteDegraded { .. } => "rewrite_degraded",
            Degradation::EntailmentServiceUnavailable { .. } => "entailment_service_unavailable",
            Degradation::VerificationUnknown { .. } => "verification_unknown",
            Degradation::ClaimCapExceeded { .. } => "claim_cap_exceeded",
        }
    }
}

/// Number of clusters per verdict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictCounts {
    /// Supported clusters
    pub supported: usize,
    /// Unsupported clusters
    pub unsupported: usize,
    /// Contradicted clusters
    pub contradicted: usize,
    /// Unknown clusters
    pub unknown: usize,
}

impl VerdictCounts {
    /// Count one more verdict
    pub fn record(&mut self, label: VerdictLabel) {
        match label {
            VerdictLabel::Supported => self.supported += 1,
            VerdictLabel::Unsupported => self.unsupported += 1,
            VerdictLabel::Contradicted => self.contradicted += 1,
            VerdictLabel::Unknown => self.unknown += 1,
        }
    }

    /// Total counted verdicts
    pub fn total(&self) -> usize {
        self.supported + self.unsupported + self.contradicted + self.unknown
    }

    /// Verdicts that count towards the score denominator
    pub fn decided(&self) -> usize {
        self.total() - self.unknown
    }
}

/// Provenance for one claim: passage sentence -> decomposed text -> rewrite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Emission position from the Decomposer
    pub ordinal: usize,
    /// Self-contained claim text
    pub text: String,
    /// Text before decontextualization
    pub contextual_text: Option<String>,
    /// Passage sentence the claim came from
    pub sentence: String,
    /// Whether the rewrite fell back to the original text
    pub rewrite_degraded: bool,
}

/// One cluster with its verdict and membership
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterReport {
    /// Cluster id within the passage
    pub cluster_id: usize,
    /// Ordinal of the verified representative
    pub representative_ordinal: usize,
    /// Number of members
    pub size: usize,
    /// Verdict inherited by every member
    pub verdict: Verdict,
    /// `-ln` of the strongest entailment of the representative by a generic
    /// (bleached) claim; `None` when no bleached claims are configured
    #[serde(default)]
    pub informativeness: Option<f64>,
    /// Members in ordinal order
    pub members: Vec<ClaimRecord>,
}

/// Final result for one passage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Source identifier of the passage
    pub passage_id: PassageId,

    /// Original passage text
    pub passage_text: String,

    /// Whether the passage was scored
    #[serde(flatten)]
    pub status: PassageStatus,

    /// `supported / (clusters - unknown)`, null when that denominator is zero
    pub score: Option<f64>,

    /// Same ratio over claim mentions instead of unique clusters (informational)
    pub mention_weighted_score: Option<f64>,

    /// Number of decomposed claims
    pub claim_count: usize,

    /// Number of clusters
    pub cluster_count: usize,

    /// Clusters per verdict
    pub verdicts: VerdictCounts,

    /// Per-cluster verdicts and membership
    pub clusters: Vec<ClusterReport>,

    /// Stages that ran in a degraded mode
    pub degradations: Vec<Degradation>,

    /// Wall-clock time spent on the passage
    pub elapsed_ms: u64,

    /// When the report was produced (seconds since Unix epoch)
    pub generated_at: u64,
}

impl ScoreReport {
    /// Report for a passage that produced no clusters because of `status`
    pub fn unscored(passage: &Passage, status: PassageStatus) -> Self {
        Self {
            passage_id: passage.id().clone(),
            passage_text: passage.text().to_string(),
            status,
            score: None,
            mention_weighted_score: None,
            claim_count: 0,
            cluster_count: 0,
            verdicts: VerdictCounts::default(),
            clusters: Vec::new(),
            degradations: Vec::new(),
            elapsed_ms: 0,
            generated_at: current_timestamp(),
        }
    }

    /// Set the elapsed time
    pub fn with_elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    /// True when every stage ran and none degraded
    pub fn is_clean(&self) -> bool {
        self.status == PassageStatus::Scored && self.degradations.is_empty()
    }

    /// Look up a degradation by kind name
    pub fn degradation(&self, kind: &str) -> Option<&Degradation> {
        self.degradations.iter().find(|d| d.kind() == kind)
    }

    /// Cluster containing the claim with this ordinal
    pub fn cluster_of(&self, ordinal: usize) -> Option<&ClusterReport> {
        self.clusters
            .iter()
            .find(|c| c.members.iter().any(|m| m.ordinal == ordinal))
    }

    /// Verdict that applies to the claim with this ordinal
    pub fn verdict_for(&self, ordinal: usize) -> Option<&Verdict> {
        self.cluster_of(ordinal).map(|c| &c.verdict)
    }
}

/// Current timestamp in seconds since Unix epoch
pub(crate) fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unscored_report() {
        let passage = Passage::new(PassageId::new("p"), "text");
        let report = ScoreReport::unscored(
            &passage,
            PassageStatus::Undecomposed {
                reason: "empty".to_string(),
            },
        );
        assert!(report.score.is_none());
        assert!(!report.is_clean());
        assert_eq!(report.status.as_str(), "undecomposed");
    }

    #[test]
    fn test_verdict_counts() {
        let mut counts = VerdictCounts::default();
        counts.record(VerdictLabel::Supported);
        counts.record(VerdictLabel::Unknown);
        counts.record(VerdictLabel::Contradicted);
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.decided(), 2);
    }

    #[test]
    fn test_status_flattened_into_report_json() {
        let passage = Passage::new(PassageId::new("p"), "text");
        let report = ScoreReport::unscored(&passage, PassageStatus::DeadlineExceeded { deadline_ms: 5 });
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "deadline_exceeded");
        assert_eq!(json["deadline_ms"], 5);
        assert!(json["score"].is_null());
    }

    #[test]
    fn test_degradation_tagging() {
        let d = Degradation::ClaimCapExceeded { claim_count: 80, cap: 64 };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["kind"], "claim_cap_exceeded");
        assert_eq!(d.kind(), "claim_cap_exceeded");
    }
}
