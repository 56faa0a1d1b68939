//! Verification verdicts

use crate::cluster::ClaimCluster;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of checking a cluster representative against evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictLabel {
    /// Evidence entails the claim
    Supported,

    /// Evidence neither entails nor contradicts the claim with enough confidence
    Unsupported,

    /// Evidence contradicts the claim
    Contradicted,

    /// The entailment service could not be reached; excluded from the score denominator
    Unknown,
}

impl VerdictLabel {
    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictLabel::Supported => "supported",
            VerdictLabel::Unsupported => "unsupported",
            VerdictLabel::Contradicted => "contradicted",
            VerdictLabel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict attached to a cluster representative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Outcome
    pub label: VerdictLabel,

    /// Evidence score backing the outcome (`None` for unknown)
    pub score: Option<f64>,

    /// Index of the evidence passage that decided the outcome, if any
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub evidence_index: Option<usize>,
}

impl Verdict {
    /// Supported by evidence passage `evidence_index` with `score`
    pub fn supported(score: f64, evidence_index: usize) -> Self {
        Self {
            label: VerdictLabel::Supported,
            score: Some(score),
            evidence_index: Some(evidence_index),
        }
    }

    /// Contradicted by evidence passage `evidence_index` with `score`
    pub fn contradicted(score: f64, evidence_index: usize) -> Self {
        Self {
            label: VerdictLabel::Contradicted,
            score: Some(score),
            evidence_index: Some(evidence_index),
        }
    }

    /// Not supported; `score` is the best entailment score seen
    pub fn unsupported(score: f64) -> Self {
        Self {
            label: VerdictLabel::Unsupported,
            score: Some(score),
            evidence_index: None,
        }
    }

    /// Verification could not complete
    pub fn unknown() -> Self {
        Self {
            label: VerdictLabel::Unknown,
            score: None,
            evidence_index: None,
        }
    }

    /// True for the distinguished unknown state
    pub fn is_unknown(&self) -> bool {
        self.label == VerdictLabel::Unknown
    }
}

/// A cluster together with the verdict of its representative
///
/// Every member inherits this verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedCluster {
    /// The deduplicated cluster
    pub cluster: ClaimCluster,

    /// Verdict of the representative
    pub verdict: Verdict,

    /// Informativeness of the representative, when it was computed
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub informativeness: Option<f64>,
}

impl VerifiedCluster {
    /// Attach a verdict to a cluster
    pub fn new(cluster: ClaimCluster, verdict: Verdict) -> Self {
        Self {
            cluster,
            verdict,
            informativeness: None,
        }
    }

    /// Attach the representative's informativeness
    pub fn with_informativeness(mut self, informativeness: Option<f64>) -> Self {
        self.informativeness = informativeness;
        self
    }

    /// Verdict for the member with this ordinal, if it belongs to the cluster
    pub fn verdict_for(&self, ordinal: usize) -> Option<&Verdict> {
        self.cluster.contains(ordinal).then_some(&self.verdict)
    }
}
