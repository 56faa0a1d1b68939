//! Entailment judgments and the directed edges built from them

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label returned by an entailment (NLI) classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntailmentLabel {
    /// The premise entails the hypothesis
    Entails,

    /// The premise contradicts the hypothesis
    Contradicts,

    /// Neither entailment nor contradiction
    Neutral,
}

impl EntailmentLabel {
    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            EntailmentLabel::Entails => "entails",
            EntailmentLabel::Contradicts => "contradicts",
            EntailmentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for EntailmentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntailmentLabel {
    type Err = String;

    /// Accepts both the verb form and the MNLI class names, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "entails" | "entailment" | "entailed" => Ok(EntailmentLabel::Entails),
            "contradicts" | "contradiction" | "contradicted" => Ok(EntailmentLabel::Contradicts),
            "neutral" => Ok(EntailmentLabel::Neutral),
            other => Err(format!("Unknown entailment label: {}", other)),
        }
    }
}

/// A single classifier output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntailmentJudgment {
    /// Predicted label
    pub label: EntailmentLabel,

    /// Classifier confidence in [0.0, 1.0]
    pub score: f64,
}

impl EntailmentJudgment {
    /// Create a judgment, clamping the score into [0.0, 1.0]
    pub fn new(label: EntailmentLabel, score: f64) -> Self {
        let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
        Self { label, score }
    }

    /// Shorthand for an `entails` judgment
    pub fn entails(score: f64) -> Self {
        Self::new(EntailmentLabel::Entails, score)
    }

    /// Shorthand for a `contradicts` judgment
    pub fn contradicts(score: f64) -> Self {
        Self::new(EntailmentLabel::Contradicts, score)
    }

    /// Shorthand for a `neutral` judgment
    pub fn neutral(score: f64) -> Self {
        Self::new(EntailmentLabel::Neutral, score)
    }

    /// True when the label is `entails` with at least `threshold` confidence
    pub fn entails_at(&self, threshold: f64) -> bool {
        self.label == EntailmentLabel::Entails && self.score >= threshold
    }

    /// True when the label is `contradicts` with at least `threshold` confidence
    pub fn contradicts_at(&self, threshold: f64) -> bool {
        self.label == EntailmentLabel::Contradicts && self.score >= threshold
    }

    /// Probability mass on `entails`
    ///
    /// For any other label only the winning score is known, so the remaining
    /// `1 - score` bounds the entailment probability.
    pub fn entailment_probability(&self) -> f64 {
        match self.label {
            EntailmentLabel::Entails => self.score,
            EntailmentLabel::Contradicts | EntailmentLabel::Neutral => 1.0 - self.score,
        }
    }
}

/// Directed pairwise judgment between two claims of the same passage
///
/// Only lives while clusters are being built; claims are referenced by ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquivalenceEdge {
    /// Ordinal of the premise claim
    pub from: usize,

    /// Ordinal of the hypothesis claim
    pub to: usize,

    /// Classifier output for `from` ⊨ `to`
    pub judgment: EntailmentJudgment,
}
