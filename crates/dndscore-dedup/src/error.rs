//! Error types for the Deduplicator

use thiserror::Error;

/// Invalid input to clustering
///
/// Entailment service failures are not errors here; they degrade the result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DedupError {
    /// Two claims share an ordinal
    #[error("Duplicate claim ordinal: {0}")]
    DuplicateOrdinal(usize),

    /// An edge refers to an ordinal that is not in the claim set
    #[error("Edge refers to unknown claim ordinal: {0}")]
    UnknownOrdinal(usize),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
