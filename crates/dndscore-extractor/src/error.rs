//! Error types for the extraction stages

use dndscore_domain::GenerationFailure;
use thiserror::Error;

/// Decomposition failures
///
/// Any of these excludes the passage from scoring with an "undecomposed" status.
/// The Decontextualizer never fails; it degrades per claim instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractorError {
    /// Passage is empty or whitespace
    #[error("Passage is empty")]
    EmptyPassage,

    /// Passage exceeds maximum length
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// Generation failed for one sentence after all retries
    #[error("Decomposition of sentence {sentence} failed: {source}")]
    Generation {
        /// Index of the sentence within the passage
        sentence: usize,
        /// Last failure
        source: GenerationFailure,
    },

    /// The passage produced no claims at all
    #[error("Decomposition produced no claims")]
    NoClaims,

    /// Model output could not be read as a claim list
    #[error("Invalid claim format: {0}")]
    InvalidFormat(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
