//! DnDScore Domain Layer
//!
//! This crate contains the data model shared by every stage of the DnDScore
//! factuality pipeline, together with the trait interfaces for the two external
//! collaborators (text generation and entailment classification).
//!
//! ## Key Concepts
//!
//! - **Passage**: The immutable input text being scored
//! - **Claim**: An atomic factual statement decomposed from a passage
//! - **ClaimCluster**: A set of claims judged mutually equivalent
//! - **Verdict**: The outcome of checking a cluster representative against evidence
//! - **ScoreReport**: The self-describing result for one passage
//!
//! ## Stage ownership
//!
//! Every attribute has exactly one writing stage:
//!
//! ```text
//! Decomposer ──► Decontextualizer ──► Deduplicator ──► Verifier ──► Aggregator
//!  (creates)      (rewrites text)     (clusters)       (verdicts)    (read-only)
//! ```
//!
//! Claim fields are private; the only mutators are the ones the
//! Decontextualizer uses, and ownership is handed from stage to stage.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod claim;
pub mod cluster;
pub mod entailment;
pub mod passage;
pub mod report;
pub mod traits;
pub mod verdict;

// Re-exports for convenience
pub use claim::Claim;
pub use cluster::ClaimCluster;
pub use entailment::{EntailmentJudgment, EntailmentLabel, EquivalenceEdge};
pub use passage::{Passage, PassageId};
pub use report::{
    ClaimRecord, ClusterReport, Degradation, PassageStatus, ScoreReport, VerdictCounts,
};
pub use traits::{
    EntailmentFailure, EntailmentService, GenerationFailure, GenerationOptions,
    TextGenerationService,
};
pub use verdict::{Verdict, VerdictLabel, VerifiedCluster};
