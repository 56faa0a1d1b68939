//! DnDScore Deduplicator
//!
//! Partitions the decontextualized claims of a passage into clusters of
//! semantically equivalent claims, so that a fact repeated three times is
//! verified (and counted) once.
//!
//! # Algorithm
//!
//! 1. Every unordered pair is checked in both directions with the entailment service
//! 2. A pair is equivalent only when both directions `entail` at or above the threshold
//! 3. Equivalent pairs are merged with union-find; each connected component is a cluster
//! 4. The lowest-ordinal member represents its cluster
//!
//! Connected components make equivalence transitive even when the oracle is not,
//! which biases toward over-merging.
//!
//! # Degraded modes
//!
//! - Passages above `max_claims_per_passage` skip the O(n²) queries; every claim is a singleton
//! - Failed queries leave edges absent; the run still completes and reports the counts
//!
//! # Informativeness
//!
//! [`InformativenessScorer`] weighs each representative against a list of
//! bleached (generic) claims as `-ln(min P(bleached ⇒ claim))`. It is reported
//! per cluster and leaves the partition untouched.
//!
//! # Examples
//!
//! ```
//! use dndscore_dedup::cluster_claims;
//! use dndscore_domain::{Claim, PassageId};
//!
//! let p = PassageId::new("p");
//! let claims = vec![
//!     Claim::new("Paris is in France", p.clone(), 0, "s"),
//!     Claim::new("Paris is the capital of France", p.clone(), 1, "s"),
//!     Claim::new("Paris is located in France", p, 2, "s"),
//! ];
//!
//! let clusters = cluster_claims(claims, &[(0, 2)]).unwrap();
//! assert_eq!(clusters.len(), 2);
//! assert_eq!(clusters[0].ordinals(), vec![0, 2]);
//! ```

#![warn(missing_docs)]

mod config;
mod deduplicator;
mod error;
mod informativeness;
mod union_find;

pub use config::DedupConfig;
pub use deduplicator::{
    cluster_claims, equivalences_from_edges, DedupOutcome, DedupStats, Deduplicator,
};
pub use error::DedupError;
pub use informativeness::{informativeness, InformativenessScorer};
pub use union_find::DisjointSet;
