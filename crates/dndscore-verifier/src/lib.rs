//! DnDScore Verifier
//!
//! Checks each cluster representative against evidence with the entailment
//! service and attaches a [`Verdict`](dndscore_domain::Verdict) to the cluster.
//!
//! | Evidence judgment                       | Verdict        |
//! |-----------------------------------------|----------------|
//! | `entails` at or above the threshold     | `supported`    |
//! | `contradicts` at or above the threshold | `contradicted` |
//! | anything else                           | `unsupported`  |
//! | call failed after retry                 | `unknown`      |
//!
//! `unknown` is never folded into another verdict; the Aggregator keeps it out
//! of the score denominator.

#![warn(missing_docs)]

mod evidence;
mod verifier;

pub use evidence::Evidence;
pub use verifier::{Verifier, VerifierConfig};
