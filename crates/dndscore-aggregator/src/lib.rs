//! DnDScore Aggregator
//!
//! Turns verified clusters into the final [`ScoreReport`](dndscore_domain::ScoreReport).
//!
//! The score is precision-style over unique clusters:
//!
//! ```text
//! score = supported / (clusters - unknown)      (null when the denominator is 0)
//! ```
//!
//! Cluster sizes are reported but do not weight the score; a mention-weighted
//! variant is included for frequency-sensitive analyses. [`summarize`] rolls a
//! batch of reports up into the dataset-level mean.

#![warn(missing_docs)]

mod score;
mod summary;

pub use score::{aggregate, count_verdicts, mention_weighted_score, score};
pub use summary::{summarize, BatchSummary};
