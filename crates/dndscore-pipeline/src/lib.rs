//! DnDScore Pipeline
//!
//! Runs a passage through every stage and turns whatever happens into a
//! [`ScoreReport`](dndscore_domain::ScoreReport):
//!
//! ```text
//! Decomposer -> Decontextualizer -> Deduplicator -> Verifier -> Aggregator
//! ```
//!
//! # Failure handling
//!
//! | Failure                                  | Outcome                                  |
//! |------------------------------------------|------------------------------------------|
//! | Decomposition fails after retry          | status `undecomposed`, null score        |
//! | A rewrite fails                          | original text kept, `rewrite_degraded`   |
//! | Entailment queries fail during dedup     | edges absent, `entailment_service_unavailable` |
//! | Too many claims for pairwise dedup       | singletons, `claim_cap_exceeded`         |
//! | Verification fails                       | verdict `unknown`, `verification_unknown`|
//! | Passage deadline elapses                 | status `deadline_exceeded`               |
//! | Shutdown requested                       | status `cancelled`                       |
//!
//! # Configuration
//!
//! ```toml
//! entailment_threshold = 0.5
//! verification_threshold = 0.7
//! max_claims_per_passage = 64
//! concurrency = 4
//! call_timeout_secs = 60
//! passage_deadline_secs = 600
//! max_text_length = 50000
//!
//! [retry]
//! max_attempts = 3
//! backoff_base_ms = 500
//! max_backoff_ms = 8000
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod metrics;
mod pipeline;
mod services;
mod shutdown;

pub use config::{ScoringConfig, ServiceConfig};
pub use error::{ConfigError, PipelineError};
pub use metrics::PipelineMetrics;
pub use pipeline::{score, Pipeline, ScoreRequest};
pub use services::Services;
pub use shutdown::{ShutdownHandle, ShutdownSignal};

pub use dndscore_aggregator::{summarize, BatchSummary};
pub use dndscore_verifier::Evidence;
