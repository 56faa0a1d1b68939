//! DnDScore Extractor
//!
//! The first two pipeline stages: turning a passage into atomic claims and
//! making each claim self-contained.
//!
//! # Architecture
//!
//! ```text
//! Passage → sentences → Decomposer → LLM → Claims → Decontextualizer → LLM → Claims
//! ```
//!
//! # Key Features
//!
//! - **Sentence-level decomposition**: Unicode sentence segmentation, one request per sentence,
//!   the whole passage as context
//! - **Tolerant parsing**: JSON arrays, fenced JSON, JSON in prose, bulleted lists
//! - **Never silent**: a passage that cannot be decomposed is an error, not zero claims
//! - **Degrade, don't fail**: a failed rewrite keeps the original text and flags the claim
//!
//! # Example Usage
//!
//! ```no_run
//! use dndscore_extractor::{Decomposer, Decontextualizer, ExtractorConfig};
//! use dndscore_domain::Passage;
//! use dndscore_llm::{MockGenerator, WorkerPool};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let generator = Arc::new(MockGenerator::new(r#"["Paris is the capital of France"]"#));
//! let pool = WorkerPool::default();
//!
//! let decomposer = Decomposer::new(generator.clone(), pool.clone(), ExtractorConfig::default());
//! let decontextualizer = Decontextualizer::new(generator, pool, ExtractorConfig::default());
//!
//! let passage = Passage::with_generated_id("Paris is the capital of France.");
//! let claims = decomposer.decompose(&passage).await?;
//! let claims = decontextualizer.decontextualize_all(claims, &passage).await;
//!
//! println!("{} claims", claims.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod decomposer;
mod decontextualizer;
mod error;
mod parser;
mod prompt;
mod segment;

pub use config::ExtractorConfig;
pub use decomposer::Decomposer;
pub use decontextualizer::Decontextualizer;
pub use error::ExtractorError;
pub use parser::{parse_claim_list, parse_rewrite};
pub use prompt::{DecompositionPromptBuilder, DecontextPromptBuilder};
pub use segment::segment_sentences;
