//! Scoring and service configuration
//!
//! [`ScoringConfig`] holds every tunable of a scoring run and fans out into
//! the per-stage configs. [`ServiceConfig`] says where the model services live.

use crate::error::ConfigError;
use dndscore_dedup::DedupConfig;
use dndscore_extractor::ExtractorConfig;
use dndscore_llm::{RetryPolicy, WorkerPool};
use dndscore_verifier::VerifierConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for a scoring run
///
/// # Examples
///
/// ```
/// use dndscore_pipeline::ScoringConfig;
///
/// let config = ScoringConfig::default();
/// assert_eq!(config.entailment_threshold, 0.5);
/// assert_eq!(config.concurrency, 4);
///
/// // More parallel, less patient
/// let config = ScoringConfig::aggressive();
/// assert_eq!(config.concurrency, 8);
///
/// // Fewer slots, more retries, longer deadlines
/// let config = ScoringConfig::lenient();
/// assert_eq!(config.retry.max_attempts, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Minimum `entails` score, in both directions, for two claims to be equivalent
    /// Default: 0.5
    pub entailment_threshold: f64,

    /// Minimum score for evidence to support or contradict a claim
    /// Default: 0.7
    pub verification_threshold: f64,

    /// Passages with more claims skip deduplication
    /// Default: 64 (4032 entailment queries)
    pub max_claims_per_passage: usize,

    /// Concurrent model calls across all passages
    /// Default: 4
    pub concurrency: usize,

    /// Timeout for a single model call attempt (seconds)
    /// Default: 60
    pub call_timeout_secs: u64,

    /// Wall-clock budget for one passage (seconds)
    /// Default: 600
    pub passage_deadline_secs: u64,

    /// Longest passage accepted (characters)
    /// Default: 50,000
    pub max_text_length: usize,

    /// Generic claims used to weigh each cluster representative's informativeness
    /// Default: empty (informativeness is not computed)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bleached_claims: Vec<String>,

    /// Backoff for failed model calls
    pub retry: RetryPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            entailment_threshold: 0.5,
            verification_threshold: 0.7,
            max_claims_per_passage: 64,
            concurrency: 4,
            call_timeout_secs: 60,
            passage_deadline_secs: 600,
            max_text_length: 50_000,
            bleached_claims: Vec::new(),
            retry: RetryPolicy::default(),
        }
    }
}

impl ScoringConfig {
    /// High-throughput configuration for fast local services
    ///
    /// - Concurrency: 8
    /// - Retries: 2 attempts
    /// - Call timeout: 30s, passage deadline: 300s
    pub fn aggressive() -> Self {
        Self {
            concurrency: 8,
            retry: RetryPolicy {
                max_attempts: 2,
                backoff_base_ms: 250,
                max_backoff_ms: 2_000,
            },
            call_timeout_secs: 30,
            passage_deadline_secs: 300,
            ..Self::default()
        }
    }

    /// Patient configuration for slow or flaky services
    ///
    /// - Concurrency: 2
    /// - Retries: 5 attempts
    /// - Call timeout: 120s, passage deadline: 1800s
    pub fn lenient() -> Self {
        Self {
            concurrency: 2,
            retry: RetryPolicy {
                max_attempts: 5,
                backoff_base_ms: 1_000,
                max_backoff_ms: 30_000,
            },
            call_timeout_secs: 120,
            passage_deadline_secs: 1_800,
            ..Self::default()
        }
    }

    /// Timeout for one call attempt
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Budget for one passage
    pub fn passage_deadline(&self) -> Duration {
        Duration::from_secs(self.passage_deadline_secs)
    }

    /// Decomposer and Decontextualizer settings
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            max_text_length: self.max_text_length,
            ..ExtractorConfig::default()
        }
    }

    /// Deduplicator settings
    pub fn dedup_config(&self) -> DedupConfig {
        DedupConfig {
            entailment_threshold: self.entailment_threshold,
            max_claims_per_passage: self.max_claims_per_passage,
        }
    }

    /// Verifier settings
    pub fn verifier_config(&self) -> VerifierConfig {
        VerifierConfig {
            verification_threshold: self.verification_threshold,
        }
    }

    /// A fresh worker pool sized and timed by this config
    pub fn worker_pool(&self) -> WorkerPool {
        WorkerPool::new(self.concurrency, self.retry, self.call_timeout())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be greater than 0".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".into()));
        }
        if self.retry.max_backoff_ms < self.retry.backoff_base_ms {
            return Err(ConfigError::Invalid(
                "retry.max_backoff_ms must not be below retry.backoff_base_ms".into(),
            ));
        }
        if self.call_timeout_secs == 0 || self.passage_deadline_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be greater than 0".into()));
        }
        if let Some(idx) = self.bleached_claims.iter().position(|b| b.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "bleached_claims[{}] must not be blank",
                idx
            )));
        }
        self.dedup_config().validate().map_err(ConfigError::Invalid)?;
        self.verifier_config().validate().map_err(ConfigError::Invalid)?;
        self.extractor_config().validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Toml(e.to_string()))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Toml(e.to_string()))
    }

    /// Load and validate configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml(&contents)?;
        config.validate()?;
        Ok(config)
    }
}

/// Where the model services live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Ollama base URL
    pub generation_endpoint: String,

    /// Ollama model used for decomposition and rewrites
    pub generation_model: String,

    /// HTTP timeout for generation requests (seconds)
    pub generation_timeout_secs: u64,

    /// NLI classification URL
    pub entailment_endpoint: String,

    /// NLI model name (informational)
    pub entailment_model: String,

    /// HTTP timeout for classification requests (seconds)
    pub entailment_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            generation_endpoint: "http://localhost:11434".to_string(),
            generation_model: "llama3.1".to_string(),
            generation_timeout_secs: 120,
            entailment_endpoint: "http://localhost:8080/classify".to_string(),
            entailment_model: "roberta-large-mnli".to_string(),
            entailment_timeout_secs: 30,
        }
    }
}

impl ServiceConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, url) in [
            ("generation_endpoint", &self.generation_endpoint),
            ("entailment_endpoint", &self.entailment_endpoint),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }
        if self.generation_model.trim().is_empty() {
            return Err(ConfigError::Invalid("generation_model must not be empty".into()));
        }
        if self.generation_timeout_secs == 0 || self.entailment_timeout_secs == 0 {
            return Err(ConfigError::Invalid("service timeouts must be greater than 0".into()));
        }
        Ok(())
    }
}
