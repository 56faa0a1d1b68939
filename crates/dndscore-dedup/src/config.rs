//! Deduplicator configuration

use serde::{Deserialize, Serialize};

/// Configuration for the Deduplicator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Minimum `entails` score, required in both directions, for two claims to be equivalent
    pub entailment_threshold: f64,

    /// Passages with more claims skip deduplication (all singletons)
    pub max_claims_per_passage: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            entailment_threshold: 0.5,
            max_claims_per_passage: 64,
        }
    }
}

impl DedupConfig {
    /// Number of pairwise queries needed for `n` claims
    pub fn queries_for(n: usize) -> usize {
        n.saturating_sub(1) * n
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.entailment_threshold) {
            return Err(format!(
                "entailment_threshold must be in [0.0, 1.0], got {}",
                self.entailment_threshold
            ));
        }
        if self.max_claims_per_passage == 0 {
            return Err("max_claims_per_passage must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DedupConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.entailment_threshold, 0.5);
    }

    #[test]
    fn test_invalid_threshold() {
        let config = DedupConfig {
            entailment_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = DedupConfig {
            entailment_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_queries_for() {
        assert_eq!(DedupConfig::queries_for(0), 0);
        assert_eq!(DedupConfig::queries_for(1), 0);
        assert_eq!(DedupConfig::queries_for(4), 12);
    }
}
