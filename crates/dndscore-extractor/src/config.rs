//! Configuration for decomposition and decontextualization

use dndscore_domain::GenerationOptions;
use serde::{Deserialize, Serialize};

/// Configuration for the Decomposer and Decontextualizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum passage length (characters)
    pub max_text_length: usize,

    /// Token budget for one sentence decomposition
    pub decompose_max_tokens: u32,

    /// Sampling temperature for decomposition
    pub decompose_temperature: f32,

    /// Token budget for one rewrite
    pub decontext_max_tokens: u32,

    /// Sampling temperature for rewrites
    pub decontext_temperature: f32,

    /// Stop sequences for rewrites
    pub decontext_stop: Vec<String>,
}

impl ExtractorConfig {
    /// Generation options for decomposition requests
    pub fn decomposition_options(&self) -> GenerationOptions {
        GenerationOptions {
            max_tokens: Some(self.decompose_max_tokens),
            temperature: Some(self.decompose_temperature),
            stop: Vec::new(),
        }
    }

    /// Generation options for rewrite requests
    pub fn decontext_options(&self) -> GenerationOptions {
        GenerationOptions {
            max_tokens: Some(self.decontext_max_tokens),
            temperature: Some(self.decontext_temperature),
            stop: self.decontext_stop.clone(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.decompose_max_tokens == 0 || self.decontext_max_tokens == 0 {
            return Err("token budgets must be greater than 0".to_string());
        }
        for (name, t) in [
            ("decompose_temperature", self.decompose_temperature),
            ("decontext_temperature", self.decontext_temperature),
        ] {
            if !(0.0..=2.0).contains(&t) {
                return Err(format!("{} must be in [0.0, 2.0], got {}", name, t));
            }
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_text_length: 50_000,
            decompose_max_tokens: 512,
            decompose_temperature: 0.0,
            decontext_max_tokens: 100,
            decontext_temperature: 0.3,
            decontext_stop: vec!["\n".to_string()],
        }
    }
}
