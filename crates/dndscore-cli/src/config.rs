//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use dndscore_pipeline::{ScoringConfig, ServiceConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Model service locations
    #[serde(default)]
    pub services: ServiceConfig,

    /// Scoring parameters
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (score only) format
    Quiet,
}

impl Config {
    /// Default configuration file path (`~/.dndscore/config.toml`).
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".dndscore").join("config.toml"))
    }

    /// Load configuration from `path`.
    ///
    /// A missing file yields the defaults unless `required` is set, which is
    /// the case for a path given explicitly on the command line.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        if !path.exists() {
            if required {
                return Err(CliError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Validate service and scoring sections.
    pub fn validate(&self) -> Result<()> {
        self.services.validate()?;
        self.scoring.validate()?;
        Ok(())
    }
}

/// Read a bleached claims file: one claim per line, blank lines skipped.
pub fn load_bleached_claims(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path).map_err(|e| {
        CliError::Config(format!(
            "Could not read bleached claims file {}: {}",
            path.display(),
            e
        ))
    })?;
    let claims: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if claims.is_empty() {
        return Err(CliError::Config(format!(
            "Bleached claims file {} has no claims",
            path.display()
        )));
    }
    Ok(claims)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert_eq!(config.scoring.entailment_threshold, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_path() {
        let path = Config::default_path().unwrap();
        assert!(path.ends_with(".dndscore/config.toml"));
    }

    #[test]
    fn test_missing_optional_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("config.toml"), false).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_required_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(&dir.path().join("config.toml"), true);
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.scoring.max_claims_per_passage = 32;
        config.services.generation_model = "mistral".to_string();
        config.settings.format = OutputFormat::Json;
        config.save(&path).unwrap();

        let loaded = Config::load(&path, true).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_sections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[scoring]\nentailment_threshold = 0.8\n\n[settings]\ncolor = false\n",
        )
        .unwrap();

        let config = Config::load(&path, true).unwrap();
        assert_eq!(config.scoring.entailment_threshold, 0.8);
        assert_eq!(config.scoring.concurrency, 4);
        assert!(!config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert_eq!(config.services, ServiceConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[scoring]\nconcurrency = 0\n").unwrap();

        assert!(matches!(
            Config::load(&path, true),
            Err(CliError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_bleached_claims() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bleached.txt");
        fs::write(&path, "He is a person.

  He was born somewhere.  
").unwrap();

        let claims = load_bleached_claims(&path).unwrap();
        assert_eq!(claims, vec!["He is a person.", "He was born somewhere."]);
    }

    #[test]
    fn test_load_bleached_claims_errors() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("empty.txt");
        fs::write(&empty, "\n  \n").unwrap();

        assert!(matches!(load_bleached_claims(&empty), Err(CliError::Config(_))));
        assert!(matches!(
            load_bleached_claims(&dir.path().join("missing.txt")),
            Err(CliError::Config(_))
        ));
    }
}
