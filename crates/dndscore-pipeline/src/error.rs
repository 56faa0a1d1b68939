//! Error types for pipeline setup

use thiserror::Error;

/// Configuration loading and validation failures
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// File path
        path: String,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// TOML could not be parsed or produced
    #[error("Invalid TOML: {0}")]
    Toml(String),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that can occur while building or running the pipeline
///
/// Scoring itself never fails: every passage yields a report. These errors
/// cover wiring the pipeline together.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A service client could not be set up
    #[error("Service setup failed: {0}")]
    Services(String),
}
