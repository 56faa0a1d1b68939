//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DnDScore - Factuality scoring for long-form text.
#[derive(Debug, Parser)]
#[command(name = "dndscore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DNDSCORE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bleached claims file (one generic claim per line); enables per-cluster informativeness
    #[arg(long, global = true, value_name = "FILE")]
    pub bleached_claims: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (score only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score a single passage
    Score(ScoreArgs),

    /// Score every passage of a JSONL file
    Batch(BatchArgs),

    /// Inspect configuration
    Config(ConfigArgs),
}

/// Arguments for the score command.
#[derive(Debug, Parser)]
pub struct ScoreArgs {
    /// Passage text
    #[arg(short, long, conflicts_with = "passage_file")]
    pub passage: Option<String>,

    /// File containing the passage
    #[arg(long)]
    pub passage_file: Option<PathBuf>,

    /// Evidence text (repeatable; each value is one evidence passage)
    #[arg(short, long)]
    pub evidence: Vec<String>,

    /// Evidence file (repeatable; each file is one evidence passage)
    #[arg(long)]
    pub evidence_file: Vec<PathBuf>,

    /// Passage id (generated when omitted)
    #[arg(long)]
    pub id: Option<String>,
}

/// Arguments for the batch command.
#[derive(Debug, Parser)]
pub struct BatchArgs {
    /// JSONL input: one `{"id"?, "passage", "evidence"}` object per line
    #[arg(short, long)]
    pub input: PathBuf,

    /// Write reports as JSONL to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the default configuration
    Default,

    /// Print the configuration file path
    Path,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_score_command() {
        let cli = Cli::parse_from([
            "dndscore",
            "score",
            "--passage",
            "Paris is the capital of France.",
            "-e",
            "first",
            "-e",
            "second",
            "--format",
            "json",
        ]);
        match cli.command {
            Command::Score(args) => {
                assert_eq!(args.passage.as_deref(), Some("Paris is the capital of France."));
                assert_eq!(args.evidence, vec!["first", "second"]);
            }
            _ => panic!("Expected Score command"),
        }
        assert!(matches!(cli.format, Some(CliFormat::Json)));
    }

    #[test]
    fn test_passage_sources_conflict() {
        let result = Cli::try_parse_from([
            "dndscore",
            "score",
            "--passage",
            "text",
            "--passage-file",
            "passage.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_batch_command() {
        let cli = Cli::parse_from(["dndscore", "batch", "-i", "in.jsonl", "-o", "out.jsonl"]);
        match cli.command {
            Command::Batch(args) => {
                assert_eq!(args.input, PathBuf::from("in.jsonl"));
                assert_eq!(args.output, Some(PathBuf::from("out.jsonl")));
            }
            _ => panic!("Expected Batch command"),
        }
    }

    #[test]
    fn test_bleached_claims_flag() {
        let cli = Cli::parse_from([
            "dndscore",
            "score",
            "--passage",
            "text",
            "--bleached-claims",
            "bleached.txt",
        ]);
        assert_eq!(cli.bleached_claims, Some(PathBuf::from("bleached.txt")));

        let cli = Cli::parse_from(["dndscore", "batch", "-i", "in.jsonl"]);
        assert!(cli.bleached_claims.is_none());
    }

    #[test]
    fn test_config_command() {
        let cli = Cli::parse_from(["dndscore", "--no-color", "config", "path"]);
        assert!(cli.no_color);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigArgs {
                action: ConfigAction::Path
            })
        ));
    }
}
