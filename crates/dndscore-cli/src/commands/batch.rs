//! Batch command implementation.

use crate::cli::BatchArgs;
use crate::config::OutputFormat;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use dndscore_domain::{Passage, PassageId, ScoreReport};
use dndscore_pipeline::{Evidence, Pipeline, PipelineMetrics, ScoreRequest};
use serde::Deserialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::sync::Arc;

/// Execute the batch command.
pub async fn execute_batch(
    args: BatchArgs,
    pipeline: &Arc<Pipeline>,
    formatter: &Formatter,
) -> Result<()> {
    let input = fs::read_to_string(&args.input)?;
    let requests = parse_batch_input(&input)?;

    if requests.is_empty() {
        return Err(CliError::InvalidInput(format!(
            "No passages found in {}",
            args.input.display()
        )));
    }

    let reports = pipeline.score_batch(requests).await;
    let metrics = PipelineMetrics::from_reports(&reports);

    match &args.output {
        Some(path) => {
            let file = fs::File::create(path)?;
            write_reports_jsonl(BufWriter::new(file), &reports)?;
            eprintln!(
                "{}",
                formatter.success(&format!(
                    "Wrote {} report(s) to {}",
                    reports.len(),
                    path.display()
                ))
            );
        }
        None => println!("{}", formatter.format_reports(&reports)?),
    }

    // JSON reports on stdout stay machine-readable; the summary goes to stderr
    let summary = formatter.format_summary(&metrics)?;
    if formatter.format() == OutputFormat::Json && args.output.is_none() {
        eprintln!("{}", summary);
    } else {
        println!("{}", summary);
    }

    Ok(())
}

/// One input line.
#[derive(Debug, Deserialize)]
struct BatchLine {
    #[serde(default)]
    id: Option<String>,
    passage: String,
    #[serde(default)]
    evidence: Evidence,
}

/// Parse JSONL input; blank lines are skipped.
///
/// Lines without an `id` are named after their line number (`line-3`).
pub fn parse_batch_input(input: &str) -> Result<Vec<ScoreRequest>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            let parsed: BatchLine = serde_json::from_str(line).map_err(|e| {
                CliError::InvalidInput(format!("Line {}: {}", idx + 1, e))
            })?;
            let id = parsed.id.unwrap_or_else(|| format!("line-{}", idx + 1));
            Ok(ScoreRequest::new(
                Passage::new(PassageId::new(id), parsed.passage),
                parsed.evidence,
            ))
        })
        .collect()
}

/// Write one JSON report per line.
pub fn write_reports_jsonl<W: Write>(mut writer: W, reports: &[ScoreReport]) -> Result<()> {
    for report in reports {
        serde_json::to_writer(&mut writer, report)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dndscore_domain::PassageStatus;

    #[test]
    fn test_parse_batch_input() {
        let input = r#"{"id": "a", "passage": "Paris is in France.", "evidence": "France contains Paris."}

{"passage": "It rains.", "evidence": ["one", "two"]}
{"passage": "No evidence here."}
"#;
        let requests = parse_batch_input(input).unwrap();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].passage.id().as_str(), "a");
        assert_eq!(requests[1].passage.id().as_str(), "line-3");
        assert_eq!(requests[1].evidence.len(), 2);
        assert!(requests[2].evidence.is_empty());
    }

    #[test]
    fn test_parse_error_names_line() {
        let input = "{\"passage\": \"ok\"}\n{\"evidence\": \"no passage\"}\n";
        let err = parse_batch_input(input).unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn test_write_reports_jsonl() {
        let passage = Passage::new(PassageId::new("p"), "text");
        let reports = vec![
            ScoreReport::unscored(&passage, PassageStatus::Cancelled),
            ScoreReport::unscored(&passage, PassageStatus::Scored),
        ];

        let mut buffer = Vec::new();
        write_reports_jsonl(&mut buffer, &reports).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["status"], "cancelled");
    }
}
