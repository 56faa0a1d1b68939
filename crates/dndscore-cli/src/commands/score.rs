//! Score command implementation.

use crate::cli::ScoreArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use dndscore_domain::{Passage, PassageId};
use dndscore_pipeline::{Evidence, Pipeline, ScoreRequest};
use std::fs;

/// Execute the score command.
pub async fn execute_score(args: ScoreArgs, pipeline: &Pipeline, formatter: &Formatter) -> Result<()> {
    let request = build_request(args)?;
    if request.evidence.is_empty() {
        eprintln!(
            "{}",
            formatter.warning("No evidence given; every claim will be unsupported")
        );
    }

    let report = pipeline.score(&request.passage, &request.evidence).await;
    println!("{}", formatter.format_report(&report)?);
    Ok(())
}

/// Turn command-line arguments into a scoring request.
pub fn build_request(args: ScoreArgs) -> Result<ScoreRequest> {
    let text = match (args.passage, args.passage_file) {
        (Some(text), _) => text,
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => {
            return Err(CliError::InvalidInput(
                "Must specify either --passage or --passage-file".to_string(),
            ))
        }
    };

    let mut evidence = args.evidence;
    for path in args.evidence_file {
        evidence.push(fs::read_to_string(path)?);
    }

    let passage = match args.id {
        Some(id) => Passage::new(PassageId::new(id), text),
        None => Passage::with_generated_id(text),
    };
    Ok(ScoreRequest::new(passage, evidence_from(evidence)))
}

fn evidence_from(mut passages: Vec<String>) -> Evidence {
    match passages.len() {
        0 => Evidence::empty(),
        1 => Evidence::Text(passages.remove(0)),
        _ => Evidence::Passages(passages),
    }
}
