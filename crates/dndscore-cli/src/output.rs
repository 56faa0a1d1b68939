//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use dndscore_domain::{Degradation, PassageStatus, ScoreReport, VerdictLabel};
use dndscore_pipeline::PipelineMetrics;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format one passage report.
    pub fn format_report(&self, report: &ScoreReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Table => Ok(self.format_report_table(report)),
            OutputFormat::Quiet => Ok(format_score(report.score)),
        }
    }

    /// Format a batch of reports, one row or line per passage.
    pub fn format_reports(&self, reports: &[ScoreReport]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let lines = reports
                    .iter()
                    .map(serde_json::to_string)
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(lines.join("\n"))
            }
            OutputFormat::Table => Ok(self.format_reports_table(reports)),
            OutputFormat::Quiet => Ok(reports
                .iter()
                .map(|r| format_score(r.score))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format batch metrics.
    pub fn format_summary(&self, metrics: &PipelineMetrics) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&metrics.batch)?),
            OutputFormat::Table => Ok(metrics.summary()),
            OutputFormat::Quiet => Ok(format_score(metrics.mean_score())),
        }
    }

    fn format_report_table(&self, report: &ScoreReport) -> String {
        let mut lines = vec![
            format!("Passage: {}", report.passage_id),
            format!("Status:  {}", self.status(&report.status)),
            format!("Score:   {}", self.score(report.score)),
        ];

        if report.status != PassageStatus::Scored {
            return lines.join("\n");
        }

        lines.push(format!(
            "Claims:  {} in {} clusters ({} supported, {} unsupported, {} contradicted, {} unknown)",
            report.claim_count,
            report.cluster_count,
            report.verdicts.supported,
            report.verdicts.unsupported,
            report.verdicts.contradicted,
            report.verdicts.unknown,
        ));

        if !report.clusters.is_empty() {
            let weighed = report.clusters.iter().any(|c| c.informativeness.is_some());
            let mut builder = Builder::default();
            let mut header = vec!["#", "Size", "Verdict", "Score"];
            if weighed {
                header.push("Info");
            }
            header.push("Claim");
            builder.push_record(header);

            for cluster in &report.clusters {
                let claim = cluster
                    .members
                    .first()
                    .map(|m| m.text.as_str())
                    .unwrap_or_default();
                let mut row = vec![
                    cluster.cluster_id.to_string(),
                    cluster.size.to_string(),
                    self.verdict(cluster.verdict.label),
                    format_two(cluster.verdict.score),
                ];
                if weighed {
                    row.push(format_two(cluster.informativeness));
                }
                row.push(claim.to_string());
                builder.push_record(row);
            }

            let mut table = builder.build();
            table
                .with(Style::rounded())
                .with(Modify::new(Rows::first()).with(Alignment::center()));
            lines.push(table.to_string());
        }

        for degradation in &report.degradations {
            lines.push(self.warning(&describe_degradation(degradation)));
        }

        lines.join("\n")
    }

    fn format_reports_table(&self, reports: &[ScoreReport]) -> String {
        if reports.is_empty() {
            return self.colorize("No passages scored.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Passage", "Status", "Score", "Claims", "Clusters", "Degraded"]);
        for report in reports {
            builder.push_record([
                report.passage_id.to_string(),
                self.status(&report.status),
                format_score(report.score),
                report.claim_count.to_string(),
                report.cluster_count.to_string(),
                report.degradations.len().to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn status(&self, status: &PassageStatus) -> String {
        let color = match status {
            PassageStatus::Scored => "green",
            PassageStatus::Undecomposed { .. } | PassageStatus::Aborted { .. } => "red",
            PassageStatus::Cancelled | PassageStatus::DeadlineExceeded { .. } => "yellow",
        };
        let text = match status {
            PassageStatus::Undecomposed { reason } | PassageStatus::Aborted { reason } => {
                format!("{} ({})", status.as_str(), reason)
            }
            _ => status.as_str().to_string(),
        };
        self.colorize(&text, color)
    }

    fn score(&self, score: Option<f64>) -> String {
        match score {
            Some(_) => self.colorize(&format_score(score), "cyan"),
            None => self.colorize("null", "yellow"),
        }
    }

    fn verdict(&self, label: VerdictLabel) -> String {
        let color = match label {
            VerdictLabel::Supported => "green",
            VerdictLabel::Unsupported => "yellow",
            VerdictLabel::Contradicted => "red",
            VerdictLabel::Unknown => "magenta",
        };
        self.colorize(label.as_str(), color)
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Score with four decimals, or `null`.
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{:.4}", s),
        None => "null".to_string(),
    }
}

fn format_two(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn describe_degradation(degradation: &Degradation) -> String {
    match degradation {
        Degradation::RewriteDegraded { ordinals } => {
            format!("Rewrite failed for claims {:?}; original text kept", ordinals)
        }
        Degradation::EntailmentServiceUnavailable {
            failed_queries,
            undetermined_pairs,
            total_pairs,
        } => format!(
            "Entailment service unavailable: {} queries failed, {}/{} pairs undetermined",
            failed_queries, undetermined_pairs, total_pairs
        ),
        Degradation::VerificationUnknown { cluster_ids } => {
            format!("Verification unknown for clusters {:?}", cluster_ids)
        }
        Degradation::ClaimCapExceeded { claim_count, cap } => format!(
            "{} claims exceed the cap of {}; deduplication skipped",
            claim_count, cap
        ),
    }
}
