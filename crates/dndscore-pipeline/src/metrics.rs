//! Run metrics for a pipeline instance

use dndscore_aggregator::{summarize, BatchSummary};
use dndscore_domain::ScoreReport;

/// Counters accumulated over every passage a pipeline scored
///
/// Built from reports, so it agrees with what was emitted.
#[derive(Debug, Clone, Default)]
pub struct PipelineMetrics {
    /// Aggregate over the recorded reports
    pub batch: BatchSummary,

    /// Reports recorded
    pub report_count: usize,

    /// Sum of per-passage elapsed time
    pub total_elapsed_ms: u64,

    /// Slowest passage
    pub max_elapsed_ms: u64,

    score_sum: f64,
    score_count: usize,
}

impl PipelineMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Metrics over a finished batch
    pub fn from_reports(reports: &[ScoreReport]) -> Self {
        let mut metrics = Self::new();
        metrics.record_all(reports);
        metrics
    }

    /// Record one batch of reports
    pub fn record_all(&mut self, reports: &[ScoreReport]) {
        let batch = summarize(reports);

        self.batch.passages += batch.passages;
        self.batch.scored += batch.scored;
        self.batch.undecomposed += batch.undecomposed;
        self.batch.cancelled += batch.cancelled;
        self.batch.deadline_exceeded += batch.deadline_exceeded;
        self.batch.aborted += batch.aborted;
        self.batch.degraded += batch.degraded;
        self.batch.null_scores += batch.null_scores;
        self.batch.total_claims += batch.total_claims;
        self.batch.total_clusters += batch.total_clusters;
        self.batch.verdicts.supported += batch.verdicts.supported;
        self.batch.verdicts.unsupported += batch.verdicts.unsupported;
        self.batch.verdicts.contradicted += batch.verdicts.contradicted;
        self.batch.verdicts.unknown += batch.verdicts.unknown;

        for report in reports {
            self.report_count += 1;
            self.total_elapsed_ms += report.elapsed_ms;
            self.max_elapsed_ms = self.max_elapsed_ms.max(report.elapsed_ms);
            if let Some(score) = report.score {
                self.score_sum += score;
                self.score_count += 1;
            }
        }
        self.batch.mean_score = (self.score_count > 0).then(|| self.score_sum / self.score_count as f64);
    }

    /// Record a single report
    pub fn record(&mut self, report: &ScoreReport) {
        self.record_all(std::slice::from_ref(report));
    }

    /// Dataset-level score: mean over passages with a non-null score
    pub fn mean_score(&self) -> Option<f64> {
        self.batch.mean_score
    }

    /// Claims per cluster across all scored passages
    pub fn duplication_ratio(&self) -> Option<f64> {
        (self.batch.total_clusters > 0)
            .then(|| self.batch.total_claims as f64 / self.batch.total_clusters as f64)
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let b = &self.batch;
        let mut lines = vec![
            "DnDScore Summary".to_string(),
            "================".to_string(),
            format!("Passages: {}", b.passages),
            format!("  Scored: {}", b.scored),
        ];

        for (label, count) in [
            ("Undecomposed", b.undecomposed),
            ("Cancelled", b.cancelled),
            ("Deadline exceeded", b.deadline_exceeded),
            ("Aborted", b.aborted),
            ("Degraded", b.degraded),
            ("Null score", b.null_scores),
        ] {
            if count > 0 {
                lines.push(format!("  {}: {}", label, count));
            }
        }

        lines.push(String::new());
        lines.push(format!(
            "Claims: {} in {} clusters",
            b.total_claims, b.total_clusters
        ));
        lines.push(format!(
            "Verdicts: {} supported, {} unsupported, {} contradicted, {} unknown",
            b.verdicts.supported, b.verdicts.unsupported, b.verdicts.contradicted, b.verdicts.unknown
        ));
        lines.push(match b.mean_score {
            Some(score) => format!("Mean score: {:.4}", score),
            None => "Mean score: n/a".to_string(),
        });
        lines.push(format!("Total time: {}ms", self.total_elapsed_ms));

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dndscore_domain::{Passage, PassageId, PassageStatus};

    fn report(id: &str, status: PassageStatus, score: Option<f64>, elapsed_ms: u64) -> ScoreReport {
        let passage = Passage::new(PassageId::new(id), "text");
        let mut r = ScoreReport::unscored(&passage, status).with_elapsed_ms(elapsed_ms);
        r.score = score;
        r.claim_count = 4;
        r.cluster_count = 2;
        r
    }

    #[test]
    fn test_metrics_creation() {
        let metrics = PipelineMetrics::new();
        assert_eq!(metrics.report_count, 0);
        assert!(metrics.mean_score().is_none());
        assert!(metrics.duplication_ratio().is_none());
    }

    #[test]
    fn test_incremental_matches_batch() {
        let reports = vec![
            report("a", PassageStatus::Scored, Some(1.0), 10),
            report("b", PassageStatus::Scored, Some(0.5), 30),
            report("c", PassageStatus::Cancelled, None, 5),
        ];

        let batch = PipelineMetrics::from_reports(&reports);
        let mut incremental = PipelineMetrics::new();
        for r in &reports {
            incremental.record(r);
        }

        assert_eq!(batch.batch, incremental.batch);
        assert_eq!(incremental.mean_score(), Some(0.75));
        assert_eq!(incremental.max_elapsed_ms, 30);
        assert_eq!(incremental.total_elapsed_ms, 45);
        assert_eq!(incremental.duplication_ratio(), Some(2.0));
    }

    #[test]
    fn test_reset() {
        let mut metrics =
            PipelineMetrics::from_reports(&[report("a", PassageStatus::Scored, Some(1.0), 1)]);
        metrics.reset();
        assert_eq!(metrics.report_count, 0);
        assert!(metrics.mean_score().is_none());
    }

    #[test]
    fn test_summary() {
        let metrics = PipelineMetrics::from_reports(&[
            report("a", PassageStatus::Scored, Some(0.5), 120),
            report("b", PassageStatus::Undecomposed { reason: "x".into() }, None, 3),
        ]);

        let summary = metrics.summary();
        assert!(summary.contains("Passages: 2"));
        assert!(summary.contains("Undecomposed: 1"));
        assert!(summary.contains("Mean score: 0.5000"));
        assert!(!summary.contains("Cancelled"));
    }
}
