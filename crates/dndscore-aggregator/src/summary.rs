//! Batch summaries over many passage reports

use dndscore_domain::{PassageStatus, ScoreReport, VerdictCounts};
use serde::{Deserialize, Serialize};

/// Dataset-level view of a batch of reports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Reports summarized
    pub passages: usize,
    /// Passages that went through every stage
    pub scored: usize,
    /// Passages excluded because decomposition failed
    pub undecomposed: usize,
    /// Passages cancelled by shutdown
    pub cancelled: usize,
    /// Passages that ran out of time
    pub deadline_exceeded: usize,
    /// Passages whose task terminated abnormally
    pub aborted: usize,
    /// Scored passages with at least one degradation
    pub degraded: usize,
    /// Scored passages whose score is null
    pub null_scores: usize,
    /// Mean score over passages with a non-null score
    pub mean_score: Option<f64>,
    /// Claims across scored passages
    pub total_claims: usize,
    /// Clusters across scored passages
    pub total_clusters: usize,
    /// Cluster verdicts across scored passages
    pub verdicts: VerdictCounts,
}

/// Summarize a batch of reports
pub fn summarize(reports: &[ScoreReport]) -> BatchSummary {
    let mut summary = BatchSummary {
        passages: reports.len(),
        ..Default::default()
    };
    let mut score_sum = 0.0;
    let mut score_count = 0usize;

    for report in reports {
        match report.status {
            PassageStatus::Scored => summary.scored += 1,
            PassageStatus::Undecomposed { .. } => summary.undecomposed += 1,
            PassageStatus::Cancelled => summary.cancelled += 1,
            PassageStatus::DeadlineExceeded { .. } => summary.deadline_exceeded += 1,
            PassageStatus::Aborted { .. } => summary.aborted += 1,
        }
        if report.status != PassageStatus::Scored {
            continue;
        }

        if !report.degradations.is_empty() {
            summary.degraded += 1;
        }
        match report.score {
            Some(s) => {
                score_sum += s;
                score_count += 1;
            }
            None => summary.null_scores += 1,
        }
        summary.total_claims += report.claim_count;
        summary.total_clusters += report.cluster_count;
        summary.verdicts.supported += report.verdicts.supported;
        summary.verdicts.unsupported += report.verdicts.unsupported;
        summary.verdicts.contradicted += report.verdicts.contradicted;
        summary.verdicts.unknown += report.verdicts.unknown;
    }

    summary.mean_score = (score_count > 0).then(|| score_sum / score_count as f64);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use dndscore_domain::{Degradation, Passage, PassageId};

    fn report(id: &str, status: PassageStatus, score: Option<f64>) -> ScoreReport {
        let passage = Passage::new(PassageId::new(id), "text");
        let mut r = ScoreReport::unscored(&passage, status);
        r.score = score;
        r
    }

    #[test]
    fn test_mean_over_non_null_scores() {
        let mut degraded = report("c", PassageStatus::Scored, Some(0.5));
        degraded.degradations.push(Degradation::ClaimCapExceeded {
            claim_count: 70,
            cap: 64,
        });

        let reports = vec![
            report("a", PassageStatus::Scored, Some(1.0)),
            report("b", PassageStatus::Scored, None),
            degraded,
            report("d", PassageStatus::Undecomposed { reason: "x".into() }, None),
            report("e", PassageStatus::Cancelled, None),
        ];
        let summary = summarize(&reports);

        assert_eq!(summary.passages, 5);
        assert_eq!(summary.scored, 3);
        assert_eq!(summary.undecomposed, 1);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.degraded, 1);
        assert_eq!(summary.null_scores, 1);
        assert_eq!(summary.mean_score, Some(0.75));
    }

    #[test]
    fn test_empty_batch() {
        let summary = summarize(&[]);
        assert_eq!(summary.passages, 0);
        assert!(summary.mean_score.is_none());
    }
}
