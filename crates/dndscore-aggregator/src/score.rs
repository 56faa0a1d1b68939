//! Score computation and report assembly

use dndscore_domain::{
    ClaimRecord, ClusterReport, Degradation, Passage, PassageStatus, ScoreReport, VerdictCounts,
    VerdictLabel, VerifiedCluster,
};
use tracing::debug;

/// `supported / (clusters - unknown)` over unique clusters
///
/// `None` when every cluster is unknown or there are no clusters. Cluster
/// sizes do not matter.
pub fn score(verified: &[VerifiedCluster]) -> Option<f64> {
    ratio(verified.iter().map(|v| (v.verdict.label, 1)))
}

/// The same ratio, counting each claim mention instead of each cluster
pub fn mention_weighted_score(verified: &[VerifiedCluster]) -> Option<f64> {
    ratio(verified.iter().map(|v| (v.verdict.label, v.cluster.size())))
}

fn ratio(weighted: impl Iterator<Item = (VerdictLabel, usize)>) -> Option<f64> {
    let (supported, decided) = weighted.fold((0usize, 0usize), |(s, d), (label, weight)| match label {
        VerdictLabel::Supported => (s + weight, d + weight),
        VerdictLabel::Unknown => (s, d),
        VerdictLabel::Unsupported | VerdictLabel::Contradicted => (s, d + weight),
    });

    if decided == 0 {
        None
    } else {
        Some(supported as f64 / decided as f64)
    }
}

/// Assemble the report for a passage that went through every stage
///
/// `upstream` carries degradations raised before verification (claim cap,
/// entailment outage). Rewrite and verification degradations are derived from
/// the clusters themselves.
pub fn aggregate(
    passage: &Passage,
    verified: Vec<VerifiedCluster>,
    upstream: Vec<Degradation>,
) -> ScoreReport {
    let mut report = ScoreReport::unscored(passage, PassageStatus::Scored);
    report.score = score(&verified);
    report.mention_weighted_score = mention_weighted_score(&verified);
    report.verdicts = count_verdicts(&verified);

    let mut rewrite_degraded = Vec::new();
    let mut unknown_clusters = Vec::new();

    for v in &verified {
        report.claim_count += v.cluster.size();
        if v.verdict.is_unknown() {
            unknown_clusters.push(v.cluster.id());
        }
        rewrite_degraded.extend(
            v.cluster
                .members()
                .iter()
                .filter(|c| c.is_rewrite_degraded())
                .map(|c| c.ordinal()),
        );
    }
    report.cluster_count = verified.len();

    if !rewrite_degraded.is_empty() {
        rewrite_degraded.sort_unstable();
        report.degradations.push(Degradation::RewriteDegraded {
            ordinals: rewrite_degraded,
        });
    }
    report.degradations.extend(upstream);
    if !unknown_clusters.is_empty() {
        report.degradations.push(Degradation::VerificationUnknown {
            cluster_ids: unknown_clusters,
        });
    }

    report.clusters = verified.into_iter().map(cluster_report).collect();

    debug!(
        passage_id = %passage.id(),
        score = ?report.score,
        clusters = report.cluster_count,
        degradations = report.degradations.len(),
        "Aggregated report"
    );
    report
}

fn cluster_report(verified: VerifiedCluster) -> ClusterReport {
    let VerifiedCluster {
        cluster,
        verdict,
        informativeness,
    } = verified;
    ClusterReport {
        cluster_id: cluster.id(),
        representative_ordinal: cluster.representative().ordinal(),
        size: cluster.size(),
        verdict,
        informativeness,
        members: cluster
            .members()
            .iter()
            .map(|c| ClaimRecord {
                ordinal: c.ordinal(),
                text: c.text().to_string(),
                contextual_text: c.contextual_text().map(str::to_string),
                sentence: c.sentence().to_string(),
                rewrite_degraded: c.is_rewrite_degraded(),
            })
            .collect(),
    }
}

/// Verdict counts for a set of verified clusters
pub fn count_verdicts(verified: &[VerifiedCluster]) -> VerdictCounts {
    let mut counts = VerdictCounts::default();
    for v in verified {
        counts.record(v.verdict.label);
    }
    counts
}
