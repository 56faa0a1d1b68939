//! Deduplicator: bidirectional entailment -> union-find clusters

use crate::config::DedupConfig;
use crate::error::DedupError;
use crate::union_find::DisjointSet;
use dndscore_domain::{
    Claim, ClaimCluster, Degradation, EntailmentFailure, EntailmentJudgment, EntailmentService,
    EquivalenceEdge,
};
use dndscore_llm::WorkerPool;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Counters describing one deduplication run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupStats {
    /// Unordered claim pairs considered
    pub pairs_considered: usize,
    /// Directional entailment queries issued
    pub queries_issued: usize,
    /// Queries that failed after retry
    pub failed_queries: usize,
    /// Pairs whose equivalence could not be determined
    pub undetermined_pairs: usize,
    /// Pairs judged equivalent
    pub equivalent_pairs: usize,
}

/// Clusters plus everything needed to explain them
#[derive(Debug, Clone, PartialEq)]
pub struct DedupOutcome {
    /// Partition of the input, sorted by representative ordinal, ids `0..k`
    pub clusters: Vec<ClaimCluster>,
    /// Run counters
    pub stats: DedupStats,
    /// Degraded-mode flags (`ClaimCapExceeded`, `EntailmentServiceUnavailable`)
    pub degradations: Vec<Degradation>,
}

/// Partitions claims into equivalence classes
///
/// Two claims are equivalent when each entails the other with at least the
/// configured threshold. Equivalence is closed transitively through connected
/// components: A~B and B~C put A, B and C in one cluster even when A~C was
/// judged non-equivalent.
pub struct Deduplicator {
    entailment: Arc<dyn EntailmentService>,
    pool: WorkerPool,
    config: DedupConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairResolution {
    Equivalent,
    NotEquivalent,
    Undetermined,
}

struct PairOutcome {
    from: usize,
    to: usize,
    forward: Result<EntailmentJudgment, EntailmentFailure>,
    backward: Result<EntailmentJudgment, EntailmentFailure>,
}

impl PairOutcome {
    fn failed_queries(&self) -> usize {
        usize::from(self.forward.is_err()) + usize::from(self.backward.is_err())
    }

    /// A failed direction is harmless when the other one already rules equivalence out
    fn resolve(&self, threshold: f64) -> PairResolution {
        match (&self.forward, &self.backward) {
            (Ok(f), Ok(b)) => {
                if f.entails_at(threshold) && b.entails_at(threshold) {
                    PairResolution::Equivalent
                } else {
                    PairResolution::NotEquivalent
                }
            }
            (Ok(j), Err(_)) | (Err(_), Ok(j)) => {
                if j.entails_at(threshold) {
                    PairResolution::Undetermined
                } else {
                    PairResolution::NotEquivalent
                }
            }
            (Err(_), Err(_)) => PairResolution::Undetermined,
        }
    }

    fn edges(&self) -> impl Iterator<Item = EquivalenceEdge> + '_ {
        let forward = self.forward.as_ref().ok().map(|j| EquivalenceEdge {
            from: self.from,
            to: self.to,
            judgment: *j,
        });
        let backward = self.backward.as_ref().ok().map(|j| EquivalenceEdge {
            from: self.to,
            to: self.from,
            judgment: *j,
        });
        forward.into_iter().chain(backward)
    }
}

impl Deduplicator {
    /// Create a new Deduplicator
    pub fn new(
        entailment: Arc<dyn EntailmentService>,
        pool: WorkerPool,
        config: DedupConfig,
    ) -> Self {
        Self {
            entailment,
            pool,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// Cluster the decontextualized claims of one passage
    ///
    /// # Errors
    ///
    /// Only invalid input is an error (duplicate ordinals). Service failures
    /// leave edges absent and are reported in the outcome's degradations.
    pub async fn deduplicate(&self, mut claims: Vec<Claim>) -> Result<DedupOutcome, DedupError> {
        claims.sort_by_key(Claim::ordinal);
        check_unique_ordinals(&claims)?;

        let n = claims.len();
        if n > self.config.max_claims_per_passage {
            warn!(
                claims = n,
                cap = self.config.max_claims_per_passage,
                "Claim cap exceeded, skipping deduplication"
            );
            let clusters = cluster_claims(claims, &[])?;
            return Ok(DedupOutcome {
                clusters,
                stats: DedupStats::default(),
                degradations: vec![Degradation::ClaimCapExceeded {
                    claim_count: n,
                    cap: self.config.max_claims_per_passage,
                }],
            });
        }

        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect();

        debug!(
            claims = n,
            pairs = pairs.len(),
            model = self.entailment.model_name(),
            "Querying pairwise entailment"
        );

        let claims_ref = &claims;
        let outcomes = join_all(pairs.iter().map(|&(i, j)| async move {
            let (a, b) = (&claims_ref[i], &claims_ref[j]);
            let service = self.entailment.as_ref();
            let (forward, backward) = futures::join!(
                self.pool.classify(service, a.text(), b.text()),
                self.pool.classify(service, b.text(), a.text()),
            );
            PairOutcome {
                from: a.ordinal(),
                to: b.ordinal(),
                forward,
                backward,
            }
        }))
        .await;

        let threshold = self.config.entailment_threshold;
        let mut stats = DedupStats {
            pairs_considered: pairs.len(),
            queries_issued: pairs.len() * 2,
            ..Default::default()
        };
        let mut edges = Vec::with_capacity(outcomes.len() * 2);
        for outcome in &outcomes {
            stats.failed_queries += outcome.failed_queries();
            match outcome.resolve(threshold) {
                PairResolution::Equivalent => stats.equivalent_pairs += 1,
                PairResolution::Undetermined => stats.undetermined_pairs += 1,
                PairResolution::NotEquivalent => {}
            }
            edges.extend(outcome.edges());
        }

        let equivalences = equivalences_from_edges(&edges, threshold);
        let clusters = cluster_claims(claims, &equivalences)?;

        let mut degradations = Vec::new();
        if stats.undetermined_pairs > 0 {
            warn!(
                failed_queries = stats.failed_queries,
                undetermined_pairs = stats.undetermined_pairs,
                total_pairs = stats.pairs_considered,
                "Entailment service failures left pairs undetermined"
            );
            degradations.push(Degradation::EntailmentServiceUnavailable {
                failed_queries: stats.failed_queries,
                undetermined_pairs: stats.undetermined_pairs,
                total_pairs: stats.pairs_considered,
            });
        }

        info!(
            claims = n,
            clusters = clusters.len(),
            equivalent_pairs = stats.equivalent_pairs,
            "Deduplication complete"
        );

        Ok(DedupOutcome {
            clusters,
            stats,
            degradations,
        })
    }
}

/// Ordinal pairs `(a, b)`, `a < b`, where both directions entail at `threshold`
pub fn equivalences_from_edges(edges: &[EquivalenceEdge], threshold: f64) -> Vec<(usize, usize)> {
    let entailing: HashMap<(usize, usize), bool> = edges
        .iter()
        .map(|e| ((e.from, e.to), e.judgment.entails_at(threshold)))
        .collect();

    let mut pairs: Vec<(usize, usize)> = entailing
        .iter()
        .filter(|&(&(from, to), &entails)| {
            from < to && entails && entailing.get(&(to, from)).copied().unwrap_or(false)
        })
        .map(|(&pair, _)| pair)
        .collect();
    pairs.sort_unstable();
    pairs
}

/// Partition `claims` into connected components of the `equivalences` graph
///
/// Pure and synchronous. Clusters come back sorted by representative (lowest)
/// ordinal with ids `0..k`; members are in ordinal order.
///
/// # Errors
///
/// Duplicate claim ordinals, or an equivalence that names an unknown ordinal.
pub fn cluster_claims(
    mut claims: Vec<Claim>,
    equivalences: &[(usize, usize)],
) -> Result<Vec<ClaimCluster>, DedupError> {
    claims.sort_by_key(Claim::ordinal);
    check_unique_ordinals(&claims)?;

    let index_of: HashMap<usize, usize> = claims
        .iter()
        .enumerate()
        .map(|(idx, claim)| (claim.ordinal(), idx))
        .collect();

    let mut sets = DisjointSet::new(claims.len());
    for &(a, b) in equivalences {
        let ia = *index_of.get(&a).ok_or(DedupError::UnknownOrdinal(a))?;
        let ib = *index_of.get(&b).ok_or(DedupError::UnknownOrdinal(b))?;
        sets.union(ia, ib);
    }

    let mut slots: Vec<Option<Claim>> = claims.into_iter().map(Some).collect();
    let clusters = sets
        .groups()
        .into_iter()
        .enumerate()
        .filter_map(|(id, members)| {
            let members = members.into_iter().filter_map(|i| slots[i].take()).collect();
            ClaimCluster::from_members(id, members)
        })
        .collect();
    Ok(clusters)
}

/// Expects `claims` sorted by ordinal
fn check_unique_ordinals(claims: &[Claim]) -> Result<(), DedupError> {
    match claims.windows(2).find(|w| w[0].ordinal() == w[1].ordinal()) {
        Some(w) => Err(DedupError::DuplicateOrdinal(w[0].ordinal())),
        None => Ok(()),
    }
}
