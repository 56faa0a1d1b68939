//! Orchestrator: decompose, decontextualize, deduplicate, verify, aggregate

use crate::config::ScoringConfig;
use crate::error::PipelineError;
use crate::metrics::PipelineMetrics;
use crate::services::Services;
use crate::shutdown::ShutdownHandle;
use dndscore_aggregator::aggregate;
use dndscore_dedup::{Deduplicator, InformativenessScorer};
use dndscore_domain::{Passage, PassageStatus, ScoreReport};
use dndscore_extractor::{Decomposer, Decontextualizer};
use dndscore_llm::WorkerPool;
use dndscore_verifier::{Evidence, Verifier};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// One passage to score, with the evidence to check it against
#[derive(Debug, Clone)]
pub struct ScoreRequest {
    /// Passage to score
    pub passage: Passage,
    /// Evidence for verification
    pub evidence: Evidence,
}

impl ScoreRequest {
    /// Create a request
    pub fn new(passage: Passage, evidence: impl Into<Evidence>) -> Self {
        Self {
            passage,
            evidence: evidence.into(),
        }
    }
}

/// The scoring pipeline
///
/// All stages share one [`WorkerPool`], so the concurrency limit holds across
/// every passage in flight. Scoring never returns an error: a passage that
/// cannot be scored still yields a report whose status says why.
///
/// # Examples
///
/// ```no_run
/// use dndscore_pipeline::{Pipeline, ScoringConfig, ServiceConfig, Services};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let services = Services::from_config(&ServiceConfig::default())?;
/// let pipeline = Pipeline::new(services, ScoringConfig::default())?;
///
/// let report = pipeline
///     .score_text(
///         "Paris is the capital of France. It has the Eiffel Tower.",
///         &"Paris, the capital of France, is home to the Eiffel Tower.".into(),
///     )
///     .await;
/// println!("{:?}", report.score);
///
/// pipeline.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    services: Services,
    config: ScoringConfig,
    pool: WorkerPool,
    decomposer: Decomposer,
    decontextualizer: Decontextualizer,
    deduplicator: Deduplicator,
    informativeness: InformativenessScorer,
    verifier: Verifier,
    shutdown: ShutdownHandle,
    metrics: Mutex<PipelineMetrics>,
}

impl Pipeline {
    /// Wire the stages to `services`
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not validate.
    pub fn new(services: Services, config: ScoringConfig) -> Result<Self, PipelineError> {
        config.validate()?;

        let pool = config.worker_pool();
        let extractor = config.extractor_config();

        Ok(Self {
            decomposer: Decomposer::new(services.generator.clone(), pool.clone(), extractor.clone()),
            decontextualizer: Decontextualizer::new(services.generator.clone(), pool.clone(), extractor),
            deduplicator: Deduplicator::new(
                services.entailment.clone(),
                pool.clone(),
                config.dedup_config(),
            ),
            informativeness: InformativenessScorer::new(
                services.entailment.clone(),
                pool.clone(),
                config.bleached_claims.iter().cloned(),
            ),
            verifier: Verifier::new(services.entailment.clone(), pool.clone(), config.verifier_config()),
            services,
            config,
            pool,
            shutdown: ShutdownHandle::new(),
            metrics: Mutex::new(PipelineMetrics::new()),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Handle that cancels in-flight passages when triggered
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Snapshot of the metrics over every passage scored so far
    pub fn metrics(&self) -> PipelineMetrics {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Score one passage
    ///
    /// Bounded by the configured passage deadline; returns a `cancelled`
    /// report as soon as shutdown is requested.
    pub async fn score(&self, passage: &Passage, evidence: &Evidence) -> ScoreReport {
        let started = Instant::now();
        let deadline = self.config.passage_deadline();
        let mut signal = self.shutdown.subscribe();

        let report = if signal.is_shutdown() {
            ScoreReport::unscored(passage, PassageStatus::Cancelled)
        } else {
            tokio::select! {
                biased;
                _ = signal.wait() => {
                    warn!(passage_id = %passage.id(), "Passage cancelled by shutdown");
                    ScoreReport::unscored(passage, PassageStatus::Cancelled)
                }
                result = tokio::time::timeout(deadline, self.run_stages(passage, evidence)) => {
                    match result {
                        Ok(report) => report,
                        Err(_) => {
                            warn!(
                                passage_id = %passage.id(),
                                deadline_ms = millis(deadline),
                                "Passage deadline exceeded"
                            );
                            ScoreReport::unscored(
                                passage,
                                PassageStatus::DeadlineExceeded {
                                    deadline_ms: millis(deadline),
                                },
                            )
                        }
                    }
                }
            }
        };

        let report = report.with_elapsed_ms(millis(started.elapsed()));
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(&report);
        report
    }

    /// Score raw text under a generated passage id
    pub async fn score_text(&self, text: &str, evidence: &Evidence) -> ScoreReport {
        let passage = Passage::with_generated_id(text);
        self.score(&passage, evidence).await
    }

    /// Score passages concurrently, one task per passage
    ///
    /// Reports come back in request order. A task that panics yields an
    /// `aborted` report instead of taking the batch down.
    pub async fn score_batch(self: &Arc<Self>, requests: Vec<ScoreRequest>) -> Vec<ScoreReport> {
        let total = requests.len();
        info!(passages = total, "Scoring batch");

        let tasks: Vec<_> = requests
            .into_iter()
            .map(|request| {
                let pipeline = Arc::clone(self);
                let passage = request.passage.clone();
                let task = tokio::spawn(async move {
                    pipeline.score(&request.passage, &request.evidence).await
                });
                (passage, task)
            })
            .collect();

        let mut reports = Vec::with_capacity(total);
        for (passage, task) in tasks {
            let report = match task.await {
                Ok(report) => report,
                Err(e) => {
                    error!(passage_id = %passage.id(), "Scoring task failed: {}", e);
                    let report = ScoreReport::unscored(
                        &passage,
                        PassageStatus::Aborted {
                            reason: e.to_string(),
                        },
                    );
                    self.metrics
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .record(&report);
                    report
                }
            };
            reports.push(report);
        }

        info!(passages = total, "Batch complete");
        reports
    }

    /// Cancel in-flight passages, stop admitting model calls and close the clients
    pub async fn shutdown(&self) {
        info!("Shutting down pipeline");
        self.shutdown.trigger();
        self.pool.close();
        self.services.shutdown().await;
    }

    async fn run_stages(&self, passage: &Passage, evidence: &Evidence) -> ScoreReport {
        info!(
            passage_id = %passage.id(),
            chars = passage.text().chars().count(),
            evidence_passages = evidence.len(),
            "Scoring passage"
        );

        let claims = match self.decomposer.decompose(passage).await {
            Ok(claims) => claims,
            Err(e) => {
                error!(passage_id = %passage.id(), "Decomposition failed: {}", e);
                return ScoreReport::unscored(
                    passage,
                    PassageStatus::Undecomposed {
                        reason: e.to_string(),
                    },
                );
            }
        };

        let claims = self.decontextualizer.decontextualize_all(claims, passage).await;

        let outcome = match self.deduplicator.deduplicate(claims).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(passage_id = %passage.id(), "Deduplication failed: {}", e);
                return ScoreReport::unscored(
                    passage,
                    PassageStatus::Aborted {
                        reason: e.to_string(),
                    },
                );
            }
        };

        // Informativeness is reported alongside the verdicts and never feeds the score
        let (weights, verified) = tokio::join!(
            self.informativeness.weigh_all(&outcome.clusters),
            self.verifier.verify_all(outcome.clusters.clone(), evidence),
        );
        let verified = verified
            .into_iter()
            .zip(weights)
            .map(|(v, weight)| v.with_informativeness(weight))
            .collect();
        let report = aggregate(passage, verified, outcome.degradations);

        info!(
            passage_id = %passage.id(),
            score = ?report.score,
            claims = report.claim_count,
            clusters = report.cluster_count,
            degradations = report.degradations.len(),
            "Passage scored"
        );
        report
    }
}

/// Score one passage with a pipeline built for this call
///
/// # Errors
///
/// Returns an error if `config` does not validate.
pub async fn score(
    services: &Services,
    passage: &Passage,
    evidence: &Evidence,
    config: &ScoringConfig,
) -> Result<ScoreReport, PipelineError> {
    let pipeline = Pipeline::new(services.clone(), config.clone())?;
    Ok(pipeline.score(passage, evidence).await)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
