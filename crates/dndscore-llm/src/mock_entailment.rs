//! Mock entailment oracle for deterministic testing

use async_trait::async_trait;
use dndscore_domain::{EntailmentFailure, EntailmentJudgment, EntailmentService};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

type Rule = Arc<dyn Fn(&str, &str) -> Option<EntailmentJudgment> + Send + Sync>;

#[derive(Debug, Clone)]
enum Scripted {
    Judgment(EntailmentJudgment),
    Failure,
    Transient {
        remaining: usize,
        then: EntailmentJudgment,
    },
}

/// Mock entailment service
///
/// Judgments are looked up by exact `(premise, hypothesis)` pair, then by the
/// optional rule closure, then fall back to a default judgment.
///
/// # Examples
///
/// ```
/// use dndscore_llm::MockEntailment;
///
/// let mut oracle = MockEntailment::neutral();
/// oracle.add_equivalence("Paris is in France", "Paris is located in France");
/// assert_eq!(oracle.call_count(), 0);
/// ```
#[derive(Clone)]
pub struct MockEntailment {
    default: EntailmentJudgment,
    scripted: Arc<Mutex<HashMap<(String, String), Scripted>>>,
    rule: Option<Rule>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    latency: Option<Duration>,
    fail_all: bool,
    closed: Arc<AtomicBool>,
}

impl std::fmt::Debug for MockEntailment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockEntailment")
            .field("default", &self.default)
            .field("has_rule", &self.rule.is_some())
            .field("fail_all", &self.fail_all)
            .finish()
    }
}

impl MockEntailment {
    /// Oracle answering `default` for every unscripted pair
    pub fn new(default: EntailmentJudgment) -> Self {
        Self {
            default,
            scripted: Arc::new(Mutex::new(HashMap::new())),
            rule: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            latency: None,
            fail_all: false,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Oracle that finds nothing entailed by default
    pub fn neutral() -> Self {
        Self::new(EntailmentJudgment::neutral(0.9))
    }

    /// Oracle that finds everything entailed by default
    pub fn entails_everything() -> Self {
        Self::new(EntailmentJudgment::entails(0.95))
    }

    /// Oracle whose every call fails, simulating an outage
    pub fn unavailable() -> Self {
        let mut oracle = Self::neutral();
        oracle.fail_all = true;
        oracle
    }

    /// Consult `rule` for pairs without an exact script
    pub fn with_rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&str, &str) -> Option<EntailmentJudgment> + Send + Sync + 'static,
    {
        self.rule = Some(Arc::new(rule));
        self
    }

    /// Delay every reply by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Answer `judgment` for `premise` ⊨ `hypothesis`
    pub fn add_judgment(
        &mut self,
        premise: impl Into<String>,
        hypothesis: impl Into<String>,
        judgment: EntailmentJudgment,
    ) {
        self.script(premise.into(), hypothesis.into(), Scripted::Judgment(judgment));
    }

    /// Make `a` and `b` entail each other
    pub fn add_equivalence(&mut self, a: impl Into<String>, b: impl Into<String>) {
        let (a, b) = (a.into(), b.into());
        self.add_judgment(a.clone(), b.clone(), EntailmentJudgment::entails(0.95));
        self.add_judgment(b, a, EntailmentJudgment::entails(0.95));
    }

    /// Fail every query for `premise` ⊨ `hypothesis`
    pub fn add_failure(&mut self, premise: impl Into<String>, hypothesis: impl Into<String>) {
        self.script(premise.into(), hypothesis.into(), Scripted::Failure);
    }

    /// Fail the first `times` queries for the pair, then answer `then`
    pub fn add_transient_failure(
        &mut self,
        premise: impl Into<String>,
        hypothesis: impl Into<String>,
        times: usize,
        then: EntailmentJudgment,
    ) {
        self.script(
            premise.into(),
            hypothesis.into(),
            Scripted::Transient {
                remaining: times,
                then,
            },
        );
    }

    /// Number of classify calls so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Number of classify calls for one ordered pair
    pub fn calls_for(&self, premise: &str, hypothesis: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(p, h)| p == premise && h == hypothesis)
            .count()
    }

    fn script(&mut self, premise: String, hypothesis: String, entry: Scripted) {
        self.scripted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((premise, hypothesis), entry);
    }

    fn lookup(&self, premise: &str, hypothesis: &str) -> Result<EntailmentJudgment, EntailmentFailure> {
        if self.fail_all {
            return Err(EntailmentFailure::Unavailable("Mock outage".to_string()));
        }

        let mut scripted = self.scripted.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = scripted.get_mut(&(premise.to_string(), hypothesis.to_string())) {
            return match entry {
                Scripted::Judgment(j) => Ok(*j),
                Scripted::Failure => Err(EntailmentFailure::Unavailable("Mock error".to_string())),
                Scripted::Transient { remaining, then } => {
                    if *remaining > 0 {
                        *remaining -= 1;
                        Err(EntailmentFailure::Unavailable("Mock transient error".to_string()))
                    } else {
                        Ok(*then)
                    }
                }
            };
        }
        drop(scripted);

        if let Some(judgment) = self.rule.as_ref().and_then(|rule| rule(premise, hypothesis)) {
            return Ok(judgment);
        }

        Ok(self.default)
    }
}

impl Default for MockEntailment {
    fn default() -> Self {
        Self::neutral()
    }
}

#[async_trait]
impl EntailmentService for MockEntailment {
    async fn classify(
        &self,
        premise: &str,
        hypothesis: &str,
    ) -> Result<EntailmentJudgment, EntailmentFailure> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(EntailmentFailure::Closed);
        }
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((premise.to_string(), hypothesis.to_string()));

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.lookup(premise, hypothesis)
    }

    fn model_name(&self) -> &str {
        "mock-nli"
    }

    async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
