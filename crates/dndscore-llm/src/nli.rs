//! HTTP entailment client
//!
//! Talks to an NLI inference server that accepts
//! `POST {"premise": ..., "hypothesis": ...}` and answers either with a single
//! `{"label": ..., "score": ...}` object or with a list of them (one per class,
//! as text-classification servers usually do). For a list, the highest score
//! wins. Labels are matched case-insensitively, so both `entailment` and
//! `ENTAILS` are understood.

use async_trait::async_trait;
use dndscore_domain::{EntailmentFailure, EntailmentJudgment, EntailmentLabel, EntailmentService};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

/// Default HTTP timeout for a single request
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for an HTTP NLI server
pub struct HttpEntailmentClient {
    url: String,
    model: String,
    client: reqwest::Client,
    closed: AtomicBool,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    premise: &'a str,
    hypothesis: &'a str,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Single(LabelScore),
    Ranked(Vec<LabelScore>),
}

impl ClassifyResponse {
    fn into_judgment(self) -> Result<EntailmentJudgment, EntailmentFailure> {
        let best = match self {
            ClassifyResponse::Single(ls) => ls,
            ClassifyResponse::Ranked(list) => list
                .into_iter()
                .max_by(|a, b| a.score.total_cmp(&b.score))
                .ok_or_else(|| EntailmentFailure::Malformed("Empty label list".to_string()))?,
        };

        let label: EntailmentLabel = best.label.parse().map_err(EntailmentFailure::Malformed)?;
        Ok(EntailmentJudgment::new(label, best.score))
    }
}

impl HttpEntailmentClient {
    /// Create a client posting to `url`; `model` is used for logging only
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_timeout(url, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom HTTP timeout
    pub fn with_timeout(url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            url: url.into(),
            model: model.into(),
            client,
            closed: AtomicBool::new(false),
        }
    }

    /// Configured URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl EntailmentService for HttpEntailmentClient {
    async fn classify(
        &self,
        premise: &str,
        hypothesis: &str,
    ) -> Result<EntailmentJudgment, EntailmentFailure> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(EntailmentFailure::Closed);
        }

        debug!(model = %self.model, "NLI classify request");

        let response = self
            .client
            .post(&self.url)
            .json(&ClassifyRequest { premise, hypothesis })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EntailmentFailure::Timeout
                } else {
                    EntailmentFailure::Unavailable(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EntailmentFailure::Unavailable(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body = response
            .json::<ClassifyResponse>()
            .await
            .map_err(|e| EntailmentFailure::Malformed(format!("Failed to parse response: {}", e)))?;

        body.into_judgment()
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
