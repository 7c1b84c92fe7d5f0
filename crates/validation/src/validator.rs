use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use wegweiser_core::{TraceStage, TraceStep, ValidationResult};
use wegweiser_engine::{FallbackDecision, Outcome, Snapshot, evaluate};

/// How many URLs are evaluated concurrently by default.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Dry-run validator bound to one snapshot.
///
/// Every URL in a batch is evaluated against the same snapshot, so a reload
/// mid-batch never produces mixed results.
#[derive(Debug, Clone)]
pub struct Validator {
    snapshot: Arc<Snapshot>,
    concurrency: usize,
}

impl Validator {
    /// Create a validator over a snapshot.
    #[must_use]
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Self {
            snapshot,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set the number of URLs evaluated concurrently (at least 1).
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Evaluate a single URL.
    ///
    /// Never fails: an unparseable URL yields a result whose only step is an
    /// error marker and whose `final_url` is the input unchanged.
    #[must_use]
    pub fn validate_one(&self, input: &str) -> ValidationResult {
        validate_against(&self.snapshot, input)
    }

    /// Evaluate a batch of URLs concurrently.
    ///
    /// Results come back in input order regardless of completion order. A
    /// URL that fails occupies its slot with an error marker; it never
    /// aborts the rest of the batch.
    #[instrument(skip_all, fields(urls = urls.len(), concurrency = self.concurrency))]
    pub async fn validate(&self, urls: &[String]) -> Vec<ValidationResult> {
        futures::stream::iter(urls.iter().map(|url| self.spawn_one(url.clone())))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Like [`validate`](Self::validate), but stops early when the token is
    /// cancelled, returning the results completed so far.
    pub async fn validate_until_cancelled(
        &self,
        urls: &[String],
        token: &CancellationToken,
    ) -> Vec<ValidationResult> {
        let mut stream = futures::stream::iter(urls.iter().map(|url| self.spawn_one(url.clone())))
            .buffered(self.concurrency);

        let mut results = Vec::with_capacity(urls.len());
        loop {
            tokio::select! {
                () = token.cancelled() => {
                    debug!(completed = results.len(), total = urls.len(), "batch cancelled");
                    break;
                }
                next = stream.next() => match next {
                    Some(result) => results.push(result),
                    None => break,
                },
            }
        }
        results
    }

    async fn spawn_one(&self, url: String) -> ValidationResult {
        let snapshot = Arc::clone(&self.snapshot);
        let input = url.clone();
        let handle = tokio::task::spawn_blocking(move || validate_against(&snapshot, &input));
        match handle.await {
            Ok(result) => result,
            Err(join_error) => {
                warn!(%url, %join_error, "evaluation task failed");
                ValidationResult {
                    input_url: url.clone(),
                    matched_rule_id: None,
                    final_url: url.clone(),
                    steps: vec![TraceStep::error_marker(&url, "evaluation task failed")],
                }
            }
        }
    }
}

fn validate_against(snapshot: &Snapshot, input: &str) -> ValidationResult {
    match evaluate(input, snapshot) {
        Ok(Outcome::Redirect {
            rule_id,
            url,
            steps,
            ..
        }) => ValidationResult {
            input_url: input.to_owned(),
            matched_rule_id: Some(rule_id),
            final_url: url,
            steps,
        },
        Ok(Outcome::Fallback(result)) => {
            let (final_url, description) = match &result.decision {
                FallbackDecision::Message { text } => (
                    input.to_owned(),
                    format!("no rule matched; fallback message: {text}"),
                ),
                FallbackDecision::SearchRedirect { url, term } => (
                    url.clone(),
                    format!("no rule matched; search redirect for `{term}`"),
                ),
            };
            let step = TraceStep::new(TraceStage::Rule, description, input, final_url.clone());
            ValidationResult {
                input_url: input.to_owned(),
                matched_rule_id: None,
                final_url,
                steps: vec![step],
            }
        }
        Err(error) => {
            debug!(%input, %error, "marking URL as unevaluable");
            ValidationResult {
                input_url: input.to_owned(),
                matched_rule_id: None,
                final_url: input.to_owned(),
                steps: vec![TraceStep::error_marker(input, error.to_string())],
            }
        }
    }
}
