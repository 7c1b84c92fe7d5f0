use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which transformation stage recorded a trace step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStage {
    /// Process-wide normalization applied before any rule logic.
    Global,
    /// The matched rule's transformation (or the fallback decision).
    Rule,
    /// Final normalization applied after every rule.
    Cleanup,
    /// Marker for a URL that could not be evaluated at all.
    Error,
}

impl TraceStage {
    /// Return the `snake_case` string representation (matches serde serialization).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Rule => "rule",
            Self::Cleanup => "cleanup",
            Self::Error => "error",
        }
    }
}

/// One recorded transformation stage.
///
/// Within a single evaluation, steps are contiguous: each step's `url_after`
/// equals the next step's `url_before`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    /// The stage that produced this step.
    pub stage: TraceStage,
    /// Human-readable description of what the stage did.
    pub description: String,
    /// The URL before this stage ran.
    pub url_before: String,
    /// The URL after this stage ran.
    pub url_after: String,
    /// `true` iff `url_before != url_after`.
    pub changed: bool,
}

impl TraceStep {
    /// Record a step. `changed` is derived from the before/after strings.
    #[must_use]
    pub fn new(
        stage: TraceStage,
        description: impl Into<String>,
        url_before: impl Into<String>,
        url_after: impl Into<String>,
    ) -> Self {
        let url_before = url_before.into();
        let url_after = url_after.into();
        let changed = url_before != url_after;
        Self {
            stage,
            description: description.into(),
            url_before,
            url_after,
            changed,
        }
    }

    /// Record a stage that ran but had nothing to do.
    #[must_use]
    pub fn unchanged(stage: TraceStage, description: impl Into<String>, url: &str) -> Self {
        Self::new(stage, description, url, url)
    }

    /// Record an error marker for a URL that could not be evaluated.
    #[must_use]
    pub fn error_marker(url: &str, message: impl Into<String>) -> Self {
        Self::unchanged(TraceStage::Error, message, url)
    }
}

/// Outcome of one dry-run evaluation.
///
/// Produced fresh per evaluation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// The URL as supplied by the caller.
    pub input_url: String,
    /// Id of the rule that matched, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_rule_id: Option<Uuid>,
    /// The resolved destination. Equals the input when evaluation failed or
    /// the fallback produced only a message.
    pub final_url: String,
    /// Ordered trace of every transformation stage.
    pub steps: Vec<TraceStep>,
}

impl ValidationResult {
    /// Check the step contiguity invariant: every step's `url_after` equals
    /// the next step's `url_before`.
    #[must_use]
    pub fn steps_contiguous(&self) -> bool {
        self.steps
            .windows(2)
            .all(|pair| pair[0].url_after == pair[1].url_before)
    }

    /// `true` when evaluation failed and only an error marker was recorded.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.steps
            .iter()
            .any(|step| step.stage == TraceStage::Error)
    }
}
