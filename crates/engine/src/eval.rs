use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use wegweiser_core::TraceStep;

use crate::error::EngineError;
use crate::fallback::{FallbackResult, resolve_fallback};
use crate::matcher::find_match;
use crate::request::UrlParts;
use crate::resolver::resolve;
use crate::snapshot::Snapshot;

/// The result of evaluating one URL against a snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// A rule matched and produced a destination.
    Redirect {
        /// The matched rule.
        rule_id: Uuid,
        /// The fully transformed destination URL.
        url: String,
        /// Whether callers should navigate without showing a preview.
        /// The rule's flag or the global flag, whichever is set.
        auto_redirect: bool,
        /// One trace step per transformation stage.
        steps: Vec<TraceStep>,
    },
    /// No rule matched; the configured fallback applies.
    Fallback(FallbackResult),
}

/// Evaluate a URL against the snapshot.
///
/// Deterministic: identical input and snapshot always yield the identical
/// outcome, steps included. The only error is an unparseable input URL;
/// an unmatched URL is a fallback, not an error.
#[instrument(skip(snapshot), fields(rules = snapshot.rules().len()))]
pub fn evaluate(input: &str, snapshot: &Snapshot) -> Result<Outcome, EngineError> {
    let request = UrlParts::parse(input)?;

    match find_match(&request, snapshot) {
        Some(matched) => {
            let rule = matched.rule.rule();
            let auto_redirect = rule.auto_redirect || snapshot.settings().auto_redirect;
            let rule_id = rule.id;
            let resolution = resolve(input, &request, &matched, snapshot);
            Ok(Outcome::Redirect {
                rule_id,
                url: resolution.final_url,
                auto_redirect,
                steps: resolution.steps,
            })
        }
        None => Ok(Outcome::Fallback(resolve_fallback(&request, snapshot))),
    }
}
