use tracing::debug;

use wegweiser_core::MatchType;

use crate::request::{UrlParts, trim_trailing_slashes};
use crate::snapshot::{CompiledRule, Snapshot};

/// A successful rule match, with any wildcard captures.
#[derive(Debug)]
pub struct RuleMatch<'a> {
    /// The rule that matched.
    pub rule: &'a CompiledRule,
    /// Substrings captured by `*` in a wildcard matcher, in order.
    pub captures: Vec<String>,
}

/// Select the best rule for a request: first match wins in priority order.
///
/// Evaluation order is fixed by the snapshot (ascending priority, insertion
/// order on ties), which makes selection deterministic and operator
/// controllable. No match is not an error.
pub fn find_match<'a>(request: &UrlParts, snapshot: &'a Snapshot) -> Option<RuleMatch<'a>> {
    for compiled in snapshot.rules() {
        if let Some(captures) = match_rule(compiled, request) {
            debug!(rule = %compiled.id(), matcher = %compiled.rule().matcher, "rule matched");
            return Some(RuleMatch {
                rule: compiled,
                captures,
            });
        }
    }
    debug!("no rule matched");
    None
}

fn match_rule(compiled: &CompiledRule, request: &UrlParts) -> Option<Vec<String>> {
    let rule = compiled.rule();
    match rule.match_type {
        MatchType::Exact => {
            (trim_trailing_slashes(&request.path) == trim_trailing_slashes(&rule.matcher))
                .then(Vec::new)
        }
        MatchType::Prefix => request.path.starts_with(&rule.matcher).then(Vec::new),
        MatchType::Wildcard => compiled
            .wildcard()
            .and_then(|re| re.captures(&request.path))
            .map(|caps| {
                caps.iter()
                    .skip(1)
                    .map(|group| group.map_or_else(String::new, |m| m.as_str().to_owned()))
                    .collect()
            }),
        MatchType::Domain => request
            .host
            .as_deref()
            .is_some_and(|host| host.eq_ignore_ascii_case(&rule.matcher))
            .then(Vec::new),
    }
}
