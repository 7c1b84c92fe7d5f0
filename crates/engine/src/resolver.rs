use wegweiser_core::{MatchType, TraceStage, TraceStep};

use crate::matcher::RuleMatch;
use crate::query::filter_params;
use crate::request::UrlParts;
use crate::snapshot::Snapshot;

/// A resolved destination with its full transformation trace.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The destination URL, equal to the last step's `url_after`.
    pub final_url: String,
    /// One step per stage, in order: global, rule, cleanup.
    pub steps: Vec<TraceStep>,
}

/// Compose the destination URL for a matched rule.
///
/// Three ordered stages, each recording exactly one trace step (a stage with
/// nothing to do still records a step with `changed = false`):
///
/// 1. **global** — process-wide normalization (scheme/host canonicalization,
///    global parameter denylist) before any rule-specific logic.
/// 2. **rule** — wildcard capture substitution into the target URL, then the
///    query-parameter policy applied to the combined result.
/// 3. **cleanup** — trailing-slash normalization, deterministic query
///    re-encoding (source key order preserved), empty fragment removal.
pub fn resolve(
    input: &str,
    request: &UrlParts,
    matched: &RuleMatch<'_>,
    snapshot: &Snapshot,
) -> Resolution {
    let mut steps = Vec::with_capacity(3);
    let settings = snapshot.settings();

    // Stage 1: global normalization.
    let mut current = request.clone();
    let before_strip = current.query.len();
    if !settings.strip_query_params.is_empty() {
        current
            .query
            .retain(|(key, _)| !settings.strip_query_params.iter().any(|denied| denied == key));
    }
    let stripped = before_strip - current.query.len();

    let mut notes = Vec::new();
    if current.has_origin() {
        notes.push("canonicalized scheme and host".to_owned());
    }
    if stripped > 0 {
        notes.push(format!(
            "stripped {stripped} denylisted query parameter{}",
            plural(stripped)
        ));
    }
    let global_desc = if notes.is_empty() {
        "no global normalization to apply".to_owned()
    } else {
        notes.join("; ")
    };
    let global_rendered = current.render();
    steps.push(TraceStep::new(
        TraceStage::Global,
        global_desc,
        input,
        global_rendered.clone(),
    ));

    // Stage 2: rule transformation plus query-parameter policy.
    let rule = matched.rule.rule();
    let (target, unresolved) = substitute_captures(&rule.target_url, &matched.captures);
    let (kept, params_changed) = filter_params(&current.query, matched.rule, snapshot);
    let dropped = current.query.len() - kept.len();

    let mut rule_desc = format!("applied {} rule `{}`", rule.match_type.as_str(), rule.matcher);
    if params_changed {
        rule_desc.push_str(&format!(
            "; discarded {dropped} query parameter{}",
            plural(dropped)
        ));
    }
    if unresolved {
        rule_desc.push_str("; unresolved capture placeholder left in target");
    }

    let (rule_rendered, parsed) =
        match build_destination(&target, &current, rule.match_type, &rule.matcher) {
            Ok(mut dest) => {
                dest.query.extend(kept);
                let rendered = dest.render();
                (rendered, Some(dest))
            }
            Err(literal) => {
                rule_desc.push_str("; target URL not parseable, used literally");
                (literal, None)
            }
        };
    steps.push(TraceStep::new(
        TraceStage::Rule,
        rule_desc,
        global_rendered,
        rule_rendered.clone(),
    ));

    // Stage 3: cleanup.
    let (final_rendered, cleanup_desc) = match parsed {
        Some(mut dest) => {
            let mut actions = Vec::new();
            let trimmed = dest.path.trim_end_matches('/');
            let normalized = if !dest.has_origin() && trimmed.is_empty() {
                "/".to_owned()
            } else {
                trimmed.to_owned()
            };
            if normalized != dest.path {
                dest.path = normalized;
                actions.push("stripped trailing slash");
            }
            if dest.fragment.as_deref() == Some("") {
                dest.fragment = None;
                actions.push("removed empty fragment");
            }
            let rendered = dest.render();
            let desc = if actions.is_empty() {
                "nothing to normalize".to_owned()
            } else {
                format!("normalized destination: {}", actions.join(", "))
            };
            (rendered, desc)
        }
        None => (rule_rendered.clone(), "destination left as-is".to_owned()),
    };
    steps.push(TraceStep::new(
        TraceStage::Cleanup,
        cleanup_desc,
        rule_rendered,
        final_rendered.clone(),
    ));

    Resolution {
        final_url: final_rendered,
        steps,
    }
}

/// Replace `%1`..`%9` placeholders with wildcard captures.
///
/// A placeholder without a corresponding capture is left untouched and
/// reported, so evaluation never fails on a misauthored target.
fn substitute_captures(target: &str, captures: &[String]) -> (String, bool) {
    let mut out = String::with_capacity(target.len());
    let mut unresolved = false;
    let mut rest = target;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        match after.chars().next() {
            Some(digit @ '1'..='9') => {
                let index = digit as usize - '0' as usize;
                if let Some(capture) = captures.get(index - 1) {
                    out.push_str(capture);
                } else {
                    out.push('%');
                    out.push(digit);
                    unresolved = true;
                }
                rest = &after[1..];
            }
            _ => {
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    (out, unresolved)
}

/// Build the destination parts for a substituted target.
///
/// Absolute targets stand alone; relative ones resolve against the request's
/// origin. Prefix rules carry the unmatched path suffix over; domain rules
/// keep the request path on the new origin. An absolute target that fails to
/// parse is returned as a literal.
fn build_destination(
    target: &str,
    current: &UrlParts,
    match_type: MatchType,
    matcher: &str,
) -> Result<UrlParts, String> {
    let mut dest = if target.contains("://") {
        match UrlParts::parse(target) {
            Ok(parts) => parts,
            Err(_) => return Err(target.to_owned()),
        }
    } else {
        let path_form = if target.starts_with('/') {
            target.to_owned()
        } else {
            format!("/{target}")
        };
        let mut parts = UrlParts::parse_path_form(&path_form);
        parts.scheme = current.scheme.clone();
        parts.host = current.host.clone();
        parts.port = current.port;
        parts
    };

    match match_type {
        MatchType::Exact | MatchType::Wildcard => {}
        MatchType::Prefix => {
            let suffix = current.path.strip_prefix(matcher).unwrap_or("");
            if !suffix.is_empty() {
                let base = dest.path.trim_end_matches('/');
                dest.path = if suffix.starts_with('/') {
                    format!("{base}{suffix}")
                } else {
                    format!("{base}/{suffix}")
                };
            }
        }
        MatchType::Domain => {
            let base = dest.path.trim_end_matches('/');
            dest.path = format!("{base}{}", current.path);
        }
    }
    Ok(dest)
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use wegweiser_core::{Rule, Settings};

    use super::*;
    use crate::matcher::find_match;

    fn resolve_with(input: &str, rules: Vec<Rule>, settings: Settings) -> Resolution {
        let snapshot = Snapshot::build(rules, settings).snapshot;
        let request = UrlParts::parse(input).unwrap();
        let matched = find_match(&request, &snapshot).expect("a rule should match");
        resolve(input, &request, &matched, &snapshot)
    }

    fn assert_contiguous(resolution: &Resolution) {
        for pair in resolution.steps.windows(2) {
            assert_eq!(pair[0].url_after, pair[1].url_before);
        }
        assert_eq!(
            resolution.final_url,
            resolution.steps.last().unwrap().url_after
        );
    }

    #[test]
    fn exact_rule_discards_query() {
        let rule = Rule::new("/old", MatchType::Exact, "https://new.com")
            .with_discard_query_params(true);
        let resolution = resolve_with("/old?utm_source=x", vec![rule], Settings::new());
        assert_eq!(resolution.final_url, "https://new.com");
        assert_eq!(resolution.steps.len(), 3);
        assert_contiguous(&resolution);
    }

    #[test]
    fn kept_params_survive() {
        let rule = Rule::new("/old", MatchType::Exact, "https://new.com")
            .with_discard_query_params(true)
            .with_keep_query_params([".*"]);
        let resolution = resolve_with("/old?a=1", vec![rule], Settings::new());
        assert_eq!(resolution.final_url, "https://new.com?a=1");
    }

    #[test]
    fn every_stage_records_a_step() {
        let rule = Rule::new("/old", MatchType::Exact, "https://new.com/page");
        let resolution = resolve_with("/old", vec![rule], Settings::new());
        let stages: Vec<TraceStage> = resolution.steps.iter().map(|s| s.stage).collect();
        assert_eq!(
            stages,
            vec![TraceStage::Global, TraceStage::Rule, TraceStage::Cleanup]
        );
        // The global stage had nothing to do but is still recorded.
        assert!(!resolution.steps[0].changed);
    }

    #[test]
    fn wildcard_substitution() {
        let rule = Rule::new("/blog/*", MatchType::Wildcard, "https://new.com/posts/%1");
        let resolution = resolve_with("/blog/hello-world", vec![rule], Settings::new());
        assert_eq!(resolution.final_url, "https://new.com/posts/hello-world");
        assert_contiguous(&resolution);
    }

    #[test]
    fn missing_capture_leaves_placeholder() {
        let rule = Rule::new("/blog/*", MatchType::Wildcard, "https://new.com/%1/%2");
        let resolution = resolve_with("/blog/post", vec![rule], Settings::new());
        assert_eq!(resolution.final_url, "https://new.com/post/%2");
        assert!(resolution.steps[1].description.contains("unresolved"));
    }

    #[test]
    fn prefix_rule_carries_suffix() {
        let rule = Rule::new("/docs", MatchType::Prefix, "/manual");
        let resolution = resolve_with("/docs/setup?v=2", vec![rule], Settings::new());
        assert_eq!(resolution.final_url, "/manual/setup?v=2");
    }

    #[test]
    fn relative_target_resolves_against_request_origin() {
        let rule = Rule::new("/docs", MatchType::Prefix, "/manual");
        let resolution = resolve_with("https://old.com/docs/x", vec![rule], Settings::new());
        assert_eq!(resolution.final_url, "https://old.com/manual/x");
    }

    #[test]
    fn domain_rule_keeps_request_path() {
        let rule = Rule::new("old.example.com", MatchType::Domain, "https://new.example.com");
        let resolution = resolve_with(
            "https://old.example.com/a/b?x=1",
            vec![rule],
            Settings::new(),
        );
        assert_eq!(resolution.final_url, "https://new.example.com/a/b?x=1");
    }

    #[test]
    fn domain_rule_target_path_becomes_prefix() {
        let rule = Rule::new(
            "old.example.com",
            MatchType::Domain,
            "https://new.example.com/archive",
        );
        let resolution = resolve_with("https://old.example.com/a", vec![rule], Settings::new());
        assert_eq!(resolution.final_url, "https://new.example.com/archive/a");
    }

    #[test]
    fn global_denylist_strips_before_rule_logic() {
        // Pass-through rule: discarding off, but the global denylist still
        // removes the tracking parameter in the global stage.
        let rule = Rule::new("/a", MatchType::Exact, "https://new.com/b");
        let settings = Settings::new().with_strip_query_params(["utm_source"]);
        let resolution = resolve_with("/a?utm_source=x&keep=1", vec![rule], settings);
        assert_eq!(resolution.final_url, "https://new.com/b?keep=1");
        assert!(resolution.steps[0].changed);
        assert!(resolution.steps[0].description.contains("denylisted"));
    }

    #[test]
    fn cleanup_strips_empty_fragment_and_trailing_slash() {
        let rule = Rule::new("/a", MatchType::Exact, "https://new.com/page/#");
        let resolution = resolve_with("/a", vec![rule], Settings::new());
        assert_eq!(resolution.final_url, "https://new.com/page");
        assert!(resolution.steps[2].changed);
    }

    #[test]
    fn query_key_order_is_preserved() {
        let rule = Rule::new("/a", MatchType::Exact, "https://new.com/b");
        let resolution = resolve_with("/a?z=1&a=2&m=3", vec![rule], Settings::new());
        assert_eq!(resolution.final_url, "https://new.com/b?z=1&a=2&m=3");
    }

    #[test]
    fn substitute_basic() {
        let (out, unresolved) =
            substitute_captures("/x/%1/y/%2", &["a".to_owned(), "b".to_owned()]);
        assert_eq!(out, "/x/a/y/b");
        assert!(!unresolved);
    }

    #[test]
    fn substitute_keeps_percent_escapes() {
        let (out, unresolved) = substitute_captures("/x%20y", &[]);
        assert_eq!(out, "/x%20y");
        // `%2` has no capture and is reported; the trailing `0` is literal.
        assert!(unresolved);
    }

    #[test]
    fn substitute_ignores_bare_percent() {
        let (out, unresolved) = substitute_captures("/100%", &[]);
        assert_eq!(out, "/100%");
        assert!(!unresolved);
    }
}
