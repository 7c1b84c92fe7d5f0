use crate::snapshot::{CompiledRule, Snapshot};

/// Decide which query parameters survive transformation.
///
/// The effective discard flag is the rule's own flag when explicitly set,
/// otherwise the global one. With discarding off, everything passes through.
/// With it on, a parameter survives only if its *key* matches at least one
/// pattern in the union of the rule's and the global keep-lists.
///
/// The returned flag is `true` iff the parameter set differs from the input;
/// an empty input always yields `false`.
pub fn filter_params(
    pairs: &[(String, String)],
    rule: &CompiledRule,
    snapshot: &Snapshot,
) -> (Vec<(String, String)>, bool) {
    let discard = rule
        .rule()
        .discard_query_params
        .unwrap_or(snapshot.settings().discard_query_params);
    if !discard || pairs.is_empty() {
        return (pairs.to_vec(), false);
    }

    let kept: Vec<(String, String)> = pairs
        .iter()
        .filter(|(key, _)| {
            rule.keep_params()
                .iter()
                .chain(snapshot.global_keep())
                .any(|re| re.is_match(key))
        })
        .cloned()
        .collect();
    let changed = kept.len() != pairs.len();
    (kept, changed)
}
