use std::hash::{Hash, Hasher};

use regex::Regex;
use tracing::warn;
use uuid::Uuid;

use wegweiser_core::{Rule, Settings};

use crate::error::RuleCompileError;

/// A rule with its patterns compiled, ready for evaluation.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    rule: Rule,
    keep_params: Vec<Regex>,
    wildcard: Option<Regex>,
}

impl CompiledRule {
    fn compile(rule: Rule) -> Result<Self, (Rule, RuleCompileError)> {
        let mut keep_params = Vec::with_capacity(rule.keep_query_params.len());
        for pattern in &rule.keep_query_params {
            match Regex::new(pattern) {
                Ok(re) => keep_params.push(re),
                Err(source) => {
                    let err = RuleCompileError::KeepPattern {
                        pattern: pattern.clone(),
                        source,
                    };
                    return Err((rule, err));
                }
            }
        }

        let wildcard = if rule.match_type == wegweiser_core::MatchType::Wildcard {
            match compile_glob(&rule.matcher) {
                Ok(re) => Some(re),
                Err(source) => {
                    let err = RuleCompileError::WildcardMatcher {
                        matcher: rule.matcher.clone(),
                        source,
                    };
                    return Err((rule, err));
                }
            }
        } else {
            None
        };

        Ok(Self {
            rule,
            keep_params,
            wildcard,
        })
    }

    /// The underlying rule.
    #[must_use]
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// The rule id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.rule.id
    }

    pub(crate) fn keep_params(&self) -> &[Regex] {
        &self.keep_params
    }

    pub(crate) fn wildcard(&self) -> Option<&Regex> {
        self.wildcard.as_ref()
    }
}

/// Translate a glob matcher into an anchored regex where each `*` becomes a
/// capture group.
fn compile_glob(matcher: &str) -> Result<Regex, regex::Error> {
    let pattern: String = matcher
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("(.*)");
    Regex::new(&format!("^{pattern}$"))
}

/// A rule excluded from a snapshot because its patterns failed to compile.
#[derive(Debug)]
pub struct RejectedRule {
    /// The rule as supplied.
    pub rule: Rule,
    /// Why it was rejected.
    pub error: RuleCompileError,
}

/// Result of building a snapshot: the usable snapshot plus everything that
/// had to be excluded.
#[derive(Debug)]
pub struct SnapshotBuild {
    /// The snapshot containing all valid rules.
    pub snapshot: Snapshot,
    /// Rules excluded because of uncompilable patterns.
    pub rejected: Vec<RejectedRule>,
    /// Settings-level patterns (global keep-list, search term pattern) that
    /// failed to compile and were ignored.
    pub invalid_settings_patterns: Vec<String>,
}

/// An immutable view of the active rule set and global configuration.
///
/// Rules are sorted by ascending priority at build time, ties broken by
/// insertion order. A snapshot is never mutated; reload replaces it
/// wholesale (see [`SnapshotStore`](crate::store::SnapshotStore)).
#[derive(Debug)]
pub struct Snapshot {
    rules: Vec<CompiledRule>,
    settings: Settings,
    global_keep: Vec<Regex>,
    search_term_pattern: Option<Regex>,
}

impl Snapshot {
    /// Compile rules and settings into a snapshot.
    ///
    /// Rules whose keep-list or wildcard patterns fail to compile are
    /// excluded and reported; the snapshot stays usable with the remaining
    /// rules. Invalid settings-level patterns are ignored and reported the
    /// same way.
    #[must_use]
    pub fn build(rules: Vec<Rule>, settings: Settings) -> SnapshotBuild {
        let mut compiled = Vec::with_capacity(rules.len());
        let mut rejected = Vec::new();
        for rule in rules {
            match CompiledRule::compile(rule) {
                Ok(c) => compiled.push(c),
                Err((rule, error)) => {
                    warn!(rule = %rule.id, matcher = %rule.matcher, %error, "excluding rule");
                    rejected.push(RejectedRule { rule, error });
                }
            }
        }
        // Stable sort: ties keep insertion order.
        compiled.sort_by_key(|c| c.rule().priority);

        let mut invalid_settings_patterns = Vec::new();
        let mut global_keep = Vec::with_capacity(settings.keep_query_params.len());
        for pattern in &settings.keep_query_params {
            match Regex::new(pattern) {
                Ok(re) => global_keep.push(re),
                Err(error) => {
                    warn!(%pattern, %error, "ignoring invalid global keep pattern");
                    invalid_settings_patterns.push(pattern.clone());
                }
            }
        }

        let search_term_pattern = settings.search_term_pattern.as_ref().and_then(|pattern| {
            match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(error) => {
                    warn!(%pattern, %error, "ignoring invalid search term pattern");
                    invalid_settings_patterns.push(pattern.clone());
                    None
                }
            }
        });

        SnapshotBuild {
            snapshot: Self {
                rules: compiled,
                settings,
                global_keep,
                search_term_pattern,
            },
            rejected,
            invalid_settings_patterns,
        }
    }

    /// The active rules, sorted by evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// The global settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Look up a rule by id.
    #[must_use]
    pub fn rule_by_id(&self, id: Uuid) -> Option<&CompiledRule> {
        self.rules.iter().find(|c| c.id() == id)
    }

    /// Fingerprint of the rule set, useful for detecting stale snapshots.
    #[must_use]
    pub fn rules_version(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        for compiled in &self.rules {
            compiled.rule().id.hash(&mut hasher);
            compiled.rule().priority.hash(&mut hasher);
            compiled.rule().matcher.hash(&mut hasher);
        }
        hasher.finish()
    }

    pub(crate) fn global_keep(&self) -> &[Regex] {
        &self.global_keep
    }

    pub(crate) fn search_term_pattern(&self) -> Option<&Regex> {
        self.search_term_pattern.as_ref()
    }
}
