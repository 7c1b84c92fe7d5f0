use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a rule's `matcher` string is compared against an incoming URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Full path equality. Trailing slashes are stripped on both sides;
    /// comparison is case-sensitive.
    Exact,
    /// The request path starts with the matcher.
    Prefix,
    /// Glob-style matcher where each `*` captures a substring. Captures are
    /// available to the target URL as `%1`, `%2`, ...
    Wildcard,
    /// The request host equals the matcher; the path is ignored.
    Domain,
}

impl MatchType {
    /// Return the `snake_case` string representation (matches serde serialization).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Prefix => "prefix",
            Self::Wildcard => "wildcard",
            Self::Domain => "domain",
        }
    }
}

/// A single redirect rule.
///
/// Rules are evaluated in priority order (lower number = evaluated first,
/// ties broken by insertion order). The first rule whose matcher test
/// succeeds determines the destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule identifier.
    pub id: Uuid,

    /// The matcher string. A path for `exact`/`prefix`, a glob pattern for
    /// `wildcard`, a hostname for `domain`.
    pub matcher: String,

    /// How the matcher is compared against the request.
    pub match_type: MatchType,

    /// Destination URL. Absolute, or a path resolved against the request's
    /// origin. May reference wildcard captures as `%1`, `%2`, ...
    pub target_url: String,

    /// Whether query parameters are discarded during transformation.
    /// `None` inherits the global setting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discard_query_params: Option<bool>,

    /// Regexes matched against query parameter *keys*. A parameter whose key
    /// matches any pattern survives even when discarding is active. Evaluated
    /// in addition to the global keep-list, never instead of it.
    #[serde(default)]
    pub keep_query_params: Vec<String>,

    /// Whether a caller should navigate immediately on match.
    #[serde(default)]
    pub auto_redirect: bool,

    /// Priority for ordering. Lower values are evaluated first.
    #[serde(default)]
    pub priority: i32,
}

impl Rule {
    /// Create a new rule with the given matcher, match type, and target.
    ///
    /// Generates a UUID-v4 id and defaults to priority 0 with inherited
    /// query-parameter handling.
    #[must_use]
    pub fn new(
        matcher: impl Into<String>,
        match_type: MatchType,
        target_url: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            matcher: matcher.into(),
            match_type,
            target_url: target_url.into(),
            discard_query_params: None,
            keep_query_params: Vec::new(),
            auto_redirect: false,
            priority: 0,
        }
    }

    /// Set the rule id.
    #[must_use]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Set the priority of this rule.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Explicitly set query-parameter discarding, overriding the global flag.
    #[must_use]
    pub fn with_discard_query_params(mut self, discard: bool) -> Self {
        self.discard_query_params = Some(discard);
        self
    }

    /// Set the keep-list patterns for this rule.
    #[must_use]
    pub fn with_keep_query_params<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keep_query_params = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Set whether a caller should navigate immediately on match.
    #[must_use]
    pub fn with_auto_redirect(mut self, auto_redirect: bool) -> Self {
        self.auto_redirect = auto_redirect;
        self
    }
}
