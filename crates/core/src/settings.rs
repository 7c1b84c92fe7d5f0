use serde::{Deserialize, Serialize};

/// Message shown when no rule matches and no operator message is configured.
pub const DEFAULT_FALLBACK_MESSAGE: &str = "No redirect rule matched this address.";

/// Policy governing unmatched-path behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackStrategy {
    /// Show a static operator-defined message.
    #[default]
    Message,
    /// Redirect to a search URL derived from the unmatched path.
    Search,
}

impl FallbackStrategy {
    /// Return the `snake_case` string representation (matches serde serialization).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Search => "search",
        }
    }
}

/// Global configuration applied to every evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// What to do when no rule matches.
    #[serde(default)]
    pub fallback_strategy: FallbackStrategy,

    /// Base URL for search fallback; the derived term is appended. Required
    /// when `fallback_strategy` is `Search`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_base_url: Option<String>,

    /// Operator message for the message fallback. Falls back to
    /// [`DEFAULT_FALLBACK_MESSAGE`] when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_message: Option<String>,

    /// Whether callers should navigate immediately without showing a preview.
    #[serde(default)]
    pub auto_redirect: bool,

    /// Global default for query-parameter discarding. Rules may override it.
    #[serde(default)]
    pub discard_query_params: bool,

    /// Regexes matched against query parameter *keys*; matching parameters
    /// survive discarding. Unioned with each rule's own keep-list.
    #[serde(default)]
    pub keep_query_params: Vec<String>,

    /// Parameter keys stripped from every URL before rule logic runs.
    #[serde(default)]
    pub strip_query_params: Vec<String>,

    /// Optional regex for deriving the search fallback term from the full
    /// input URL. Capture group 1 (or the whole match) becomes the term.
    /// When unset or not matching, the last path segment is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term_pattern: Option<String>,
}

impl Settings {
    /// Create settings with all defaults (message fallback, no discarding).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback strategy.
    #[must_use]
    pub fn with_fallback_strategy(mut self, strategy: FallbackStrategy) -> Self {
        self.fallback_strategy = strategy;
        self
    }

    /// Set the search base URL.
    #[must_use]
    pub fn with_search_base_url(mut self, url: impl Into<String>) -> Self {
        self.search_base_url = Some(url.into());
        self
    }

    /// Set the operator fallback message.
    #[must_use]
    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = Some(message.into());
        self
    }

    /// Set whether callers navigate immediately.
    #[must_use]
    pub fn with_auto_redirect(mut self, auto_redirect: bool) -> Self {
        self.auto_redirect = auto_redirect;
        self
    }

    /// Set the global query-parameter discard flag.
    #[must_use]
    pub fn with_discard_query_params(mut self, discard: bool) -> Self {
        self.discard_query_params = discard;
        self
    }

    /// Set the global keep-list patterns.
    #[must_use]
    pub fn with_keep_query_params<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keep_query_params = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the global strip denylist.
    #[must_use]
    pub fn with_strip_query_params<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strip_query_params = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Set the search term extraction pattern.
    #[must_use]
    pub fn with_search_term_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.search_term_pattern = Some(pattern.into());
        self
    }

    /// The effective fallback message text.
    #[must_use]
    pub fn message_text(&self) -> &str {
        self.fallback_message
            .as_deref()
            .unwrap_or(DEFAULT_FALLBACK_MESSAGE)
    }
}
