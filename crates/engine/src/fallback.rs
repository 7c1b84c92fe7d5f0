use percent_encoding::{percent_decode_str, percent_encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use wegweiser_core::{ConfigError, FallbackStrategy, Settings};

use crate::request::{COMPONENT, UrlParts};
use crate::snapshot::Snapshot;

/// What to do when no rule matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackDecision {
    /// Show a static message; never a redirect.
    Message {
        /// The configured (or default) message text.
        text: String,
    },
    /// Redirect to a search engine with a term derived from the input.
    SearchRedirect {
        /// The full search URL, term already encoded.
        url: String,
        /// The derived term, decoded.
        term: String,
    },
}

/// The fallback decision together with redirect behavior and any
/// configuration problem encountered while deciding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackResult {
    /// The decision.
    pub decision: FallbackDecision,
    /// Whether a search redirect should be followed automatically.
    /// Always `false` for message decisions.
    pub auto_redirect: bool,
    /// Set when the configured strategy could not be honored and the
    /// engine degraded to a message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_error: Option<ConfigError>,
}

/// Decide the fallback for a request no rule matched.
///
/// The `search` strategy degrades to a message, never to an error: a
/// missing search base or an input with no derivable term both produce
/// a message decision (the former with a [`ConfigError`] attached).
pub fn resolve_fallback(request: &UrlParts, snapshot: &Snapshot) -> FallbackResult {
    let settings = snapshot.settings();
    match settings.fallback_strategy {
        FallbackStrategy::Message => message_result(settings, None),
        FallbackStrategy::Search => {
            let base = settings
                .search_base_url
                .as_deref()
                .map(str::trim)
                .unwrap_or_default();
            if base.is_empty() {
                warn!("fallback strategy is `search` but no search base URL is configured");
                return message_result(settings, Some(ConfigError::MissingSearchBase));
            }
            match derive_search_term(request, snapshot) {
                Some(term) => {
                    let url = format!("{base}{}", percent_encode(term.as_bytes(), COMPONENT));
                    debug!(%term, "derived search term");
                    FallbackResult {
                        decision: FallbackDecision::SearchRedirect { url, term },
                        auto_redirect: settings.auto_redirect,
                        config_error: None,
                    }
                }
                None => message_result(settings, None),
            }
        }
    }
}

fn message_result(settings: &Settings, config_error: Option<ConfigError>) -> FallbackResult {
    FallbackResult {
        decision: FallbackDecision::Message {
            text: settings.message_text().to_owned(),
        },
        auto_redirect: false,
        config_error,
    }
}

/// Derive a search term from the request.
///
/// A configured term pattern is tried first against the rendered URL
/// (capture group 1, or the whole match). Otherwise the last non-empty
/// path segment, percent-decoded. A root path yields nothing.
fn derive_search_term(request: &UrlParts, snapshot: &Snapshot) -> Option<String> {
    if let Some(re) = snapshot.search_term_pattern() {
        let rendered = request.render();
        if let Some(caps) = re.captures(&rendered) {
            let m = caps.get(1).or_else(|| caps.get(0));
            if let Some(m) = m {
                let term = m.as_str().trim();
                if !term.is_empty() {
                    return Some(term.to_owned());
                }
            }
        }
    }

    request
        .path
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
        .filter(|term| !term.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use wegweiser_core::DEFAULT_FALLBACK_MESSAGE;

    use super::*;

    fn snapshot(settings: Settings) -> Snapshot {
        Snapshot::build(Vec::new(), settings).snapshot
    }

    fn request(input: &str) -> UrlParts {
        UrlParts::parse(input).unwrap()
    }

    #[test]
    fn message_strategy_uses_default_text() {
        let snap = snapshot(Settings::new());
        let result = resolve_fallback(&request("/nope"), &snap);
        assert_eq!(
            result.decision,
            FallbackDecision::Message {
                text: DEFAULT_FALLBACK_MESSAGE.to_owned(),
            }
        );
        assert!(!result.auto_redirect);
        assert!(result.config_error.is_none());
    }

    #[test]
    fn message_strategy_uses_custom_text() {
        let settings = Settings::new().with_fallback_message("Seite nicht gefunden.");
        let result = resolve_fallback(&request("/nope"), &snapshot(settings));
        assert_eq!(
            result.decision,
            FallbackDecision::Message {
                text: "Seite nicht gefunden.".to_owned(),
            }
        );
    }

    #[test]
    fn search_strategy_builds_redirect_from_last_segment() {
        let settings = Settings::new()
            .with_fallback_strategy(FallbackStrategy::Search)
            .with_search_base_url("https://duckduckgo.com/?q=");
        let result = resolve_fallback(&request("/search/nike-air"), &snapshot(settings));
        assert_eq!(
            result.decision,
            FallbackDecision::SearchRedirect {
                url: "https://duckduckgo.com/?q=nike-air".to_owned(),
                term: "nike-air".to_owned(),
            }
        );
    }

    #[test]
    fn search_term_is_percent_encoded() {
        let settings = Settings::new()
            .with_fallback_strategy(FallbackStrategy::Search)
            .with_search_base_url("https://duckduckgo.com/?q=");
        let result = resolve_fallback(&request("/caf%C3%A9%20au%20lait"), &snapshot(settings));
        let FallbackDecision::SearchRedirect { url, term } = result.decision else {
            panic!("expected a search redirect");
        };
        assert_eq!(term, "café au lait");
        assert_eq!(url, "https://duckduckgo.com/?q=caf%C3%A9%20au%20lait");
    }

    #[test]
    fn search_without_base_degrades_to_message_with_error() {
        let settings = Settings::new().with_fallback_strategy(FallbackStrategy::Search);
        let result = resolve_fallback(&request("/anything"), &snapshot(settings));
        assert!(matches!(result.decision, FallbackDecision::Message { .. }));
        assert_eq!(result.config_error, Some(ConfigError::MissingSearchBase));
        assert!(!result.auto_redirect);
    }

    #[test]
    fn blank_base_counts_as_missing() {
        let settings = Settings::new()
            .with_fallback_strategy(FallbackStrategy::Search)
            .with_search_base_url("   ");
        let result = resolve_fallback(&request("/anything"), &snapshot(settings));
        assert_eq!(result.config_error, Some(ConfigError::MissingSearchBase));
    }

    #[test]
    fn root_path_has_no_term() {
        let settings = Settings::new()
            .with_fallback_strategy(FallbackStrategy::Search)
            .with_search_base_url("https://duckduckgo.com/?q=");
        let result = resolve_fallback(&request("/"), &snapshot(settings));
        assert!(matches!(result.decision, FallbackDecision::Message { .. }));
        assert!(result.config_error.is_none());
    }

    #[test]
    fn auto_redirect_follows_global_flag() {
        let settings = Settings::new()
            .with_fallback_strategy(FallbackStrategy::Search)
            .with_search_base_url("https://duckduckgo.com/?q=")
            .with_auto_redirect(true);
        let result = resolve_fallback(&request("/term"), &snapshot(settings));
        assert!(result.auto_redirect);
    }

    #[test]
    fn term_pattern_takes_precedence() {
        let settings = Settings::new()
            .with_fallback_strategy(FallbackStrategy::Search)
            .with_search_base_url("https://duckduckgo.com/?q=")
            .with_search_term_pattern(r"/s/([^/]+)");
        let result = resolve_fallback(&request("/s/widgets/extra"), &snapshot(settings));
        let FallbackDecision::SearchRedirect { term, .. } = result.decision else {
            panic!("expected a search redirect");
        };
        assert_eq!(term, "widgets");
    }
}
