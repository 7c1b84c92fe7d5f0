use std::fmt::Write as _;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};
use url::Url;

use crate::error::EngineError;

/// Characters percent-encoded in query keys, values, and search terms.
/// The conservative component set: everything except unreserved characters.
pub(crate) const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A URL decomposed into the pieces the engine transforms.
///
/// Accepts full URLs (`https://host/path?q`), bare host forms
/// (`host.example/path`), and origin-less request paths (`/path?q`).
/// Query parameters are held decoded, in source order, and re-encoded
/// deterministically on [`render`](Self::render).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    /// Lowercased scheme, when an origin is present.
    pub scheme: Option<String>,
    /// Lowercased host, when an origin is present.
    pub host: Option<String>,
    /// Explicit non-default port, when an origin is present.
    pub port: Option<u16>,
    /// The path, percent-encoded as supplied. Always starts with `/` when
    /// non-empty.
    pub path: String,
    /// Decoded query pairs in source order.
    pub query: Vec<(String, String)>,
    /// The fragment; `Some("")` preserves a bare trailing `#`.
    pub fragment: Option<String>,
}

impl UrlParts {
    /// Parse a request URL. Origin-less inputs must start with `/`;
    /// scheme-less host forms are treated as `https`.
    pub fn parse(input: &str) -> Result<Self, EngineError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidInput {
                url: input.to_owned(),
                reason: "empty input".to_owned(),
            });
        }

        if trimmed.starts_with('/') {
            return Ok(Self::parse_path_form(trimmed));
        }

        let candidate = if trimmed.contains("://") {
            trimmed.to_owned()
        } else {
            format!("https://{trimmed}")
        };
        let url = Url::parse(&candidate).map_err(|e| EngineError::InvalidInput {
            url: input.to_owned(),
            reason: e.to_string(),
        })?;
        let Some(host) = url.host_str() else {
            return Err(EngineError::InvalidInput {
                url: input.to_owned(),
                reason: "URL has no host".to_owned(),
            });
        };

        Ok(Self {
            scheme: Some(url.scheme().to_owned()),
            host: Some(host.to_owned()),
            port: url.port(),
            path: url.path().to_owned(),
            query: url.query().map(parse_query).unwrap_or_default(),
            fragment: url.fragment().map(str::to_owned),
        })
    }

    /// Parse an origin-less path like `/docs/setup?v=2#top`. Never fails.
    pub(crate) fn parse_path_form(input: &str) -> Self {
        let (rest, fragment) = match input.split_once('#') {
            Some((rest, frag)) => (rest, Some(frag.to_owned())),
            None => (input, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, q)) => (path, parse_query(q)),
            None => (rest, Vec::new()),
        };
        Self {
            scheme: None,
            host: None,
            port: None,
            path: path.to_owned(),
            query,
            fragment,
        }
    }

    /// Whether this URL carries a scheme and host.
    #[must_use]
    pub fn has_origin(&self) -> bool {
        self.scheme.is_some() && self.host.is_some()
    }

    /// Serialize back to a string. Query pairs are re-encoded with a stable
    /// component set, preserving source key order.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let (Some(scheme), Some(host)) = (&self.scheme, &self.host) {
            out.push_str(scheme);
            out.push_str("://");
            out.push_str(host);
            if let Some(port) = self.port {
                let _ = write!(out, ":{port}");
            }
        }
        out.push_str(&self.path);
        if !self.query.is_empty() {
            out.push('?');
            for (i, (key, value)) in self.query.iter().enumerate() {
                if i > 0 {
                    out.push('&');
                }
                let _ = write!(
                    out,
                    "{}={}",
                    percent_encode(key.as_bytes(), COMPONENT),
                    percent_encode(value.as_bytes(), COMPONENT)
                );
            }
        }
        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Strip trailing slashes for path comparison. `/old/` and `/old` match.
pub(crate) fn trim_trailing_slashes(path: &str) -> &str {
    path.trim_end_matches('/')
}
