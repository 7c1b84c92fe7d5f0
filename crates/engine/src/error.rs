use thiserror::Error;

/// Errors that abort evaluation of a single URL.
///
/// These never cross between URLs: in a batch, each input fails (or
/// succeeds) on its own.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The supplied URL could not be parsed into scheme/host/path/query.
    #[error("invalid input URL `{url}`: {reason}")]
    InvalidInput {
        /// The input as supplied by the caller.
        url: String,
        /// Why parsing failed.
        reason: String,
    },
}

/// Why a rule was excluded from a snapshot at build time.
#[derive(Debug, Error)]
pub enum RuleCompileError {
    /// A `keep_query_params` regex failed to compile.
    #[error("invalid keep pattern `{pattern}`: {source}")]
    KeepPattern {
        /// The offending pattern.
        pattern: String,
        /// The underlying regex error.
        source: regex::Error,
    },

    /// A wildcard matcher could not be compiled into a pattern.
    #[error("invalid wildcard matcher `{matcher}`: {source}")]
    WildcardMatcher {
        /// The offending matcher.
        matcher: String,
        /// The underlying regex error.
        source: regex::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_display() {
        let err = EngineError::InvalidInput {
            url: "::".into(),
            reason: "empty host".into(),
        };
        assert_eq!(err.to_string(), "invalid input URL `::`: empty host");
    }
}
