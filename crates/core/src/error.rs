use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A settings invariant violation detected during evaluation.
///
/// Configuration errors never abort an evaluation; the engine degrades to a
/// safe behavior and surfaces the error alongside the result.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigError {
    /// The fallback strategy is `search` but no usable base URL is set.
    #[error("fallback strategy is `search` but `search_base_url` is empty")]
    MissingSearchBase,
}
