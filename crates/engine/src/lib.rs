//! URL matching, transformation, and trace engine.
//!
//! The engine is a pure function of `(input URL, Snapshot)`: it selects the
//! best rule for a request, transforms the URL through three ordered stages
//! (global normalization, rule application, cleanup), and records one trace
//! step per stage. When no rule matches, a configurable fallback produces
//! either a static message or a derived search redirect.
//!
//! Snapshots are immutable and swapped wholesale on reload; concurrent
//! evaluations against the same snapshot need no locking.

pub mod error;
pub mod eval;
pub mod fallback;
pub mod matcher;
pub mod query;
pub mod request;
pub mod resolver;
pub mod snapshot;
pub mod store;

pub use error::{EngineError, RuleCompileError};
pub use eval::{Outcome, evaluate};
pub use fallback::{FallbackDecision, FallbackResult, resolve_fallback};
pub use matcher::{RuleMatch, find_match};
pub use query::filter_params;
pub use request::UrlParts;
pub use resolver::{Resolution, resolve};
pub use snapshot::{CompiledRule, RejectedRule, Snapshot, SnapshotBuild};
pub use store::SnapshotStore;
