pub mod error;
pub mod rule;
pub mod settings;
pub mod trace;

pub use error::ConfigError;
pub use rule::{MatchType, Rule};
pub use settings::{DEFAULT_FALLBACK_MESSAGE, FallbackStrategy, Settings};
pub use trace::{TraceStage, TraceStep, ValidationResult};
