//! Batch dry-run validation.
//!
//! Operators paste a list of URLs and get back, per URL, the matched rule,
//! the resolved destination, and the full transformation trace, without any
//! redirect being served. Evaluation runs concurrently but results come back
//! in input order, and a URL that cannot be evaluated yields an error marker
//! in its slot instead of aborting the batch.

pub mod validator;

pub use validator::{DEFAULT_CONCURRENCY, Validator};
