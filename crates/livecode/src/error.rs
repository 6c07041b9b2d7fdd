//! Pipeline error types.
//!
//! Failures are normally reported as a [`LiveError`] inside
//! [`Execution`](crate::Execution). A thrown value that is not an error
//! instance is passed back unchanged as [`Uncaught`].

use livecode_eval::{inspect, Value};
use livecode_types::LiveError;
use thiserror::Error;

/// A non-error value thrown by author code (`throw "oops"`, `throw 42`).
#[derive(Debug, Clone, Error)]
#[error("Uncaught {}", inspect(&self.0))]
pub struct Uncaught(pub Value);

impl Uncaught {
    pub fn value(&self) -> &Value {
        &self.0
    }
}

/// How a sandboxed stage failed.
#[derive(Debug, Clone, Error)]
pub enum Failure {
    #[error(transparent)]
    Live(#[from] LiveError),
    #[error(transparent)]
    Uncaught(#[from] Uncaught),
}

/// `Scope::from_json` input that is not a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("scope must be a JSON object, got {found}")]
pub struct ScopeError {
    pub found: &'static str,
}

/// Configuration that failed to load.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("excerpt_limit must be at least 1")]
    ZeroExcerptLimit,
}
