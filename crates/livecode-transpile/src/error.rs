//! Transpiler error types.

use livecode_types::Span;
use thiserror::Error;

/// Errors that stop a source text from being transpiled.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranspileError {
    /// The source does not parse. Carries the first diagnostic.
    #[error("{message}")]
    Syntax { message: String, position: Span },

    /// Two exports bind the same exported name.
    #[error("Duplicate export of '{name}'")]
    DuplicateExport { name: String, position: Span },
}

impl TranspileError {
    pub fn position(&self) -> Option<Span> {
        match self {
            Self::Syntax { position, .. } | Self::DuplicateExport { position, .. } => {
                Some(*position)
            }
        }
    }
}

/// Transpiler result type alias.
pub type TranspileResult<T> = Result<T, TranspileError>;
