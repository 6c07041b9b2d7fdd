//! Shared types for livecode.
//!
//! This crate defines the AST node types, source spans, diagnostics and the
//! pipeline error type used across all livecode crates.

mod error;
mod span;
pub mod ast;

pub use error::{
    Diagnostic, Diagnostics, Excerpt, ExcerptKind, LiveError, Stage, DEFAULT_EXCERPT_LIMIT,
    MAX_ERRORS,
};
pub use span::{SourceFile, Span};
