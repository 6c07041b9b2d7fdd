use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of diagnostics collected before the lexer/parser gives up.
pub const MAX_ERRORS: usize = 20;

/// Default byte budget for a code excerpt attached to a [`LiveError`].
pub const DEFAULT_EXCERPT_LIMIT: usize = 240;

/// A single lexer or parser diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Human-readable error message.
    pub message: String,
    /// Source location.
    pub span: Span,
    /// The exact source line for context.
    pub source_line: String,
    /// Optional fix suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, span: Span, source_line: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    /// Attach a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.span)
    }
}

/// Diagnostics collected by one lexer or parser run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub errors: Vec<Diagnostic>,
    pub total_errors: usize,
}

impl Diagnostics {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Add an error, respecting the [`MAX_ERRORS`] limit.
    pub fn push(&mut self, error: Diagnostic) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    /// Merge another set of diagnostics into this one.
    pub fn extend(&mut self, other: Diagnostics) {
        for error in other.errors {
            if self.errors.len() < MAX_ERRORS {
                self.errors.push(error);
            }
        }
        self.total_errors += other.total_errors;
    }

    pub fn first(&self) -> Option<&Diagnostic> {
        self.errors.first()
    }

    pub fn at_limit(&self) -> bool {
        self.total_errors >= MAX_ERRORS
    }
}

/// The pipeline stage an error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// The transpiler rejected the (normalized) source.
    Transform,
    /// Scope building, evaluation or coercion failed.
    Evaluate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transform => write!(f, "transform"),
            Self::Evaluate => write!(f, "evaluate"),
        }
    }
}

/// Which text an [`Excerpt`] was cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExcerptKind {
    Source,
    Normalized,
    Transformed,
}

impl fmt::Display for ExcerptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Normalized => write!(f, "normalized code"),
            Self::Transformed => write!(f, "transformed code"),
        }
    }
}

/// A bounded prefix of some code, attached to an error for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Excerpt {
    pub kind: ExcerptKind,
    pub text: String,
    pub truncated: bool,
}

impl Excerpt {
    /// Cut `text` down to at most `limit` bytes, on a char boundary.
    pub fn new(kind: ExcerptKind, text: &str, limit: usize) -> Self {
        if text.len() <= limit {
            return Self {
                kind,
                text: text.to_string(),
                truncated: false,
            };
        }
        let mut end = limit;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        Self {
            kind,
            text: text[..end].to_string(),
            truncated: true,
        }
    }
}

impl fmt::Display for Excerpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {} ---", self.kind)?;
        write!(f, "{}", self.text)?;
        if self.truncated {
            write!(f, "…")?;
        }
        Ok(())
    }
}

/// A failed playground evaluation.
///
/// Carries the stage that failed, the original message, an optional source
/// position, and excerpts of the code involved. Callers show `to_string()`
/// in their status channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveError {
    pub stage: Stage,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Span>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub excerpts: Vec<Excerpt>,
}

impl LiveError {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            position: None,
            excerpts: Vec::new(),
        }
    }

    pub fn at(mut self, position: Option<Span>) -> Self {
        self.position = position;
        self
    }

    /// Attach an excerpt, replacing any existing excerpt of the same kind.
    pub fn with_excerpt(mut self, kind: ExcerptKind, text: &str, limit: usize) -> Self {
        self.excerpts.retain(|e| e.kind != kind);
        self.excerpts.push(Excerpt::new(kind, text, limit));
        self
    }

    pub fn excerpt(&self, kind: ExcerptKind) -> Option<&Excerpt> {
        self.excerpts.iter().find(|e| e.kind == kind)
    }
}

impl fmt::Display for LiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.stage, self.message)?;
        if let Some(position) = self.position {
            write!(f, " (at {position})")?;
        }
        for excerpt in &self.excerpts {
            write!(f, "\n{excerpt}")?;
        }
        Ok(())
    }
}

impl std::error::Error for LiveError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_max_limit() {
        let mut diags = Diagnostics::empty();
        for i in 0..25 {
            diags.push(Diagnostic::new(format!("Error {i}"), Span::point(i, 1, 1), ""));
        }
        assert_eq!(diags.errors.len(), MAX_ERRORS);
        assert_eq!(diags.total_errors, 25);
        assert!(diags.has_errors());
        assert!(diags.at_limit());
    }

    #[test]
    fn test_diagnostics_empty() {
        let diags = Diagnostics::empty();
        assert!(!diags.has_errors());
        assert!(diags.first().is_none());
    }

    #[test]
    fn test_diagnostic_with_suggestion() {
        let d = Diagnostic::new("Unexpected '@'", Span::point(0, 1, 1), "@x")
            .with_suggestion("Decorators are not supported");
        assert_eq!(d.suggestion.as_deref(), Some("Decorators are not supported"));
        assert_eq!(d.to_string(), "Unexpected '@' (1:1)");
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let e = Excerpt::new(ExcerptKind::Source, "héllo world", 2);
        assert_eq!(e.text, "h");
        assert!(e.truncated);
        let e = Excerpt::new(ExcerptKind::Source, "short", 240);
        assert_eq!(e.text, "short");
        assert!(!e.truncated);
    }

    #[test]
    fn test_live_error_display() {
        let err = LiveError::new(Stage::Evaluate, "ReferenceError: x is not defined")
            .at(Some(Span::new(12, 13, 2, 5)))
            .with_excerpt(ExcerptKind::Source, "export default x", 240);
        let text = err.to_string();
        assert!(text.starts_with("evaluate error: ReferenceError: x is not defined (at 2:5)"));
        assert!(text.contains("--- source ---\nexport default x"));
    }

    #[test]
    fn test_live_error_excerpt_replaced() {
        let err = LiveError::new(Stage::Transform, "boom")
            .with_excerpt(ExcerptKind::Normalized, "a", 240)
            .with_excerpt(ExcerptKind::Normalized, "b", 240);
        assert_eq!(err.excerpts.len(), 1);
        assert_eq!(err.excerpt(ExcerptKind::Normalized).map(|e| e.text.as_str()), Some("b"));
    }

    #[test]
    fn test_live_error_json_serialization() {
        let err = LiveError::new(Stage::Transform, "Unexpected token")
            .with_excerpt(ExcerptKind::Normalized, "export default <div", 240);
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"stage\":\"transform\""));
        assert!(json.contains("\"kind\":\"normalized\""));
        assert!(!json.contains("\"position\""));
    }
}
