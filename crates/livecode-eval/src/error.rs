//! Runtime exceptions for the livecode interpreter.

use std::fmt;

use livecode_types::Span;
use thiserror::Error;

use crate::value::Value;

/// Built-in error classes the interpreter raises itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Error,
    TypeError,
    ReferenceError,
    RangeError,
    SyntaxError,
    /// Raised by the `require` shim for an unregistered path.
    ModuleNotFoundError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::Error,
        ErrorKind::TypeError,
        ErrorKind::ReferenceError,
        ErrorKind::RangeError,
        ErrorKind::SyntaxError,
        ErrorKind::ModuleNotFoundError,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::ModuleNotFoundError => "ModuleNotFoundError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What was thrown.
#[derive(Debug, Clone)]
pub enum Thrown {
    /// An error raised by the interpreter or a built-in. Becomes an error
    /// object of the matching class when author code catches it.
    Error { kind: ErrorKind, message: String },
    /// A value thrown by author code.
    Value(Value),
}

/// A thrown value propagating through the interpreter.
#[derive(Debug, Clone, Error)]
#[error("{}", describe(&self.thrown))]
pub struct Exception {
    pub thrown: Thrown,
    /// Where it was thrown, when known.
    pub span: Option<Span>,
}

impl Exception {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            thrown: Thrown::Error {
                kind,
                message: message.into(),
            },
            span: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Error, message)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    pub fn reference_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ReferenceError, message)
    }

    pub fn range_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RangeError, message)
    }

    pub fn syntax_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SyntaxError, message)
    }

    /// `Cannot find module "path"` from the `require` shim.
    pub fn module_not_found(path: &str) -> Self {
        Self::new(
            ErrorKind::ModuleNotFoundError,
            format!("Cannot find module \"{path}\""),
        )
    }

    pub fn throw(value: Value) -> Self {
        Self {
            thrown: Thrown::Value(value),
            span: None,
        }
    }

    /// Attach a position unless one is already known.
    pub fn at(mut self, span: Span) -> Self {
        self.span.get_or_insert(span);
        self
    }

    /// Whether the thrown value is an error instance (as opposed to a plain
    /// thrown string, number or object).
    pub fn is_error(&self) -> bool {
        match &self.thrown {
            Thrown::Error { .. } => true,
            Thrown::Value(Value::Object(obj)) => obj.is_error(),
            Thrown::Value(_) => false,
        }
    }

    /// `Name: message` for errors, the string form otherwise.
    pub fn message(&self) -> String {
        describe(&self.thrown)
    }
}

fn describe(thrown: &Thrown) -> String {
    match thrown {
        Thrown::Error { kind, message } => format!("{kind}: {message}"),
        Thrown::Value(Value::Object(obj)) if obj.is_error() => {
            let name = obj
                .get("name")
                .map(|v| v.to_string())
                .unwrap_or_else(|| "Error".to_string());
            let message = obj.get("message").map(|v| v.to_string()).unwrap_or_default();
            if message.is_empty() {
                name
            } else {
                format!("{name}: {message}")
            }
        }
        Thrown::Value(value) => value.to_string(),
    }
}

/// Result alias for interpreter operations.
pub type EvalResult<T> = Result<T, Exception>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_error_message() {
        let e = Exception::type_error("x is not a function");
        assert_eq!(e.message(), "TypeError: x is not a function");
        assert!(e.is_error());
    }

    #[test]
    fn test_module_not_found_message() {
        let e = Exception::module_not_found("pkg/missing");
        assert_eq!(
            e.to_string(),
            "ModuleNotFoundError: Cannot find module \"pkg/missing\""
        );
    }

    #[test]
    fn test_thrown_primitive_is_not_error() {
        let e = Exception::throw(Value::from("oops"));
        assert!(!e.is_error());
        assert_eq!(e.message(), "oops");
    }

    #[test]
    fn test_first_span_wins() {
        let a = Span::point(1, 1, 2);
        let b = Span::point(5, 2, 1);
        let e = Exception::error("boom").at(a).at(b);
        assert_eq!(e.span, Some(a));
    }
}
