//! Transform adapter: runs the transpiler and repairs artifacts in its
//! output that the sandbox does not accept.

use livecode_transpile::{Transpile, Transpiler};
use livecode_types::{ExcerptKind, LiveError, Stage, DEFAULT_EXCERPT_LIMIT};

const ES_MODULE_MARKER: &str = "Object.defineProperty(exports, \"__esModule\", { value: true });";

/// Wraps a [`Transpile`] implementation.
#[derive(Debug, Clone)]
pub struct TransformAdapter<T = Transpiler> {
    transpiler: T,
    excerpt_limit: usize,
}

impl Default for TransformAdapter {
    fn default() -> Self {
        Self::new(Transpiler::default())
    }
}

impl<T: Transpile> TransformAdapter<T> {
    pub fn new(transpiler: T) -> Self {
        Self {
            transpiler,
            excerpt_limit: DEFAULT_EXCERPT_LIMIT,
        }
    }

    pub fn with_excerpt_limit(mut self, limit: usize) -> Self {
        self.excerpt_limit = limit;
        self
    }

    pub fn transpiler(&self) -> &T {
        &self.transpiler
    }

    /// Transpile normalized code. Failures carry stage `transform`, the
    /// transpiler's message and position, and the normalized code.
    pub fn transform(&self, normalized: &str) -> Result<String, LiveError> {
        match self.transpiler.transpile(normalized) {
            Ok(output) => Ok(repair(&output)),
            Err(err) => Err(LiveError::new(Stage::Transform, err.to_string())
                .at(err.position())
                .with_excerpt(ExcerptKind::Normalized, normalized, self.excerpt_limit)),
        }
    }
}

/// Strip the strict-mode prologue and the leading `__esModule` marker, and
/// join `exports. default` back into `exports.default`.
pub fn repair(output: &str) -> String {
    let mut rest = output.trim_start();
    for directive in ["\"use strict\";", "'use strict';"] {
        if let Some(stripped) = rest.strip_prefix(directive) {
            rest = stripped.trim_start();
            break;
        }
    }
    if let Some(stripped) = rest.strip_prefix(ES_MODULE_MARKER) {
        rest = stripped.trim_start();
    }
    rest.replace("exports. default", "exports.default")
}

#[cfg(test)]
mod tests {
    use super::*;
    use livecode_transpile::{TranspileError, TranspileResult};
    use livecode_types::Span;
    use pretty_assertions::assert_eq;

    struct Fixed(&'static str);

    impl Transpile for Fixed {
        fn transpile(&self, _: &str) -> TranspileResult<String> {
            Ok(self.0.to_string())
        }
    }

    struct Rejects;

    impl Transpile for Rejects {
        fn transpile(&self, _: &str) -> TranspileResult<String> {
            Err(TranspileError::Syntax {
                message: "Unexpected token".into(),
                position: Span::point(3, 1, 4),
            })
        }
    }

    #[test]
    fn test_repairs_prologue_and_marker() {
        let adapter = TransformAdapter::new(Fixed(
            "  'use strict';\nObject.defineProperty(exports, \"__esModule\", { value: true });\nexports. default = 1;",
        ));
        assert_eq!(adapter.transform("x").unwrap(), "exports.default = 1;");
    }

    #[test]
    fn test_marker_only_stripped_at_start() {
        let code = "var a = 1;\nObject.defineProperty(exports, \"__esModule\", { value: true });";
        assert_eq!(repair(code), code);
    }

    #[test]
    fn test_transpile_failure_is_transform_stage() {
        let err = TransformAdapter::new(Rejects)
            .with_excerpt_limit(4)
            .transform("<div><")
            .unwrap_err();
        assert_eq!(err.stage, Stage::Transform);
        assert_eq!(err.message, "Unexpected token");
        assert_eq!(err.position, Some(Span::point(3, 1, 4)));
        let excerpt = err.excerpt(ExcerptKind::Normalized).unwrap();
        assert_eq!(excerpt.text, "<div");
        assert!(excerpt.truncated);
    }

    #[test]
    fn test_default_transpiler_output_is_repaired() {
        let out = TransformAdapter::default()
            .transform("export default 42;")
            .unwrap();
        assert!(!out.contains("use strict"));
        assert!(!out.contains("__esModule"));
        assert!(out.contains("exports.default = 42;"));
    }
}
