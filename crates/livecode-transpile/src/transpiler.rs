//! The transpiler entry point and its configuration.

use livecode_parser::{parse, ParseOptions};
use livecode_types::SourceFile;
use serde::{Deserialize, Serialize};

use crate::error::{TranspileError, TranspileResult};
use crate::module::emit_program;

/// Turns author source text into executable text.
///
/// The pipeline depends on this contract only, so any transpiler can be
/// plugged in.
pub trait Transpile {
    fn transpile(&self, code: &str) -> TranspileResult<String>;
}

/// Transpiler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranspileOptions {
    /// Function called for every JSX element.
    pub jsx_factory: String,
    /// Value passed as the type of `<>...</>`.
    pub jsx_fragment: String,
    /// Accept and erase TypeScript annotations.
    pub typescript: bool,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            jsx_factory: "React.createElement".to_string(),
            jsx_fragment: "React.Fragment".to_string(),
            typescript: true,
        }
    }
}

/// The default transpiler: parses JSX/TypeScript modules and prints them as
/// script code against the `require`/`exports` shim.
#[derive(Debug, Clone, Default)]
pub struct Transpiler {
    options: TranspileOptions,
}

impl Transpiler {
    pub fn new(options: TranspileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TranspileOptions {
        &self.options
    }
}

impl Transpile for Transpiler {
    fn transpile(&self, code: &str) -> TranspileResult<String> {
        let source = SourceFile::new("input.jsx", code);
        let parsed = parse(
            &source,
            ParseOptions::module().with_typescript(self.options.typescript),
        );
        if let Some(diagnostic) = parsed.errors.first() {
            return Err(TranspileError::Syntax {
                message: diagnostic.message.clone(),
                position: diagnostic.span,
            });
        }
        emit_program(&parsed.program, &self.options)
    }
}

/// Transpile with the default options.
pub fn transpile(code: &str) -> TranspileResult<String> {
    Transpiler::default().transpile(code)
}
