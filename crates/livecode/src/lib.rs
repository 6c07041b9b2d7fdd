//! livecode: run playground snippets and get back something to render.
//!
//! ```text
//! source → normalize → transform → build scope → sandboxed evaluate → coerce
//! ```
//!
//! ```
//! use livecode::{execute, Renderable, Scope};
//!
//! let outcome = execute("<div>Hi</div>", &Scope::new()).unwrap();
//! assert!(matches!(outcome.result, Some(Renderable::Node(_))));
//! assert!(outcome.error.is_none());
//! ```
//!
//! Evaluation runs in the livecode interpreter. It is not a security
//! boundary: there are no time or memory limits.

pub mod coerce;
pub mod config;
pub mod error;
pub mod logging;
pub mod markup;
pub mod normalize;
pub mod pipeline;
pub mod sandbox;
pub mod scope;
pub mod session;
pub mod transform;

pub use coerce::{coerce, Renderable};
pub use config::LiveConfig;
pub use error::{ConfigError, Failure, ScopeError, Uncaught};
pub use livecode_eval::Value;
pub use livecode_types::{Excerpt, ExcerptKind, LiveError, Stage};
pub use markup::render_markup;
pub use normalize::normalize;
pub use pipeline::{Execution, Runner};
pub use sandbox::{InterpreterSandbox, Sandbox};
pub use scope::{build_scope, BuiltScope, ExecutionContext, ModuleTable, Scope};
pub use session::Session;
pub use transform::TransformAdapter;

/// Run `code` against `scope` with the default transpiler and interpreter.
///
/// Errors are reported in [`Execution::error`]; only a thrown value that is
/// not an error instance comes back as `Err`.
pub fn execute(code: &str, scope: &Scope) -> Result<Execution, Uncaught> {
    logging::init_tracing();
    Runner::new().execute(code, scope)
}
