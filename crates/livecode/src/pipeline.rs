//! The error pipeline around normalize → transform → scope → evaluate →
//! coerce.
//!
//! Every failure ends up as a single [`LiveError`] in the [`Execution`],
//! enriched with excerpts of the code involved. The one exception is a
//! thrown non-error value, which is handed back as [`Uncaught`].

use std::fmt;

use livecode_transpile::{Transpile, Transpiler};
use livecode_types::{ExcerptKind, LiveError, Stage, DEFAULT_EXCERPT_LIMIT};

use crate::coerce::{coerce, Renderable};
use crate::config::LiveConfig;
use crate::error::{Failure, Uncaught};
use crate::normalize::normalize;
use crate::sandbox::{evaluate, render_callback, InterpreterSandbox, Sandbox};
use crate::scope::{build_scope, Scope};
use crate::transform::TransformAdapter;

/// Outcome of one run. At most one field is set; both are `None` when the
/// code exported nothing renderable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Execution {
    pub result: Option<Renderable>,
    pub error: Option<LiveError>,
}

impl Execution {
    pub fn succeeded(result: Option<Renderable>) -> Self {
        Self {
            result,
            error: None,
        }
    }

    pub fn failed(error: LiveError) -> Self {
        Self {
            result: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    Normalizing,
    Transforming,
    ScopeBuilding,
    Evaluating,
    Coercing,
    Succeeded,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Normalizing => "normalizing",
            Phase::Transforming => "transforming",
            Phase::ScopeBuilding => "scope-building",
            Phase::Evaluating => "evaluating",
            Phase::Coercing => "coercing",
            Phase::Succeeded => "succeeded",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Default)]
struct Progress {
    phase: Phase,
}

impl Progress {
    fn advance(&mut self, next: Phase) {
        tracing::debug!(from = %self.phase, to = %next, "stage transition");
        self.phase = next;
    }
}

/// A configured pipeline: which transpiler to run and which sandbox to
/// evaluate in.
pub struct Runner<T = Transpiler, S = InterpreterSandbox> {
    adapter: TransformAdapter<T>,
    sandbox: S,
    excerpt_limit: usize,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// The default transpiler and interpreter.
    pub fn new() -> Self {
        Self::from_parts(Transpiler::default(), InterpreterSandbox::new())
    }

    pub fn with_config(config: &LiveConfig) -> Self {
        Self::from_parts(
            Transpiler::new(config.transpile.clone()),
            InterpreterSandbox::new(),
        )
        .with_excerpt_limit(config.excerpt_limit)
    }
}

impl<T: Transpile, S: Sandbox> Runner<T, S> {
    pub fn from_parts(transpiler: T, sandbox: S) -> Self {
        Self {
            adapter: TransformAdapter::new(transpiler),
            sandbox,
            excerpt_limit: DEFAULT_EXCERPT_LIMIT,
        }
    }

    pub fn with_excerpt_limit(mut self, limit: usize) -> Self {
        self.adapter = self.adapter.with_excerpt_limit(limit);
        self.excerpt_limit = limit;
        self
    }

    pub fn sandbox(&self) -> &S {
        &self.sandbox
    }

    /// Run `code` against `scope`.
    pub fn execute(&mut self, code: &str, scope: &Scope) -> Result<Execution, Uncaught> {
        let span = tracing::debug_span!("execute", code_len = code.len(), scope_len = scope.len());
        let _guard = span.enter();
        let mut progress = Progress::default();

        progress.advance(Phase::Normalizing);
        let normalized = normalize(code);

        progress.advance(Phase::Transforming);
        let transformed = match self.adapter.transform(&normalized) {
            Ok(transformed) => transformed,
            Err(error) => {
                progress.advance(Phase::Failed);
                return Ok(Execution::failed(error));
            }
        };

        match self.run_transformed(&transformed, scope, &mut progress) {
            Ok(result) => {
                progress.advance(Phase::Succeeded);
                Ok(Execution::succeeded(result))
            }
            Err(Failure::Live(error)) => {
                progress.advance(Phase::Failed);
                Ok(Execution::failed(self.enrich(code, error)))
            }
            Err(Failure::Uncaught(uncaught)) => {
                progress.advance(Phase::Failed);
                Err(uncaught)
            }
        }
    }

    fn run_transformed(
        &mut self,
        transformed: &str,
        scope: &Scope,
        progress: &mut Progress,
    ) -> Result<Option<Renderable>, Failure> {
        progress.advance(Phase::ScopeBuilding);
        let built = build_scope(scope);
        let mut context = built.context;
        context.bind("render", render_callback(&built.exports));
        tracing::debug!(modules = built.modules.len(), bindings = context.len(), "scope built");

        progress.advance(Phase::Evaluating);
        let exported = evaluate(
            &mut self.sandbox,
            transformed,
            &context,
            &built.exports,
            self.excerpt_limit,
        )?;

        progress.advance(Phase::Coercing);
        Ok(coerce(&exported))
    }

    /// Attach source and transformed-code excerpts. The transformed code is
    /// regenerated from the source; if that fails, the error describes both
    /// failures.
    fn enrich(&self, code: &str, error: LiveError) -> LiveError {
        let limit = self.excerpt_limit;
        match self.adapter.transform(&normalize(code)) {
            Ok(transformed) => error
                .with_excerpt(ExcerptKind::Source, code, limit)
                .with_excerpt(ExcerptKind::Transformed, &transformed, limit),
            Err(second) => {
                tracing::debug!(error = %second.message, "re-transform for diagnostics failed");
                LiveError::new(
                    Stage::Evaluate,
                    format!(
                        "{}; transforming the source again for diagnostics also failed: {}",
                        error.message, second.message
                    ),
                )
                .at(error.position)
                .with_excerpt(ExcerptKind::Source, code, limit)
            }
        }
    }
}
