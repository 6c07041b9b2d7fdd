//! A live-editing session: code and scope that change over time, re-run
//! on demand.

use crate::error::Uncaught;
use crate::pipeline::{Execution, Runner};
use crate::scope::Scope;

/// Holds the current code and scope. Every setter call bumps the
/// generation, even when the new value equals the old one; `output` re-runs
/// the pipeline only when the generation moved since the last run.
pub struct Session {
    runner: Runner,
    code: String,
    scope: Scope,
    generation: u64,
    last: Option<(u64, Result<Execution, Uncaught>)>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Runner::new())
    }
}

impl Session {
    pub fn new(runner: Runner) -> Self {
        Self {
            runner,
            code: String::new(),
            scope: Scope::new(),
            generation: 0,
            last: None,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
        self.generation += 1;
    }

    pub fn set_scope(&mut self, scope: Scope) {
        self.scope = scope;
        self.generation += 1;
    }

    /// The outcome for the current code and scope.
    pub fn output(&mut self) -> &Result<Execution, Uncaught> {
        let generation = self.generation;
        if self.last.as_ref().is_some_and(|(ran, _)| *ran != generation) {
            self.last = None;
        }
        let runner = &mut self.runner;
        let (code, scope) = (&self.code, &self.scope);
        let (_, outcome) = self.last.get_or_insert_with(|| {
            tracing::debug!(generation, "session re-run");
            (generation, runner.execute(code, scope))
        });
        outcome
    }
}
