//! Sandboxed evaluation of transformed code.
//!
//! The code becomes the body of a function whose parameters are the
//! execution context's names; it is compiled, called once with the matching
//! values, and whatever it left in `exports.default` is the result.
//!
//! Nothing here isolates author code from the interpreter's globals or
//! bounds its running time.

use livecode_eval::value::ObjectRef;
use livecode_eval::{ConsoleEntry, EvalResult, Evaluator, Exception, Thrown, Value};
use livecode_types::{ExcerptKind, LiveError, Stage};

use crate::error::{Failure, Uncaught};
use crate::scope::{is_valid_identifier, ExecutionContext};

/// A way to turn code text into something callable.
pub trait Sandbox {
    type Unit;

    /// Compile `body` as a function of `params`.
    fn compile(&mut self, params: &[String], body: &str) -> EvalResult<Self::Unit>;

    /// Call a compiled unit with one argument per parameter.
    fn invoke(&mut self, unit: &Self::Unit, args: Vec<Value>) -> EvalResult<Value>;
}

/// The default sandbox, backed by the tree-walking interpreter. Every
/// compile starts from a fresh [`Evaluator`], so runs share no state.
#[derive(Default)]
pub struct InterpreterSandbox {
    evaluator: Evaluator,
}

impl InterpreterSandbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// `console` output of the most recent run.
    pub fn console(&self) -> &[ConsoleEntry] {
        &self.evaluator.console
    }
}

impl Sandbox for InterpreterSandbox {
    type Unit = Value;

    fn compile(&mut self, params: &[String], body: &str) -> EvalResult<Value> {
        self.evaluator = Evaluator::new();
        self.evaluator.compile_function(params, body)
    }

    fn invoke(&mut self, unit: &Value, args: Vec<Value>) -> EvalResult<Value> {
        self.evaluator.call_function(unit, Value::Undefined, args)
    }
}

/// The `render(value)` callback: stores `value` as the default export.
pub fn render_callback(exports: &ObjectRef) -> Value {
    let exports = exports.clone();
    Value::native("render", 1, move |_, _, args| {
        exports.insert("default", args.first().cloned().unwrap_or_default());
        Ok(Value::Undefined)
    })
}

/// Run `code` over `context` and return `exports.default`.
///
/// Bindings whose names are not valid identifiers are left out. An error
/// thrown while compiling or running becomes a `LiveError` with stage
/// `evaluate`, the error's message and position, and a prefix of `code`;
/// any other thrown value comes back as [`Uncaught`].
pub fn evaluate<S: Sandbox>(
    sandbox: &mut S,
    code: &str,
    context: &ExecutionContext,
    exports: &ObjectRef,
    excerpt_limit: usize,
) -> Result<Value, Failure> {
    let (params, args): (Vec<String>, Vec<Value>) = context
        .iter()
        .filter(|(name, _)| is_valid_identifier(name))
        .map(|(name, value)| (name.to_string(), value.clone()))
        .unzip();
    tracing::debug!(bindings = params.len(), "sandbox bindings filtered");

    let run = sandbox
        .compile(&params, code)
        .and_then(|unit| sandbox.invoke(&unit, args));
    match run {
        Ok(_) => Ok(exports.get("default").unwrap_or_default()),
        Err(exception) => Err(classify(exception, code, excerpt_limit)),
    }
}

fn classify(exception: Exception, code: &str, excerpt_limit: usize) -> Failure {
    let is_error = exception.is_error();
    let message = exception.message();
    let span = exception.span;
    match exception.thrown {
        Thrown::Value(value) if !is_error => Failure::Uncaught(Uncaught(value)),
        _ => Failure::Live(
            LiveError::new(Stage::Evaluate, message)
                .at(span)
                .with_excerpt(ExcerptKind::Transformed, code, excerpt_limit),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livecode_eval::Object;
    use livecode_types::DEFAULT_EXCERPT_LIMIT;
    use pretty_assertions::assert_eq;

    fn evaluate_default(
        code: &str,
        context: &ExecutionContext,
        exports: &ObjectRef,
    ) -> Result<Value, Failure> {
        evaluate(&mut InterpreterSandbox::new(), code, context, exports, DEFAULT_EXCERPT_LIMIT)
    }

    fn context(entries: &[(&str, Value)], exports: &ObjectRef) -> ExecutionContext {
        let mut context = ExecutionContext::default();
        context.bind("exports", Value::Object(exports.clone()));
        context.bind("render", render_callback(exports));
        for (name, value) in entries {
            context.bind(*name, value.clone());
        }
        context
    }

    #[test]
    fn test_returns_default_export() {
        let exports = Object::new();
        let ctx = context(&[("x", Value::from(20))], &exports);
        let value = evaluate_default("exports.default = x + 1;", &ctx, &exports).unwrap();
        assert_eq!(value, Value::from(21));
    }

    #[test]
    fn test_render_callback_sets_export() {
        let exports = Object::new();
        let ctx = context(&[], &exports);
        let value = evaluate_default("render('hello');", &ctx, &exports).unwrap();
        assert_eq!(value, Value::from("hello"));
    }

    #[test]
    fn test_invalid_names_are_not_bound() {
        let exports = Object::new();
        let ctx = context(&[("my value", Value::from(1)), ("2x", Value::from(2))], &exports);
        let value = evaluate_default("exports.default = typeof x;", &ctx, &exports).unwrap();
        assert_eq!(value, Value::from("undefined"));
    }

    #[test]
    fn test_error_carries_message_and_excerpt() {
        let exports = Object::new();
        let ctx = context(&[], &exports);
        let code = "throw new TypeError('bad prop');";
        let Err(Failure::Live(err)) = evaluate(&mut InterpreterSandbox::new(), code, &ctx, &exports, 10)
        else {
            panic!("expected a live error");
        };
        assert_eq!(err.stage, Stage::Evaluate);
        assert_eq!(err.message, "TypeError: bad prop");
        assert!(err.position.is_some());
        assert_eq!(err.excerpt(ExcerptKind::Transformed).map(|e| e.text.as_str()), Some("throw new "));
    }

    #[test]
    fn test_syntax_error_is_live_error() {
        let exports = Object::new();
        let ctx = context(&[], &exports);
        let result = evaluate_default("let = ;", &ctx, &exports);
        assert!(matches!(result, Err(Failure::Live(ref e)) if e.message.starts_with("SyntaxError")));
    }

    #[test]
    fn test_non_error_throw_is_uncaught() {
        let exports = Object::new();
        let ctx = context(&[], &exports);
        let result = evaluate_default("throw 'plain';", &ctx, &exports);
        let Err(Failure::Uncaught(Uncaught(value))) = result else {
            panic!("expected an uncaught value");
        };
        assert_eq!(value, Value::from("plain"));
    }

    #[test]
    fn test_console_is_captured() {
        let exports = Object::new();
        let ctx = context(&[], &exports);
        let mut sandbox = InterpreterSandbox::new();
        evaluate(&mut sandbox, "console.log('hi', 1);", &ctx, &exports, 100).unwrap();
        assert_eq!(sandbox.console().len(), 1);
        assert_eq!(sandbox.console()[0].message, "hi 1");
    }
}
