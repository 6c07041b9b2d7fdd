//! End-to-end pipeline tests.
//!
//! Covers:
//! - empty code, bare markup, exported components and `render(...)`
//! - scope bindings, `import` paths, invalid binding names
//! - transform failures, evaluation failures, double failures
//! - non-error throwables coming back as `Uncaught`
//! - determinism across content-equal scopes
//! - configuration, sessions and the markup preview

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use livecode::transform::repair;
use livecode::{
    execute, render_markup, ExcerptKind, Execution, InterpreterSandbox, LiveConfig, Renderable,
    Runner, Scope, Session, Stage, Value,
};
use livecode_eval::runtime;
use livecode_transpile::{Transpile, TranspileError, TranspileResult, Transpiler};
use livecode_types::Span;
use pretty_assertions::assert_eq;
use serde_json::json;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn run(code: &str, scope: &Scope) -> Execution {
    match execute(code, scope) {
        Ok(outcome) => outcome,
        Err(uncaught) => panic!("unexpected {uncaught}"),
    }
}

fn run_ok(code: &str, scope: &Scope) -> Option<Renderable> {
    let outcome = run(code, scope);
    if let Some(err) = outcome.error {
        panic!("unexpected error: {err}");
    }
    outcome.result
}

fn markup(code: &str, scope: &Scope) -> String {
    let result = run_ok(code, scope).expect("a renderable result");
    render_markup(&result).unwrap()
}

fn scope_json(value: serde_json::Value) -> Scope {
    Scope::from_json(value).unwrap()
}

/// Transpiles once, then rejects everything.
struct FailsAfterFirst {
    calls: Cell<usize>,
}

impl Transpile for FailsAfterFirst {
    fn transpile(&self, code: &str) -> TranspileResult<String> {
        self.calls.set(self.calls.get() + 1);
        if self.calls.get() == 1 {
            return Transpiler::default().transpile(code);
        }
        Err(TranspileError::Syntax {
            message: "transpiler unavailable".into(),
            position: Span::default(),
        })
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Results
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_empty_code_yields_nothing() {
    for scope in [Scope::new(), scope_json(json!({ "x": 1, "import": { "a/b": 2 } }))] {
        assert_eq!(run("", &scope), Execution::default());
    }
}

#[test]
fn test_bare_markup_is_a_node() {
    let Some(Renderable::Node(el)) = run_ok("<div>Hi</div>", &Scope::new()) else {
        panic!("expected a node");
    };
    assert_eq!(el.type_name(), "div");
    assert_eq!(el.children(), vec![Value::from("Hi")]);
}

#[test]
fn test_function_component_is_wrapped() {
    let code = "function Greeting() {\n  return <h1 className=\"title\">Hello</h1>;\n}";
    let result = run_ok(code, &Scope::new());
    assert!(matches!(result, Some(Renderable::Component(_))));
    assert_eq!(markup(code, &Scope::new()), "<h1 class=\"title\">Hello</h1>");
}

#[test]
fn test_class_component_without_constructor() {
    let code = r#"class Card extends React.Component {
  title() {
    return this.props.title || "Untitled";
  }
  render() {
    return <section className="card">{this.title()}</section>;
  }
}"#;
    let Some(Renderable::Component(el)) = run_ok(code, &Scope::new()) else {
        panic!("expected a component");
    };
    assert_eq!(el.type_name(), "Card");
    assert_eq!(
        markup(code, &Scope::new()),
        "<section class=\"card\">Untitled</section>"
    );
}

#[test]
fn test_render_callback() {
    let code = "const name = 'Ada';\nrender(<p>Hi {name}</p>);";
    assert_eq!(markup(code, &Scope::new()), "<p>Hi Ada</p>");
}

#[test]
fn test_text_result() {
    assert_eq!(
        run_ok("export default `n=${1 + 1}`;", &Scope::new()),
        Some(Renderable::Text("n=2".into()))
    );
}

#[test]
fn test_non_renderable_values_are_silent() {
    for code in [
        "export default 42;",
        "export default [1, 2];",
        "export default ({ a: 1 });",
        "export default (props) => <b/>;",
        "export default null;",
    ] {
        assert_eq!(run(code, &Scope::new()), Execution::default(), "{code}");
    }
}

#[test]
fn test_hooks_and_typescript() {
    let code = r#"
import React, { useState } from "react";

type Props = { start?: number };

const Counter = ({ start = 3 }: Props) => {
  const [count, setCount] = useState<number>(start);
  return <button onClick={() => setCount(count + 1)}>Count: {count}</button>;
};

<Counter />
"#;
    assert_eq!(markup(code, &Scope::new()), "<button>Count: 3</button>");
}

// ══════════════════════════════════════════════════════════════════════════════
// Scope
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_scope_bindings_are_visible() {
    let scope = scope_json(json!({ "title": "Docs", "items": ["a", "b"] }));
    let code = "<ul title={title}>{items.map(i => <li key={i}>{i}</li>)}</ul>";
    assert_eq!(markup(code, &scope), "<ul title=\"Docs\"><li>a</li><li>b</li></ul>");
}

#[test]
fn test_imported_value_is_not_renderable() {
    let scope = scope_json(json!({ "import": { "pkg-x": { "val": 1 } } }));
    let code = "import { val } from \"pkg-x\";\nexport default val;";
    assert_eq!(run(code, &scope), Execution::default());
}

#[test]
fn test_invalid_names_resolve_through_require() {
    let scope = scope_json(json!({
        "my widget": "spaced",
        "2fast": "digit",
        "import": { "my widget": "spaced", "2fast": "digit" }
    }));
    let code = "import a from \"my widget\";\nimport b from \"2fast\";\nexport default a + ':' + b;";
    assert_eq!(run_ok(code, &scope), Some(Renderable::Text("spaced:digit".into())));
}

#[test]
fn test_path_keys_are_modules() {
    let scope = scope_json(json!({ "@acme/ui": { "label": "from path key" } }));
    let code = "import { label } from \"@acme/ui\";\nexport default label;";
    assert_eq!(run_ok(code, &scope), Some(Renderable::Text("from path key".into())));
}

#[test]
fn test_react_import_alias() {
    let code = "import * as R from \"react\";\nexport default R.createElement('i', null, R.version);";
    assert_eq!(markup(code, &Scope::new()), "<i>18.3.1</i>");
}

#[test]
fn test_content_equal_scopes_give_equal_results() {
    let code = "<section><h2>{heading}</h2></section>";
    let first = run(code, &scope_json(json!({ "heading": "Same" })));
    let second = run(code, &scope_json(json!({ "heading": "Same" })));
    assert!(first.result.is_some());
    assert_eq!(first, second);
}

#[test]
fn test_scope_is_not_mutated() {
    let scope = scope_json(json!({ "config": { "mode": "a" } }));
    run("config.mode = 'b';\nexport default config.mode;", &scope);
    let Some(Value::Object(config)) = scope.get("config") else {
        panic!("config missing");
    };
    // Author code may change objects it was handed; the scope's own entries
    // stay as they were.
    assert_eq!(scope.len(), 1);
    assert!(config.has_own("mode"));
}

// ══════════════════════════════════════════════════════════════════════════════
// Errors
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_thrown_error_is_reported() {
    let code = "const boom = () => { throw new Error('kaboom'); };\nboom();";
    let outcome = run(code, &Scope::new());
    assert_eq!(outcome.result, None);
    let err = outcome.error.expect("an error");
    assert_eq!(err.stage, Stage::Evaluate);
    assert!(err.message.contains("kaboom"), "{}", err.message);
    assert!(err.position.is_some());
    assert_eq!(err.excerpt(ExcerptKind::Source).map(|e| e.text.as_str()), Some(code));
    let transformed = err.excerpt(ExcerptKind::Transformed).expect("transformed excerpt");
    assert!(transformed.text.contains("throw new Error"));
}

#[test]
fn test_missing_module_names_the_path() {
    let code = "import thing from \"@acme/not-there\";\nexport default thing;";
    let err = run(code, &Scope::new()).error.expect("an error");
    assert!(err.message.starts_with("ModuleNotFoundError"), "{}", err.message);
    assert!(err.message.contains("@acme/not-there"));
}

#[test]
fn test_runtime_type_error() {
    let err = run("const user = null;\nexport default user.name;", &Scope::new())
        .error
        .expect("an error");
    assert!(err.message.starts_with("TypeError: "), "{}", err.message);
}

#[test]
fn test_transform_error() {
    let outcome = run("<div>", &Scope::new());
    assert_eq!(outcome.result, None);
    let err = outcome.error.expect("an error");
    assert_eq!(err.stage, Stage::Transform);
    assert!(err.position.is_some());
    assert_eq!(
        err.excerpt(ExcerptKind::Normalized).map(|e| e.text.as_str()),
        Some("export default <div>")
    );
}

#[test]
fn test_excerpts_are_bounded() {
    let mut code = "export default (() => { throw new RangeError('too far'); })();\n".to_string();
    code.push_str(&"// padding\n".repeat(100));
    let mut runner = Runner::new().with_excerpt_limit(32);
    let err = runner.execute(&code, &Scope::new()).unwrap().error.expect("an error");
    for excerpt in &err.excerpts {
        assert!(excerpt.text.len() <= 32);
        assert!(excerpt.truncated);
    }
}

#[test]
fn test_double_failure_is_composed() {
    let transpiler = FailsAfterFirst {
        calls: Cell::new(0),
    };
    let mut runner = Runner::from_parts(transpiler, InterpreterSandbox::new());
    let err = runner
        .execute("throw new Error('first');", &Scope::new())
        .unwrap()
        .error
        .expect("an error");
    assert_eq!(err.stage, Stage::Evaluate);
    assert!(err.message.contains("Error: first"));
    assert!(err.message.contains("transpiler unavailable"));
    assert!(err.excerpt(ExcerptKind::Source).is_some());
    assert!(err.excerpt(ExcerptKind::Transformed).is_none());
}

#[test]
fn test_non_error_throw_is_uncaught() {
    let uncaught = execute("throw { code: 7 };", &Scope::new()).unwrap_err();
    let Value::Object(obj) = uncaught.value() else {
        panic!("expected the thrown object");
    };
    assert_eq!(obj.get("code"), Some(Value::from(7)));
    assert_eq!(uncaught.to_string(), "Uncaught { code: 7 }");
}

// ══════════════════════════════════════════════════════════════════════════════
// Configuration, sessions, console
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_configured_jsx_factory() {
    let config = LiveConfig::from_json_str(r#"{ "transpile": { "jsx_factory": "h" } }"#).unwrap();
    let h = runtime::react()
        .as_object()
        .and_then(|react| react.get("createElement"))
        .expect("createElement");
    let scope = Scope::new().with("h", h);
    let outcome = Runner::with_config(&config).execute("<em>x</em>", &scope).unwrap();
    let result = outcome.result.expect("a node");
    assert_eq!(render_markup(&result).unwrap(), "<em>x</em>");
}

#[test]
fn test_console_output_is_captured() {
    let mut runner = Runner::new();
    runner
        .execute("console.log('value:', { a: 1 });\n<br/>", &Scope::new())
        .unwrap();
    let messages: Vec<&str> = runner
        .sandbox()
        .console()
        .iter()
        .map(|entry| entry.message.as_str())
        .collect();
    assert_eq!(messages, vec!["value: { a: 1 }"]);
}

#[test]
fn test_session_reruns_on_generation_change() {
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    let tick = Value::native("tick", 0, move |_, _, _| {
        *counter.borrow_mut() += 1;
        Ok(Value::Undefined)
    });

    let mut session = Session::default();
    session.set_scope(Scope::new().with("tick", tick));
    session.set_code("tick();\n<b>{1}</b>");
    assert!(session.output().as_ref().is_ok_and(|o| o.result.is_some()));
    assert!(session.output().is_ok());
    assert_eq!(*calls.borrow(), 1);

    session.set_code(session.code().to_string());
    assert_eq!(session.generation(), 3);
    assert!(session.output().is_ok());
    assert_eq!(*calls.borrow(), 2);
}

#[test]
fn test_repair_matches_default_transpiler_output() {
    let raw = Transpiler::default().transpile("export default 1;").unwrap();
    assert!(raw.starts_with("\"use strict\";"));
    assert_eq!(repair(&raw), "exports.default = 1;\n");
}
