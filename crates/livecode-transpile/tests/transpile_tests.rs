//! Transpiler tests: JSX lowering, module lowering, TypeScript erasure,
//! statement layout, precedence and errors.

use livecode_parser::{parse, ParseOptions};
use livecode_transpile::{transpile, Transpile, TranspileError, TranspileOptions, Transpiler};
use livecode_types::SourceFile;
use pretty_assertions::assert_eq;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

const PROLOGUE: &str = "\"use strict\";\nObject.defineProperty(exports, \"__esModule\", { value: true });\n";

fn ok(source: &str) -> String {
    transpile(source).unwrap_or_else(|e| panic!("transpile failed: {e}"))
}

fn module(body: &str) -> String {
    format!("{PROLOGUE}{body}")
}

// ─────────────────────────────────────────────────────────────────────
// JSX
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_default_jsx_export() {
    assert_eq!(
        ok("export default <div>Hi</div>"),
        module("exports.default = React.createElement(\"div\", null, \"Hi\");\n")
    );
}

#[test]
fn test_jsx_props() {
    assert_eq!(
        ok(r#"<Button kind="primary" disabled onClick={() => go(1)} {...rest} aria-label="x" />"#),
        "React.createElement(Button, { kind: \"primary\", disabled: true, onClick: () => go(1), ...rest, \"aria-label\": \"x\" });\n"
    );
}

#[test]
fn test_jsx_nested_children_and_member_tags() {
    assert_eq!(
        ok("<Ui.List>\n  <li>{item}</li>\n  text\n</Ui.List>"),
        "React.createElement(Ui.List, null, React.createElement(\"li\", null, item), \"text\");\n"
    );
}

#[test]
fn test_custom_jsx_factory_and_fragment() {
    let transpiler = Transpiler::new(TranspileOptions {
        jsx_factory: "h".into(),
        jsx_fragment: "Fragment".into(),
        typescript: false,
    });
    assert_eq!(
        transpiler.transpile("<><a /></>").expect("transpiles"),
        "h(Fragment, null, h(\"a\", null));\n"
    );
}

// ─────────────────────────────────────────────────────────────────────
// Modules
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_imports_become_require_calls() {
    let source = r#"import React, { useState } from "react";
export default function App() { const [n, setN] = useState(0); return <b>{n}</b>; }"#;
    let expected = module(
        r#"const _react = require("react");
const React = _interopRequireDefault(_react).default;
const { useState } = _react;
function App() {
  const [n, setN] = useState(0);
  return React.createElement("b", null, n);
}
exports.default = App;
function _interopRequireDefault(e) { return e && e.__esModule ? e : { default: e }; }
"#,
    );
    assert_eq!(ok(source), expected);
}

#[test]
fn test_import_forms() {
    let source = r#"import * as utils from "./utils";
import { a as b, c } from "pkg-x";
import "./styles.css";
export default b;"#;
    let expected = module(
        r#"const utils = require("./utils");
const { a: b, c } = require("pkg-x");
require("./styles.css");
exports.default = b;
"#,
    );
    assert_eq!(ok(source), expected);
}

#[test]
fn test_imports_are_hoisted() {
    let out = ok("const x = 1;\nimport { y } from \"y\";\nexport default x + y;");
    assert_eq!(
        out,
        module("const { y } = require(\"y\");\nconst x = 1;\nexports.default = x + y;\n")
    );
}

#[test]
fn test_export_declarations() {
    assert_eq!(
        ok("export const a = 1, b = 2;\nexport function f() {}\nexport { a as c };"),
        module(
            "const a = 1, b = 2;\nexports.a = a;\nexports.b = b;\nfunction f() {}\nexports.f = f;\nexports.c = a;\n"
        )
    );
}

#[test]
fn test_export_default_anonymous_function() {
    assert_eq!(
        ok("export default function () { return null; }"),
        module("exports.default = function () {\n  return null;\n};\n")
    );
}

#[test]
fn test_export_all() {
    let expected = module(
        r#"const _x = require("./x");
Object.keys(_x).forEach(function (key) {
  if (key === "default" || key === "__esModule") return;
  exports[key] = _x[key];
});
"#,
    );
    assert_eq!(ok("export * from \"./x\";"), expected);
}

#[test]
fn test_script_has_no_prologue() {
    assert_eq!(ok("const a = 1 + 2 * 3;"), "const a = 1 + 2 * 3;\n");
}

// ─────────────────────────────────────────────────────────────────────
// TypeScript
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_typescript_is_erased() {
    let source = r#"interface Props { label: string }
type Size = "s" | "m";
const x: number = 1;
function show(p: Props): string { return p.label as string; }"#;
    assert_eq!(
        ok(source),
        "const x = 1;\nfunction show(p) {\n  return p.label;\n}\n"
    );
}

#[test]
fn test_typescript_can_be_disabled() {
    let transpiler = Transpiler::new(TranspileOptions {
        typescript: false,
        ..TranspileOptions::default()
    });
    assert!(transpiler.transpile("const x: number = 1;").is_err());
}

// ─────────────────────────────────────────────────────────────────────
// Statements & Expressions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_if_else_chain_layout() {
    assert_eq!(
        ok("if (a) b(); else if (c) d(); else { e(); }"),
        "if (a) {\n  b();\n} else if (c) {\n  d();\n} else {\n  e();\n}\n"
    );
}

#[test]
fn test_class_layout() {
    let source = r#"class Counter extends React.Component {
  state = { count: 0 };
  render() { return <span>{this.state.count}</span>; }
}"#;
    assert_eq!(
        ok(source),
        r#"class Counter extends React.Component {
  state = { count: 0 };
  render() {
    return React.createElement("span", null, this.state.count);
  }
}
"#
    );
}

#[test]
fn test_loops_and_switch() {
    let source = "for (let i = 0; i < 3; i++) total += i;\nswitch (k) { case 1: go(); break; default: stop(); }";
    assert_eq!(
        ok(source),
        "for (let i = 0; i < 3; i++) {\n  total += i;\n}\nswitch (k) {\n  case 1:\n    go();\n    break;\n  default:\n    stop();\n}\n"
    );
}

#[test]
fn test_parentheses_are_preserved() {
    assert_eq!(ok("x = (a + b) * c;"), "x = (a + b) * c;\n");
    assert_eq!(ok("const f = () => ({ a: 1 });"), "const f = () => ({ a: 1 });\n");
    assert_eq!(ok("y = a ?? (b || c);"), "y = a ?? (b || c);\n");
}

#[test]
fn test_template_and_strings() {
    assert_eq!(ok("s = `Hello ${name}!`;"), "s = `Hello ${name}!`;\n");
    assert_eq!(ok("s = 'it\\'s';"), "s = \"it's\";\n");
}

#[test]
fn test_destructuring_patterns() {
    assert_eq!(
        ok("const { a, b: [c, , d = 1], ...rest } = obj;"),
        "const { a, b: [c, , d = 1], ...rest } = obj;\n"
    );
}

#[test]
fn test_output_parses_as_function_body() {
    let source = r#"import React, { useState } from "react";
const items = [1, 2, 3];
export default function List({ title = "List" }) {
  const [open, setOpen] = useState(false);
  return (
    <section className="list">
      <h2 onClick={() => setOpen(!open)}>{title}</h2>
      {open && <ul>{items.map(i => <li key={i}>{i * 2}</li>)}</ul>}
    </section>
  );
}"#;
    let out = ok(source);
    let sf = SourceFile::new("out.js", out.as_str());
    let reparsed = parse(&sf, ParseOptions::function_body());
    assert!(
        !reparsed.has_errors(),
        "output does not parse:\n{out}\n{:?}",
        reparsed.errors.errors
    );
}

// ─────────────────────────────────────────────────────────────────────
// Errors & Options
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_syntax_error_carries_position() {
    let err = transpile("let x = 1;\nconst = 2;").expect_err("should fail");
    let TranspileError::Syntax { position, .. } = &err else {
        panic!("expected syntax error, got {err:?}");
    };
    assert_eq!(position.line, 2);
    assert_eq!(err.position(), Some(*position));
}

#[test]
fn test_duplicate_export_is_rejected() {
    let err = transpile("export const a = 1;\nexport { a };").expect_err("should fail");
    assert_eq!(err.to_string(), "Duplicate export of 'a'");
}

#[test]
fn test_options_from_json() {
    let options: TranspileOptions =
        serde_json::from_str(r#"{ "jsx_factory": "h" }"#).expect("valid options");
    assert_eq!(options.jsx_factory, "h");
    assert_eq!(options.jsx_fragment, "React.Fragment");
    assert!(options.typescript);

    let unknown = serde_json::from_str::<TranspileOptions>(r#"{ "pragma": "h" }"#);
    assert!(unknown.is_err());
}

#[test]
fn test_transpile_is_deterministic() {
    let source = "export default () => <p>{[1, 2].map(n => n * 2)}</p>";
    assert_eq!(ok(source), ok(source));
}
