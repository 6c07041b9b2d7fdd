//! Parser tests: statements, expressions and precedence, JSX, modules,
//! TypeScript erasure and error reporting.

use livecode_parser::{parse, ParseOptions, ParseResult};
use livecode_types::ast::*;
use livecode_types::SourceFile;
use pretty_assertions::assert_eq;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn parse_with(source: &str, options: ParseOptions) -> ParseResult {
    let sf = SourceFile::new("test.jsx", source);
    parse(&sf, options)
}

fn parse_ok_with(source: &str, options: ParseOptions) -> Program {
    let result = parse_with(source, options);
    if result.has_errors() {
        for e in &result.errors.errors {
            eprintln!("  ERROR: {} ({})", e.message, e.span);
        }
        panic!("unexpected parse errors (see above)");
    }
    result.program
}

fn parse_ok(source: &str) -> Program {
    parse_ok_with(source, ParseOptions::module())
}

fn parse_ts(source: &str) -> Program {
    parse_ok_with(source, ParseOptions::module().with_typescript(true))
}

fn first_error(source: &str) -> String {
    let result = parse_with(source, ParseOptions::module());
    result
        .errors
        .first()
        .map(|e| e.message.clone())
        .expect("expected a parse error")
}

/// Parse a single expression statement and return the expression.
fn expr(source: &str) -> Expr {
    let program = parse_ok(source);
    match program.body.into_iter().next() {
        Some(Stmt::Expr(stmt)) => stmt.expr,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

fn jsx(source: &str) -> JsxElement {
    match expr(source).kind {
        ExprKind::Jsx(element) => *element,
        other => panic!("expected JSX, got {other:?}"),
    }
}

/// Render an expression with explicit grouping to check precedence.
fn shape(e: &Expr) -> String {
    match &e.kind {
        ExprKind::Number(n) => n.to_string(),
        ExprKind::Ident(name) => name.clone(),
        ExprKind::String(s) => format!("{s:?}"),
        ExprKind::Bool(b) => b.to_string(),
        ExprKind::Binary { left, op, right } => {
            format!("({} {} {})", shape(left), op, shape(right))
        }
        ExprKind::Logical { left, op, right } => {
            format!("({} {} {})", shape(left), op, shape(right))
        }
        ExprKind::Unary { op, operand } => format!("({op} {})", shape(operand)),
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => format!(
            "({} ? {} : {})",
            shape(test),
            shape(consequent),
            shape(alternate)
        ),
        ExprKind::Assign { target, op, value } => {
            format!("({} {} {})", shape(target), op, shape(value))
        }
        ExprKind::Member {
            object,
            property: MemberProp::Named(name),
            optional,
        } => format!("{}{}{}", shape(object), if *optional { "?." } else { "." }, name.name),
        ExprKind::Call { callee, args, .. } => format!("{}({})", shape(callee), args.len()),
        ExprKind::Paren(inner) => shape(inner),
        other => format!("<{other:?}>"),
    }
}

fn shape_of(source: &str) -> String {
    shape(&expr(source))
}

// ─────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(shape_of("1 + 2 * 3"), "(1 + (2 * 3))");
    assert_eq!(shape_of("1 - 2 - 3"), "((1 - 2) - 3)");
    assert_eq!(shape_of("2 ** 3 ** 2"), "(2 ** (3 ** 2))");
}

#[test]
fn test_logical_precedence() {
    assert_eq!(shape_of("a || b && c"), "(a || (b && c))");
    assert_eq!(shape_of("a ?? b"), "(a ?? b)");
    assert_eq!(shape_of("a === 1 && b < 2"), "((a === 1) && (b < 2))");
}

#[test]
fn test_conditional_and_assignment() {
    assert_eq!(shape_of("a ? b : c ? d : e"), "(a ? b : (c ? d : e))");
    assert_eq!(shape_of("a = b = 1"), "(a = (b = 1))");
    assert_eq!(shape_of("x += y * 2"), "(x += (y * 2))");
    assert_eq!(shape_of("x ??= 1"), "(x ??= 1)");
}

#[test]
fn test_unary_binds_tighter_than_binary() {
    assert_eq!(shape_of("!a && b"), "((! a) && b)");
    assert_eq!(shape_of("typeof x === \"string\""), "((typeof x) === \"string\")");
}

#[test]
fn test_member_and_call_chain() {
    assert_eq!(shape_of("a.b.c(1, 2)"), "a.b.c(2)");
    assert_eq!(shape_of("a?.b"), "a?.b");
}

#[test]
fn test_sequence_expression() {
    let e = expr("a, b, c");
    assert!(matches!(e.kind, ExprKind::Sequence(ref items) if items.len() == 3));
}

// ─────────────────────────────────────────────────────────────────────
// Literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_template_literal_parts() {
    let e = expr("`a${x}b${y}`");
    let ExprKind::Template(parts) = e.kind else {
        panic!("expected template");
    };
    assert_eq!(parts.len(), 4);
    assert_eq!(parts[0], TemplatePart::Literal("a".into()));
    assert!(matches!(parts[1], TemplatePart::Expr(_)));
}

#[test]
fn test_object_literal_forms() {
    let e = expr("({ a: 1, b, [k]: 2, m() { return 1 }, ...rest, 'q': 3 })");
    let ExprKind::Paren(inner) = e.kind else {
        panic!("expected parens");
    };
    let ExprKind::Object(props) = inner.kind else {
        panic!("expected object");
    };
    assert_eq!(props.len(), 6);
    assert!(matches!(props[1], ObjectProp::Shorthand(ref id) if id.name == "b"));
    assert!(matches!(
        props[2],
        ObjectProp::KeyValue {
            key: PropKey::Computed(_),
            ..
        }
    ));
    assert!(matches!(props[3], ObjectProp::Method { .. }));
    assert!(matches!(props[4], ObjectProp::Spread(_)));
    assert!(matches!(
        props[5],
        ObjectProp::KeyValue {
            key: PropKey::String(_),
            ..
        }
    ));
}

#[test]
fn test_array_literal_with_spread_and_hole() {
    let e = expr("[1, ...xs, , 2]");
    let ExprKind::Array(elements) = e.kind else {
        panic!("expected array");
    };
    assert_eq!(elements.len(), 4);
    assert!(matches!(elements[1], ArrayElement::Spread(_)));
}

// ─────────────────────────────────────────────────────────────────────
// Functions & Classes
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_arrow_functions() {
    let e = expr("(a, b = 2, ...rest) => a + b");
    let ExprKind::Arrow(func) = e.kind else {
        panic!("expected arrow");
    };
    assert_eq!(func.params.len(), 3);
    assert!(func.params[2].rest);
    assert!(matches!(func.body, FunctionBody::Expr(_)));

    let e = expr("x => { return x }");
    assert!(matches!(e.kind, ExprKind::Arrow(ref f) if matches!(f.body, FunctionBody::Block(_))));
}

#[test]
fn test_arrow_with_destructured_param() {
    let e = expr("({ name, age = 3 }) => name");
    let ExprKind::Arrow(func) = e.kind else {
        panic!("expected arrow");
    };
    assert_eq!(
        func.params[0].pattern.bound_names(),
        vec!["name".to_string(), "age".to_string()]
    );
}

#[test]
fn test_function_declaration() {
    let program = parse_ok("function add(a, b) { return a + b; }");
    let Stmt::Function(func) = &program.body[0] else {
        panic!("expected function");
    };
    assert_eq!(func.name.as_ref().map(|n| n.name.as_str()), Some("add"));
    assert_eq!(func.params.len(), 2);
}

#[test]
fn test_class_with_members() {
    let program = parse_ok(
        r#"class Counter extends React.Component {
  state = { count: 0 };
  static label = "c";
  constructor(props) { super(props); }
  render() { return null; }
}"#,
    );
    let Stmt::Class(class) = &program.body[0] else {
        panic!("expected class");
    };
    assert!(class.superclass.is_some());
    assert_eq!(class.members.len(), 4);
    assert!(class.constructor().is_some());
}

#[test]
fn test_new_expression() {
    let e = expr("new Date(2020, 1).getTime()");
    let ExprKind::Call { callee, .. } = e.kind else {
        panic!("expected call");
    };
    let ExprKind::Member { object, .. } = callee.kind else {
        panic!("expected member");
    };
    assert!(matches!(object.kind, ExprKind::New { ref args, .. } if args.len() == 2));
}

// ─────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_variable_declarations_with_patterns() {
    let program = parse_ok("const [a, b] = pair; let { x, y: z } = point; var n;");
    assert_eq!(program.body.len(), 3);
    let Stmt::Var(decl) = &program.body[0] else {
        panic!("expected var");
    };
    assert_eq!(decl.kind, VarKind::Const);
    assert_eq!(decl.declarations[0].pattern.bound_names(), vec!["a", "b"]);
}

#[test]
fn test_control_flow_statements() {
    let program = parse_ok(
        r#"
for (let i = 0; i < 3; i++) { if (i === 1) continue; }
for (const item of items) total += item;
for (const key in obj) {}
while (x) { break; }
do { x--; } while (x > 0)
switch (v) { case 1: f(); break; default: g(); }
try { risky() } catch (e) { log(e) } finally { done() }
"#,
    );
    assert_eq!(program.body.len(), 7);
    assert!(matches!(program.body[1], Stmt::ForEach(ref s) if s.kind == ForEachKind::Of));
    assert!(matches!(program.body[2], Stmt::ForEach(ref s) if s.kind == ForEachKind::In));
    assert!(matches!(program.body[4], Stmt::DoWhile(_)));
}

#[test]
fn test_automatic_semicolon_insertion() {
    let program = parse_ok("let a = 1\nlet b = a\nb++\n");
    assert_eq!(program.body.len(), 3);
}

#[test]
fn test_return_at_top_level_of_function_body() {
    let program = parse_ok_with("const x = 1;\nreturn x;", ParseOptions::function_body());
    assert!(matches!(program.body[1], Stmt::Return(_)));
}

// ─────────────────────────────────────────────────────────────────────
// Modules
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_import_forms() {
    let program = parse_ok(
        r#"import React, { useState as useS, useEffect } from "react";
import * as utils from "./utils";
import "./side-effect";"#,
    );
    assert!(program.is_module());
    let Stmt::Import(import) = &program.body[0] else {
        panic!("expected import");
    };
    assert_eq!(import.source, "react");
    assert_eq!(import.specifiers.len(), 3);
    assert!(matches!(
        import.specifiers[1],
        ImportSpecifier::Named { ref imported, ref local } if imported == "useState" && local.name == "useS"
    ));
    let Stmt::Import(side) = &program.body[2] else {
        panic!("expected import");
    };
    assert!(side.specifiers.is_empty());
}

#[test]
fn test_export_forms() {
    let program = parse_ok(
        r#"export default function App() { return <div /> }
export const a = 1;
export { a as b };
export * from "./x";"#,
    );
    let kinds: Vec<_> = program
        .body
        .iter()
        .map(|s| match s {
            Stmt::Export(e) => match &e.kind {
                ExportKind::DefaultFunction(_) => "default-fn",
                ExportKind::Decl(_) => "decl",
                ExportKind::Named { .. } => "named",
                ExportKind::All { .. } => "all",
                _ => "other",
            },
            _ => "stmt",
        })
        .collect();
    assert_eq!(kinds, vec!["default-fn", "decl", "named", "all"]);
}

#[test]
fn test_script_is_not_module() {
    assert!(!parse_ok("const a = 1;").is_module());
}

#[test]
fn test_import_rejected_in_function_body() {
    let result = parse_with("import x from 'y';", ParseOptions::function_body());
    assert_eq!(
        result.errors.first().map(|e| e.message.as_str()),
        Some("Cannot use import statement outside a module")
    );
}

// ─────────────────────────────────────────────────────────────────────
// JSX
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_jsx_intrinsic_with_attributes() {
    let el = jsx(r#"<div className="box" id={id} hidden {...rest} />"#);
    assert_eq!(el.name, JsxName::Intrinsic("div".into()));
    assert_eq!(el.attributes.len(), 4);
    assert!(matches!(
        el.attributes[0],
        JsxAttribute::Named { ref name, value: Some(JsxAttrValue::String(ref v)), .. }
            if name == "className" && v == "box"
    ));
    assert!(matches!(
        el.attributes[2],
        JsxAttribute::Named { value: None, .. }
    ));
    assert!(matches!(el.attributes[3], JsxAttribute::Spread(_)));
}

#[test]
fn test_jsx_component_and_member_names() {
    assert_eq!(jsx("<App />").name, JsxName::Component(vec!["App".into()]));
    assert_eq!(
        jsx("<Foo.Bar />").name,
        JsxName::Component(vec!["Foo".into(), "Bar".into()])
    );
    assert_eq!(jsx("<my-widget />").name, JsxName::Intrinsic("my-widget".into()));
}

#[test]
fn test_jsx_children_whitespace() {
    let el = jsx("<p>\n  Hello {name}!\n  <b>bold</b>\n</p>");
    assert_eq!(el.children.len(), 4);
    assert_eq!(el.children[0], JsxChild::Text("Hello ".into()));
    assert!(matches!(el.children[1], JsxChild::Expr(_)));
    assert_eq!(el.children[2], JsxChild::Text("!".into()));
    assert!(matches!(el.children[3], JsxChild::Element(_)));
}

#[test]
fn test_jsx_fragment_and_empty_expression() {
    let el = jsx("<>{/* note */}<span />text</>");
    assert_eq!(el.name, JsxName::Fragment);
    assert_eq!(el.children.len(), 2);
}

#[test]
fn test_jsx_inside_expressions() {
    let e = expr("items.map(item => <li key={item.id}>{item.name}</li>)");
    assert!(matches!(e.kind, ExprKind::Call { .. }));
    let e = expr("ok && <b>yes</b>");
    assert!(matches!(e.kind, ExprKind::Logical { .. }));
}

#[test]
fn test_jsx_entities_in_text() {
    let el = jsx("<p>a &amp; b</p>");
    assert_eq!(el.children[0], JsxChild::Text("a & b".into()));
}

#[test]
fn test_jsx_mismatched_closing_tag() {
    assert_eq!(
        first_error("<div></span>"),
        "Expected corresponding JSX closing tag for <div>"
    );
}

#[test]
fn test_less_than_is_not_jsx() {
    assert_eq!(shape_of("a < b"), "(a < b)");
}

// ─────────────────────────────────────────────────────────────────────
// TypeScript
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_typescript_annotations_are_erased() {
    let program = parse_ts(
        r#"interface Props { name: string; count?: number }
type Mode = "a" | "b";
const x: number = 1;
function greet(name: string, opts?: Props): string { return name; }
const f = (a: number, b: Array<string>): void => {};
const s = useState<string | null>(null);
const y = value as unknown as string;
const z = maybe!;
export type { Props };"#,
    );
    let kinds: Vec<_> = program
        .body
        .iter()
        .map(|s| matches!(s, Stmt::Empty(_)))
        .collect();
    assert_eq!(
        kinds,
        vec![true, true, false, false, false, false, false, false, true]
    );
}

#[test]
fn test_typescript_class_members() {
    let program = parse_ts(
        r#"class Store<T> implements Base {
  private items: T[] = [];
  readonly name: string;
  constructor(public size: number) {}
  add(item: T): void { this.items.push(item); }
}"#,
    );
    let Stmt::Class(class) = &program.body[0] else {
        panic!("expected class");
    };
    assert_eq!(class.members.len(), 4);
}

#[test]
fn test_typescript_generic_arrow_return_type() {
    let program = parse_ts("const f = (x: number): Promise<number> => x;");
    assert_eq!(program.body.len(), 1);
}

fn arrow_params(program: &Program) -> usize {
    let Stmt::Var(decl) = &program.body[0] else {
        panic!("expected a declaration, got {:?}", program.body[0]);
    };
    match decl.declarations[0].init.as_ref().map(|init| &init.kind) {
        Some(ExprKind::Arrow(def)) => def.params.len(),
        other => panic!("expected an arrow, got {other:?}"),
    }
}

#[test]
fn test_typescript_generic_arrow_type_params() {
    assert_eq!(arrow_params(&parse_ts("const f = <T,>(x: T): T => x;")), 1);
    assert_eq!(
        arrow_params(&parse_ts("const pick = <K extends string, V>(k: K, v: V) => v;")),
        2
    );
    // A single-letter tag is still markup.
    assert_eq!(jsx("<T>{a}</T>").children.len(), 1);
}

// ─────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_error_positions() {
    let result = parse_with("const a = ;", ParseOptions::module());
    let err = result.errors.first().expect("error");
    assert_eq!(err.span.line, 1);
    assert_eq!(err.span.col, 11);
    assert_eq!(err.source_line, "const a = ;");
}

#[test]
fn test_unsupported_syntax_messages() {
    assert_eq!(first_error("async function f() {}"), "async functions are not supported");
    assert_eq!(
        first_error("const r = /ab+c/;"),
        "Regular expression literals are not supported"
    );
    assert_eq!(first_error("function* g() {}"), "Generator functions are not supported");
    assert_eq!(
        first_error("outer: for (;;) { break outer; }"),
        "Labeled statements are not supported"
    );
}

#[test]
fn test_invalid_assignment_target() {
    assert_eq!(first_error("1 = 2"), "Invalid left-hand side in assignment");
}

#[test]
fn test_missing_const_initializer() {
    assert_eq!(first_error("const a;"), "Missing initializer in declaration");
}

#[test]
fn test_recovery_reports_multiple_errors() {
    let result = parse_with("const = 1;\nlet ok = 2;\nconst = 3;", ParseOptions::module());
    assert_eq!(result.errors.errors.len(), 2);
    assert!(result
        .program
        .body
        .iter()
        .any(|s| matches!(s, Stmt::Var(d) if d.kind == VarKind::Let)));
}

#[test]
fn test_deep_nesting_is_an_error_not_a_crash() {
    let source = format!("{}1{}", "(".repeat(500), ")".repeat(500));
    let result = parse_with(&source, ParseOptions::module());
    assert_eq!(
        result.errors.first().map(|e| e.message.as_str()),
        Some("Code is nested too deeply")
    );
}

#[test]
fn test_parsing_is_deterministic() {
    let source = "export default function App() { const [n, setN] = useState(0); return <b onClick={() => setN(n + 1)}>{n}</b> }";
    let a = parse_ok(source);
    let b = parse_ok(source);
    assert_eq!(a, b);
}
