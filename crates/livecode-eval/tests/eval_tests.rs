//! Integration tests for the livecode interpreter.
//!
//! Tests cover:
//! - operators, conversions and template literals
//! - closures, hoisting and temporal dead zones
//! - destructuring, spread and optional chaining
//! - classes, `super` and error subclasses
//! - exceptions, `finally` and the call depth limit
//! - built-ins (arrays, strings, numbers, JSON, console)
//! - the `React` runtime base

use livecode_eval::runtime;
use livecode_eval::{ConsoleLevel, ElementType, ErrorKind, Evaluator, Exception, Thrown, Value};
use pretty_assertions::assert_eq;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn run(source: &str) -> Value {
    let mut ev = Evaluator::new();
    ev.define_global("React", runtime::react());
    ev.run(source)
        .unwrap_or_else(|e| panic!("evaluation failed: {}", e.message()))
}

fn run_err(source: &str) -> Exception {
    let mut ev = Evaluator::new();
    ev.define_global("React", runtime::react());
    match ev.run(source) {
        Ok(value) => panic!("expected an exception, got {value:?}"),
        Err(e) => e,
    }
}

fn s(v: &str) -> Value {
    Value::from(v)
}

fn kind_of(e: &Exception) -> Option<ErrorKind> {
    match &e.thrown {
        Thrown::Error { kind, .. } => Some(*kind),
        Thrown::Value(_) => None,
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Operators & conversions
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(run("return 1 + 2 * 3 ** 2;"), Value::from(19));
}

#[test]
fn test_string_concatenation_is_left_to_right() {
    assert_eq!(run(r#"return "a" + 1 + 2;"#), s("a12"));
    assert_eq!(run(r#"return 1 + 2 + "a";"#), s("3a"));
}

#[test]
fn test_template_literal() {
    assert_eq!(run("const n = 3; return `n=${n * 2}!`;"), s("n=6!"));
}

#[test]
fn test_loose_and_strict_equality() {
    assert_eq!(
        run(r#"return [1 == "1", 1 === "1", null == undefined, NaN === NaN].join();"#),
        s("true,false,true,false")
    );
}

#[test]
fn test_typeof_undeclared_identifier() {
    assert_eq!(run("return typeof nope;"), s("undefined"));
}

#[test]
fn test_number_formatting() {
    assert_eq!(run("return (0.1 + 0.2).toString();"), s("0.30000000000000004"));
    assert_eq!(run("return (1234.5).toFixed(2);"), s("1234.50"));
    assert_eq!(run("return (255).toString(16);"), s("ff"));
    assert_eq!(run("return (1234567.5).toLocaleString();"), s("1,234,567.5"));
}

// ══════════════════════════════════════════════════════════════════════════════
// Scoping
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_closure_keeps_state() {
    let src = r#"
        function counter() { let n = 0; return () => ++n; }
        const c = counter();
        c(); c();
        return c();
    "#;
    assert_eq!(run(src), Value::from(3));
}

#[test]
fn test_loop_closures_capture_each_iteration() {
    let src = r#"
        const fns = [];
        for (let i = 0; i < 3; i++) { fns.push(() => i); }
        return fns.map(f => f()).join(",");
    "#;
    assert_eq!(run(src), s("0,1,2"));
}

#[test]
fn test_function_declarations_are_hoisted() {
    assert_eq!(run("return twice(4); function twice(x) { return x * 2; }"), Value::from(8));
}

#[test]
fn test_temporal_dead_zone() {
    let e = run_err("x; let x = 1;");
    assert_eq!(kind_of(&e), Some(ErrorKind::ReferenceError));
    assert_eq!(e.message(), "ReferenceError: Cannot access 'x' before initialization");
}

#[test]
fn test_const_reassignment_is_a_type_error() {
    let e = run_err("const a = 1; a = 2;");
    assert_eq!(e.message(), "TypeError: Assignment to constant variable.");
}

#[test]
fn test_undefined_variable() {
    let e = run_err("return missing + 1;");
    assert_eq!(e.message(), "ReferenceError: missing is not defined");
}

// ══════════════════════════════════════════════════════════════════════════════
// Destructuring, spread, optional chaining
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_destructuring_with_defaults_and_rest() {
    let src = r#"
        const { a, b: [x, y = 5], ...rest } = { a: 1, b: [2], c: 3, d: 4 };
        return [a, x, y, Object.keys(rest).join("")].join(" ");
    "#;
    assert_eq!(run(src), s("1 2 5 cd"));
}

#[test]
fn test_rest_parameters_and_spread_arguments() {
    let src = r#"
        function sum(...xs) { return xs.reduce((a, b) => a + b, 0); }
        return sum(...[1, 2], 3);
    "#;
    assert_eq!(run(src), Value::from(6));
}

#[test]
fn test_object_literal_features() {
    let src = r#"
        const k = "b";
        const o = { a: 1, [k]: 2, ...{ c: 3 } };
        return Object.entries(o).map(([key, v]) => key + v).join(",");
    "#;
    assert_eq!(run(src), s("a1,b2,c3"));
}

#[test]
fn test_optional_chaining_and_nullish() {
    let src = r#"
        const o = { a: null };
        return [o.a?.b, o.missing?.(), o?.a ?? "d"].join("|");
    "#;
    assert_eq!(run(src), s("||d"));
}

#[test]
fn test_calling_a_non_function_names_the_callee() {
    let e = run_err("const props = {}; props.onClick();");
    assert_eq!(e.message(), "TypeError: props.onClick is not a function");
}

// ══════════════════════════════════════════════════════════════════════════════
// Control flow & exceptions
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_switch_fallthrough() {
    let src = r#"
        function f(x) {
            let out = "";
            switch (x) {
                case 1: out += "a";
                case 2: out += "b"; break;
                default: out += "z";
            }
            return out;
        }
        return f(1) + f(2) + f(3);
    "#;
    assert_eq!(run(src), s("abbz"));
}

#[test]
fn test_loops_with_break_and_continue() {
    let src = r#"
        const out = [];
        for (const n of [1, 2, 3, 4, 5]) {
            if (n === 2) continue;
            if (n === 5) break;
            out.push(n);
        }
        for (const key in { x: 1, y: 2 }) out.push(key);
        return out.join("");
    "#;
    assert_eq!(run(src), s("134xy"));
}

#[test]
fn test_caught_builtin_error_is_an_error_object() {
    let src = r#"
        try { null.x; } catch (e) {
            return e instanceof TypeError ? e.message : "no";
        }
    "#;
    assert_eq!(run(src), s("Cannot read properties of null (reading 'x')"));
}

#[test]
fn test_finally_overrides_return() {
    assert_eq!(
        run("function f() { try { return 1; } finally { return 2; } } return f();"),
        Value::from(2)
    );
}

#[test]
fn test_thrown_value_propagates_unchanged() {
    let e = run_err("throw { code: 7 };");
    let Thrown::Value(value) = &e.thrown else {
        panic!("expected a thrown value");
    };
    assert_eq!(value.as_object().and_then(|o| o.get("code")), Some(Value::from(7)));
}

#[test]
fn test_runaway_recursion_is_a_range_error() {
    let e = run_err("function f() { return f(); } return f();");
    assert_eq!(kind_of(&e), Some(ErrorKind::RangeError));
    assert_eq!(e.message(), "RangeError: Maximum call stack size exceeded");
}

#[test]
fn test_syntax_error_is_reported() {
    let e = run_err("return (;");
    assert_eq!(kind_of(&e), Some(ErrorKind::SyntaxError));
}

// ══════════════════════════════════════════════════════════════════════════════
// Classes
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_class_inheritance_and_super_methods() {
    let src = r#"
        class Animal {
            constructor(name) { this.name = name; }
            speak() { return this.name + " makes a sound"; }
        }
        class Dog extends Animal {
            speak() { return super.speak() + " (woof)"; }
        }
        return new Dog("Rex").speak();
    "#;
    assert_eq!(run(src), s("Rex makes a sound (woof)"));
}

#[test]
fn test_class_length_counts_own_constructor_only() {
    let src = r#"
        class Base { constructor(a, b) { this.a = a; } }
        class Derived extends Base {}
        class Explicit extends Base { constructor(x) { super(x, x); } }
        class Card extends React.Component {}
        return [Base.length, Derived.length, Explicit.length, Card.length].join(",");
    "#;
    assert_eq!(run(src), s("2,0,1,0"));
}

#[test]
fn test_class_fields_and_statics() {
    let src = r#"
        class Counter {
            count = 1;
            static label = "C";
            inc() { this.count += 1; return this; }
        }
        return Counter.label + new Counter().inc().inc().count;
    "#;
    assert_eq!(run(src), s("C3"));
}

#[test]
fn test_class_without_new_is_a_type_error() {
    let e = run_err("class A {} A();");
    assert_eq!(
        e.message(),
        "TypeError: Class constructor A cannot be invoked without 'new'"
    );
}

#[test]
fn test_error_subclass() {
    let src = r#"
        class MyErr extends Error {
            constructor(m) { super(m); this.name = "MyErr"; }
        }
        try { throw new MyErr("bad"); } catch (e) {
            return String(e) + "|" + (e instanceof Error);
        }
    "#;
    assert_eq!(run(src), s("MyErr: bad|true"));
}

// ══════════════════════════════════════════════════════════════════════════════
// Built-ins
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_array_pipeline() {
    let src = r#"
        return [3, 1, 2].sort().concat([4])
            .filter(x => x > 1)
            .map(x => x * 10)
            .reduce((a, b) => a + b, 0);
    "#;
    assert_eq!(run(src), Value::from(90));
}

#[test]
fn test_array_at() {
    assert_eq!(run("return [1, 2, 3].at(-1);"), Value::from(3));
    assert_eq!(run("return [1, 2, 3].at(0);"), Value::from(1));
    assert_eq!(run("return [1, 2, 3].at(5);"), Value::Undefined);
}

#[test]
fn test_sort_default_and_comparator() {
    assert_eq!(run("return [10, 9, 1].sort().join();"), s("1,10,9"));
    assert_eq!(run("return [10, 9, 1].sort((a, b) => a - b).join();"), s("1,9,10"));
}

#[test]
fn test_string_methods() {
    assert_eq!(
        run(r#"return "Hello".toUpperCase().split("").reverse().join("");"#),
        s("OLLEH")
    );
    assert_eq!(run(r#"return "a-b-c".replaceAll("-", "+");"#), s("a+b+c"));
    assert_eq!(run(r#"return "abc".padStart(5, "*");"#), s("**abc"));
    assert_eq!(run(r#"return "héllo".length;"#), Value::from(5));
    // Lengths count Unicode scalar values, not UTF-16 code units.
    assert_eq!(run(r#"return "😀".length;"#), Value::from(1));
}

#[test]
fn test_json_stringify() {
    assert_eq!(
        run(r#"return JSON.stringify({ a: [1, "x", null], b: undefined, c: 1.5 });"#),
        s(r#"{"a":[1,"x",null],"c":1.5}"#)
    );
    assert_eq!(
        run("return JSON.stringify({ a: 1 }, null, 2);"),
        s("{\n  \"a\": 1\n}")
    );
}

#[test]
fn test_json_circular_structure() {
    let e = run_err("const a = {}; a.self = a; JSON.stringify(a);");
    assert_eq!(e.message(), "TypeError: Converting circular structure to JSON");
}

#[test]
fn test_json_parse_keeps_key_order() {
    assert_eq!(
        run(r#"return Object.keys(JSON.parse('{"z":1,"a":2}')).join();"#),
        s("z,a")
    );
}

#[test]
fn test_console_output_is_captured() {
    let mut ev = Evaluator::new();
    ev.run(r#"console.log("a", 1, { b: [2] }); console.warn("careful");"#)
        .unwrap_or_else(|e| panic!("{}", e.message()));
    let lines: Vec<(ConsoleLevel, &str)> = ev
        .console
        .iter()
        .map(|entry| (entry.level, entry.message.as_str()))
        .collect();
    assert_eq!(
        lines,
        vec![
            (ConsoleLevel::Log, "a 1 { b: [ 2 ] }"),
            (ConsoleLevel::Warn, "careful"),
        ]
    );
}

#[test]
fn test_math_random_is_deterministic() {
    let first = Evaluator::new().run("return Math.random();").ok();
    let second = Evaluator::new().run("return Math.random();").ok();
    assert_eq!(first, second);
}

// ══════════════════════════════════════════════════════════════════════════════
// Runtime base
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_create_element() {
    let value = run(r#"
        return React.createElement("div", { id: "x", key: 1 }, "hi", React.createElement("b", null));
    "#);
    let el = value.as_element().unwrap_or_else(|| panic!("not an element"));
    assert_eq!(el.element_type, ElementType::Intrinsic("div".into()));
    assert_eq!(el.key.as_deref(), Some("1"));
    assert_eq!(el.props.get("id"), Some(&s("x")));
    assert_eq!(el.children().len(), 2);
}

#[test]
fn test_create_element_rejects_invalid_type() {
    let e = run_err("React.createElement(undefined, null);");
    assert_eq!(kind_of(&e), Some(ErrorKind::TypeError));
    assert!(e.message().contains("Element type is invalid"));
}

#[test]
fn test_fragment_children() {
    let value = run(r#"return React.createElement(React.Fragment, null, "a", "b");"#);
    let el = value.as_element().unwrap_or_else(|| panic!("not an element"));
    assert_eq!(el.element_type, ElementType::Fragment);
    assert_eq!(el.children(), vec![s("a"), s("b")]);
}

#[test]
fn test_use_state_initializer() {
    assert_eq!(
        run("const [v, setV] = React.useState(() => 5); setV(6); return v;"),
        Value::from(5)
    );
}

#[test]
fn test_class_component_receives_props() {
    let src = r#"
        class Hello extends React.Component {
            render() { return "hi " + this.props.name; }
        }
        return new Hello({ name: "Ada" }).render();
    "#;
    assert_eq!(run(src), s("hi Ada"));
}

#[test]
fn test_set_state_merges() {
    let src = r#"
        class Box extends React.Component {
            state = { a: 1, b: 2 };
        }
        const box = new Box({});
        box.setState({ b: 3 });
        return box.state.a + box.state.b;
    "#;
    assert_eq!(run(src), Value::from(4));
}
