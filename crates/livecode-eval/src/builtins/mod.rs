//! The global objects and functions author code can reach.

pub(crate) mod array;
pub(crate) mod console;
pub(crate) mod error;
pub(crate) mod function;
pub(crate) mod json;
pub(crate) mod math;
pub(crate) mod number;
pub(crate) mod object;
pub(crate) mod string;

use crate::env::EnvRef;
use crate::error::EvalResult;
use crate::evaluator::Evaluator;
use crate::realm::Realm;
use crate::value::{Function, FunctionRef, Object, ObjectRef, Symbol, Value};

/// Declare every global on `global`.
pub(crate) fn install(global: &EnvRef, realm: &Realm) {
    global.declare("undefined", Value::Undefined, false);
    global.declare("NaN", Value::Number(f64::NAN), false);
    global.declare("Infinity", Value::Number(f64::INFINITY), false);

    let globals: Vec<(&str, Value)> = vec![
        ("Object", object::constructor(realm)),
        ("Function", function::constructor(realm)),
        ("Array", array::constructor(realm)),
        ("String", string::constructor(realm)),
        ("Number", number::constructor(realm)),
        ("Boolean", number::boolean_constructor(realm)),
        ("Symbol", symbol_constructor()),
        ("Math", math::object(realm)),
        ("JSON", json::object(realm)),
        ("console", console::object(realm)),
        ("parseInt", Value::native("parseInt", 2, number::parse_int)),
        ("parseFloat", Value::native("parseFloat", 1, number::parse_float)),
        ("isNaN", Value::native("isNaN", 1, |ev, _, args| {
            Ok(Value::Bool(ev.to_number(&arg(args, 0))?.is_nan()))
        })),
        ("isFinite", Value::native("isFinite", 1, |ev, _, args| {
            Ok(Value::Bool(ev.to_number(&arg(args, 0))?.is_finite()))
        })),
    ];
    for (name, value) in globals {
        global.declare(name, value, true);
    }
    for (name, value) in error::constructors(realm) {
        global.declare(&name, value, true);
    }
}

/// The `i`th argument, or `undefined`.
pub(crate) fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or_default()
}

/// Add a native method to an object.
pub(crate) fn method(
    target: &ObjectRef,
    name: &str,
    arity: usize,
    func: impl Fn(&mut Evaluator, &Value, &[Value]) -> EvalResult<Value> + 'static,
) {
    target.insert(name, Value::native(name, arity, func));
}

/// Add a native static to a function.
pub(crate) fn static_method(
    target: &FunctionRef,
    name: &str,
    arity: usize,
    func: impl Fn(&mut Evaluator, &Value, &[Value]) -> EvalResult<Value> + 'static,
) {
    target.set(name, Value::native(name, arity, func));
}

/// Link a constructor and its prototype object both ways.
pub(crate) fn link_prototype(constructor: &FunctionRef, proto: &ObjectRef) {
    constructor.set("prototype", Value::Object(proto.clone()));
    proto.insert("constructor", Value::Function(constructor.clone()));
}

/// A plain namespace object such as `Math` or `JSON`.
pub(crate) fn namespace(realm: &Realm) -> ObjectRef {
    Object::with_proto(Some(realm.object_proto.clone()))
}

fn symbol_constructor() -> Value {
    let symbol = Function::native("Symbol", 0, |ev, _, args| {
        let description = match args.first() {
            None | Some(Value::Undefined) => String::new(),
            Some(value) => ev.to_js_string(value)?,
        };
        Ok(Value::Symbol(Symbol::new(description)))
    });
    symbol.set("iterator", Value::Symbol(Symbol::new("Symbol.iterator")));
    Value::Function(symbol)
}
