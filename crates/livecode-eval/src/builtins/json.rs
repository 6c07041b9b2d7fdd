//! `JSON.stringify` and `JSON.parse`, backed by serde_json.

use std::rc::Rc;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Number, Serializer};

use crate::builtins::{arg, method, namespace};
use crate::error::{EvalResult, Exception};
use crate::evaluator::Evaluator;
use crate::realm::Realm;
use crate::runtime;
use crate::value::{Object, Value};

/// Largest integer `JSON.stringify` writes without a fraction.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

pub(crate) fn object(realm: &Realm) -> Value {
    let json = namespace(realm);
    method(&json, "stringify", 3, |ev, _, args| {
        let indent = indent(ev, &arg(args, 2))?;
        stringify(ev, &arg(args, 0), &indent).map(|text| text.map(Value::from).unwrap_or_default())
    });
    method(&json, "parse", 2, |ev, _, args| {
        let text = ev.to_js_string(&arg(args, 0))?;
        parse(ev, &text)
    });
    Value::Object(json)
}

/// The `space` argument: a count of spaces (at most ten) or a string
/// prefix (at most ten chars).
fn indent(ev: &mut Evaluator, space: &Value) -> EvalResult<String> {
    Ok(match space {
        Value::Number(n) => " ".repeat(n.clamp(0.0, 10.0) as usize),
        Value::String(s) => s.chars().take(10).collect(),
        Value::Undefined | Value::Null => String::new(),
        other => {
            let n = ev.to_number(other)?;
            " ".repeat(if n.is_nan() { 0 } else { n.clamp(0.0, 10.0) as usize })
        }
    })
}

/// Serialize `value`. `None` when nothing is written (`undefined`, a
/// function or a symbol at the top level).
pub fn stringify(ev: &mut Evaluator, value: &Value, indent: &str) -> EvalResult<Option<String>> {
    let mut stack = Vec::new();
    let Some(json) = to_json(ev, value, &mut stack)? else {
        return Ok(None);
    };
    if indent.is_empty() {
        return serde_json::to_string(&json)
            .map(Some)
            .map_err(|e| Exception::type_error(e.to_string()));
    }
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
    json.serialize(&mut serializer)
        .map_err(|e| Exception::type_error(e.to_string()))?;
    String::from_utf8(out)
        .map(Some)
        .map_err(|e| Exception::type_error(e.to_string()))
}

fn identity(value: &Value) -> Option<*const ()> {
    match value {
        Value::Array(items) => Some(Rc::as_ptr(items) as *const ()),
        Value::Object(obj) => Some(Rc::as_ptr(obj) as *const ()),
        _ => None,
    }
}

fn to_json(
    ev: &mut Evaluator,
    value: &Value,
    stack: &mut Vec<*const ()>,
) -> EvalResult<Option<serde_json::Value>> {
    let value = match value {
        Value::Object(_) => {
            let to_json = ev.get_property(value, "toJSON")?;
            if to_json.is_callable() {
                ev.call_function(&to_json, value.clone(), Vec::new())?
            } else {
                value.clone()
            }
        }
        other => other.clone(),
    };
    let json = match &value {
        Value::Undefined | Value::Function(_) | Value::Symbol(_) => return Ok(None),
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => number(*n),
        Value::String(s) => serde_json::Value::String(s.to_string()),
        Value::Array(items) => {
            let id = identity(&value);
            enter(stack, id)?;
            let items = items.borrow().clone();
            let mut out = Vec::with_capacity(items.len());
            for item in &items {
                out.push(to_json(ev, item, stack)?.unwrap_or(serde_json::Value::Null));
            }
            stack.pop();
            serde_json::Value::Array(out)
        }
        Value::Object(obj) => {
            enter(stack, identity(&value))?;
            let mut out = Map::new();
            for (key, item) in obj.entries() {
                if let Some(json) = to_json(ev, &item, stack)? {
                    out.insert(key, json);
                }
            }
            stack.pop();
            serde_json::Value::Object(out)
        }
        Value::Element(el) => {
            let mut out = Map::new();
            let type_value = el.type_value(&runtime::fragment());
            out.insert(
                "type".into(),
                match &type_value {
                    Value::String(s) => serde_json::Value::String(s.to_string()),
                    _ => serde_json::Value::Null,
                },
            );
            out.insert(
                "key".into(),
                el.key.clone().map(serde_json::Value::String).unwrap_or_default(),
            );
            out.insert("ref".into(), serde_json::Value::Null);
            let mut props = Map::new();
            for (key, item) in &el.props {
                if let Some(json) = to_json(ev, item, stack)? {
                    props.insert(key.clone(), json);
                }
            }
            out.insert("props".into(), serde_json::Value::Object(props));
            serde_json::Value::Object(out)
        }
    };
    Ok(Some(json))
}

fn enter(stack: &mut Vec<*const ()>, id: Option<*const ()>) -> EvalResult<()> {
    if let Some(id) = id {
        if stack.contains(&id) {
            return Err(Exception::type_error("Converting circular structure to JSON"));
        }
        stack.push(id);
    }
    Ok(())
}

fn number(n: f64) -> serde_json::Value {
    if !n.is_finite() {
        return serde_json::Value::Null;
    }
    if n.fract() == 0.0 && n.abs() < MAX_EXACT_INT {
        return serde_json::Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or_default()
}

/// Parse JSON text into plain objects and arrays.
pub fn parse(ev: &mut Evaluator, text: &str) -> EvalResult<Value> {
    let json: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| Exception::syntax_error(format!("{e} in JSON")))?;
    Ok(from_json(ev, json))
}

pub fn from_json(ev: &Evaluator, json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::from(s),
        serde_json::Value::Array(items) => {
            Value::array(items.into_iter().map(|item| from_json(ev, item)).collect())
        }
        serde_json::Value::Object(map) => {
            let obj = Object::with_proto(Some(ev.realm.object_proto.clone()));
            for (key, item) in map {
                obj.insert(key, from_json(ev, item));
            }
            Value::Object(obj)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_numbers_have_no_fraction() {
        assert_eq!(number(3.0).to_string(), "3");
        assert_eq!(number(-0.5).to_string(), "-0.5");
        assert_eq!(number(f64::NAN), serde_json::Value::Null);
    }
}
