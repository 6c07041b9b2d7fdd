//! Property access on every kind of value.

use crate::error::{EvalResult, Exception};
use crate::evaluator::Evaluator;
use crate::runtime;
use crate::value::{parse_index, FunctionKind, Object, Value};

/// Arrays may not grow past this many elements through index writes.
const MAX_ARRAY_GROWTH: usize = 1 << 24;

impl Evaluator {
    /// `target[key]`.
    pub fn get_property(&mut self, target: &Value, key: &str) -> EvalResult<Value> {
        let found = match target {
            Value::Undefined | Value::Null => {
                return Err(Exception::type_error(format!(
                    "Cannot read properties of {target} (reading '{key}')"
                )))
            }
            Value::Bool(_) => self.realm.boolean_proto.get(key),
            Value::Number(_) => self.realm.number_proto.get(key),
            Value::String(s) => {
                if key == "length" {
                    Some(Value::from(s.chars().count()))
                } else if let Some(index) = parse_index(key) {
                    Some(
                        s.chars()
                            .nth(index)
                            .map(|c| Value::from(c.to_string()))
                            .unwrap_or_default(),
                    )
                } else {
                    self.realm.string_proto.get(key)
                }
            }
            Value::Symbol(sym) => match key {
                "description" => Some(Value::from(sym.description.as_str())),
                _ => self.realm.object_proto.get(key),
            },
            Value::Array(items) => {
                if key == "length" {
                    Some(Value::from(items.borrow().len()))
                } else if let Some(index) = parse_index(key) {
                    Some(items.borrow().get(index).cloned().unwrap_or_default())
                } else {
                    self.realm.array_proto.get(key)
                }
            }
            Value::Object(obj) => obj.get(key).or_else(|| self.realm.object_proto.get(key)),
            Value::Function(f) => match f.get(key) {
                Some(v) => Some(v),
                None => match key {
                    "name" => Some(Value::from(f.name())),
                    "length" => Some(Value::from(f.arity())),
                    "prototype" if matches!(f.kind, FunctionKind::Closure(_)) && f.is_constructor() => {
                        Some(Value::Object(self.function_prototype(f)))
                    }
                    _ => self.realm.function_proto.get(key),
                },
            },
            Value::Element(el) => match key {
                "type" => Some(el.type_value(&runtime::fragment())),
                "props" => {
                    let props = Object::with_proto(Some(self.realm.object_proto.clone()));
                    for (k, v) in &el.props {
                        props.insert(k.clone(), v.clone());
                    }
                    props.freeze();
                    Some(Value::Object(props))
                }
                "key" => Some(el.key.clone().map(Value::from).unwrap_or(Value::Null)),
                "ref" => Some(Value::Null),
                _ => self.realm.object_proto.get(key),
            },
        };
        Ok(found.unwrap_or_default())
    }

    /// `target[key] = value`.
    pub fn set_property(&mut self, target: &Value, key: &str, value: Value) -> EvalResult<()> {
        match target {
            Value::Undefined | Value::Null => Err(Exception::type_error(format!(
                "Cannot set properties of {target} (setting '{key}')"
            ))),
            Value::Object(obj) => {
                if obj.set(key, value) {
                    Ok(())
                } else {
                    Err(Exception::type_error(format!(
                        "Cannot assign to read only property '{key}' of object"
                    )))
                }
            }
            Value::Array(items) => {
                if key == "length" {
                    let len = self.to_number(&value)?;
                    let len = crate::value::as_index(len)
                        .filter(|n| *n <= MAX_ARRAY_GROWTH)
                        .ok_or_else(|| Exception::range_error("Invalid array length"))?;
                    items.borrow_mut().resize(len, Value::Undefined);
                } else if let Some(index) = parse_index(key) {
                    let mut items = items.borrow_mut();
                    if index >= items.len() {
                        if index - items.len() > MAX_ARRAY_GROWTH {
                            return Err(Exception::range_error("Invalid array length"));
                        }
                        items.resize(index + 1, Value::Undefined);
                    }
                    items[index] = value;
                }
                Ok(())
            }
            Value::Function(f) => {
                f.set(key, value);
                Ok(())
            }
            Value::Element(_) => Err(Exception::type_error(format!(
                "Cannot assign to read only property '{key}' of object"
            ))),
            _ => Ok(()),
        }
    }

    /// `delete target[key]`.
    pub fn delete_property(&mut self, target: &Value, key: &str) -> EvalResult<bool> {
        match target {
            Value::Undefined | Value::Null => Err(Exception::type_error(format!(
                "Cannot convert undefined or null to object (deleting '{key}')"
            ))),
            Value::Object(obj) => {
                if obj.remove(key) {
                    Ok(true)
                } else {
                    Err(Exception::type_error(format!(
                        "Cannot delete property '{key}' of object"
                    )))
                }
            }
            Value::Array(items) => {
                if let Some(index) = parse_index(key) {
                    if let Some(slot) = items.borrow_mut().get_mut(index) {
                        *slot = Value::Undefined;
                    }
                }
                Ok(true)
            }
            Value::Function(f) => {
                f.remove(key);
                Ok(true)
            }
            _ => Ok(true),
        }
    }

    /// `key in target`.
    pub fn has_property(&self, target: &Value, key: &str) -> bool {
        match target {
            Value::Object(obj) => obj.has(key) || self.realm.object_proto.has(key),
            Value::Array(items) => {
                key == "length"
                    || parse_index(key).is_some_and(|i| i < items.borrow().len())
                    || self.realm.array_proto.has(key)
            }
            Value::Function(f) => {
                f.get(key).is_some()
                    || matches!(key, "name" | "length" | "prototype")
                    || self.realm.function_proto.has(key)
            }
            Value::Element(_) => matches!(key, "type" | "props" | "key" | "ref"),
            _ => false,
        }
    }

    /// Own enumerable string keys, as `Object.keys` reports them.
    pub fn own_keys(&self, target: &Value) -> Vec<String> {
        match target {
            Value::Object(obj) => obj.keys(),
            Value::Array(items) => (0..items.borrow().len()).map(|i| i.to_string()).collect(),
            Value::String(s) => (0..s.chars().count()).map(|i| i.to_string()).collect(),
            Value::Function(f) => f.keys(),
            Value::Element(_) => vec!["type".into(), "key".into(), "props".into()],
            _ => Vec::new(),
        }
    }

    /// Keys a `for...in` loop visits.
    pub(crate) fn enumerable_keys(&self, target: &Value) -> Vec<String> {
        self.own_keys(target)
    }

    /// Own enumerable `(key, value)` pairs, used by spread and `Object.entries`.
    pub fn own_entries(&mut self, target: &Value) -> EvalResult<Vec<(String, Value)>> {
        if let Value::Object(obj) = target {
            return Ok(obj.entries());
        }
        let mut out = Vec::new();
        for key in self.own_keys(target) {
            let value = self.get_property(target, &key)?;
            out.push((key, value));
        }
        Ok(out)
    }

    /// The values a `for...of` loop, spread or array pattern walks.
    pub fn iterate(&mut self, value: &Value) -> EvalResult<Vec<Value>> {
        match value {
            Value::Array(items) => Ok(items.borrow().clone()),
            Value::String(s) => Ok(s.chars().map(|c| Value::from(c.to_string())).collect()),
            Value::Undefined | Value::Null => Err(Exception::type_error(format!(
                "{value} is not iterable"
            ))),
            Value::Function(f) => Err(Exception::type_error(format!(
                "{} is not iterable",
                if f.name().is_empty() { "function".to_string() } else { f.name() }
            ))),
            other => Err(Exception::type_error(format!(
                "{} is not iterable",
                other.type_of()
            ))),
        }
    }
}
