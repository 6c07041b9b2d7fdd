//! Type conversions and operators.

use std::cmp::Ordering;
use std::rc::Rc;

use livecode_types::ast::BinOp;

use crate::error::{EvalResult, Exception};
use crate::evaluator::Evaluator;
use crate::value::{number_to_string, FunctionKind, Value};

/// `ToNumber` for a string.
pub fn string_to_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix)
                .map(|n| n as f64)
                .unwrap_or(f64::NAN);
        }
    }
    // Rust accepts "inf", "nan" and friends; JavaScript does not.
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    s.parse().unwrap_or(f64::NAN)
}

/// `ToNumber` for a primitive. References convert through
/// [`Evaluator::to_number`].
pub fn primitive_to_number(value: &Value) -> f64 {
    match value {
        Value::Undefined => f64::NAN,
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => *n,
        Value::String(s) => string_to_number(s),
        _ => f64::NAN,
    }
}

/// `ToInt32`-like truncation used by index arguments.
pub fn to_integer(n: f64) -> f64 {
    if n.is_nan() {
        0.0
    } else {
        n.trunc()
    }
}

/// Resolve a relative index argument (negative counts from the end) into
/// `0..=len`.
pub fn relative_index(n: f64, len: usize) -> usize {
    let n = to_integer(n);
    let len_f = len as f64;
    if n < 0.0 {
        (len_f + n).max(0.0) as usize
    } else {
        n.min(len_f) as usize
    }
}

impl Evaluator {
    // ══════════════════════════════════════════════════════════════════════
    // Conversions
    // ══════════════════════════════════════════════════════════════════════

    /// `ToPrimitive`: call `valueOf`/`toString` on objects.
    pub fn to_primitive(&mut self, value: &Value, prefer_string: bool) -> EvalResult<Value> {
        if !value.is_reference() {
            return Ok(value.clone());
        }
        if let Value::Array(_) | Value::Element(_) = value {
            return Ok(Value::from(value.to_string()));
        }
        let order: [&str; 2] = if prefer_string {
            ["toString", "valueOf"]
        } else {
            ["valueOf", "toString"]
        };
        for method in order {
            let func = self.get_property(value, method)?;
            if func.is_callable() {
                let result = self.call_function(&func, value.clone(), Vec::new())?;
                if !result.is_reference() {
                    return Ok(result);
                }
            }
        }
        Err(Exception::type_error("Cannot convert object to primitive value"))
    }

    pub fn to_number(&mut self, value: &Value) -> EvalResult<f64> {
        match value {
            Value::Symbol(_) => Err(Exception::type_error(
                "Cannot convert a Symbol value to a number",
            )),
            v if v.is_reference() => {
                let primitive = self.to_primitive(v, false)?;
                Ok(primitive_to_number(&primitive))
            }
            v => Ok(primitive_to_number(v)),
        }
    }

    /// `ToString`, calling user-defined `toString` methods on objects.
    pub fn to_js_string(&mut self, value: &Value) -> EvalResult<String> {
        match value {
            Value::String(s) => Ok(s.to_string()),
            Value::Symbol(_) => Err(Exception::type_error(
                "Cannot convert a Symbol value to a string",
            )),
            Value::Object(_) => {
                let primitive = self.to_primitive(value, true)?;
                Ok(primitive.to_string())
            }
            other => Ok(other.to_string()),
        }
    }

    /// A property key from a computed member or key expression.
    pub fn to_property_key(&mut self, value: &Value) -> EvalResult<String> {
        match value {
            Value::String(s) => Ok(s.to_string()),
            Value::Number(n) => Ok(number_to_string(*n)),
            Value::Symbol(sym) => Ok(format!("@@{}:{:p}", sym.description, Rc::as_ptr(sym))),
            other => self.to_js_string(other),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Operators
    // ══════════════════════════════════════════════════════════════════════

    pub(crate) fn binary_op(&mut self, op: BinOp, left: Value, right: Value) -> EvalResult<Value> {
        match op {
            BinOp::Add => self.add(&left, &right),
            BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod | BinOp::Pow => {
                let l = self.to_number(&left)?;
                let r = self.to_number(&right)?;
                Ok(Value::Number(arithmetic(op, l, r)))
            }
            BinOp::StrictEq => Ok(Value::Bool(left.strict_equals(&right))),
            BinOp::StrictNotEq => Ok(Value::Bool(!left.strict_equals(&right))),
            BinOp::Eq => self.loose_equals(&left, &right).map(Value::Bool),
            BinOp::NotEq => self.loose_equals(&left, &right).map(|eq| Value::Bool(!eq)),
            BinOp::Less => self.relational(&left, &right, |o| o == Ordering::Less),
            BinOp::Greater => self.relational(&left, &right, |o| o == Ordering::Greater),
            BinOp::LessEq => self.relational(&left, &right, |o| o != Ordering::Greater),
            BinOp::GreaterEq => self.relational(&left, &right, |o| o != Ordering::Less),
            BinOp::InstanceOf => self.instance_of(&left, &right).map(Value::Bool),
            BinOp::In => {
                if !right.is_reference() {
                    let key = self.to_js_string(&left)?;
                    return Err(Exception::type_error(format!(
                        "Cannot use 'in' operator to search for '{key}' in {right}"
                    )));
                }
                let key = self.to_property_key(&left)?;
                Ok(Value::Bool(self.has_property(&right, &key)))
            }
        }
    }

    fn add(&mut self, left: &Value, right: &Value) -> EvalResult<Value> {
        if let (Value::Number(l), Value::Number(r)) = (left, right) {
            return Ok(Value::Number(l + r));
        }
        let l = self.to_primitive(left, false)?;
        let r = self.to_primitive(right, false)?;
        if matches!(l, Value::String(_)) || matches!(r, Value::String(_)) {
            let mut s = self.to_js_string(&l)?;
            s.push_str(&self.to_js_string(&r)?);
            return Ok(Value::from(s));
        }
        Ok(Value::Number(self.to_number(&l)? + self.to_number(&r)?))
    }

    fn relational(
        &mut self,
        left: &Value,
        right: &Value,
        test: impl Fn(Ordering) -> bool,
    ) -> EvalResult<Value> {
        let l = self.to_primitive(left, false)?;
        let r = self.to_primitive(right, false)?;
        let ordering = match (&l, &r) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => {
                let a = self.to_number(&l)?;
                let b = self.to_number(&r)?;
                a.partial_cmp(&b)
            }
        };
        Ok(Value::Bool(ordering.is_some_and(test)))
    }

    /// `==` semantics.
    pub fn loose_equals(&mut self, left: &Value, right: &Value) -> EvalResult<bool> {
        Ok(match (left, right) {
            (a, b) if a.is_nullish() || b.is_nullish() => a.is_nullish() && b.is_nullish(),
            (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
                primitive_to_number(left) == primitive_to_number(right)
            }
            (Value::Bool(_), _) => {
                let l = Value::Number(primitive_to_number(left));
                return self.loose_equals(&l, right);
            }
            (_, Value::Bool(_)) => {
                let r = Value::Number(primitive_to_number(right));
                return self.loose_equals(left, &r);
            }
            (a, b) if a.is_reference() && !b.is_reference() => {
                let a = self.to_primitive(a, false)?;
                return self.loose_equals(&a, b);
            }
            (a, b) if !a.is_reference() && b.is_reference() => {
                let b = self.to_primitive(b, false)?;
                return self.loose_equals(a, &b);
            }
            (a, b) => a.strict_equals(b),
        })
    }

    pub(crate) fn instance_of(&mut self, value: &Value, constructor: &Value) -> EvalResult<bool> {
        let Value::Function(f) = constructor else {
            return Err(Exception::type_error(
                "Right-hand side of 'instanceof' is not callable",
            ));
        };
        if let FunctionKind::Bound { target, .. } = &f.kind {
            return self.instance_of(value, &target.clone());
        }
        let Some(proto) = f.prototype() else {
            return Ok(false);
        };
        let realm = &self.realm;
        Ok(match value {
            Value::Object(obj) => obj.inherits_from(&proto),
            Value::Array(_) => {
                Rc::ptr_eq(&proto, &realm.array_proto) || Rc::ptr_eq(&proto, &realm.object_proto)
            }
            Value::Function(_) => {
                Rc::ptr_eq(&proto, &realm.function_proto) || Rc::ptr_eq(&proto, &realm.object_proto)
            }
            Value::Element(_) => Rc::ptr_eq(&proto, &realm.object_proto),
            _ => false,
        })
    }
}

/// Numeric binary operators.
pub fn arithmetic(op: BinOp, l: f64, r: f64) -> f64 {
    match op {
        BinOp::Sub => l - r,
        BinOp::Mul => l * r,
        BinOp::Div => l / r,
        BinOp::Mod => l % r,
        BinOp::Pow => {
            if r.is_nan() || (l.abs() == 1.0 && r.is_infinite()) {
                f64::NAN
            } else {
                l.powf(r)
            }
        }
        _ => l + r,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_to_number() {
        assert_eq!(string_to_number("  42 "), 42.0);
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("0x1F"), 31.0);
        assert_eq!(string_to_number("1e3"), 1000.0);
        assert!(string_to_number("inf").is_nan());
        assert!(string_to_number("12px").is_nan());
        assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
    }

    #[test]
    fn test_relative_index() {
        assert_eq!(relative_index(-1.0, 5), 4);
        assert_eq!(relative_index(-10.0, 5), 0);
        assert_eq!(relative_index(10.0, 5), 5);
        assert_eq!(relative_index(f64::NAN, 5), 0);
    }

    #[test]
    fn test_arithmetic_edges() {
        assert_eq!(arithmetic(BinOp::Mod, -7.0, 3.0), -1.0);
        assert!(arithmetic(BinOp::Pow, 1.0, f64::NAN).is_nan());
        assert_eq!(arithmetic(BinOp::Pow, 2.0, 10.0), 1024.0);
    }
}
