//! `String` and `String.prototype`. Indices count Unicode scalar values.

use crate::builtins::{arg, link_prototype, method, static_method};
use crate::error::{EvalResult, Exception};
use crate::evaluator::Evaluator;
use crate::ops::{relative_index, to_integer};
use crate::realm::Realm;
use crate::value::{Function, ObjectRef, Value};

const MAX_STRING_LENGTH: usize = 1 << 28;

fn this_string(ev: &mut Evaluator, this: &Value) -> EvalResult<String> {
    match this {
        Value::String(s) => Ok(s.to_string()),
        Value::Undefined | Value::Null => Err(Exception::type_error(
            "String.prototype method called on null or undefined",
        )),
        other => ev.to_js_string(other),
    }
}

fn string_arg(ev: &mut Evaluator, args: &[Value], i: usize) -> EvalResult<String> {
    ev.to_js_string(&arg(args, i))
}

/// Position of `needle` in `hay` at or after `from`, in chars.
fn find_chars(hay: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return (from <= hay.len()).then_some(from);
    }
    if needle.len() > hay.len() {
        return None;
    }
    (from..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()] == *needle)
}

fn rfind_chars(hay: &[char], needle: &[char]) -> Option<usize> {
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len())
        .rev()
        .find(|&i| hay[i..i + needle.len()] == *needle)
}

fn collect(chars: &[char]) -> Value {
    Value::from(chars.iter().collect::<String>())
}

/// Replace the first (or every) occurrence of a string pattern. Function
/// replacements receive `(match, offset, whole)`.
fn replace(ev: &mut Evaluator, this: &Value, args: &[Value], all: bool) -> EvalResult<Value> {
    let s: Vec<char> = this_string(ev, this)?.chars().collect();
    let pattern: Vec<char> = string_arg(ev, args, 0)?.chars().collect();
    let replacement = arg(args, 1);
    let whole = collect(&s);

    let mut out = String::new();
    let mut pos = 0;
    while let Some(found) = find_chars(&s, &pattern, pos) {
        out.extend(&s[pos..found]);
        let piece = if replacement.is_callable() {
            let result = ev.call_function(
                &replacement,
                Value::Undefined,
                vec![collect(&pattern), Value::from(found), whole.clone()],
            )?;
            ev.to_js_string(&result)?
        } else {
            ev.to_js_string(&replacement)?
                .replace("$&", &pattern.iter().collect::<String>())
        };
        out.push_str(&piece);
        pos = found + pattern.len();
        if pattern.is_empty() {
            if let Some(c) = s.get(found) {
                out.push(*c);
            }
            pos += 1;
        }
        if !all || pos > s.len() {
            break;
        }
    }
    if pos <= s.len() {
        out.extend(&s[pos..]);
    }
    Ok(Value::from(out))
}

fn pad(ev: &mut Evaluator, this: &Value, args: &[Value], at_start: bool) -> EvalResult<Value> {
    let s = this_string(ev, this)?;
    let target = to_integer(ev.to_number(&arg(args, 0))?).max(0.0) as usize;
    let filler = match arg(args, 1) {
        Value::Undefined => " ".to_string(),
        f => ev.to_js_string(&f)?,
    };
    let len = s.chars().count();
    if target <= len || filler.is_empty() {
        return Ok(Value::from(s));
    }
    if target > MAX_STRING_LENGTH {
        return Err(Exception::range_error("Invalid string length"));
    }
    let padding: String = filler.chars().cycle().take(target - len).collect();
    Ok(Value::from(if at_start {
        padding + &s
    } else {
        s + &padding
    }))
}

pub(crate) fn install_prototype(proto: &ObjectRef) {
    method(proto, "charAt", 1, |ev, this, args| {
        let s = this_string(ev, this)?;
        let i = to_integer(ev.to_number(&arg(args, 0))?);
        let c = if i < 0.0 { None } else { s.chars().nth(i as usize) };
        Ok(Value::from(c.map(String::from).unwrap_or_default()))
    });
    method(proto, "charCodeAt", 1, |ev, this, args| {
        let s = this_string(ev, this)?;
        let i = to_integer(ev.to_number(&arg(args, 0))?);
        let c = if i < 0.0 { None } else { s.chars().nth(i as usize) };
        Ok(Value::Number(c.map(|c| f64::from(u32::from(c))).unwrap_or(f64::NAN)))
    });
    method(proto, "codePointAt", 1, |ev, this, args| {
        let s = this_string(ev, this)?;
        let i = to_integer(ev.to_number(&arg(args, 0))?);
        let c = if i < 0.0 { None } else { s.chars().nth(i as usize) };
        Ok(c.map(|c| Value::Number(f64::from(u32::from(c)))).unwrap_or_default())
    });
    method(proto, "at", 1, |ev, this, args| {
        let chars: Vec<char> = this_string(ev, this)?.chars().collect();
        let n = to_integer(ev.to_number(&arg(args, 0))?);
        let index = if n < 0.0 { chars.len() as f64 + n } else { n };
        if index < 0.0 {
            return Ok(Value::Undefined);
        }
        Ok(chars
            .get(index as usize)
            .map(|c| Value::from(c.to_string()))
            .unwrap_or_default())
    });
    method(proto, "indexOf", 1, |ev, this, args| {
        let s: Vec<char> = this_string(ev, this)?.chars().collect();
        let needle: Vec<char> = string_arg(ev, args, 0)?.chars().collect();
        let from = relative_index(ev.to_number(&arg(args, 1))?.max(0.0), s.len());
        let found = find_chars(&s, &needle, from);
        Ok(Value::Number(found.map(|i| i as f64).unwrap_or(-1.0)))
    });
    method(proto, "lastIndexOf", 1, |ev, this, args| {
        let s: Vec<char> = this_string(ev, this)?.chars().collect();
        let needle: Vec<char> = string_arg(ev, args, 0)?.chars().collect();
        Ok(Value::Number(
            rfind_chars(&s, &needle).map(|i| i as f64).unwrap_or(-1.0),
        ))
    });
    method(proto, "includes", 1, |ev, this, args| {
        let s = this_string(ev, this)?;
        let needle = string_arg(ev, args, 0)?;
        Ok(Value::Bool(s.contains(needle.as_str())))
    });
    method(proto, "startsWith", 1, |ev, this, args| {
        let s: Vec<char> = this_string(ev, this)?.chars().collect();
        let needle: Vec<char> = string_arg(ev, args, 0)?.chars().collect();
        let from = relative_index(ev.to_number(&arg(args, 1))?.max(0.0), s.len());
        Ok(Value::Bool(s[from..].starts_with(&needle)))
    });
    method(proto, "endsWith", 1, |ev, this, args| {
        let s: Vec<char> = this_string(ev, this)?.chars().collect();
        let needle: Vec<char> = string_arg(ev, args, 0)?.chars().collect();
        let end = match arg(args, 1) {
            Value::Undefined => s.len(),
            n => relative_index(ev.to_number(&n)?.max(0.0), s.len()),
        };
        Ok(Value::Bool(s[..end].ends_with(&needle)))
    });
    method(proto, "slice", 2, |ev, this, args| {
        let s: Vec<char> = this_string(ev, this)?.chars().collect();
        let start = relative_index(ev.to_number(&arg(args, 0))?, s.len());
        let end = match arg(args, 1) {
            Value::Undefined => s.len(),
            n => relative_index(ev.to_number(&n)?, s.len()),
        };
        Ok(collect(s.get(start..end.max(start)).unwrap_or_default()))
    });
    method(proto, "substring", 2, |ev, this, args| {
        let s: Vec<char> = this_string(ev, this)?.chars().collect();
        let clamp = |n: f64| to_integer(n).clamp(0.0, s.len() as f64) as usize;
        let a = clamp(ev.to_number(&arg(args, 0))?);
        let b = match arg(args, 1) {
            Value::Undefined => s.len(),
            n => clamp(ev.to_number(&n)?),
        };
        Ok(collect(&s[a.min(b)..a.max(b)]))
    });
    method(proto, "substr", 2, |ev, this, args| {
        let s: Vec<char> = this_string(ev, this)?.chars().collect();
        let start = relative_index(ev.to_number(&arg(args, 0))?, s.len());
        let len = match arg(args, 1) {
            Value::Undefined => s.len() - start,
            n => (to_integer(ev.to_number(&n)?).max(0.0) as usize).min(s.len() - start),
        };
        Ok(collect(&s[start..start + len]))
    });
    method(proto, "toUpperCase", 0, |ev, this, _| {
        Ok(Value::from(this_string(ev, this)?.to_uppercase()))
    });
    method(proto, "toLowerCase", 0, |ev, this, _| {
        Ok(Value::from(this_string(ev, this)?.to_lowercase()))
    });
    method(proto, "toLocaleUpperCase", 0, |ev, this, _| {
        Ok(Value::from(this_string(ev, this)?.to_uppercase()))
    });
    method(proto, "toLocaleLowerCase", 0, |ev, this, _| {
        Ok(Value::from(this_string(ev, this)?.to_lowercase()))
    });
    method(proto, "trim", 0, |ev, this, _| {
        Ok(Value::from(this_string(ev, this)?.trim()))
    });
    method(proto, "trimStart", 0, |ev, this, _| {
        Ok(Value::from(this_string(ev, this)?.trim_start()))
    });
    method(proto, "trimEnd", 0, |ev, this, _| {
        Ok(Value::from(this_string(ev, this)?.trim_end()))
    });
    method(proto, "padStart", 2, |ev, this, args| pad(ev, this, args, true));
    method(proto, "padEnd", 2, |ev, this, args| pad(ev, this, args, false));
    method(proto, "repeat", 1, |ev, this, args| {
        let s = this_string(ev, this)?;
        let n = to_integer(ev.to_number(&arg(args, 0))?);
        if n < 0.0 || n.is_infinite() {
            return Err(Exception::range_error(format!("Invalid count value: {n}")));
        }
        if s.len() as f64 * n > MAX_STRING_LENGTH as f64 {
            return Err(Exception::range_error("Invalid string length"));
        }
        Ok(Value::from(s.repeat(n as usize)))
    });
    method(proto, "concat", 1, |ev, this, args| {
        let mut s = this_string(ev, this)?;
        for value in args {
            s.push_str(&ev.to_js_string(value)?);
        }
        Ok(Value::from(s))
    });
    method(proto, "split", 2, |ev, this, args| {
        let s = this_string(ev, this)?;
        let limit = match arg(args, 1) {
            Value::Undefined => usize::MAX,
            n => to_integer(ev.to_number(&n)?).max(0.0) as usize,
        };
        let parts: Vec<Value> = match arg(args, 0) {
            Value::Undefined => vec![Value::from(s)],
            sep => {
                let sep = ev.to_js_string(&sep)?;
                if sep.is_empty() {
                    s.chars().map(|c| Value::from(c.to_string())).collect()
                } else {
                    s.split(sep.as_str()).map(Value::from).collect()
                }
            }
        };
        Ok(Value::array(parts.into_iter().take(limit).collect()))
    });
    method(proto, "replace", 2, |ev, this, args| replace(ev, this, args, false));
    method(proto, "replaceAll", 2, |ev, this, args| replace(ev, this, args, true));
    method(proto, "localeCompare", 1, |ev, this, args| {
        let s = this_string(ev, this)?;
        let other = string_arg(ev, args, 0)?;
        Ok(Value::Number(match s.cmp(&other) {
            std::cmp::Ordering::Less => -1.0,
            std::cmp::Ordering::Equal => 0.0,
            std::cmp::Ordering::Greater => 1.0,
        }))
    });
    method(proto, "normalize", 0, |ev, this, _| this_string(ev, this).map(Value::from));
    method(proto, "toString", 0, |ev, this, _| this_string(ev, this).map(Value::from));
    method(proto, "valueOf", 0, |ev, this, _| this_string(ev, this).map(Value::from));
}

pub(crate) fn constructor(realm: &Realm) -> Value {
    let string = Function::native("String", 1, |ev, _, args| match args.first() {
        None => Ok(Value::from("")),
        Some(Value::Symbol(sym)) => Ok(Value::from(format!("Symbol({})", sym.description))),
        Some(value) => ev.to_js_string(value).map(Value::from),
    });
    link_prototype(&string, &realm.string_proto);
    static_method(&string, "fromCharCode", 1, |ev, _, args| {
        let mut out = String::with_capacity(args.len());
        for value in args {
            let code = ev.to_number(value)? as u32;
            out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
        }
        Ok(Value::from(out))
    });
    static_method(&string, "fromCodePoint", 1, |ev, _, args| {
        let mut out = String::with_capacity(args.len());
        for value in args {
            let code = ev.to_number(value)?;
            let c = char::from_u32(code as u32)
                .filter(|_| code.fract() == 0.0 && code >= 0.0)
                .ok_or_else(|| Exception::range_error(format!("Invalid code point {code}")))?;
            out.push(c);
        }
        Ok(Value::from(out))
    });
    Value::Function(string)
}
