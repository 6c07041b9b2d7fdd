//! `console`: output is captured on the evaluator and forwarded to tracing
//! under the `livecode::console` target.

use std::rc::Rc;

use crate::builtins::{method, namespace};
use crate::error::EvalResult;
use crate::evaluator::{ConsoleEntry, ConsoleLevel, Evaluator};
use crate::realm::Realm;
use crate::value::{number_to_string, FunctionKind, Value};

/// Nesting depth past which `inspect` prints `[Object]`/`[Array]`.
const MAX_INSPECT_DEPTH: usize = 2;

pub(crate) fn object(realm: &Realm) -> Value {
    let console = namespace(realm);
    for (name, level) in [
        ("log", ConsoleLevel::Log),
        ("info", ConsoleLevel::Info),
        ("debug", ConsoleLevel::Debug),
        ("warn", ConsoleLevel::Warn),
        ("error", ConsoleLevel::Error),
        ("trace", ConsoleLevel::Debug),
    ] {
        method(&console, name, 0, move |ev, _, args| {
            let message = format_args(ev, args)?;
            emit(ev, level, message);
            Ok(Value::Undefined)
        });
    }
    Value::Object(console)
}

fn emit(ev: &mut Evaluator, level: ConsoleLevel, message: String) {
    match level {
        ConsoleLevel::Log | ConsoleLevel::Info | ConsoleLevel::Debug => {
            tracing::info!(target: "livecode::console", "{message}");
        }
        ConsoleLevel::Warn => tracing::warn!(target: "livecode::console", "{message}"),
        ConsoleLevel::Error => tracing::error!(target: "livecode::console", "{message}"),
    }
    ev.console.push(ConsoleEntry { level, message });
}

/// Join arguments the way Node does: strings print raw, everything else
/// is inspected. A leading format string consumes `%s`, `%d`, `%i`, `%f`,
/// `%o`, `%O` and `%j` directives.
fn format_args(ev: &mut Evaluator, args: &[Value]) -> EvalResult<String> {
    let mut parts = Vec::with_capacity(args.len());
    let mut rest = args;
    if let Some(Value::String(format)) = args.first() {
        if format.contains('%') {
            let (text, consumed) = apply_format(ev, format, &args[1..])?;
            parts.push(text);
            rest = &args[1 + consumed..];
        }
    }
    for value in rest {
        parts.push(match value {
            Value::String(s) => s.to_string(),
            other => inspect(other),
        });
    }
    Ok(parts.join(" "))
}

fn apply_format(ev: &mut Evaluator, format: &str, args: &[Value]) -> EvalResult<(String, usize)> {
    let mut out = String::with_capacity(format.len());
    let mut used = 0;
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(&directive) = chars.peek() else {
            out.push('%');
            break;
        };
        if directive == '%' {
            chars.next();
            out.push('%');
            continue;
        }
        if !matches!(directive, 's' | 'd' | 'i' | 'f' | 'o' | 'O' | 'j') || used >= args.len() {
            out.push('%');
            continue;
        }
        chars.next();
        let value = &args[used];
        used += 1;
        match directive {
            's' => match value {
                Value::String(s) => out.push_str(s),
                other => out.push_str(&inspect(other)),
            },
            'd' | 'i' => {
                let n = ev.to_number(value)?;
                let n = if directive == 'i' { n.trunc() } else { n };
                out.push_str(&number_to_string(n));
            }
            'f' => out.push_str(&number_to_string(ev.to_number(value)?)),
            'j' => match super::json::stringify(ev, value, "")? {
                Some(text) => out.push_str(&text),
                None => out.push_str("undefined"),
            },
            _ => out.push_str(&inspect(value)),
        }
    }
    Ok((out, used))
}

/// Node-style `util.inspect` rendering.
pub fn inspect(value: &Value) -> String {
    let mut seen = Vec::new();
    inspect_at(value, 0, &mut seen)
}

fn inspect_at(value: &Value, depth: usize, seen: &mut Vec<*const ()>) -> String {
    match value {
        Value::String(s) => quote(s),
        Value::Symbol(sym) => format!("Symbol({})", sym.description),
        Value::Function(f) => {
            let name = f.name();
            match (&f.kind, name.is_empty()) {
                (FunctionKind::Class(_), true) => "[class (anonymous)]".into(),
                (FunctionKind::Class(_), false) => format!("[class {name}]"),
                (_, true) => "[Function (anonymous)]".into(),
                (_, false) => format!("[Function: {name}]"),
            }
        }
        Value::Array(items) => {
            let id = Rc::as_ptr(items) as *const ();
            if seen.contains(&id) {
                return "[Circular *1]".into();
            }
            let items = items.borrow();
            if items.is_empty() {
                return "[]".into();
            }
            if depth > MAX_INSPECT_DEPTH {
                return "[Array]".into();
            }
            seen.push(id);
            let parts: Vec<String> = items
                .iter()
                .map(|item| inspect_at(item, depth + 1, seen))
                .collect();
            seen.pop();
            format!("[ {} ]", parts.join(", "))
        }
        Value::Object(obj) if obj.is_error() => value.to_string(),
        Value::Object(obj) => {
            let id = Rc::as_ptr(obj) as *const ();
            if seen.contains(&id) {
                return "[Circular *1]".into();
            }
            let entries = obj.entries();
            if entries.is_empty() {
                return "{}".into();
            }
            if depth > MAX_INSPECT_DEPTH {
                return "[Object]".into();
            }
            seen.push(id);
            let parts: Vec<String> = entries
                .iter()
                .map(|(key, item)| format!("{}: {}", inspect_key(key), inspect_at(item, depth + 1, seen)))
                .collect();
            seen.pop();
            format!("{{ {} }}", parts.join(", "))
        }
        Value::Element(el) => format!("<{} />", el.type_name()),
        other => other.to_string(),
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'").replace('\n', "\\n"))
}

fn inspect_key(key: &str) -> String {
    let mut chars = key.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    if plain {
        key.to_string()
    } else {
        quote(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inspect_nested_values() {
        let value = Value::object([
            ("a", Value::from(1)),
            ("b", Value::array(vec![Value::from("x"), Value::Null])),
            ("data-id", Value::Undefined),
        ]);
        assert_eq!(inspect(&value), "{ a: 1, b: [ 'x', null ], 'data-id': undefined }");
    }

    #[test]
    fn test_inspect_empty_containers() {
        assert_eq!(inspect(&Value::array(vec![])), "[]");
        assert_eq!(inspect(&Value::object(Vec::<(String, Value)>::new())), "{}");
    }
}
