//! `Function` and `Function.prototype`.

use crate::builtins::{arg, link_prototype, method};
use crate::error::Exception;
use crate::realm::Realm;
use crate::value::{Function, FunctionKind, ObjectRef, Value};

pub(crate) fn install_prototype(proto: &ObjectRef) {
    method(proto, "call", 1, |ev, this, args| {
        let receiver = arg(args, 0);
        let rest = args.get(1..).map(<[Value]>::to_vec).unwrap_or_default();
        ev.call_function(this, receiver, rest)
    });
    method(proto, "apply", 2, |ev, this, args| {
        let receiver = arg(args, 0);
        let list = match arg(args, 1) {
            Value::Undefined | Value::Null => Vec::new(),
            list @ Value::Array(_) => ev.iterate(&list)?,
            _ => {
                return Err(Exception::type_error(
                    "CreateListFromArrayLike called on non-object",
                ))
            }
        };
        ev.call_function(this, receiver, list)
    });
    method(proto, "bind", 1, |_, this, args| {
        let Value::Function(target) = this else {
            return Err(Exception::type_error("Bind must be called on a function"));
        };
        let name = format!("bound {}", target.name());
        Ok(Value::Function(Function::new(
            name,
            FunctionKind::Bound {
                target: this.clone(),
                this: arg(args, 0),
                args: args.get(1..).map(<[Value]>::to_vec).unwrap_or_default(),
            },
        )))
    });
    method(proto, "toString", 0, |_, this, _| Ok(Value::from(this.to_string())));
}

/// `Function(...params, body)` compiles its last argument against the
/// global scope.
pub(crate) fn constructor(realm: &Realm) -> Value {
    let function = Function::native_constructor("Function", 1, |ev, _, args| {
        let mut parts = Vec::with_capacity(args.len());
        for value in args {
            parts.push(ev.to_js_string(value)?);
        }
        let body = parts.pop().unwrap_or_default();
        let params: Vec<String> = parts
            .iter()
            .flat_map(|p| p.split(','))
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        ev.compile_function(&params, &body)
    });
    link_prototype(&function, &realm.function_proto);
    Value::Function(function)
}
