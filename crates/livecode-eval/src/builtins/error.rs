//! `Error` and its subclasses.

use crate::builtins::{arg, link_prototype, method, static_method};
use crate::error::ErrorKind;
use crate::realm::Realm;
use crate::value::{Function, ObjectRef, Value};

pub(crate) fn install_prototype(proto: &ObjectRef) {
    proto.insert("message", Value::from(""));
    method(proto, "toString", 0, |ev, this, _| {
        let name = match ev.get_property(this, "name")? {
            Value::Undefined => "Error".to_string(),
            name => ev.to_js_string(&name)?,
        };
        let message = match ev.get_property(this, "message")? {
            Value::Undefined => String::new(),
            message => ev.to_js_string(&message)?,
        };
        Ok(Value::from(match (name.is_empty(), message.is_empty()) {
            (_, true) => name,
            (true, false) => message,
            (false, false) => format!("{name}: {message}"),
        }))
    });
}

/// One constructor per error class author code can name.
pub(crate) fn constructors(realm: &Realm) -> Vec<(String, Value)> {
    ErrorKind::ALL
        .iter()
        .filter(|kind| **kind != ErrorKind::ModuleNotFoundError)
        .map(|&kind| {
            let constructor = Function::native_constructor(kind.name(), 1, move |ev, this, args| {
                let proto = ev.realm.error_proto(kind);
                let target = match this {
                    Value::Object(obj) if obj.inherits_from(&proto) => this.clone(),
                    _ => ev.make_error(kind, ""),
                };
                if let Value::Object(obj) = &target {
                    let message = arg(args, 0);
                    if !message.is_undefined() {
                        obj.insert("message", Value::from(ev.to_js_string(&message)?));
                    }
                    let options = arg(args, 1);
                    if options.is_reference() && ev.has_property(&options, "cause") {
                        let cause = ev.get_property(&options, "cause")?;
                        obj.insert("cause", cause);
                    }
                    obj.mark_error();
                }
                Ok(target)
            });
            link_prototype(&constructor, &realm.error_proto(kind));
            if kind == ErrorKind::Error {
                static_method(&constructor, "captureStackTrace", 1, |_, _, _| Ok(Value::Undefined));
            }
            (kind.name().to_string(), Value::Function(constructor))
        })
        .collect()
}
