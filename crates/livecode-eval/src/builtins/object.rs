//! `Object` and `Object.prototype`.

use crate::builtins::{arg, link_prototype, method, static_method};
use crate::error::{EvalResult, Exception};
use crate::realm::Realm;
use crate::value::{parse_index, Function, Object, ObjectRef, Value};

pub(crate) fn install_prototype(proto: &ObjectRef) {
    method(proto, "hasOwnProperty", 1, |ev, this, args| {
        let key = ev.to_property_key(&arg(args, 0))?;
        Ok(Value::Bool(has_own_property(this, &key)))
    });
    method(proto, "isPrototypeOf", 1, |_, this, args| {
        Ok(Value::Bool(match (this, arg(args, 0)) {
            (Value::Object(proto), Value::Object(obj)) => {
                !std::rc::Rc::ptr_eq(proto, &obj) && obj.inherits_from(proto)
            }
            _ => false,
        }))
    });
    method(proto, "toString", 0, |_, this, _| {
        let tag = match this {
            Value::Undefined => "Undefined",
            Value::Null => "Null",
            Value::Array(_) => "Array",
            Value::Function(_) => "Function",
            Value::String(_) => "String",
            Value::Number(_) => "Number",
            Value::Bool(_) => "Boolean",
            Value::Object(obj) if obj.is_error() => "Error",
            _ => "Object",
        };
        Ok(Value::from(format!("[object {tag}]")))
    });
    method(proto, "toLocaleString", 0, |ev, this, _| {
        ev.to_js_string(this).map(Value::from)
    });
    method(proto, "valueOf", 0, |_, this, _| Ok(this.clone()));
}

fn has_own_property(target: &Value, key: &str) -> bool {
    match target {
        Value::Object(obj) => obj.has_own(key),
        Value::Array(items) => key == "length" || parse_index(key).is_some_and(|i| i < items.borrow().len()),
        Value::String(s) => key == "length" || parse_index(key).is_some_and(|i| i < s.chars().count()),
        Value::Function(f) => f.get_own(key).is_some() || matches!(key, "name" | "length"),
        Value::Element(_) => matches!(key, "type" | "props" | "key" | "ref"),
        _ => false,
    }
}

pub(crate) fn constructor(realm: &Realm) -> Value {
    let object = Function::native_constructor("Object", 1, |ev, _, args| {
        let value = arg(args, 0);
        if value.is_reference() {
            return Ok(value);
        }
        Ok(ev.new_object(Vec::<(String, Value)>::new()))
    });
    link_prototype(&object, &realm.object_proto);

    static_method(&object, "keys", 1, |ev, _, args| {
        let target = require_object(&arg(args, 0), "keys")?;
        Ok(Value::array(ev.own_keys(&target).into_iter().map(Value::from).collect()))
    });
    static_method(&object, "values", 1, |ev, _, args| {
        let target = require_object(&arg(args, 0), "values")?;
        let entries = ev.own_entries(&target)?;
        Ok(Value::array(entries.into_iter().map(|(_, v)| v).collect()))
    });
    static_method(&object, "entries", 1, |ev, _, args| {
        let target = require_object(&arg(args, 0), "entries")?;
        let entries = ev.own_entries(&target)?;
        Ok(Value::array(
            entries
                .into_iter()
                .map(|(k, v)| Value::array(vec![Value::from(k), v]))
                .collect(),
        ))
    });
    static_method(&object, "getOwnPropertyNames", 1, |ev, _, args| {
        let target = require_object(&arg(args, 0), "getOwnPropertyNames")?;
        let mut keys = ev.own_keys(&target);
        if matches!(target, Value::Array(_) | Value::String(_)) {
            keys.push("length".into());
        }
        Ok(Value::array(keys.into_iter().map(Value::from).collect()))
    });
    static_method(&object, "assign", 2, |ev, _, args| {
        let target = arg(args, 0);
        if target.is_nullish() {
            return Err(Exception::type_error("Cannot convert undefined or null to object"));
        }
        for source in args.iter().skip(1) {
            if source.is_nullish() {
                continue;
            }
            for (key, value) in ev.own_entries(source)? {
                ev.set_property(&target, &key, value)?;
            }
        }
        Ok(target)
    });
    static_method(&object, "freeze", 1, |_, _, args| {
        let target = arg(args, 0);
        if let Value::Object(obj) = &target {
            obj.freeze();
        }
        Ok(target)
    });
    static_method(&object, "isFrozen", 1, |_, _, args| {
        Ok(Value::Bool(match arg(args, 0) {
            Value::Object(obj) => obj.is_frozen(),
            Value::Array(_) | Value::Function(_) => false,
            _ => true,
        }))
    });
    static_method(&object, "defineProperty", 3, |ev, _, args| {
        let target = arg(args, 0);
        if !target.is_reference() {
            return Err(Exception::type_error("Object.defineProperty called on non-object"));
        }
        let key = ev.to_property_key(&arg(args, 1))?;
        let descriptor = arg(args, 2);
        if !descriptor.is_reference() {
            return Err(Exception::type_error(format!(
                "Property description must be an object: {descriptor}"
            )));
        }
        if ev.has_property(&descriptor, "get") || ev.has_property(&descriptor, "set") {
            return Err(Exception::type_error("Accessor properties are not supported"));
        }
        let value = ev.get_property(&descriptor, "value")?;
        match &target {
            Value::Object(obj) => obj.insert(key, value),
            _ => ev.set_property(&target, &key, value)?,
        }
        Ok(target)
    });
    static_method(&object, "create", 2, |ev, _, args| {
        let proto = match arg(args, 0) {
            Value::Object(proto) => Some(proto),
            Value::Null => None,
            other => {
                return Err(Exception::type_error(format!(
                    "Object prototype may only be an Object or null: {other}"
                )))
            }
        };
        let obj = Value::Object(Object::with_proto(proto));
        let props = arg(args, 1);
        if !props.is_nullish() {
            for (key, descriptor) in ev.own_entries(&props)? {
                let value = ev.get_property(&descriptor, "value")?;
                ev.set_property(&obj, &key, value)?;
            }
        }
        Ok(obj)
    });
    static_method(&object, "getPrototypeOf", 1, |ev, _, args| {
        Ok(match arg(args, 0) {
            Value::Object(obj) => obj.proto().map(Value::Object).unwrap_or(Value::Null),
            Value::Array(_) => Value::Object(ev.realm.array_proto.clone()),
            Value::Function(_) => Value::Object(ev.realm.function_proto.clone()),
            Value::String(_) => Value::Object(ev.realm.string_proto.clone()),
            Value::Number(_) => Value::Object(ev.realm.number_proto.clone()),
            Value::Bool(_) => Value::Object(ev.realm.boolean_proto.clone()),
            Value::Undefined | Value::Null => {
                return Err(Exception::type_error("Cannot convert undefined or null to object"))
            }
            _ => Value::Object(ev.realm.object_proto.clone()),
        })
    });
    static_method(&object, "setPrototypeOf", 2, |_, _, args| {
        let target = arg(args, 0);
        if let Value::Object(obj) = &target {
            match arg(args, 1) {
                Value::Object(proto) => obj.set_proto(Some(proto)),
                Value::Null => obj.set_proto(None),
                other => {
                    return Err(Exception::type_error(format!(
                        "Object prototype may only be an Object or null: {other}"
                    )))
                }
            }
        }
        Ok(target)
    });
    static_method(&object, "fromEntries", 1, |ev, _, args| {
        let obj = ev.new_object(Vec::<(String, Value)>::new());
        for entry in ev.iterate(&arg(args, 0))? {
            let key = ev.get_property(&entry, "0")?;
            let key = ev.to_property_key(&key)?;
            let value = ev.get_property(&entry, "1")?;
            ev.set_property(&obj, &key, value)?;
        }
        Ok(obj)
    });
    static_method(&object, "is", 2, |_, _, args| {
        Ok(Value::Bool(arg(args, 0).same_value(&arg(args, 1))))
    });

    Value::Function(object)
}

fn require_object(value: &Value, name: &str) -> EvalResult<Value> {
    if value.is_nullish() {
        return Err(Exception::type_error(format!(
            "Cannot convert undefined or null to object (Object.{name})"
        )));
    }
    Ok(value.clone())
}
