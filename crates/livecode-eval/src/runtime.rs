//! The runtime base author code renders against: a `React`-shaped object
//! whose `createElement` builds [`Element`] values.
//!
//! Hooks assume a single static render. State setters and effects are
//! accepted and ignored.

use indexmap::IndexMap;

use crate::builtins::{arg, link_prototype, method};
use crate::element::{flatten_children, Element, ElementType};
use crate::error::{EvalResult, Exception};
use crate::evaluator::Evaluator;
use crate::value::{Function, FunctionRef, Object, ObjectRef, Symbol, Value};

pub const REACT_VERSION: &str = "18.3.1";

thread_local! {
    static FRAGMENT: Value = Value::Symbol(Symbol::new("react.fragment"));
}

/// The `React.Fragment` marker.
pub fn fragment() -> Value {
    FRAGMENT.with(Value::clone)
}

/// Build the runtime base object.
pub fn react() -> Value {
    let react = Object::new();
    react.insert("version", Value::from(REACT_VERSION));
    react.insert("Fragment", fragment());
    react.insert("createElement", Value::native("createElement", 3, create_element));
    react.insert("cloneElement", Value::native("cloneElement", 3, clone_element));
    react.insert(
        "isValidElement",
        Value::native("isValidElement", 1, |_, _, args| {
            Ok(Value::Bool(matches!(arg(args, 0), Value::Element(_))))
        }),
    );

    let component = component_class("Component", None);
    let pure = component_class("PureComponent", component.prototype());
    if let Some(proto) = pure.prototype() {
        proto.insert("isPureReactComponent", Value::Bool(true));
    }
    react.insert("Component", Value::Function(component));
    react.insert("PureComponent", Value::Function(pure));

    for name in ["StrictMode", "Suspense", "Profiler"] {
        react.insert(name, passthrough(name));
    }

    install_hooks(&react);
    react.insert("memo", Value::native("memo", 1, |_, _, args| Ok(arg(args, 0))));
    react.insert("forwardRef", Value::native("forwardRef", 1, forward_ref));
    react.insert("createContext", Value::native("createContext", 1, create_context));
    react.insert("Children", Value::Object(children_object()));

    Value::Object(react)
}

// ══════════════════════════════════════════════════════════════════════
// Elements
// ══════════════════════════════════════════════════════════════════════

fn element_type(value: &Value) -> EvalResult<ElementType> {
    match value {
        Value::String(tag) => Ok(ElementType::Intrinsic(tag.to_string())),
        Value::Function(_) => Ok(ElementType::Component(value.clone())),
        Value::Symbol(_) if value.strict_equals(&fragment()) => Ok(ElementType::Fragment),
        other => Err(Exception::type_error(format!(
            "Element type is invalid: expected a string (for built-in components) or a class/function (for composite components) but got: {}.",
            match other {
                Value::Undefined | Value::Null => other.to_string(),
                _ => other.type_of().to_string(),
            }
        ))),
    }
}

/// Copy `config` into `props`, pulling out `key` and dropping `ref`.
fn apply_config(
    ev: &mut Evaluator,
    config: &Value,
    props: &mut IndexMap<String, Value>,
    key: &mut Option<String>,
) -> EvalResult<()> {
    if config.is_nullish() {
        return Ok(());
    }
    for (name, value) in ev.own_entries(config)? {
        match name.as_str() {
            "key" => {
                if !value.is_nullish() {
                    *key = Some(ev.to_js_string(&value)?);
                }
            }
            "ref" | "__self" | "__source" => {}
            _ => {
                props.insert(name, value);
            }
        }
    }
    Ok(())
}

fn set_children(props: &mut IndexMap<String, Value>, children: &[Value]) {
    match children {
        [] => {}
        [only] => {
            props.insert("children".into(), only.clone());
        }
        many => {
            props.insert("children".into(), Value::array(many.to_vec()));
        }
    }
}

/// `createElement(type, config, ...children)`.
fn create_element(ev: &mut Evaluator, _: &Value, args: &[Value]) -> EvalResult<Value> {
    let type_value = arg(args, 0);
    let element_type = element_type(&type_value)?;
    let mut props = IndexMap::new();
    let mut key = None;
    apply_config(ev, &arg(args, 1), &mut props, &mut key)?;
    set_children(&mut props, args.get(2..).unwrap_or_default());

    if let Value::Function(f) = &type_value {
        if let Some(defaults) = f.get("defaultProps") {
            for (name, value) in ev.own_entries(&defaults)? {
                let missing = props.get(&name).map_or(true, Value::is_undefined);
                if missing {
                    props.insert(name, value);
                }
            }
        }
    }

    Ok(Value::from(Element {
        element_type,
        props,
        key,
    }))
}

/// `cloneElement(element, config, ...children)`.
fn clone_element(ev: &mut Evaluator, _: &Value, args: &[Value]) -> EvalResult<Value> {
    let Value::Element(original) = arg(args, 0) else {
        return Err(Exception::type_error(
            "React.cloneElement(...): The argument must be a React element",
        ));
    };
    let mut element = (*original).clone();
    apply_config(ev, &arg(args, 1), &mut element.props, &mut element.key)?;
    set_children(&mut element.props, args.get(2..).unwrap_or_default());
    Ok(Value::from(element))
}

// ══════════════════════════════════════════════════════════════════════
// Components
// ══════════════════════════════════════════════════════════════════════

/// `Component` / `PureComponent`: constructors that store `props`, with
/// `setState` merging synchronously.
fn component_class(name: &str, parent_proto: Option<ObjectRef>) -> FunctionRef {
    let class = Function::native_constructor(name, 1, |ev, this, args| {
        ev.set_property(this, "props", arg(args, 0))?;
        ev.set_property(this, "context", arg(args, 1))?;
        let refs = ev.new_object(Vec::<(String, Value)>::new());
        ev.set_property(this, "refs", refs)?;
        Ok(Value::Undefined)
    });
    let proto = Object::with_proto(parent_proto);
    link_prototype(&class, &proto);
    if proto.proto().is_none() {
        proto.insert("isReactComponent", Value::object(Vec::<(String, Value)>::new()));
        method(&proto, "setState", 1, |ev, this, args| {
            let current = ev.get_property(this, "state")?;
            let partial = match arg(args, 0) {
                update if update.is_callable() => {
                    let props = ev.get_property(this, "props")?;
                    ev.call_function(&update, this.clone(), vec![current.clone(), props])?
                }
                update => update,
            };
            if partial.is_nullish() {
                return Ok(Value::Undefined);
            }
            let next = ev.new_object(Vec::<(String, Value)>::new());
            if !current.is_nullish() {
                for (key, value) in ev.own_entries(&current)? {
                    ev.set_property(&next, &key, value)?;
                }
            }
            for (key, value) in ev.own_entries(&partial)? {
                ev.set_property(&next, &key, value)?;
            }
            ev.set_property(this, "state", next)?;
            Ok(Value::Undefined)
        });
        method(&proto, "forceUpdate", 0, |_, _, _| Ok(Value::Undefined));
    }
    class
}

/// A component that renders its children unchanged.
fn passthrough(name: &str) -> Value {
    Value::native(name, 1, |ev, _, args| {
        let props = arg(args, 0);
        if props.is_nullish() {
            return Ok(Value::Null);
        }
        ev.get_property(&props, "children")
    })
}

fn forward_ref(_: &mut Evaluator, _: &Value, args: &[Value]) -> EvalResult<Value> {
    let render = arg(args, 0);
    if !render.is_callable() {
        return Err(Exception::type_error(
            "forwardRef requires a render function",
        ));
    }
    let name = render.as_function().map(|f| f.name()).unwrap_or_default();
    Ok(Value::native(name, 1, move |ev, _, args| {
        ev.call_function(&render, Value::Undefined, vec![arg(args, 0), Value::Null])
    }))
}

fn create_context(ev: &mut Evaluator, _: &Value, args: &[Value]) -> EvalResult<Value> {
    let default = arg(args, 0);
    let context = ev.new_object([("_currentValue", default.clone())]);
    let provider = passthrough("Provider");
    let consumer = Value::native("Consumer", 1, move |ev, _, args| {
        let render = ev.get_property(&arg(args, 0), "children")?;
        if !render.is_callable() {
            return Ok(Value::Null);
        }
        ev.call_function(&render, Value::Undefined, vec![default.clone()])
    });
    ev.set_property(&context, "Provider", provider)?;
    ev.set_property(&context, "Consumer", consumer)?;
    Ok(context)
}

// ══════════════════════════════════════════════════════════════════════
// Hooks
// ══════════════════════════════════════════════════════════════════════

fn install_hooks(react: &ObjectRef) {
    method(react, "useState", 1, |ev, _, args| {
        let initial = match arg(args, 0) {
            init if init.is_callable() => ev.call_function(&init, Value::Undefined, Vec::new())?,
            init => init,
        };
        Ok(Value::array(vec![initial, no_op("setState")]))
    });
    method(react, "useReducer", 3, |ev, _, args| {
        let initial = match arg(args, 2) {
            init if init.is_callable() => {
                ev.call_function(&init, Value::Undefined, vec![arg(args, 1)])?
            }
            _ => arg(args, 1),
        };
        Ok(Value::array(vec![initial, no_op("dispatch")]))
    });
    method(react, "useMemo", 2, |ev, _, args| {
        let factory = arg(args, 0);
        if !factory.is_callable() {
            return Err(Exception::type_error("useMemo requires a function"));
        }
        ev.call_function(&factory, Value::Undefined, Vec::new())
    });
    method(react, "useCallback", 2, |_, _, args| Ok(arg(args, 0)));
    method(react, "useRef", 1, |ev, _, args| {
        Ok(ev.new_object([("current", arg(args, 0))]))
    });
    method(react, "useContext", 1, |ev, _, args| {
        ev.get_property(&arg(args, 0), "_currentValue")
    });
    method(react, "useId", 0, |_, _, _| Ok(Value::from(":r0:")));
    for name in ["useEffect", "useLayoutEffect", "useInsertionEffect", "useImperativeHandle"] {
        method(react, name, 2, |_, _, _| Ok(Value::Undefined));
    }
}

fn no_op(name: &str) -> Value {
    Value::native(name, 1, |_, _, _| Ok(Value::Undefined))
}

// ══════════════════════════════════════════════════════════════════════
// Children
// ══════════════════════════════════════════════════════════════════════

fn flattened(children: &Value) -> Vec<Value> {
    let mut out = Vec::new();
    flatten_children(children, &mut out);
    out
}

fn is_empty_node(value: &Value) -> bool {
    matches!(value, Value::Undefined | Value::Null | Value::Bool(_))
}

fn children_object() -> ObjectRef {
    let children = Object::new();
    method(&children, "toArray", 1, |_, _, args| {
        let items = flattened(&arg(args, 0));
        Ok(Value::array(items.into_iter().filter(|v| !is_empty_node(v)).collect()))
    });
    method(&children, "count", 1, |_, _, args| {
        let children = arg(args, 0);
        if children.is_nullish() {
            return Ok(Value::from(0));
        }
        Ok(Value::from(flattened(&children).len()))
    });
    method(&children, "map", 2, |ev, _, args| {
        let children = arg(args, 0);
        if children.is_nullish() {
            return Ok(children);
        }
        let func = arg(args, 1);
        let mut out = Vec::new();
        for (i, child) in flattened(&children).into_iter().enumerate() {
            let child = if is_empty_node(&child) { Value::Null } else { child };
            let mapped = ev.call_function(&func, arg(args, 2), vec![child, Value::from(i)])?;
            if !is_empty_node(&mapped) {
                out.push(mapped);
            }
        }
        Ok(Value::array(out))
    });
    method(&children, "forEach", 2, |ev, _, args| {
        let children = arg(args, 0);
        if children.is_nullish() {
            return Ok(Value::Undefined);
        }
        let func = arg(args, 1);
        for (i, child) in flattened(&children).into_iter().enumerate() {
            ev.call_function(&func, arg(args, 2), vec![child, Value::from(i)])?;
        }
        Ok(Value::Undefined)
    });
    method(&children, "only", 1, |_, _, args| match arg(args, 0) {
        child @ Value::Element(_) => Ok(child),
        _ => Err(Exception::error(
            "React.Children.only expected to receive a single React element child.",
        )),
    });
    children
}

