//! Result coercion: classify the exported value.

use livecode_eval::{Element, Value};

/// Something the host can display.
#[derive(Debug, Clone, PartialEq)]
pub enum Renderable {
    /// An element built by the code.
    Node(Element),
    /// A component exported without rendering it, wrapped in a prop-less
    /// element.
    Component(Element),
    /// Plain text.
    Text(String),
}

impl Renderable {
    pub fn element(&self) -> Option<&Element> {
        match self {
            Renderable::Node(el) | Renderable::Component(el) => Some(el),
            Renderable::Text(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Renderable::Node(_) => "node",
            Renderable::Component(_) => "component",
            Renderable::Text(_) => "text",
        }
    }
}

/// Falsy values, numbers, arrays, objects and functions that take required
/// parameters all yield `None`.
pub fn coerce(value: &Value) -> Option<Renderable> {
    if !value.is_truthy() {
        return None;
    }
    match value {
        Value::Element(el) => Some(Renderable::Node((**el).clone())),
        Value::Function(f) if f.arity() == 0 => {
            Some(Renderable::Component(Element::component(value.clone())))
        }
        Value::String(s) => Some(Renderable::Text(s.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livecode_eval::Evaluator;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_falsy_values() {
        for value in [Value::Undefined, Value::Null, Value::Bool(false), Value::from(0), Value::from("")] {
            assert_eq!(coerce(&value), None);
        }
    }

    #[test]
    fn test_element_and_text() {
        let el = Element::intrinsic("div");
        assert_eq!(coerce(&Value::from(el.clone())), Some(Renderable::Node(el)));
        assert_eq!(coerce(&Value::from("hi")), Some(Renderable::Text("hi".into())));
    }

    #[test]
    fn test_functions_by_arity() {
        let mut ev = Evaluator::new();
        let no_params = ev.run("return function App() { return null; };").unwrap();
        let with_params = ev.run("return function Card(props) { return null; };").unwrap();
        let defaulted = ev.run("return (props = {}) => null;").unwrap();

        let Some(Renderable::Component(el)) = coerce(&no_params) else {
            panic!("expected a component");
        };
        assert_eq!(el.type_name(), "App");
        assert!(el.props.is_empty());
        assert_eq!(coerce(&with_params), None);
        assert!(matches!(coerce(&defaulted), Some(Renderable::Component(_))));
    }

    #[test]
    fn test_other_values() {
        assert_eq!(coerce(&Value::from(1)), None);
        assert_eq!(coerce(&Value::array(vec![Value::from("a")])), None);
        assert_eq!(coerce(&Value::object([("a", Value::from(1))])), None);
    }
}
