//! Element: the immutable tree node `createElement` produces.

use indexmap::IndexMap;

use crate::value::Value;

/// What an element renders as.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementType {
    /// A host tag such as `"div"`.
    Intrinsic(String),
    /// A function or class component.
    Component(Value),
    /// `React.Fragment`: renders its children only.
    Fragment,
}

/// A UI tree node.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub element_type: ElementType,
    /// Props in insertion order, including `children` when present.
    pub props: IndexMap<String, Value>,
    /// Reconciliation key, stringified.
    pub key: Option<String>,
}

impl Element {
    pub fn new(element_type: ElementType, props: IndexMap<String, Value>) -> Self {
        Self {
            element_type,
            props,
            key: None,
        }
    }

    /// A host element with text-free props.
    pub fn intrinsic(tag: impl Into<String>) -> Self {
        Self::new(ElementType::Intrinsic(tag.into()), IndexMap::new())
    }

    /// An element for a component with no props.
    pub fn component(component: Value) -> Self {
        Self::new(ElementType::Component(component), IndexMap::new())
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// `props.children`, flattened into a list. A single child is a
    /// one-element list; arrays are flattened one level deep per nesting.
    pub fn children(&self) -> Vec<Value> {
        let mut out = Vec::new();
        if let Some(children) = self.props.get("children") {
            flatten_children(children, &mut out);
        }
        out
    }

    /// Tag name for host elements, component name otherwise.
    pub fn type_name(&self) -> String {
        match &self.element_type {
            ElementType::Intrinsic(tag) => tag.clone(),
            ElementType::Component(Value::Function(f)) => {
                let name = f.name();
                if name.is_empty() {
                    "Anonymous".into()
                } else {
                    name
                }
            }
            ElementType::Component(_) => "Unknown".into(),
            ElementType::Fragment => "Fragment".into(),
        }
    }

    /// The `type` property seen from author code.
    pub fn type_value(&self, fragment: &Value) -> Value {
        match &self.element_type {
            ElementType::Intrinsic(tag) => Value::from(tag.as_str()),
            ElementType::Component(component) => component.clone(),
            ElementType::Fragment => fragment.clone(),
        }
    }
}

/// Flatten nested child arrays, keeping holes such as `null` and booleans
/// for the caller to skip.
pub fn flatten_children(value: &Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items.borrow().iter() {
                flatten_children(item, out);
            }
        }
        other => out.push(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_are_flattened() {
        let mut props = IndexMap::new();
        props.insert(
            "children".to_string(),
            Value::array(vec![
                Value::from("a"),
                Value::array(vec![Value::from("b"), Value::Null]),
            ]),
        );
        let el = Element::new(ElementType::Intrinsic("ul".into()), props);
        assert_eq!(
            el.children(),
            vec![Value::from("a"), Value::from("b"), Value::Null]
        );
    }

    #[test]
    fn test_structural_equality() {
        let a = Element::intrinsic("div").with_key("1");
        let b = Element::intrinsic("div").with_key("1");
        assert_eq!(a, b);
        assert_ne!(a, Element::intrinsic("span"));
    }
}
