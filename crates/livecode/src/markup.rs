//! Static HTML-like preview of a result.
//!
//! Function components are called with their props and class components
//! are constructed and rendered, each once. Hooks behave as on a first
//! render; effects never run.

use livecode_eval::{Element, ElementType, EvalResult, Evaluator, Exception, Value};
use livecode_types::{LiveError, Stage};

use crate::coerce::Renderable;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Style properties whose numbers are written without `px`.
const UNITLESS_STYLES: &[&str] = &[
    "opacity", "zIndex", "fontWeight", "lineHeight", "flex", "flexGrow", "flexShrink",
    "order", "zoom",
];

const MAX_COMPONENT_DEPTH: usize = 128;

/// Expand `renderable` to markup. Exceptions thrown by components are
/// reported with stage `evaluate`.
pub fn render_markup(renderable: &Renderable) -> Result<String, LiveError> {
    let mut renderer = Renderer {
        ev: Evaluator::new(),
        out: String::new(),
        depth: 0,
    };
    let rendered = match renderable {
        Renderable::Text(text) => {
            renderer.out.push_str(&escape(text));
            Ok(())
        }
        Renderable::Node(el) | Renderable::Component(el) => renderer.element(el),
    };
    match rendered {
        Ok(()) => Ok(renderer.out),
        Err(e) => Err(LiveError::new(Stage::Evaluate, e.message()).at(e.span)),
    }
}

struct Renderer {
    ev: Evaluator,
    out: String,
    depth: usize,
}

impl Renderer {
    fn node(&mut self, value: &Value) -> EvalResult<()> {
        match value {
            Value::Undefined
            | Value::Null
            | Value::Bool(_)
            | Value::Function(_)
            | Value::Symbol(_) => Ok(()),
            Value::String(s) => {
                self.out.push_str(&escape(s));
                Ok(())
            }
            Value::Number(_) => {
                let text = self.ev.to_js_string(value)?;
                self.out.push_str(&text);
                Ok(())
            }
            Value::Array(items) => {
                let items = items.borrow().clone();
                items.iter().try_for_each(|item| self.node(item))
            }
            Value::Element(el) => self.element(el),
            Value::Object(obj) => Err(Exception::error(format!(
                "Objects are not valid as a React child (found: object with keys {{{}}})",
                obj.keys().join(", ")
            ))),
        }
    }

    fn element(&mut self, el: &Element) -> EvalResult<()> {
        match &el.element_type {
            ElementType::Fragment => self.children(el),
            ElementType::Intrinsic(tag) => self.intrinsic(tag, el),
            ElementType::Component(component) => {
                if self.depth >= MAX_COMPONENT_DEPTH {
                    return Err(Exception::range_error(format!(
                        "Component nesting exceeds {MAX_COMPONENT_DEPTH} levels"
                    )));
                }
                self.depth += 1;
                let result = self
                    .call_component(component, el)
                    .and_then(|rendered| self.node(&rendered));
                self.depth -= 1;
                result
            }
        }
    }

    fn children(&mut self, el: &Element) -> EvalResult<()> {
        el.children().iter().try_for_each(|child| self.node(child))
    }

    fn call_component(&mut self, component: &Value, el: &Element) -> EvalResult<Value> {
        let props = self.ev.new_object(el.props.clone());
        let is_class = component.as_function().is_some_and(|f| {
            f.is_class() || f.prototype().is_some_and(|proto| proto.has("isReactComponent"))
        });
        if !is_class {
            return self.ev.call_function(component, Value::Undefined, vec![props]);
        }
        let instance = self.ev.construct(component, vec![props])?;
        let render = self.ev.get_property(&instance, "render")?;
        if !render.is_callable() {
            return Err(Exception::type_error(format!(
                "{}(...): No `render` method found on the returned component instance",
                el.type_name()
            )));
        }
        self.ev.call_function(&render, instance, Vec::new())
    }

    fn intrinsic(&mut self, tag: &str, el: &Element) -> EvalResult<()> {
        self.out.push('<');
        self.out.push_str(tag);
        for (name, value) in &el.props {
            if name != "children" && name != "dangerouslySetInnerHTML" {
                self.attribute(name, value)?;
            }
        }
        if VOID_ELEMENTS.contains(&tag) {
            self.out.push_str("/>");
            return Ok(());
        }
        self.out.push('>');
        match el.props.get("dangerouslySetInnerHTML") {
            Some(inner) if !inner.is_nullish() => {
                let html = self.ev.get_property(inner, "__html")?;
                if !html.is_nullish() {
                    let html = self.ev.to_js_string(&html)?;
                    self.out.push_str(&html);
                }
            }
            _ => self.children(el)?,
        }
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
        Ok(())
    }

    fn attribute(&mut self, name: &str, value: &Value) -> EvalResult<()> {
        let name = match name {
            "className" => "class",
            "htmlFor" => "for",
            other => other,
        };
        let text = match value {
            Value::Undefined
            | Value::Null
            | Value::Function(_)
            | Value::Symbol(_)
            | Value::Bool(false) => return Ok(()),
            Value::Bool(true) => {
                self.out.push(' ');
                self.out.push_str(name);
                return Ok(());
            }
            Value::Object(_) if name == "style" => self.style(value)?,
            other => self.ev.to_js_string(other)?,
        };
        if name == "style" && text.is_empty() {
            return Ok(());
        }
        self.out.push_str(&format!(" {name}=\"{}\"", escape(&text)));
        Ok(())
    }

    fn style(&mut self, value: &Value) -> EvalResult<String> {
        let mut rules = Vec::new();
        for (key, item) in self.ev.own_entries(value)? {
            let text = match item {
                Value::Undefined | Value::Null | Value::Bool(_) => continue,
                Value::Number(n) if n != 0.0 && !UNITLESS_STYLES.contains(&key.as_str()) => {
                    format!("{}px", self.ev.to_js_string(&item)?)
                }
                other => self.ev.to_js_string(&other)?,
            };
            rules.push(format!("{}:{}", kebab_case(&key), text));
        }
        Ok(rules.join(";"))
    }
}

fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::coerce;
    use livecode_eval::runtime;
    use pretty_assertions::assert_eq;

    fn markup(body: &str) -> String {
        let mut ev = Evaluator::new();
        ev.define_global("React", runtime::react());
        let value = ev.run(body).unwrap();
        let renderable = coerce(&value).expect("renderable");
        render_markup(&renderable).unwrap()
    }

    #[test]
    fn test_intrinsic_attributes_and_text() {
        assert_eq!(
            markup("return React.createElement('p', { className: 'lead', onClick: () => 1, hidden: false }, 'a < b');"),
            "<p class=\"lead\">a &lt; b</p>"
        );
    }

    #[test]
    fn test_void_elements_self_close() {
        assert_eq!(
            markup("return React.createElement('div', null, React.createElement('br'), React.createElement('input', { disabled: true }));"),
            "<div><br/><input disabled/></div>"
        );
    }

    #[test]
    fn test_style_object() {
        assert_eq!(
            markup("return React.createElement('span', { style: { fontSize: 12, opacity: 0.5, color: 'red' } });"),
            "<span style=\"font-size:12px;opacity:0.5;color:red\"></span>"
        );
    }

    #[test]
    fn test_function_and_class_components() {
        let html = markup(
            "function Hello(props) { return React.createElement('b', null, 'Hi ', props.name); }\n\
             class Card extends React.Component {\n\
               render() { return React.createElement(React.Fragment, null, React.createElement(Hello, { name: this.props.who }), [1, 2]); }\n\
             }\n\
             return () => React.createElement(Card, { who: 'Ada' });",
        );
        assert_eq!(html, "<b>Hi Ada</b>12");
    }

    #[test]
    fn test_plain_object_child_is_error() {
        let mut ev = Evaluator::new();
        ev.define_global("React", runtime::react());
        let value = ev.run("return React.createElement('div', null, { a: 1 });").unwrap();
        let err = render_markup(&coerce(&value).unwrap()).unwrap_err();
        assert_eq!(err.stage, Stage::Evaluate);
        assert!(err.message.contains("Objects are not valid as a React child"));
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(
            render_markup(&Renderable::Text("\"x\" & 'y'".into())).unwrap(),
            "&quot;x&quot; &amp; &#x27;y&#x27;"
        );
    }
}
