//! JSX lowering to factory calls.
//!
//! `<Tag a="x" {...s}>text{y}</Tag>` becomes
//! `React.createElement(Tag, { a: "x", ...s }, "text", y)`; the factory and
//! fragment names come from the transpiler options.

use livecode_types::ast::*;

use crate::emitter::{property_key, quote, Emitter};
use crate::expr::{emit_expr, Prec};

pub fn emit_jsx(element: &JsxElement, e: &mut Emitter) {
    let factory = e.options.jsx_factory.clone();
    e.write(&factory);
    e.write("(");
    emit_jsx_type(&element.name, e);
    e.write(", ");
    emit_jsx_props(&element.attributes, e);
    for child in &element.children {
        e.write(", ");
        match child {
            JsxChild::Text(text) => e.write(&quote(text)),
            JsxChild::Expr(expr) => emit_expr(expr, Prec::Assign, e),
            JsxChild::Element(child) => emit_jsx(child, e),
        }
    }
    e.write(")");
}

fn emit_jsx_type(name: &JsxName, e: &mut Emitter) {
    match name {
        JsxName::Fragment => {
            let fragment = e.options.jsx_fragment.clone();
            e.write(&fragment);
        }
        JsxName::Intrinsic(tag) => e.write(&quote(tag)),
        JsxName::Component(path) => e.write(&path.join(".")),
    }
}

/// The props object, or `null` without attributes.
fn emit_jsx_props(attributes: &[JsxAttribute], e: &mut Emitter) {
    if attributes.is_empty() {
        e.write("null");
        return;
    }
    e.write("{ ");
    for (i, attribute) in attributes.iter().enumerate() {
        if i > 0 {
            e.write(", ");
        }
        match attribute {
            JsxAttribute::Named { name, value, .. } => {
                e.write(&property_key(name));
                e.write(": ");
                match value {
                    None => e.write("true"),
                    Some(JsxAttrValue::String(text)) => e.write(&quote(text)),
                    Some(JsxAttrValue::Expr(expr)) => emit_expr(expr, Prec::Assign, e),
                    Some(JsxAttrValue::Element(element)) => emit_jsx(element, e),
                }
            }
            JsxAttribute::Spread(expr) => {
                e.write("...");
                emit_expr(expr, Prec::Assign, e);
            }
        }
    }
    e.write(" }");
}
