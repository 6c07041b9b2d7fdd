//! Expression printing.
//!
//! Every expression is printed at a required minimum precedence; an
//! expression that binds more loosely than its context is wrapped in
//! parentheses. Parentheses written by the author survive as
//! [`ExprKind::Paren`] nodes.

use livecode_types::ast::*;

use crate::emitter::{escape_template, format_number, quote, Emitter};
use crate::jsx::emit_jsx;
use crate::stmt::{emit_class, emit_function, emit_function_body, emit_params, emit_prop_key};

/// Operator precedence, loosest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Prec {
    Lowest,
    Comma,
    Assign,
    Conditional,
    Nullish,
    Or,
    And,
    Equality,
    Compare,
    Add,
    Mul,
    Pow,
    Prefix,
    Postfix,
    Call,
    Primary,
}

impl Prec {
    fn next(self) -> Prec {
        match self {
            Prec::Lowest => Prec::Comma,
            Prec::Comma => Prec::Assign,
            Prec::Assign => Prec::Conditional,
            Prec::Conditional => Prec::Nullish,
            Prec::Nullish => Prec::Or,
            Prec::Or => Prec::And,
            Prec::And => Prec::Equality,
            Prec::Equality => Prec::Compare,
            Prec::Compare => Prec::Add,
            Prec::Add => Prec::Mul,
            Prec::Mul => Prec::Pow,
            Prec::Pow => Prec::Prefix,
            Prec::Prefix => Prec::Postfix,
            Prec::Postfix => Prec::Call,
            Prec::Call | Prec::Primary => Prec::Primary,
        }
    }
}

fn binary_prec(op: BinOp) -> Prec {
    match op {
        BinOp::Add | BinOp::Sub => Prec::Add,
        BinOp::Mul | BinOp::Div | BinOp::Mod => Prec::Mul,
        BinOp::Pow => Prec::Pow,
        BinOp::Eq | BinOp::NotEq | BinOp::StrictEq | BinOp::StrictNotEq => Prec::Equality,
        BinOp::Less
        | BinOp::Greater
        | BinOp::LessEq
        | BinOp::GreaterEq
        | BinOp::InstanceOf
        | BinOp::In => Prec::Compare,
    }
}

fn logical_prec(op: LogicalOp) -> Prec {
    match op {
        LogicalOp::Nullish => Prec::Nullish,
        LogicalOp::Or => Prec::Or,
        LogicalOp::And => Prec::And,
    }
}

fn expr_prec(expr: &Expr) -> Prec {
    match &expr.kind {
        ExprKind::Sequence(_) => Prec::Comma,
        ExprKind::Assign { .. } | ExprKind::Arrow(_) => Prec::Assign,
        ExprKind::Conditional { .. } => Prec::Conditional,
        ExprKind::Logical { op, .. } => logical_prec(*op),
        ExprKind::Binary { op, .. } => binary_prec(*op),
        ExprKind::Unary { .. } => Prec::Prefix,
        ExprKind::Update { prefix: true, .. } => Prec::Prefix,
        ExprKind::Update { prefix: false, .. } => Prec::Postfix,
        ExprKind::Member { .. }
        | ExprKind::Call { .. }
        | ExprKind::New { .. }
        | ExprKind::Jsx(_) => Prec::Call,
        _ => Prec::Primary,
    }
}

/// The expression printed first when `expr` is written out, ignoring
/// precedence parentheses.
fn leftmost(expr: &Expr) -> &Expr {
    match &expr.kind {
        ExprKind::Binary { left, .. } | ExprKind::Logical { left, .. } => leftmost(left),
        ExprKind::Conditional { test, .. } => leftmost(test),
        ExprKind::Assign { target, .. } => leftmost(target),
        ExprKind::Sequence(items) => items.first().map(leftmost).unwrap_or(expr),
        ExprKind::Member { object, .. } => leftmost(object),
        ExprKind::Call { callee, .. } => leftmost(callee),
        ExprKind::Update {
            prefix: false,
            target,
            ..
        } => leftmost(target),
        _ => expr,
    }
}

/// Whether `expr` would be misread at the start of a statement.
pub(crate) fn needs_statement_parens(expr: &Expr) -> bool {
    matches!(
        leftmost(expr).kind,
        ExprKind::Object(_) | ExprKind::Function(_) | ExprKind::Class(_)
    )
}

// ══════════════════════════════════════════════════════════════════════════════
// Printing
// ══════════════════════════════════════════════════════════════════════════════

/// Print `expr` so that it binds at least as tightly as `level`.
pub fn emit_expr(expr: &Expr, level: Prec, e: &mut Emitter) {
    let wrap = expr_prec(expr) < level;
    if wrap {
        e.write("(");
    }
    emit_expr_inner(expr, e);
    if wrap {
        e.write(")");
    }
}

fn emit_expr_inner(expr: &Expr, e: &mut Emitter) {
    match &expr.kind {
        // ── Literals ──────────────────────────────────────────────────────
        ExprKind::Number(n) => e.write(&format_number(*n)),
        ExprKind::String(s) => e.write(&quote(s)),
        ExprKind::Template(parts) => emit_template(parts, e),
        ExprKind::Bool(b) => e.write(if *b { "true" } else { "false" }),
        ExprKind::Null => e.write("null"),
        ExprKind::This => e.write("this"),
        ExprKind::Super => e.write("super"),
        ExprKind::Ident(name) => e.write(name),
        ExprKind::Array(elements) => {
            e.write("[");
            emit_elements(elements, e);
            e.write("]");
        }
        ExprKind::Object(props) => emit_object(props, e),

        // ── Functions ────────────────────────────────────────────────────
        ExprKind::Function(func) => emit_function(func, e),
        ExprKind::Arrow(func) => emit_arrow(func, e),
        ExprKind::Class(class) => emit_class(class, e),

        // ── Operators ────────────────────────────────────────────────────
        ExprKind::Unary { op, operand } => {
            e.write(&op.to_string());
            let needs_space = match op {
                UnaryOp::TypeOf | UnaryOp::Void | UnaryOp::Delete => true,
                UnaryOp::Neg | UnaryOp::Plus => matches!(
                    operand.kind,
                    ExprKind::Unary {
                        op: UnaryOp::Neg | UnaryOp::Plus,
                        ..
                    } | ExprKind::Update { prefix: true, .. }
                ),
                UnaryOp::Not => false,
            };
            if needs_space {
                e.write(" ");
            }
            emit_expr(operand, Prec::Prefix, e);
        }
        ExprKind::Update { op, prefix, target } => {
            let text = match op {
                UpdateOp::Inc => "++",
                UpdateOp::Dec => "--",
            };
            if *prefix {
                e.write(text);
                emit_expr(target, Prec::Prefix, e);
            } else {
                emit_expr(target, Prec::Postfix, e);
                e.write(text);
            }
        }
        ExprKind::Binary { left, op, right } => {
            let prec = binary_prec(*op);
            if *op == BinOp::Pow {
                // `-a ** b` is a syntax error; the base needs parentheses.
                emit_expr(left, Prec::Postfix, e);
                e.write(" ** ");
                emit_expr(right, prec, e);
            } else {
                emit_expr(left, prec, e);
                e.write(&format!(" {op} "));
                emit_expr(right, prec.next(), e);
            }
        }
        ExprKind::Logical { left, op, right } => {
            let prec = logical_prec(*op);
            emit_logical_operand(left, *op, prec, e);
            e.write(&format!(" {op} "));
            emit_logical_operand(right, *op, prec.next(), e);
        }
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            emit_expr(test, Prec::Nullish, e);
            e.write(" ? ");
            emit_expr(consequent, Prec::Assign, e);
            e.write(" : ");
            emit_expr(alternate, Prec::Assign, e);
        }
        ExprKind::Assign { target, op, value } => {
            emit_expr(target, Prec::Postfix, e);
            e.write(&format!(" {op} "));
            emit_expr(value, Prec::Assign, e);
        }
        ExprKind::Sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    e.write(", ");
                }
                emit_expr(item, Prec::Assign, e);
            }
        }

        // ── Access & Calls ───────────────────────────────────────────────
        ExprKind::Member {
            object,
            property,
            optional,
        } => {
            emit_member_object(object, e);
            match property {
                MemberProp::Named(name) => {
                    e.write(if *optional { "?." } else { "." });
                    e.write(&name.name);
                }
                MemberProp::Computed(prop) => {
                    e.write(if *optional { "?.[" } else { "[" });
                    emit_expr(prop, Prec::Lowest, e);
                    e.write("]");
                }
            }
        }
        ExprKind::Call {
            callee,
            args,
            optional,
        } => {
            emit_member_object(callee, e);
            e.write(if *optional { "?.(" } else { "(" });
            emit_elements(args, e);
            e.write(")");
        }
        ExprKind::New { callee, args } => {
            e.write("new ");
            if contains_call(callee) {
                e.write("(");
                emit_expr(callee, Prec::Lowest, e);
                e.write(")");
            } else {
                emit_expr(callee, Prec::Call, e);
            }
            e.write("(");
            emit_elements(args, e);
            e.write(")");
        }
        ExprKind::Paren(inner) => {
            e.write("(");
            emit_expr(inner, Prec::Lowest, e);
            e.write(")");
        }
        ExprKind::Jsx(element) => emit_jsx(element, e),
    }
}

/// `??` cannot be mixed with `||` or `&&` without parentheses.
fn emit_logical_operand(operand: &Expr, parent: LogicalOp, level: Prec, e: &mut Emitter) {
    let mixes = match &operand.kind {
        ExprKind::Logical { op, .. } => {
            (parent == LogicalOp::Nullish) != (*op == LogicalOp::Nullish)
        }
        _ => false,
    };
    if mixes {
        e.write("(");
        emit_expr(operand, Prec::Lowest, e);
        e.write(")");
    } else {
        emit_expr(operand, level, e);
    }
}

/// Object of a member access or callee of a call.
fn emit_member_object(object: &Expr, e: &mut Emitter) {
    if matches!(object.kind, ExprKind::Number(_)) {
        e.write("(");
        emit_expr(object, Prec::Lowest, e);
        e.write(")");
    } else {
        emit_expr(object, Prec::Call, e);
    }
}

/// A call anywhere in a member chain would be taken as the `new` argument
/// list.
fn contains_call(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Call { .. } => true,
        ExprKind::Member { object, .. } => contains_call(object),
        _ => false,
    }
}

/// Comma-separated array elements or call arguments.
pub(crate) fn emit_elements(elements: &[ArrayElement], e: &mut Emitter) {
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            e.write(", ");
        }
        match element {
            ArrayElement::Expr(expr) => emit_expr(expr, Prec::Assign, e),
            ArrayElement::Spread(expr) => {
                e.write("...");
                emit_expr(expr, Prec::Assign, e);
            }
        }
    }
}

fn emit_template(parts: &[TemplatePart], e: &mut Emitter) {
    e.write("`");
    for part in parts {
        match part {
            TemplatePart::Literal(text) => e.write(&escape_template(text)),
            TemplatePart::Expr(expr) => {
                e.write("${");
                emit_expr(expr, Prec::Lowest, e);
                e.write("}");
            }
        }
    }
    e.write("`");
}

fn emit_object(props: &[ObjectProp], e: &mut Emitter) {
    if props.is_empty() {
        e.write("{}");
        return;
    }
    e.write("{ ");
    for (i, prop) in props.iter().enumerate() {
        if i > 0 {
            e.write(", ");
        }
        match prop {
            ObjectProp::KeyValue { key, value } => {
                emit_prop_key(key, e);
                e.write(": ");
                emit_expr(value, Prec::Assign, e);
            }
            ObjectProp::Shorthand(ident) => e.write(&ident.name),
            ObjectProp::Method { key, func } => {
                emit_prop_key(key, e);
                emit_params(&func.params, e);
                e.write(" ");
                emit_function_body(&func.body, e);
            }
            ObjectProp::Spread(expr) => {
                e.write("...");
                emit_expr(expr, Prec::Assign, e);
            }
        }
    }
    e.write(" }");
}

fn emit_arrow(func: &FunctionDef, e: &mut Emitter) {
    emit_params(&func.params, e);
    e.write(" => ");
    match &func.body {
        FunctionBody::Block(_) => emit_function_body(&func.body, e),
        FunctionBody::Expr(body) => {
            if matches!(leftmost(body).kind, ExprKind::Object(_)) {
                e.write("(");
                emit_expr(body, Prec::Lowest, e);
                e.write(")");
            } else {
                emit_expr(body, Prec::Assign, e);
            }
        }
    }
}
