//! Statement, function, class and pattern printing.
//!
//! Bodies of `if`, loops and `else` are always printed as blocks.

use livecode_types::ast::*;

use crate::emitter::{format_number, quote, Emitter};
use crate::expr::{emit_expr, needs_statement_parens, Prec};

/// Print one statement on its own line(s). `import`/`export` are lowered by
/// the module pass and print nothing here.
pub fn emit_stmt(stmt: &Stmt, e: &mut Emitter) {
    match stmt {
        Stmt::Empty(_) | Stmt::Import(_) | Stmt::Export(_) => {}
        Stmt::Var(decl) => {
            e.start_line();
            emit_var_decl(decl, e);
            e.write(";");
            e.end_line();
        }
        Stmt::Function(func) => {
            e.start_line();
            emit_function(func, e);
            e.end_line();
        }
        Stmt::Class(class) => {
            e.start_line();
            emit_class(class, e);
            e.end_line();
        }
        Stmt::Expr(stmt) => {
            e.start_line();
            emit_expr_stmt(&stmt.expr, e);
            e.end_line();
        }
        Stmt::Return(ret) => {
            e.start_line();
            e.write("return");
            if let Some(argument) = &ret.argument {
                e.write(" ");
                emit_expr(argument, Prec::Lowest, e);
            }
            e.write(";");
            e.end_line();
        }
        Stmt::If(stmt) => {
            e.start_line();
            emit_if(stmt, e);
            e.end_line();
        }
        Stmt::For(stmt) => {
            e.start_line();
            e.write("for (");
            match &stmt.init {
                Some(ForInit::Var(decl)) => emit_var_decl(decl, e),
                Some(ForInit::Expr(expr)) => emit_expr(expr, Prec::Lowest, e),
                None => {}
            }
            e.write(";");
            if let Some(test) = &stmt.test {
                e.write(" ");
                emit_expr(test, Prec::Lowest, e);
            }
            e.write(";");
            if let Some(update) = &stmt.update {
                e.write(" ");
                emit_expr(update, Prec::Lowest, e);
            }
            e.write(") ");
            emit_body(&stmt.body, e);
            e.end_line();
        }
        Stmt::ForEach(stmt) => {
            e.start_line();
            e.write("for (");
            match &stmt.target {
                ForEachTarget::Decl(kind, pattern) => {
                    e.write(kind.as_str());
                    e.write(" ");
                    emit_pattern(pattern, e);
                }
                ForEachTarget::Ident(ident) => e.write(&ident.name),
            }
            match stmt.kind {
                ForEachKind::Of => {
                    e.write(" of ");
                    emit_expr(&stmt.iterable, Prec::Assign, e);
                }
                ForEachKind::In => {
                    e.write(" in ");
                    emit_expr(&stmt.iterable, Prec::Lowest, e);
                }
            }
            e.write(") ");
            emit_body(&stmt.body, e);
            e.end_line();
        }
        Stmt::While(stmt) => {
            e.start_line();
            e.write("while (");
            emit_expr(&stmt.test, Prec::Lowest, e);
            e.write(") ");
            emit_body(&stmt.body, e);
            e.end_line();
        }
        Stmt::DoWhile(stmt) => {
            e.start_line();
            e.write("do ");
            emit_body(&stmt.body, e);
            e.write(" while (");
            emit_expr(&stmt.test, Prec::Lowest, e);
            e.write(");");
            e.end_line();
        }
        Stmt::Switch(stmt) => {
            e.start_line();
            e.write("switch (");
            emit_expr(&stmt.discriminant, Prec::Lowest, e);
            e.write(") {");
            e.end_line();
            e.indent();
            for case in &stmt.cases {
                e.start_line();
                match &case.test {
                    Some(test) => {
                        e.write("case ");
                        emit_expr(test, Prec::Lowest, e);
                        e.write(":");
                    }
                    None => e.write("default:"),
                }
                e.end_line();
                e.indent();
                for stmt in &case.body {
                    emit_stmt(stmt, e);
                }
                e.dedent();
            }
            e.dedent();
            e.line("}");
        }
        Stmt::Break(_) => e.line("break;"),
        Stmt::Continue(_) => e.line("continue;"),
        Stmt::Throw(stmt) => {
            e.start_line();
            e.write("throw ");
            emit_expr(&stmt.argument, Prec::Lowest, e);
            e.write(";");
            e.end_line();
        }
        Stmt::Try(stmt) => {
            e.start_line();
            e.write("try ");
            emit_block(&stmt.block, e);
            if let Some(handler) = &stmt.handler {
                e.write(" catch ");
                if let Some(param) = &handler.param {
                    e.write("(");
                    emit_pattern(param, e);
                    e.write(") ");
                }
                emit_block(&handler.body, e);
            }
            if let Some(finalizer) = &stmt.finalizer {
                e.write(" finally ");
                emit_block(finalizer, e);
            }
            e.end_line();
        }
        Stmt::Block(block) => {
            e.start_line();
            emit_block(block, e);
            e.end_line();
        }
    }
}

fn emit_expr_stmt(expr: &Expr, e: &mut Emitter) {
    if needs_statement_parens(expr) {
        e.write("(");
        emit_expr(expr, Prec::Lowest, e);
        e.write(")");
    } else {
        emit_expr(expr, Prec::Lowest, e);
    }
    e.write(";");
}

fn emit_if(stmt: &IfStmt, e: &mut Emitter) {
    e.write("if (");
    emit_expr(&stmt.test, Prec::Lowest, e);
    e.write(") ");
    emit_body(&stmt.consequent, e);
    match stmt.alternate.as_deref() {
        Some(Stmt::If(chained)) => {
            e.write(" else ");
            emit_if(chained, e);
        }
        Some(alternate) => {
            e.write(" else ");
            emit_body(alternate, e);
        }
        None => {}
    }
}

/// A loop or branch body, wrapped in braces when it is not a block.
fn emit_body(stmt: &Stmt, e: &mut Emitter) {
    match stmt {
        Stmt::Block(block) => emit_block(block, e),
        other => {
            e.write("{");
            e.end_line();
            e.indent();
            emit_stmt(other, e);
            e.dedent();
            e.start_line();
            e.write("}");
        }
    }
}

/// `{ stmts }` starting at the cursor and ending after the `}`.
pub fn emit_block(block: &Block, e: &mut Emitter) {
    if block.stmts.iter().all(|s| matches!(s, Stmt::Empty(_))) {
        e.write("{}");
        return;
    }
    e.write("{");
    e.end_line();
    e.indent();
    for stmt in &block.stmts {
        emit_stmt(stmt, e);
    }
    e.dedent();
    e.start_line();
    e.write("}");
}

pub fn emit_var_decl(decl: &VarDecl, e: &mut Emitter) {
    e.write(decl.kind.as_str());
    e.write(" ");
    for (i, declarator) in decl.declarations.iter().enumerate() {
        if i > 0 {
            e.write(", ");
        }
        emit_pattern(&declarator.pattern, e);
        if let Some(init) = &declarator.init {
            e.write(" = ");
            emit_expr(init, Prec::Assign, e);
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Functions & Classes
// ══════════════════════════════════════════════════════════════════════════════

/// `function [name](params) { body }`
pub fn emit_function(func: &FunctionDef, e: &mut Emitter) {
    e.write("function");
    if let Some(name) = &func.name {
        e.write(" ");
        e.write(&name.name);
    } else {
        e.write(" ");
    }
    emit_params(&func.params, e);
    e.write(" ");
    emit_function_body(&func.body, e);
}

pub fn emit_params(params: &[Param], e: &mut Emitter) {
    e.write("(");
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            e.write(", ");
        }
        if param.rest {
            e.write("...");
        }
        emit_pattern(&param.pattern, e);
        if let Some(default) = &param.default {
            e.write(" = ");
            emit_expr(default, Prec::Assign, e);
        }
    }
    e.write(")");
}

/// A function body as a block. Expression bodies become `{ return expr; }`.
pub fn emit_function_body(body: &FunctionBody, e: &mut Emitter) {
    match body {
        FunctionBody::Block(block) => emit_block(block, e),
        FunctionBody::Expr(expr) => {
            e.write("{");
            e.end_line();
            e.indent();
            e.start_line();
            e.write("return ");
            emit_expr(expr, Prec::Lowest, e);
            e.write(";");
            e.end_line();
            e.dedent();
            e.start_line();
            e.write("}");
        }
    }
}

/// `class [Name] [extends Base] { members }`
pub fn emit_class(class: &ClassDef, e: &mut Emitter) {
    e.write("class");
    if let Some(name) = &class.name {
        e.write(" ");
        e.write(&name.name);
    }
    if let Some(superclass) = &class.superclass {
        e.write(" extends ");
        emit_expr(superclass, Prec::Call, e);
    }
    if class.members.is_empty() {
        e.write(" {}");
        return;
    }
    e.write(" {");
    e.end_line();
    e.indent();
    for member in &class.members {
        e.start_line();
        match member {
            ClassMember::Constructor(func) => {
                e.write("constructor");
                emit_params(&func.params, e);
                e.write(" ");
                emit_function_body(&func.body, e);
            }
            ClassMember::Method {
                key,
                func,
                is_static,
            } => {
                if *is_static {
                    e.write("static ");
                }
                emit_prop_key(key, e);
                emit_params(&func.params, e);
                e.write(" ");
                emit_function_body(&func.body, e);
            }
            ClassMember::Field {
                key,
                value,
                is_static,
            } => {
                if *is_static {
                    e.write("static ");
                }
                emit_prop_key(key, e);
                if let Some(value) = value {
                    e.write(" = ");
                    emit_expr(value, Prec::Assign, e);
                }
                e.write(";");
            }
        }
        e.end_line();
    }
    e.dedent();
    e.start_line();
    e.write("}");
}

pub fn emit_prop_key(key: &PropKey, e: &mut Emitter) {
    match key {
        PropKey::Ident(name) => e.write(name),
        PropKey::String(s) => e.write(&quote(s)),
        PropKey::Number(n) => e.write(&format_number(*n)),
        PropKey::Computed(expr) => {
            e.write("[");
            emit_expr(expr, Prec::Assign, e);
            e.write("]");
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Patterns
// ══════════════════════════════════════════════════════════════════════════════

pub fn emit_pattern(pattern: &Pattern, e: &mut Emitter) {
    match pattern {
        Pattern::Ident(ident) => e.write(&ident.name),
        Pattern::Object { props, rest, .. } => {
            if props.is_empty() && rest.is_none() {
                e.write("{}");
                return;
            }
            e.write("{ ");
            for (i, prop) in props.iter().enumerate() {
                if i > 0 {
                    e.write(", ");
                }
                let shorthand = matches!(
                    (&prop.key, &prop.value.pattern),
                    (PropKey::Ident(key), Pattern::Ident(ident)) if *key == ident.name
                );
                if !shorthand {
                    emit_prop_key(&prop.key, e);
                    e.write(": ");
                }
                emit_pattern_elem(&prop.value, e);
            }
            if let Some(rest) = rest {
                if !props.is_empty() {
                    e.write(", ");
                }
                e.write("...");
                e.write(&rest.name);
            }
            e.write(" }");
        }
        Pattern::Array { elements, rest, .. } => {
            e.write("[");
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    e.write(", ");
                }
                if let Some(element) = element {
                    emit_pattern_elem(element, e);
                }
            }
            if matches!(elements.last(), Some(None)) && rest.is_none() {
                e.write(",");
            }
            if let Some(rest) = rest {
                if !elements.is_empty() {
                    e.write(", ");
                }
                e.write("...");
                emit_pattern(rest, e);
            }
            e.write("]");
        }
    }
}

fn emit_pattern_elem(elem: &PatternElem, e: &mut Emitter) {
    emit_pattern(&elem.pattern, e);
    if let Some(default) = &elem.default {
        e.write(" = ");
        emit_expr(default, Prec::Assign, e);
    }
}
