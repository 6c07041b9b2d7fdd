//! Module lowering: `import` → `require` shim calls, `export` → `exports.*`
//! assignments.
//!
//! Imports are hoisted to the top of the output in source order, matching
//! module evaluation order. Default imports go through
//! `_interopRequireDefault` so that plain values supplied for a path act as
//! that module's default export.

use std::collections::HashSet;

use livecode_types::ast::*;

use crate::emitter::{is_identifier_name, property_key, quote, Emitter};
use crate::error::{TranspileError, TranspileResult};
use crate::expr::{emit_expr, Prec};
use crate::stmt::{emit_class, emit_function, emit_stmt};
use crate::transpiler::TranspileOptions;

const STRICT_DIRECTIVE: &str = "\"use strict\";";
const ES_MODULE_MARKER: &str = "Object.defineProperty(exports, \"__esModule\", { value: true });";
const INTEROP_HELPER: &str =
    "function _interopRequireDefault(e) { return e && e.__esModule ? e : { default: e }; }";

/// Print a whole program.
pub fn emit_program(program: &Program, options: &TranspileOptions) -> TranspileResult<String> {
    check_duplicate_exports(program)?;

    let mut e = Emitter::new(options);
    if program.is_module() {
        e.line(STRICT_DIRECTIVE);
        e.line(ES_MODULE_MARKER);
    }
    for stmt in &program.body {
        if let Stmt::Import(import) = stmt {
            emit_import(import, &mut e);
        }
    }
    for stmt in &program.body {
        match stmt {
            Stmt::Export(export) => emit_export(export, &mut e),
            other => emit_stmt(other, &mut e),
        }
    }
    if e.needs_interop {
        e.line(INTEROP_HELPER);
    }
    Ok(e.finish())
}

// ══════════════════════════════════════════════════════════════════════════════
// Imports
// ══════════════════════════════════════════════════════════════════════════════

fn require_call(source: &str) -> String {
    format!("require({})", quote(source))
}

fn interop_default(module: &str, e: &mut Emitter) -> String {
    e.needs_interop = true;
    format!("_interopRequireDefault({module}).default")
}

fn emit_import(import: &ImportDecl, e: &mut Emitter) {
    let require = require_call(&import.source);
    if import.specifiers.is_empty() {
        e.line(&format!("{require};"));
        return;
    }

    let mut default = None;
    let mut namespace = None;
    let mut named = Vec::new();
    for specifier in &import.specifiers {
        match specifier {
            ImportSpecifier::Default(local) => default = Some(local.name.as_str()),
            ImportSpecifier::Namespace(local) => namespace = Some(local.name.as_str()),
            ImportSpecifier::Named { imported, local } => named.push((imported, local)),
        }
    }

    // One binding form: read the module inline.
    let forms = usize::from(default.is_some())
        + usize::from(namespace.is_some())
        + usize::from(!named.is_empty());
    let module = if forms == 1 {
        require
    } else {
        let temp = namespace
            .map(str::to_string)
            .unwrap_or_else(|| e.module_temp(&import.source));
        e.line(&format!("const {temp} = {require};"));
        temp
    };

    if let Some(ns) = namespace {
        if forms == 1 {
            e.line(&format!("const {ns} = {module};"));
        }
    }
    if let Some(local) = default {
        let value = interop_default(&module, e);
        e.line(&format!("const {local} = {value};"));
    }
    if !named.is_empty() {
        let bindings: Vec<String> = named
            .iter()
            .map(|(imported, local)| {
                if **imported == local.name {
                    local.name.clone()
                } else {
                    format!("{}: {}", property_key(imported), local.name)
                }
            })
            .collect();
        e.line(&format!("const {{ {} }} = {module};", bindings.join(", ")));
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Exports
// ══════════════════════════════════════════════════════════════════════════════

fn export_assignment(exported: &str, value: &str) -> String {
    if is_identifier_name(exported) {
        format!("exports.{exported} = {value};")
    } else {
        format!("exports[{}] = {value};", quote(exported))
    }
}

fn emit_export(export: &ExportDecl, e: &mut Emitter) {
    match &export.kind {
        ExportKind::DefaultExpr(expr) => {
            e.start_line();
            e.write("exports.default = ");
            emit_expr(expr, Prec::Assign, e);
            e.write(";");
            e.end_line();
        }
        ExportKind::DefaultFunction(func) => match &func.name {
            Some(name) => {
                emit_stmt(&Stmt::Function(func.clone()), e);
                e.line(&export_assignment("default", &name.name));
            }
            None => {
                e.start_line();
                e.write("exports.default = ");
                emit_function(func, e);
                e.write(";");
                e.end_line();
            }
        },
        ExportKind::DefaultClass(class) => match &class.name {
            Some(name) => {
                emit_stmt(&Stmt::Class(class.clone()), e);
                e.line(&export_assignment("default", &name.name));
            }
            None => {
                e.start_line();
                e.write("exports.default = ");
                emit_class(class, e);
                e.write(";");
                e.end_line();
            }
        },
        ExportKind::Decl(stmt) => {
            emit_stmt(stmt, e);
            for name in declared_names(stmt) {
                e.line(&export_assignment(name, name));
            }
        }
        ExportKind::Named {
            specifiers,
            source: None,
        } => {
            for spec in specifiers {
                e.line(&export_assignment(&spec.exported, &spec.local));
            }
        }
        ExportKind::Named {
            specifiers,
            source: Some(source),
        } => {
            let temp = e.module_temp(source);
            e.line(&format!("const {temp} = {};", require_call(source)));
            for spec in specifiers {
                let value = if is_identifier_name(&spec.local) {
                    format!("{temp}.{}", spec.local)
                } else {
                    format!("{temp}[{}]", quote(&spec.local))
                };
                e.line(&export_assignment(&spec.exported, &value));
            }
        }
        ExportKind::All { source } => {
            let temp = e.module_temp(source);
            e.line(&format!("const {temp} = {};", require_call(source)));
            e.line(&format!("Object.keys({temp}).forEach(function (key) {{"));
            e.indent();
            e.line("if (key === \"default\" || key === \"__esModule\") return;");
            e.line(&format!("exports[key] = {temp}[key];"));
            e.dedent();
            e.line("});");
        }
    }
}

/// Names bound by an exported declaration.
fn declared_names(stmt: &Stmt) -> Vec<&str> {
    match stmt {
        Stmt::Var(decl) => decl
            .declarations
            .iter()
            .flat_map(|d| d.pattern.bound_names())
            .collect(),
        Stmt::Function(func) => func.name.iter().map(|n| n.name.as_str()).collect(),
        Stmt::Class(class) => class.name.iter().map(|n| n.name.as_str()).collect(),
        _ => Vec::new(),
    }
}

fn exported_names(export: &ExportDecl) -> Vec<&str> {
    match &export.kind {
        ExportKind::DefaultExpr(_) | ExportKind::DefaultFunction(_) | ExportKind::DefaultClass(_) => {
            vec!["default"]
        }
        ExportKind::Decl(stmt) => declared_names(stmt),
        ExportKind::Named { specifiers, .. } => {
            specifiers.iter().map(|s| s.exported.as_str()).collect()
        }
        ExportKind::All { .. } => Vec::new(),
    }
}

fn check_duplicate_exports(program: &Program) -> TranspileResult<()> {
    let mut seen = HashSet::new();
    for stmt in &program.body {
        let Stmt::Export(export) = stmt else {
            continue;
        };
        for name in exported_names(export) {
            if !seen.insert(name) {
                return Err(TranspileError::DuplicateExport {
                    name: name.to_string(),
                    position: export.span,
                });
            }
        }
    }
    Ok(())
}
