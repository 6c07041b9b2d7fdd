//! Binding patterns and assignment targets.

use livecode_types::ast::*;

use crate::env::{BindingError, EnvRef};
use crate::error::{EvalResult, Exception};
use crate::evaluator::{pattern_name, Evaluator};
use crate::value::{Object, Value};

/// How names introduced by a pattern are bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BindMode {
    /// `var`: the hoisted binding in the function scope.
    Var,
    /// `let`, `const`, parameters and `catch` bindings: the current scope.
    Lexical { mutable: bool },
}

impl BindMode {
    pub(crate) fn for_kind(kind: VarKind) -> Self {
        match kind {
            VarKind::Var => BindMode::Var,
            VarKind::Let => BindMode::Lexical { mutable: true },
            VarKind::Const => BindMode::Lexical { mutable: false },
        }
    }
}

/// A resolved assignment target.
pub(crate) enum Reference {
    Binding(String),
    Property(Value, String),
}

impl Evaluator {
    // ══════════════════════════════════════════════════════════════════════
    // Declarations
    // ══════════════════════════════════════════════════════════════════════

    pub(crate) fn bind_pattern(
        &mut self,
        pattern: &Pattern,
        value: Value,
        env: &EnvRef,
        mode: BindMode,
    ) -> EvalResult<()> {
        match pattern {
            Pattern::Ident(ident) => {
                match mode {
                    BindMode::Var => env.var_scope().initialize(&ident.name, value),
                    BindMode::Lexical { mutable } => env.declare(&ident.name, value, mutable),
                }
                Ok(())
            }
            Pattern::Object { props, rest, span } => {
                if value.is_nullish() {
                    return Err(Exception::type_error(format!(
                        "Cannot destructure '{value}' as it is {value}."
                    ))
                    .at(*span));
                }
                let mut used = Vec::with_capacity(props.len());
                for prop in props {
                    let key = self.eval_prop_key(&prop.key, env)?;
                    let item = self.get_property(&value, &key)?;
                    let item = self.apply_default(item, &prop.value, env)?;
                    self.bind_pattern(&prop.value.pattern, item, env, mode)?;
                    used.push(key);
                }
                if let Some(rest) = rest {
                    let remaining = self.rest_object(&value, &used)?;
                    self.bind_pattern(&Pattern::Ident(rest.clone()), remaining, env, mode)?;
                }
                Ok(())
            }
            Pattern::Array {
                elements,
                rest,
                span,
            } => {
                let items = self.iterate(&value).map_err(|e| e.at(*span))?;
                for (i, element) in elements.iter().enumerate() {
                    let Some(element) = element else {
                        continue;
                    };
                    let item = items.get(i).cloned().unwrap_or_default();
                    let item = self.apply_default(item, element, env)?;
                    self.bind_pattern(&element.pattern, item, env, mode)?;
                }
                if let Some(rest) = rest {
                    let remaining = items.get(elements.len()..).map(<[Value]>::to_vec);
                    self.bind_pattern(rest, Value::array(remaining.unwrap_or_default()), env, mode)?;
                }
                Ok(())
            }
        }
    }

    fn apply_default(&mut self, value: Value, elem: &PatternElem, env: &EnvRef) -> EvalResult<Value> {
        match &elem.default {
            Some(default) if value.is_undefined() => {
                self.eval_named(default, pattern_name(&elem.pattern), env)
            }
            _ => Ok(value),
        }
    }

    /// Own entries of `value` except `used`, as a new object.
    fn rest_object(&mut self, value: &Value, used: &[String]) -> EvalResult<Value> {
        let rest = Object::with_proto(Some(self.realm.object_proto.clone()));
        for (key, item) in self.own_entries(value)? {
            if !used.contains(&key) {
                rest.insert(key, item);
            }
        }
        Ok(Value::Object(rest))
    }

    // ══════════════════════════════════════════════════════════════════════
    // Assignment
    // ══════════════════════════════════════════════════════════════════════

    pub(crate) fn assign_binding(&mut self, name: &str, value: Value, env: &EnvRef) -> EvalResult<()> {
        env.assign(name, value).map_err(|e| match e {
            BindingError::NotDefined => Exception::reference_error(format!("{name} is not defined")),
            BindingError::Uninitialized => Exception::reference_error(format!(
                "Cannot access '{name}' before initialization"
            )),
            BindingError::Constant => Exception::type_error("Assignment to constant variable."),
        })
    }

    pub(crate) fn resolve_reference(&mut self, target: &Expr, env: &EnvRef) -> EvalResult<Reference> {
        match &target.kind {
            ExprKind::Ident(name) => Ok(Reference::Binding(name.clone())),
            ExprKind::Paren(inner) => self.resolve_reference(inner, env),
            ExprKind::Member {
                object, property, ..
            } => {
                if matches!(object.kind, ExprKind::Super) {
                    return Err(Exception::syntax_error("Assignment through 'super' is not supported"));
                }
                let base = self.eval_expr(object, env)?;
                let key = self.member_key(property, env)?;
                Ok(Reference::Property(base, key))
            }
            _ => Err(Exception::syntax_error("Invalid left-hand side in assignment")),
        }
    }

    pub(crate) fn read_reference(&mut self, reference: &Reference, env: &EnvRef) -> EvalResult<Value> {
        match reference {
            Reference::Binding(name) => self.lookup(name, env),
            Reference::Property(base, key) => self.get_property(base, key),
        }
    }

    pub(crate) fn write_reference(&mut self, reference: &Reference, value: Value, env: &EnvRef) -> EvalResult<()> {
        match reference {
            Reference::Binding(name) => self.assign_binding(name, value, env),
            Reference::Property(base, key) => self.set_property(base, key, value),
        }
    }

    /// `target = value` where `target` may be an array or object literal
    /// read as a destructuring pattern.
    pub(crate) fn assign_to(&mut self, target: &Expr, value: Value, env: &EnvRef) -> EvalResult<()> {
        match &target.kind {
            ExprKind::Array(elements) => self.assign_array_pattern(elements, value, env),
            ExprKind::Object(props) => self.assign_object_pattern(props, value, env),
            ExprKind::Assign {
                target: inner,
                op: AssignOp::Assign,
                value: default,
            } => {
                let value = if value.is_undefined() {
                    self.eval_expr(default, env)?
                } else {
                    value
                };
                self.assign_to(inner, value, env)
            }
            _ => {
                let reference = self.resolve_reference(target, env)?;
                self.write_reference(&reference, value, env)
            }
        }
    }

    fn assign_array_pattern(&mut self, elements: &[ArrayElement], value: Value, env: &EnvRef) -> EvalResult<()> {
        let items = self.iterate(&value)?;
        for (i, element) in elements.iter().enumerate() {
            match element {
                // Holes parse as the `undefined` identifier.
                ArrayElement::Expr(Expr {
                    kind: ExprKind::Ident(name),
                    ..
                }) if name == "undefined" => {}
                ArrayElement::Expr(target) => {
                    let item = items.get(i).cloned().unwrap_or_default();
                    self.assign_to(target, item, env)?;
                }
                ArrayElement::Spread(target) => {
                    let rest = items.get(i..).map(<[Value]>::to_vec).unwrap_or_default();
                    self.assign_to(target, Value::array(rest), env)?;
                }
            }
        }
        Ok(())
    }

    fn assign_object_pattern(&mut self, props: &[ObjectProp], value: Value, env: &EnvRef) -> EvalResult<()> {
        if value.is_nullish() {
            return Err(Exception::type_error(format!(
                "Cannot destructure '{value}' as it is {value}."
            )));
        }
        let mut used = Vec::new();
        for prop in props {
            match prop {
                ObjectProp::KeyValue { key, value: target } => {
                    let key = self.eval_prop_key(key, env)?;
                    let item = self.get_property(&value, &key)?;
                    self.assign_to(target, item, env)?;
                    used.push(key);
                }
                ObjectProp::Shorthand(ident) => {
                    let item = self.get_property(&value, &ident.name)?;
                    self.assign_binding(&ident.name, item, env)?;
                    used.push(ident.name.clone());
                }
                ObjectProp::Spread(target) => {
                    let rest = self.rest_object(&value, &used)?;
                    self.assign_to(target, rest, env)?;
                }
                ObjectProp::Method { .. } => {
                    return Err(Exception::syntax_error("Invalid destructuring assignment target"))
                }
            }
        }
        Ok(())
    }
}
