//! Expression evaluation.

use std::rc::Rc;

use livecode_types::ast::*;

use crate::env::{BindingError, Env, EnvRef};
use crate::error::{EvalResult, Exception};
use crate::evaluator::Evaluator;
use crate::ops::arithmetic;
use crate::value::{number_to_string, Object, Value};

impl Evaluator {
    /// Evaluate an expression. Exceptions get the innermost span that has
    /// one.
    pub(crate) fn eval_expr(&mut self, expr: &Expr, env: &EnvRef) -> EvalResult<Value> {
        self.eval_expr_kind(expr, env).map_err(|e| e.at(expr.span))
    }

    fn eval_expr_kind(&mut self, expr: &Expr, env: &EnvRef) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::Number(n) => Ok(Value::Number(*n)),
            ExprKind::String(s) => Ok(Value::from(s.as_str())),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Template(parts) => self.eval_template(parts, env),
            ExprKind::This => Ok(env.this()),
            ExprKind::Super => Err(Exception::syntax_error("'super' keyword unexpected here")),

            ExprKind::Ident(name) => self.lookup(name, env),
            ExprKind::Array(elements) => self.eval_list(elements, env).map(Value::array),
            ExprKind::Object(props) => self.eval_object_literal(props, env),
            ExprKind::Function(def) => Ok(self.eval_function_expr(def, env)),
            ExprKind::Arrow(def) => Ok(self.make_closure(def.clone(), env, None)),
            ExprKind::Class(def) => self.eval_class(def, env),

            ExprKind::Unary { op, operand } => self.eval_unary(*op, operand, env),
            ExprKind::Update { op, prefix, target } => self.eval_update(*op, *prefix, target, env),
            ExprKind::Binary { left, op, right } => {
                let l = self.eval_expr(left, env)?;
                let r = self.eval_expr(right, env)?;
                self.binary_op(*op, l, r)
            }
            ExprKind::Logical { left, op, right } => {
                let l = self.eval_expr(left, env)?;
                let short_circuit = match op {
                    LogicalOp::And => !l.is_truthy(),
                    LogicalOp::Or => l.is_truthy(),
                    LogicalOp::Nullish => !l.is_nullish(),
                };
                if short_circuit {
                    Ok(l)
                } else {
                    self.eval_expr(right, env)
                }
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.eval_expr(test, env)?.is_truthy() {
                    self.eval_expr(consequent, env)
                } else {
                    self.eval_expr(alternate, env)
                }
            }
            ExprKind::Assign { target, op, value } => self.eval_assign(target, *op, value, env),
            ExprKind::Sequence(exprs) => {
                let mut last = Value::Undefined;
                for e in exprs {
                    last = self.eval_expr(e, env)?;
                }
                Ok(last)
            }

            ExprKind::Member { .. } | ExprKind::Call { .. } => {
                Ok(self.eval_chain(expr, env)?.unwrap_or_default())
            }
            ExprKind::New { callee, args } => {
                let constructor = self.eval_expr(callee, env)?;
                let args = self.eval_list(args, env)?;
                if !constructor.as_function().is_some_and(|f| f.is_constructor()) {
                    return Err(Exception::type_error(format!(
                        "{} is not a constructor",
                        callee_text(callee)
                    )));
                }
                self.construct(&constructor, args)
            }
            ExprKind::Paren(inner) => self.eval_expr(inner, env),
            ExprKind::Jsx(_) => Err(Exception::syntax_error(
                "JSX must be transpiled before evaluation",
            )),
        }
    }

    // ── Names & literals ─────────────────────────────────────────────────

    pub(crate) fn lookup(&self, name: &str, env: &EnvRef) -> EvalResult<Value> {
        env.lookup(name).map_err(|e| match e {
            BindingError::Uninitialized => Exception::reference_error(format!(
                "Cannot access '{name}' before initialization"
            )),
            _ => Exception::reference_error(format!("{name} is not defined")),
        })
    }

    /// Evaluate `expr`, naming it after `name` when it is an anonymous
    /// function or class.
    pub(crate) fn eval_named(&mut self, expr: &Expr, name: Option<&str>, env: &EnvRef) -> EvalResult<Value> {
        let value = self.eval_expr(expr, env)?;
        if let (Some(name), Value::Function(f)) = (name, &value) {
            if matches!(
                expr.kind,
                ExprKind::Function(_) | ExprKind::Arrow(_) | ExprKind::Class(_)
            ) {
                f.infer_name(name);
            }
        }
        Ok(value)
    }

    fn eval_template(&mut self, parts: &[TemplatePart], env: &EnvRef) -> EvalResult<Value> {
        let mut out = String::new();
        for part in parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Expr(expr) => {
                    let value = self.eval_expr(expr, env)?;
                    out.push_str(&self.to_js_string(&value)?);
                }
            }
        }
        Ok(Value::from(out))
    }

    /// Array elements or call arguments, expanding spreads.
    pub(crate) fn eval_list(&mut self, elements: &[ArrayElement], env: &EnvRef) -> EvalResult<Vec<Value>> {
        let mut out = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                ArrayElement::Expr(expr) => out.push(self.eval_expr(expr, env)?),
                ArrayElement::Spread(expr) => {
                    let value = self.eval_expr(expr, env)?;
                    let items = self.iterate(&value).map_err(|e| e.at(expr.span))?;
                    out.extend(items);
                }
            }
        }
        Ok(out)
    }

    pub(crate) fn eval_prop_key(&mut self, key: &PropKey, env: &EnvRef) -> EvalResult<String> {
        match key {
            PropKey::Ident(name) | PropKey::String(name) => Ok(name.clone()),
            PropKey::Number(n) => Ok(number_to_string(*n)),
            PropKey::Computed(expr) => {
                let value = self.eval_expr(expr, env)?;
                self.to_property_key(&value)
            }
        }
    }

    pub(crate) fn member_key(&mut self, property: &MemberProp, env: &EnvRef) -> EvalResult<String> {
        match property {
            MemberProp::Named(ident) => Ok(ident.name.clone()),
            MemberProp::Computed(expr) => {
                let value = self.eval_expr(expr, env)?;
                self.to_property_key(&value)
            }
        }
    }

    fn eval_object_literal(&mut self, props: &[ObjectProp], env: &EnvRef) -> EvalResult<Value> {
        let obj = Object::with_proto(Some(self.realm.object_proto.clone()));
        let home = Value::Object(obj.clone());
        for prop in props {
            match prop {
                ObjectProp::KeyValue { key, value } => {
                    let key = self.eval_prop_key(key, env)?;
                    let value = self.eval_named(value, Some(&key), env)?;
                    obj.insert(key, value);
                }
                ObjectProp::Shorthand(ident) => {
                    let value = self.lookup(&ident.name, env).map_err(|e| e.at(ident.span))?;
                    obj.insert(ident.name.clone(), value);
                }
                ObjectProp::Method { key, func } => {
                    let key = self.eval_prop_key(key, env)?;
                    let method = self.make_closure(func.clone(), env, Some(home.clone()));
                    if let Value::Function(f) = &method {
                        f.infer_name(&key);
                    }
                    obj.insert(key, method);
                }
                ObjectProp::Spread(expr) => {
                    let value = self.eval_expr(expr, env)?;
                    if value.is_nullish() {
                        continue;
                    }
                    for (key, item) in self.own_entries(&value)? {
                        obj.insert(key, item);
                    }
                }
            }
        }
        Ok(Value::Object(obj))
    }

    /// A named function expression can refer to itself by name.
    fn eval_function_expr(&mut self, def: &Rc<FunctionDef>, env: &EnvRef) -> Value {
        match &def.name {
            Some(name) => {
                let scope = Env::block(env);
                let closure = self.make_closure(def.clone(), &scope, None);
                scope.declare(&name.name, closure.clone(), false);
                closure
            }
            None => self.make_closure(def.clone(), env, None),
        }
    }

    // ── Operators ────────────────────────────────────────────────────────

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr, env: &EnvRef) -> EvalResult<Value> {
        match op {
            UnaryOp::TypeOf => {
                if let ExprKind::Ident(name) = &operand.kind {
                    return match env.lookup(name) {
                        Ok(value) => Ok(Value::from(value.type_of())),
                        Err(BindingError::NotDefined) => Ok(Value::from("undefined")),
                        Err(_) => self.lookup(name, env),
                    };
                }
                let value = self.eval_expr(operand, env)?;
                Ok(Value::from(value.type_of()))
            }
            UnaryOp::Delete => match &operand.kind {
                ExprKind::Member {
                    object, property, ..
                } => {
                    let base = self.eval_expr(object, env)?;
                    let key = self.member_key(property, env)?;
                    self.delete_property(&base, &key).map(Value::Bool)
                }
                _ => {
                    self.eval_expr(operand, env)?;
                    Ok(Value::Bool(true))
                }
            },
            UnaryOp::Not => Ok(Value::Bool(!self.eval_expr(operand, env)?.is_truthy())),
            UnaryOp::Neg => {
                let value = self.eval_expr(operand, env)?;
                Ok(Value::Number(-self.to_number(&value)?))
            }
            UnaryOp::Plus => {
                let value = self.eval_expr(operand, env)?;
                Ok(Value::Number(self.to_number(&value)?))
            }
            UnaryOp::Void => {
                self.eval_expr(operand, env)?;
                Ok(Value::Undefined)
            }
        }
    }

    fn eval_update(&mut self, op: UpdateOp, prefix: bool, target: &Expr, env: &EnvRef) -> EvalResult<Value> {
        let reference = self.resolve_reference(target, env)?;
        let current = self.read_reference(&reference, env)?;
        let old = self.to_number(&current)?;
        let new = match op {
            UpdateOp::Inc => old + 1.0,
            UpdateOp::Dec => old - 1.0,
        };
        self.write_reference(&reference, Value::Number(new), env)?;
        Ok(Value::Number(if prefix { new } else { old }))
    }

    fn eval_assign(&mut self, target: &Expr, op: AssignOp, value: &Expr, env: &EnvRef) -> EvalResult<Value> {
        if op == AssignOp::Assign {
            let name = match &target.kind {
                ExprKind::Ident(name) => Some(name.as_str()),
                _ => None,
            };
            if matches!(target.kind, ExprKind::Array(_) | ExprKind::Object(_)) {
                let v = self.eval_expr(value, env)?;
                self.assign_to(target, v.clone(), env)?;
                return Ok(v);
            }
            let reference = self.resolve_reference(target, env)?;
            let v = self.eval_named(value, name, env)?;
            self.write_reference(&reference, v.clone(), env)?;
            return Ok(v);
        }

        let reference = self.resolve_reference(target, env)?;
        let current = self.read_reference(&reference, env)?;
        let result = match op {
            AssignOp::And | AssignOp::Or | AssignOp::Nullish => {
                let keep = match op {
                    AssignOp::And => !current.is_truthy(),
                    AssignOp::Or => current.is_truthy(),
                    _ => !current.is_nullish(),
                };
                if keep {
                    return Ok(current);
                }
                self.eval_expr(value, env)?
            }
            _ => {
                let rhs = self.eval_expr(value, env)?;
                match op.binary() {
                    Some(BinOp::Add) => self.binary_op(BinOp::Add, current, rhs)?,
                    Some(bin) => {
                        let l = self.to_number(&current)?;
                        let r = self.to_number(&rhs)?;
                        Value::Number(arithmetic(bin, l, r))
                    }
                    None => rhs,
                }
            }
        };
        self.write_reference(&reference, result.clone(), env)?;
        Ok(result)
    }

    // ── Member access & calls ────────────────────────────────────────────

    /// Evaluate a member or call expression. `None` means an optional link
    /// (`?.`) met `null`/`undefined` and the rest of the chain was skipped.
    fn eval_chain(&mut self, expr: &Expr, env: &EnvRef) -> EvalResult<Option<Value>> {
        match &expr.kind {
            ExprKind::Member {
                object,
                property,
                optional,
            } => {
                if matches!(object.kind, ExprKind::Super) {
                    let key = self.member_key(property, env)?;
                    return self.super_property(&key, env).map(Some);
                }
                let Some(base) = self.eval_chain_link(object, env)? else {
                    return Ok(None);
                };
                if *optional && base.is_nullish() {
                    return Ok(None);
                }
                let key = self.member_key(property, env)?;
                self.get_property(&base, &key).map(Some)
            }
            ExprKind::Call {
                callee,
                args,
                optional,
            } => {
                if matches!(callee.kind, ExprKind::Super) {
                    let args = self.eval_list(args, env)?;
                    return self.super_call(env, args).map(Some);
                }
                let Some((func, this)) = self.eval_callee(callee, env)? else {
                    return Ok(None);
                };
                if *optional && func.is_nullish() {
                    return Ok(None);
                }
                let args = self.eval_list(args, env)?;
                if !func.is_callable() {
                    return Err(Exception::type_error(format!(
                        "{} is not a function",
                        callee_text(callee)
                    )));
                }
                self.call_function(&func, this, args).map(Some)
            }
            _ => self.eval_expr(expr, env).map(Some),
        }
    }

    /// The object of a member or callee of a call, continuing a chain.
    fn eval_chain_link(&mut self, expr: &Expr, env: &EnvRef) -> EvalResult<Option<Value>> {
        match &expr.kind {
            ExprKind::Member { .. } | ExprKind::Call { .. } => {
                self.eval_chain(expr, env).map_err(|e| e.at(expr.span))
            }
            _ => self.eval_expr(expr, env).map(Some),
        }
    }

    /// The function to call and its receiver.
    fn eval_callee(&mut self, callee: &Expr, env: &EnvRef) -> EvalResult<Option<(Value, Value)>> {
        let ExprKind::Member {
            object,
            property,
            optional,
        } = &callee.kind
        else {
            let func = self.eval_chain_link(callee, env)?;
            return Ok(func.map(|f| (f, Value::Undefined)));
        };
        if matches!(object.kind, ExprKind::Super) {
            let key = self.member_key(property, env)?;
            let func = self.super_property(&key, env)?;
            return Ok(Some((func, env.this())));
        }
        let Some(base) = self.eval_chain_link(object, env)? else {
            return Ok(None);
        };
        if *optional && base.is_nullish() {
            return Ok(None);
        }
        let key = self.member_key(property, env)?;
        let func = self.get_property(&base, &key).map_err(|e| e.at(callee.span))?;
        Ok(Some((func, base)))
    }

    /// `super.key`: look past the home object.
    fn super_property(&mut self, key: &str, env: &EnvRef) -> EvalResult<Value> {
        let home = env.frame().and_then(|frame| frame.home.clone());
        match home {
            Some(Value::Object(home)) => Ok(home
                .proto()
                .and_then(|proto| proto.get(key))
                .or_else(|| self.realm.object_proto.get(key))
                .unwrap_or_default()),
            Some(Value::Function(class_fn)) => {
                let parent = match &class_fn.kind {
                    crate::value::FunctionKind::Class(class) => class.parent.clone(),
                    _ => None,
                };
                match parent {
                    Some(parent) => self.get_property(&parent, key),
                    None => Ok(self.realm.function_proto.get(key).unwrap_or_default()),
                }
            }
            _ => Err(Exception::syntax_error("'super' keyword unexpected here")),
        }
    }
}

/// Source-like text of a callee for error messages: `props.onClick`.
pub(crate) fn callee_text(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Ident(name) => name.clone(),
        ExprKind::This => "this".into(),
        ExprKind::Super => "super".into(),
        ExprKind::Member {
            object, property, ..
        } => match property {
            MemberProp::Named(ident) => format!("{}.{}", callee_text(object), ident.name),
            MemberProp::Computed(_) => format!("{}[...]", callee_text(object)),
        },
        ExprKind::Call { callee, .. } => format!("{}(...)", callee_text(callee)),
        ExprKind::Paren(inner) => callee_text(inner),
        ExprKind::String(s) => format!("\"{s}\""),
        ExprKind::Number(n) => number_to_string(*n),
        _ => "expression".into(),
    }
}
