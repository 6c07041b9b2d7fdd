//! Core evaluator: owns the global scope and built-ins, runs statements,
//! calls functions and builds classes. Expression evaluation lives in
//! `expr.rs`, patterns in `bind.rs`, property access in `property.rs`.

use std::rc::Rc;

use livecode_parser::{parse, ParseOptions};
use livecode_types::ast::*;
use livecode_types::SourceFile;

use crate::bind::BindMode;
use crate::builtins;
use crate::env::{Env, EnvRef, FunctionFrame};
use crate::error::{ErrorKind, EvalResult, Exception, Thrown};
use crate::realm::Realm;
use crate::value::{Class, Closure, Function, FunctionKind, FunctionRef, Object, ObjectRef, Value};

/// Maximum depth of nested calls before a `RangeError`.
pub const MAX_CALL_DEPTH: usize = 64;

/// How a statement completed.
#[derive(Debug)]
pub(crate) enum Flow {
    Normal,
    Return(Value),
    Break,
    Continue,
}

/// Severity of a `console.*` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Log,
    Info,
    Debug,
    Warn,
    Error,
}

/// One line written through `console`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleEntry {
    pub level: ConsoleLevel,
    pub message: String,
}

/// The tree-walking interpreter.
pub struct Evaluator {
    global: EnvRef,
    pub(crate) realm: Realm,
    call_depth: usize,
    /// Captured `console` output.
    pub console: Vec<ConsoleEntry>,
    random_state: u64,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// Create an evaluator with the standard globals installed.
    pub fn new() -> Self {
        let realm = Realm::new();
        let global = Env::global();
        builtins::install(&global, &realm);
        Self {
            global,
            realm,
            call_depth: 0,
            console: Vec::new(),
            random_state: 0x2545_f491_4f6c_dd1d,
        }
    }

    pub fn global(&self) -> &EnvRef {
        &self.global
    }

    /// Bind a name in the global scope, replacing any built-in.
    pub fn define_global(&self, name: &str, value: Value) {
        self.global.declare(name, value, true);
    }

    /// Parse `body` as the body of a function taking `params` and closing
    /// over the global scope. Syntax errors become `SyntaxError` exceptions.
    pub fn compile_function(&mut self, params: &[String], body: &str) -> EvalResult<Value> {
        let source = SourceFile::new("livecode.js", body);
        let parsed = parse(&source, ParseOptions::function_body());
        if let Some(diagnostic) = parsed.errors.first() {
            return Err(Exception::syntax_error(diagnostic.message.clone()).at(diagnostic.span));
        }
        let span = parsed.program.span;
        let def = FunctionDef {
            name: None,
            params: params
                .iter()
                .map(|name| Param {
                    pattern: Pattern::Ident(Ident::new(name.as_str(), span)),
                    default: None,
                    rest: false,
                })
                .collect(),
            body: FunctionBody::Block(Block {
                stmts: parsed.program.body,
                span,
            }),
            is_arrow: false,
            span,
        };
        let global = self.global.clone();
        Ok(self.make_closure(Rc::new(def), &global, None))
    }

    /// Run a function body with no parameters and return what it returns.
    pub fn run(&mut self, body: &str) -> EvalResult<Value> {
        let func = self.compile_function(&[], body)?;
        self.call_function(&func, Value::Undefined, Vec::new())
    }

    /// A plain object inheriting from `Object.prototype`.
    pub fn new_object<K: Into<String>>(&self, entries: impl IntoIterator<Item = (K, Value)>) -> Value {
        let obj = Object::with_proto(Some(self.realm.object_proto.clone()));
        for (key, value) in entries {
            obj.insert(key.into(), value);
        }
        Value::Object(obj)
    }

    /// An error instance of the given class.
    pub fn make_error(&self, kind: ErrorKind, message: &str) -> Value {
        let obj = Object::with_proto(Some(self.realm.error_proto(kind)));
        obj.insert("message", Value::from(message));
        obj.mark_error();
        Value::Object(obj)
    }

    /// The value a `catch` clause binds for an exception.
    pub fn exception_value(&self, exception: Exception) -> Value {
        match exception.thrown {
            Thrown::Value(value) => value,
            Thrown::Error { kind, message } => self.make_error(kind, &message),
        }
    }

    /// Next value of the deterministic `Math.random` sequence (xorshift64*).
    pub(crate) fn next_random(&mut self) -> f64 {
        let mut x = self.random_state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.random_state = x;
        let bits = x.wrapping_mul(0x2545_f491_4f6c_dd1d) >> 11;
        bits as f64 / (1u64 << 53) as f64
    }

    // ══════════════════════════════════════════════════════════════════════
    // Calls
    // ══════════════════════════════════════════════════════════════════════

    fn enter(&mut self) -> EvalResult<()> {
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(Exception::range_error("Maximum call stack size exceeded"));
        }
        self.call_depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    pub(crate) fn make_closure(&self, def: Rc<FunctionDef>, env: &EnvRef, home: Option<Value>) -> Value {
        let name = def.name.as_ref().map(|n| n.name.clone()).unwrap_or_default();
        Value::Function(Function::new(
            name,
            FunctionKind::Closure(Closure {
                def,
                env: env.clone(),
                home,
            }),
        ))
    }

    /// Call `func` with a receiver and arguments.
    pub fn call_function(&mut self, func: &Value, this: Value, args: Vec<Value>) -> EvalResult<Value> {
        let Value::Function(f) = func else {
            return Err(Exception::type_error(format!("{} is not a function", func.type_of())));
        };
        let f = f.clone();
        self.enter()?;
        let result = self.call_inner(&f, this, args);
        self.leave();
        result
    }

    fn call_inner(&mut self, f: &FunctionRef, this: Value, args: Vec<Value>) -> EvalResult<Value> {
        match &f.kind {
            FunctionKind::Closure(closure) => self.call_closure(closure, this, args),
            FunctionKind::Native { func, .. } => {
                let func = func.clone();
                func(self, &this, &args)
            }
            FunctionKind::Class(_) => Err(Exception::type_error(format!(
                "Class constructor {} cannot be invoked without 'new'",
                f.name()
            ))),
            FunctionKind::Bound {
                target,
                this: bound_this,
                args: bound_args,
            } => {
                let mut all = bound_args.clone();
                all.extend(args);
                self.call_function(target, bound_this.clone(), all)
            }
        }
    }

    fn call_closure(&mut self, closure: &Closure, this: Value, args: Vec<Value>) -> EvalResult<Value> {
        let def = closure.def.clone();
        let env = if def.is_arrow {
            Env::arrow(&closure.env)
        } else {
            Env::function(
                &closure.env,
                FunctionFrame {
                    this,
                    home: closure.home.clone(),
                    constructing: None,
                },
            )
        };
        self.bind_params(&def, args, &env)?;
        self.run_body(&def, &env)
    }

    fn bind_params(&mut self, def: &FunctionDef, args: Vec<Value>, env: &EnvRef) -> EvalResult<()> {
        for (i, param) in def.params.iter().enumerate() {
            let value = if param.rest {
                Value::array(args.get(i..).map(<[Value]>::to_vec).unwrap_or_default())
            } else {
                args.get(i).cloned().unwrap_or_default()
            };
            let value = match &param.default {
                Some(default) if value.is_undefined() => {
                    self.eval_named(default, pattern_name(&param.pattern), env)?
                }
                _ => value,
            };
            self.bind_pattern(&param.pattern, value, env, BindMode::Lexical { mutable: true })?;
        }
        Ok(())
    }

    fn run_body(&mut self, def: &FunctionDef, env: &EnvRef) -> EvalResult<Value> {
        match &def.body {
            FunctionBody::Expr(expr) => self.eval_expr(expr, env),
            FunctionBody::Block(block) => {
                hoist_vars(&block.stmts, env);
                match self.exec_block(&block.stmts, env)? {
                    Flow::Return(value) => Ok(value),
                    _ => Ok(Value::Undefined),
                }
            }
        }
    }

    /// `new callee(...args)`.
    pub fn construct(&mut self, callee: &Value, args: Vec<Value>) -> EvalResult<Value> {
        let Value::Function(f) = callee else {
            return Err(Exception::type_error(format!("{} is not a constructor", callee.type_of())));
        };
        if !f.is_constructor() {
            let name = f.name();
            let name = if name.is_empty() { "anonymous".into() } else { name };
            return Err(Exception::type_error(format!("{name} is not a constructor")));
        }
        let f = f.clone();
        self.enter()?;
        let result = self.construct_inner(&f, args);
        self.leave();
        result
    }

    fn construct_inner(&mut self, f: &FunctionRef, args: Vec<Value>) -> EvalResult<Value> {
        match &f.kind {
            FunctionKind::Class(class) => {
                let this = Value::Object(Object::with_proto(Some(class.prototype.clone())));
                self.run_class_constructor(class, &this, args)
            }
            FunctionKind::Closure(closure) => {
                let proto = self.function_prototype(f);
                let this = Value::Object(Object::with_proto(Some(proto)));
                let result = self.call_closure(closure, this.clone(), args)?;
                Ok(if result.is_reference() { result } else { this })
            }
            FunctionKind::Native { func, .. } => {
                let proto = f.prototype().unwrap_or_else(|| self.realm.object_proto.clone());
                let this = Value::Object(Object::with_proto(Some(proto)));
                let func = func.clone();
                let result = func(self, &this, &args)?;
                Ok(if result.is_reference() { result } else { this })
            }
            FunctionKind::Bound {
                target,
                args: bound_args,
                ..
            } => {
                let mut all = bound_args.clone();
                all.extend(args);
                self.construct(target, all)
            }
        }
    }

    /// The `prototype` object of a constructor function, created on first use.
    pub(crate) fn function_prototype(&self, f: &FunctionRef) -> ObjectRef {
        if let Some(proto) = f.prototype() {
            return proto;
        }
        let proto = Object::with_proto(Some(self.realm.object_proto.clone()));
        proto.insert("constructor", Value::Function(f.clone()));
        f.set("prototype", Value::Object(proto.clone()));
        proto
    }

    // ══════════════════════════════════════════════════════════════════════
    // Classes
    // ══════════════════════════════════════════════════════════════════════

    pub(crate) fn eval_class(&mut self, def: &Rc<ClassDef>, env: &EnvRef) -> EvalResult<Value> {
        let parent = match &def.superclass {
            Some(expr) => {
                let value = self.eval_expr(expr, env)?;
                match &value {
                    Value::Null => None,
                    Value::Function(f) if f.is_constructor() => Some(value),
                    other => {
                        return Err(Exception::type_error(format!(
                            "Class extends value {other} is not a constructor or null"
                        ))
                        .at(expr.span))
                    }
                }
            }
            None => None,
        };
        let proto_parent = match &parent {
            Some(Value::Function(pf)) => Some(self.function_prototype(pf)),
            Some(_) => None,
            None if def.superclass.is_some() => None,
            None => Some(self.realm.object_proto.clone()),
        };

        let class_env = Env::block(env);
        let name = def.name.as_ref().map(|n| n.name.clone()).unwrap_or_default();
        if !name.is_empty() {
            class_env.declare_uninitialized(&name, false);
        }
        let prototype = Object::with_proto(proto_parent);
        let class = Rc::new(Class {
            def: def.clone(),
            env: class_env.clone(),
            parent,
            prototype: prototype.clone(),
        });
        let class_fn = Function::new(name.clone(), FunctionKind::Class(class));
        let class_value = Value::Function(class_fn.clone());
        prototype.insert("constructor", class_value.clone());
        class_fn.set("prototype", Value::Object(prototype.clone()));

        for member in &def.members {
            if let ClassMember::Method { key, func, is_static } = member {
                let key = self.eval_prop_key(key, &class_env)?;
                let home = if *is_static {
                    class_value.clone()
                } else {
                    Value::Object(prototype.clone())
                };
                let method = self.make_closure(func.clone(), &class_env, Some(home));
                if let Value::Function(m) = &method {
                    m.infer_name(&key);
                }
                if *is_static {
                    class_fn.set(key, method);
                } else {
                    prototype.insert(key, method);
                }
            }
        }
        if !name.is_empty() {
            class_env.initialize(&name, class_value.clone());
        }

        let static_env = Env::function(
            &class_env,
            FunctionFrame {
                this: class_value.clone(),
                home: Some(class_value.clone()),
                constructing: None,
            },
        );
        for member in &def.members {
            if let ClassMember::Field {
                key,
                value,
                is_static: true,
            } = member
            {
                let key = self.eval_prop_key(key, &static_env)?;
                let value = match value {
                    Some(expr) => self.eval_named(expr, Some(&key), &static_env)?,
                    None => Value::Undefined,
                };
                class_fn.set(key, value);
            }
        }
        Ok(class_value)
    }

    fn run_class_constructor(&mut self, class: &Rc<Class>, this: &Value, args: Vec<Value>) -> EvalResult<Value> {
        let Some(ctor) = class.def.constructor() else {
            if let Some(parent) = &class.parent {
                self.construct_parent(parent, this, args)?;
            }
            self.init_fields(class, this)?;
            return Ok(this.clone());
        };
        if class.parent.is_none() {
            self.init_fields(class, this)?;
        }
        let env = Env::function(
            &class.env,
            FunctionFrame {
                this: this.clone(),
                home: Some(Value::Object(class.prototype.clone())),
                constructing: Some(class.clone()),
            },
        );
        let ctor = ctor.clone();
        self.bind_params(&ctor, args, &env)?;
        let result = self.run_body(&ctor, &env)?;
        Ok(if result.is_reference() { result } else { this.clone() })
    }

    /// `super(...args)` inside a derived constructor.
    pub(crate) fn super_call(&mut self, env: &EnvRef, args: Vec<Value>) -> EvalResult<Value> {
        let frame = env.frame();
        let (class, this) = match frame.and_then(|f| f.constructing.clone().map(|c| (c, f.this.clone()))) {
            Some(found) => found,
            None => return Err(Exception::syntax_error("'super' keyword unexpected here")),
        };
        let Some(parent) = class.parent.clone() else {
            return Err(Exception::syntax_error("'super' keyword unexpected here"));
        };
        self.enter()?;
        let result = self.construct_parent(&parent, &this, args);
        self.leave();
        result?;
        self.init_fields(&class, &this)?;
        Ok(Value::Undefined)
    }

    fn construct_parent(&mut self, parent: &Value, this: &Value, args: Vec<Value>) -> EvalResult<()> {
        let Value::Function(pf) = parent else {
            return Ok(());
        };
        match &pf.kind {
            FunctionKind::Class(parent_class) => {
                self.run_class_constructor(parent_class, this, args)?;
            }
            FunctionKind::Closure(closure) => {
                self.call_closure(closure, this.clone(), args)?;
            }
            FunctionKind::Native { func, .. } => {
                let func = func.clone();
                func(self, this, &args)?;
            }
            FunctionKind::Bound { .. } => {
                self.call_function(parent, this.clone(), args)?;
            }
        }
        Ok(())
    }

    fn init_fields(&mut self, class: &Rc<Class>, this: &Value) -> EvalResult<()> {
        let env = Env::function(
            &class.env,
            FunctionFrame {
                this: this.clone(),
                home: Some(Value::Object(class.prototype.clone())),
                constructing: None,
            },
        );
        for member in &class.def.members {
            if let ClassMember::Field {
                key,
                value,
                is_static: false,
            } = member
            {
                let key = self.eval_prop_key(key, &env)?;
                let value = match value {
                    Some(expr) => self.eval_named(expr, Some(&key), &env)?,
                    None => Value::Undefined,
                };
                self.set_property(this, &key, value)?;
            }
        }
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    /// Run statements in `env`, after hoisting their declarations.
    pub(crate) fn exec_block(&mut self, stmts: &[Stmt], env: &EnvRef) -> EvalResult<Flow> {
        self.hoist_declarations(stmts, env);
        for stmt in stmts {
            match self.exec_stmt(stmt, env)? {
                Flow::Normal => {}
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Flow::Normal)
    }

    /// Function declarations are usable before their statement; `let`,
    /// `const` and `class` bindings exist but may not be read yet.
    fn hoist_declarations(&mut self, stmts: &[Stmt], env: &EnvRef) {
        for stmt in stmts {
            match stmt {
                Stmt::Function(def) => {
                    if let Some(name) = &def.name {
                        let closure = self.make_closure(def.clone(), env, None);
                        env.declare(&name.name, closure, true);
                    }
                }
                Stmt::Var(decl) if decl.kind != VarKind::Var => {
                    for declarator in &decl.declarations {
                        for name in declarator.pattern.bound_names() {
                            env.declare_uninitialized(name, decl.kind == VarKind::Let);
                        }
                    }
                }
                Stmt::Class(def) => {
                    if let Some(name) = &def.name {
                        env.declare_uninitialized(&name.name, true);
                    }
                }
                _ => {}
            }
        }
    }

    pub(crate) fn exec_stmt(&mut self, stmt: &Stmt, env: &EnvRef) -> EvalResult<Flow> {
        match stmt {
            Stmt::Empty(_) | Stmt::Function(_) => Ok(Flow::Normal),
            Stmt::Var(decl) => {
                self.exec_var_decl(decl, env)?;
                Ok(Flow::Normal)
            }
            Stmt::Class(def) => {
                let class = self.eval_class(def, env)?;
                if let Some(name) = &def.name {
                    env.initialize(&name.name, class);
                }
                Ok(Flow::Normal)
            }
            Stmt::Expr(stmt) => {
                self.eval_expr(&stmt.expr, env)?;
                Ok(Flow::Normal)
            }
            Stmt::Return(ret) => {
                let value = match &ret.argument {
                    Some(argument) => self.eval_expr(argument, env)?,
                    None => Value::Undefined,
                };
                Ok(Flow::Return(value))
            }
            Stmt::If(stmt) => {
                if self.eval_expr(&stmt.test, env)?.is_truthy() {
                    self.exec_stmt(&stmt.consequent, env)
                } else if let Some(alternate) = &stmt.alternate {
                    self.exec_stmt(alternate, env)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::Block(block) => {
                let inner = Env::block(env);
                self.exec_block(&block.stmts, &inner)
            }
            Stmt::For(stmt) => self.exec_for(stmt, env),
            Stmt::ForEach(stmt) => self.exec_for_each(stmt, env),
            Stmt::While(stmt) => {
                while self.eval_expr(&stmt.test, env)?.is_truthy() {
                    match self.exec_stmt(&stmt.body, env)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::DoWhile(stmt) => {
                loop {
                    match self.exec_stmt(&stmt.body, env)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                    if !self.eval_expr(&stmt.test, env)?.is_truthy() {
                        break;
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Switch(stmt) => self.exec_switch(stmt, env),
            Stmt::Break(_) => Ok(Flow::Break),
            Stmt::Continue(_) => Ok(Flow::Continue),
            Stmt::Throw(stmt) => {
                let value = self.eval_expr(&stmt.argument, env)?;
                Err(Exception::throw(value).at(stmt.span))
            }
            Stmt::Try(stmt) => self.exec_try(stmt, env),
            Stmt::Import(decl) => Err(Exception::syntax_error(
                "Cannot use import statement outside a module",
            )
            .at(decl.span)),
            Stmt::Export(decl) => {
                Err(Exception::syntax_error("Unexpected token 'export'").at(decl.span))
            }
        }
    }

    fn exec_var_decl(&mut self, decl: &VarDecl, env: &EnvRef) -> EvalResult<()> {
        let mode = BindMode::for_kind(decl.kind);
        for declarator in &decl.declarations {
            let value = match &declarator.init {
                Some(init) => self.eval_named(init, pattern_name(&declarator.pattern), env)?,
                // `var x;` keeps any hoisted value.
                None if decl.kind == VarKind::Var => continue,
                None => Value::Undefined,
            };
            self.bind_pattern(&declarator.pattern, value, env, mode)?;
        }
        Ok(())
    }

    fn exec_for(&mut self, stmt: &ForStmt, env: &EnvRef) -> EvalResult<Flow> {
        let loop_env = Env::block(env);
        // Names copied into a fresh scope per iteration, so closures capture
        // each iteration's value.
        let mut per_iteration: Vec<String> = Vec::new();
        match &stmt.init {
            Some(ForInit::Var(decl)) => {
                if decl.kind != VarKind::Var {
                    per_iteration = decl
                        .declarations
                        .iter()
                        .flat_map(|d| d.pattern.bound_names())
                        .map(str::to_string)
                        .collect();
                }
                self.exec_var_decl(decl, &loop_env)?;
            }
            Some(ForInit::Expr(expr)) => {
                self.eval_expr(expr, &loop_env)?;
            }
            None => {}
        }

        let mut iter_env = copy_bindings(&loop_env, env, &per_iteration);
        loop {
            if let Some(test) = &stmt.test {
                if !self.eval_expr(test, &iter_env)?.is_truthy() {
                    break;
                }
            }
            match self.exec_stmt(&stmt.body, &iter_env)? {
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal | Flow::Continue => {}
            }
            iter_env = copy_bindings(&iter_env, env, &per_iteration);
            if let Some(update) = &stmt.update {
                self.eval_expr(update, &iter_env)?;
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_for_each(&mut self, stmt: &ForEachStmt, env: &EnvRef) -> EvalResult<Flow> {
        let iterable = self.eval_expr(&stmt.iterable, env)?;
        let items = match stmt.kind {
            ForEachKind::Of => self.iterate(&iterable).map_err(|e| e.at(stmt.iterable.span))?,
            ForEachKind::In => self
                .enumerable_keys(&iterable)
                .into_iter()
                .map(Value::from)
                .collect(),
        };
        for item in items {
            let iter_env = Env::block(env);
            match &stmt.target {
                ForEachTarget::Decl(kind, pattern) => {
                    self.bind_pattern(pattern, item, &iter_env, BindMode::for_kind(*kind))?;
                }
                ForEachTarget::Ident(ident) => {
                    self.assign_binding(&ident.name, item, &iter_env)
                        .map_err(|e| e.at(ident.span))?;
                }
            }
            match self.exec_stmt(&stmt.body, &iter_env)? {
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal | Flow::Continue => {}
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_switch(&mut self, stmt: &SwitchStmt, env: &EnvRef) -> EvalResult<Flow> {
        let discriminant = self.eval_expr(&stmt.discriminant, env)?;
        let switch_env = Env::block(env);
        for case in &stmt.cases {
            self.hoist_declarations(&case.body, &switch_env);
        }

        let mut start = None;
        for (i, case) in stmt.cases.iter().enumerate() {
            if let Some(test) = &case.test {
                let value = self.eval_expr(test, &switch_env)?;
                if value.strict_equals(&discriminant) {
                    start = Some(i);
                    break;
                }
            }
        }
        let start = start.or_else(|| stmt.cases.iter().position(|c| c.test.is_none()));
        let Some(start) = start else {
            return Ok(Flow::Normal);
        };

        for case in &stmt.cases[start..] {
            for body_stmt in &case.body {
                match self.exec_stmt(body_stmt, &switch_env)? {
                    Flow::Normal => {}
                    Flow::Break => return Ok(Flow::Normal),
                    abrupt => return Ok(abrupt),
                }
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_try(&mut self, stmt: &TryStmt, env: &EnvRef) -> EvalResult<Flow> {
        let block_env = Env::block(env);
        let result = match (self.exec_block(&stmt.block.stmts, &block_env), &stmt.handler) {
            (Err(exception), Some(handler)) => {
                let catch_env = Env::block(env);
                let value = self.exception_value(exception);
                match &handler.param {
                    Some(param) => self
                        .bind_pattern(param, value, &catch_env, BindMode::Lexical { mutable: true })
                        .and_then(|()| self.exec_block(&handler.body.stmts, &catch_env)),
                    None => self.exec_block(&handler.body.stmts, &catch_env),
                }
            }
            (result, _) => result,
        };

        if let Some(finalizer) = &stmt.finalizer {
            let finally_env = Env::block(env);
            match self.exec_block(&finalizer.stmts, &finally_env)? {
                Flow::Normal => {}
                abrupt => return Ok(abrupt),
            }
        }
        result
    }
}

/// The binding name used to name anonymous functions assigned to a pattern.
pub(crate) fn pattern_name(pattern: &Pattern) -> Option<&str> {
    match pattern {
        Pattern::Ident(ident) => Some(&ident.name),
        _ => None,
    }
}

/// Hoist `var` declarations of a function body, without entering nested
/// functions.
fn hoist_vars(stmts: &[Stmt], env: &EnvRef) {
    for stmt in stmts {
        hoist_vars_in(stmt, env);
    }
}

fn hoist_vars_in(stmt: &Stmt, env: &EnvRef) {
    match stmt {
        Stmt::Var(decl) => hoist_var_decl(decl, env),
        Stmt::If(stmt) => {
            hoist_vars_in(&stmt.consequent, env);
            if let Some(alternate) = &stmt.alternate {
                hoist_vars_in(alternate, env);
            }
        }
        Stmt::For(stmt) => {
            if let Some(ForInit::Var(decl)) = &stmt.init {
                hoist_var_decl(decl, env);
            }
            hoist_vars_in(&stmt.body, env);
        }
        Stmt::ForEach(stmt) => {
            if let ForEachTarget::Decl(VarKind::Var, pattern) = &stmt.target {
                for name in pattern.bound_names() {
                    env.declare_var(name);
                }
            }
            hoist_vars_in(&stmt.body, env);
        }
        Stmt::While(stmt) | Stmt::DoWhile(stmt) => hoist_vars_in(&stmt.body, env),
        Stmt::Block(block) => hoist_vars(&block.stmts, env),
        Stmt::Switch(stmt) => {
            for case in &stmt.cases {
                hoist_vars(&case.body, env);
            }
        }
        Stmt::Try(stmt) => {
            hoist_vars(&stmt.block.stmts, env);
            if let Some(handler) = &stmt.handler {
                hoist_vars(&handler.body.stmts, env);
            }
            if let Some(finalizer) = &stmt.finalizer {
                hoist_vars(&finalizer.stmts, env);
            }
        }
        _ => {}
    }
}

fn hoist_var_decl(decl: &VarDecl, env: &EnvRef) {
    if decl.kind != VarKind::Var {
        return;
    }
    for declarator in &decl.declarations {
        for name in declarator.pattern.bound_names() {
            env.declare_var(name);
        }
    }
}

/// A fresh block scope under `parent` holding copies of `names` from `from`.
fn copy_bindings(from: &EnvRef, parent: &EnvRef, names: &[String]) -> EnvRef {
    if names.is_empty() {
        return from.clone();
    }
    let env = Env::block(parent);
    for name in names {
        let value = from.lookup(name).unwrap_or_default();
        env.declare(name, value, true);
    }
    env
}
