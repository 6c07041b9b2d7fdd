//! Lexical environments for the livecode interpreter.
//!
//! Each block, function call and class body gets its own [`Env`], linked to
//! the enclosing one. Closures keep their defining environment alive through
//! an `Rc`, so bindings outlive the call that created them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::{Class, Value};

pub type EnvRef = Rc<Env>;

#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    mutable: bool,
    /// `false` between hoisting and the `let`/`const`/`class` declaration.
    initialized: bool,
}

/// Why a lookup or assignment failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingError {
    NotDefined,
    Uninitialized,
    Constant,
}

/// Per-call state of a non-arrow function.
pub struct FunctionFrame {
    pub this: Value,
    /// Object `super.x` resolves against.
    pub home: Option<Value>,
    /// Set while running a class constructor.
    pub constructing: Option<Rc<Class>>,
}

enum ScopeKind {
    Block,
    /// Arrow functions own a var scope but inherit `this` from their parent.
    Arrow,
    Function(FunctionFrame),
}

/// One scope level.
pub struct Env {
    vars: RefCell<HashMap<String, Binding>>,
    parent: Option<EnvRef>,
    kind: ScopeKind,
}

impl Env {
    /// The outermost scope.
    pub fn global() -> EnvRef {
        Rc::new(Self {
            vars: RefCell::new(HashMap::new()),
            parent: None,
            kind: ScopeKind::Function(FunctionFrame {
                this: Value::Undefined,
                home: None,
                constructing: None,
            }),
        })
    }

    /// A block scope inside `parent`.
    pub fn block(parent: &EnvRef) -> EnvRef {
        Self::child(parent, ScopeKind::Block)
    }

    /// Scope for a call of an arrow function.
    pub fn arrow(parent: &EnvRef) -> EnvRef {
        Self::child(parent, ScopeKind::Arrow)
    }

    /// Scope for a call of a regular function or method.
    pub fn function(parent: &EnvRef, frame: FunctionFrame) -> EnvRef {
        Self::child(parent, ScopeKind::Function(frame))
    }

    fn child(parent: &EnvRef, kind: ScopeKind) -> EnvRef {
        Rc::new(Self {
            vars: RefCell::new(HashMap::new()),
            parent: Some(parent.clone()),
            kind,
        })
    }

    /// Define (or redefine) an initialized binding in this scope.
    pub fn declare(&self, name: &str, value: Value, mutable: bool) {
        self.vars.borrow_mut().insert(
            name.to_string(),
            Binding {
                value,
                mutable,
                initialized: true,
            },
        );
    }

    /// Hoist a `let`/`const`/`class` binding that may not be read yet.
    pub fn declare_uninitialized(&self, name: &str, mutable: bool) {
        self.vars.borrow_mut().insert(
            name.to_string(),
            Binding {
                value: Value::Undefined,
                mutable,
                initialized: false,
            },
        );
    }

    /// Hoist a `var`: `undefined` unless already bound in this scope.
    pub fn declare_var(&self, name: &str) {
        self.vars
            .borrow_mut()
            .entry(name.to_string())
            .or_insert(Binding {
                value: Value::Undefined,
                mutable: true,
                initialized: true,
            });
    }

    /// Complete a hoisted declaration in this scope.
    pub fn initialize(&self, name: &str, value: Value) {
        let mut vars = self.vars.borrow_mut();
        match vars.get_mut(name) {
            Some(binding) => {
                binding.value = value;
                binding.initialized = true;
            }
            None => {
                vars.insert(
                    name.to_string(),
                    Binding {
                        value,
                        mutable: true,
                        initialized: true,
                    },
                );
            }
        }
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.vars.borrow().contains_key(name)
    }

    /// Look up a variable, searching from this scope outward.
    pub fn lookup(&self, name: &str) -> Result<Value, BindingError> {
        if let Some(binding) = self.vars.borrow().get(name) {
            return if binding.initialized {
                Ok(binding.value.clone())
            } else {
                Err(BindingError::Uninitialized)
            };
        }
        match &self.parent {
            Some(parent) => parent.lookup(name),
            None => Err(BindingError::NotDefined),
        }
    }

    /// Update an existing variable in the nearest scope that binds it.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), BindingError> {
        if let Some(binding) = self.vars.borrow_mut().get_mut(name) {
            if !binding.initialized {
                return Err(BindingError::Uninitialized);
            }
            if !binding.mutable {
                return Err(BindingError::Constant);
            }
            binding.value = value;
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.assign(name, value),
            None => Err(BindingError::NotDefined),
        }
    }

    /// The scope `var` declarations hoist to.
    pub fn var_scope(self: &Rc<Self>) -> EnvRef {
        let mut current = self.clone();
        loop {
            if !matches!(current.kind, ScopeKind::Block) {
                return current;
            }
            match &current.parent {
                Some(parent) => current = parent.clone(),
                None => return current,
            }
        }
    }

    /// The innermost non-arrow function frame.
    pub fn frame(&self) -> Option<&FunctionFrame> {
        match &self.kind {
            ScopeKind::Function(frame) => Some(frame),
            _ => self.parent.as_deref().and_then(Env::frame),
        }
    }

    pub fn this(&self) -> Value {
        self.frame()
            .map(|frame| frame.this.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_scope_shadows_outer() {
        let global = Env::global();
        global.declare("x", Value::from(1), true);
        let inner = Env::block(&global);
        inner.declare("x", Value::from(2), true);
        assert_eq!(inner.lookup("x"), Ok(Value::from(2)));
        assert_eq!(global.lookup("x"), Ok(Value::from(1)));
    }

    #[test]
    fn test_assign_updates_defining_scope() {
        let global = Env::global();
        global.declare("count", Value::from(0), true);
        let inner = Env::block(&global);
        inner.assign("count", Value::from(5)).expect("assignable");
        assert_eq!(global.lookup("count"), Ok(Value::from(5)));
    }

    #[test]
    fn test_const_rejects_assignment() {
        let global = Env::global();
        global.declare("k", Value::from(1), false);
        assert_eq!(global.assign("k", Value::from(2)), Err(BindingError::Constant));
    }

    #[test]
    fn test_uninitialized_binding() {
        let global = Env::global();
        global.declare_uninitialized("late", true);
        assert_eq!(global.lookup("late"), Err(BindingError::Uninitialized));
        global.initialize("late", Value::from(true));
        assert_eq!(global.lookup("late"), Ok(Value::from(true)));
    }

    #[test]
    fn test_var_scope_skips_blocks() {
        let global = Env::global();
        let func = Env::function(
            &global,
            FunctionFrame {
                this: Value::Null,
                home: None,
                constructing: None,
            },
        );
        let block = Env::block(&func);
        block.var_scope().declare_var("v");
        assert!(func.has_own("v"));
        assert!(!block.has_own("v"));
        assert_eq!(block.this(), Value::Null);
    }

    #[test]
    fn test_arrow_inherits_this() {
        let global = Env::global();
        let func = Env::function(
            &global,
            FunctionFrame {
                this: Value::from("self"),
                home: None,
                constructing: None,
            },
        );
        let arrow = Env::arrow(&func);
        assert_eq!(arrow.this(), Value::from("self"));
    }
}
