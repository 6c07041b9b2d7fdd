//! Caller bindings ([`Scope`]) and what the sandbox is built from: the
//! execution context seed and the module table behind `require`.

use std::rc::Rc;

use indexmap::IndexMap;
use livecode_eval::value::ObjectRef;
use livecode_eval::{from_json, runtime, EvalResult, Evaluator, Exception, Object, Value};
use livecode_lexer::{is_ident_continue, is_ident_start, ALL_KEYWORDS};

use crate::error::ScopeError;

/// Binding name of the runtime base object.
pub const RUNTIME_BASE: &str = "React";
/// Import path the runtime base is registered under.
pub const RUNTIME_BASE_PATH: &str = "react";

const IMPORT_KEY: &str = "import";
/// Scope keys that never become bindings.
const RESERVED_KEYS: [&str; 3] = ["default", IMPORT_KEY, "exports"];

/// Words that cannot name a binding even though the lexer treats them as
/// identifiers.
const STRICT_RESERVED: &[&str] = &[
    "enum", "await", "yield", "implements", "interface", "package", "private",
    "protected", "public", "static", "with", "debugger", "arguments", "eval",
];

/// Whether `name` can be bound as a parameter of sandboxed code.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_ident_start)
        && chars.all(is_ident_continue)
        && !ALL_KEYWORDS.contains(&name)
        && !STRICT_RESERVED.contains(&name)
}

fn looks_like_module_path(key: &str) -> bool {
    key.starts_with('@') || (key.contains('/') && key != RUNTIME_BASE)
}

// ══════════════════════════════════════════════════════════════════════
// Scope
// ══════════════════════════════════════════════════════════════════════

/// The dependencies one evaluation may use, keyed by binding name or
/// import path. `import` holds an object of extra import paths.
///
/// A scope is never mutated by the pipeline; builder methods consume and
/// return it.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    entries: IndexMap<String, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a binding.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.entries.insert(name.into(), value);
        self
    }

    /// Register `value` under an import path inside the `import` entry.
    /// The existing `import` object is copied, never modified in place.
    pub fn with_import(mut self, path: impl Into<String>, value: Value) -> Self {
        let mut imports: IndexMap<String, Value> = match self.entries.get(IMPORT_KEY) {
            Some(Value::Object(obj)) => obj.entries().into_iter().collect(),
            _ => IndexMap::new(),
        };
        imports.insert(path.into(), value);
        self.entries.insert(IMPORT_KEY.into(), Value::object(imports));
        self
    }

    /// Build a scope from a JSON object. Nested objects become plain objects
    /// with `Object.prototype` methods.
    pub fn from_json(json: serde_json::Value) -> Result<Self, ScopeError> {
        let serde_json::Value::Object(map) = json else {
            return Err(ScopeError {
                found: json_type(&json),
            });
        };
        let ev = Evaluator::new();
        Ok(Self {
            entries: map
                .into_iter()
                .map(|(key, value)| (key, from_json(&ev, value)))
                .collect(),
        })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn json_type(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// ══════════════════════════════════════════════════════════════════════
// Module table
// ══════════════════════════════════════════════════════════════════════

/// Import path → module value, consulted by the `require` shim.
#[derive(Debug, Clone, Default)]
pub struct ModuleTable {
    modules: IndexMap<String, Value>,
}

impl ModuleTable {
    pub fn resolve(&self, path: &str) -> Option<&Value> {
        self.modules.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Look up `path`, failing with `ModuleNotFoundError`.
    pub fn require(&self, path: &str) -> EvalResult<Value> {
        self.resolve(path)
            .cloned()
            .ok_or_else(|| Exception::module_not_found(path))
    }

    fn register(&mut self, path: impl Into<String>, value: Value) {
        self.modules.insert(path.into(), value);
    }
}

// ══════════════════════════════════════════════════════════════════════
// Execution context
// ══════════════════════════════════════════════════════════════════════

/// Ordered name → value bindings handed to the sandbox.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    bindings: IndexMap<String, Value>,
}

impl ExecutionContext {
    /// Bind `name`. Rebinding keeps the original position.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Output of [`build_scope`].
#[derive(Debug, Clone)]
pub struct BuiltScope {
    /// `React`, `require`, `exports`, then the caller's bindings.
    pub context: ExecutionContext,
    pub modules: Rc<ModuleTable>,
    /// The `exports` placeholder the code writes its result into.
    pub exports: ObjectRef,
}

/// Merge the caller's scope with the built-ins.
pub fn build_scope(scope: &Scope) -> BuiltScope {
    let base = scope
        .get(RUNTIME_BASE)
        .cloned()
        .unwrap_or_else(runtime::react);

    let mut modules = ModuleTable::default();
    for (key, value) in scope.iter() {
        if looks_like_module_path(key) {
            modules.register(key, value.clone());
        }
    }
    if let Some(Value::Object(imports)) = scope.get(IMPORT_KEY) {
        for (path, value) in imports.entries() {
            modules.register(path, value);
        }
    }
    if !modules.contains(RUNTIME_BASE_PATH) {
        modules.register(RUNTIME_BASE_PATH, base.clone());
    }
    let modules = Rc::new(modules);

    let exports = Object::new();
    let mut context = ExecutionContext::default();
    context.bind(RUNTIME_BASE, base);
    context.bind("require", require_shim(Rc::clone(&modules)));
    context.bind("exports", Value::Object(exports.clone()));
    for (key, value) in scope.iter() {
        if !RESERVED_KEYS.contains(&key) {
            context.bind(key, value.clone());
        }
    }

    BuiltScope {
        context,
        modules,
        exports,
    }
}

fn require_shim(modules: Rc<ModuleTable>) -> Value {
    Value::native("require", 1, move |ev, _, args| {
        let path = ev.to_js_string(&args.first().cloned().unwrap_or_default())?;
        modules.require(&path)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_identifier_validity() {
        for name in ["Button", "_x", "$", "café", "a1"] {
            assert!(is_valid_identifier(name), "{name}");
        }
        for name in ["", "1abc", "my button", "data-id", "@scope/pkg", "class", "await"] {
            assert!(!is_valid_identifier(name), "{name}");
        }
    }

    #[test]
    fn test_context_order_and_reserved_keys() {
        let scope = Scope::new()
            .with("Button", Value::from(1))
            .with("default", Value::from(2))
            .with("exports", Value::from(3))
            .with_import("pkg", Value::from(4));
        let built = build_scope(&scope);
        let names: Vec<&str> = built.context.names().collect();
        assert_eq!(names, vec!["React", "require", "exports", "Button"]);
    }

    #[test]
    fn test_caller_react_overrides_builtin() {
        let scope = Scope::new().with("React", Value::from("custom"));
        let built = build_scope(&scope);
        assert_eq!(built.context.get("React"), Some(&Value::from("custom")));
        assert_eq!(built.modules.resolve("react"), Some(&Value::from("custom")));
        assert_eq!(built.context.names().next(), Some("React"));
    }

    #[test]
    fn test_module_table_sources() {
        let scope = Scope::new()
            .with("@ui/button", Value::from(1))
            .with("lib/util", Value::from(2))
            .with("plain", Value::from(3))
            .with_import("lib/util", Value::from(20))
            .with_import("react", Value::from(30));
        let built = build_scope(&scope);
        let paths: Vec<&str> = built.modules.paths().collect();
        assert_eq!(paths, vec!["@ui/button", "lib/util", "react"]);
        assert_eq!(built.modules.resolve("lib/util"), Some(&Value::from(20)));
        assert_eq!(built.modules.resolve("react"), Some(&Value::from(30)));
    }

    #[test]
    fn test_with_import_copies() {
        let first = Scope::new().with_import("a", Value::from(1));
        let second = first.clone().with_import("b", Value::from(2));
        let Some(Value::Object(imports)) = first.get("import") else {
            panic!("import entry missing");
        };
        assert_eq!(imports.keys(), vec!["a"]);
        assert_eq!(second.get("import").and_then(Value::as_object).map(|o| o.len()), Some(2));
    }

    #[test]
    fn test_require_missing_path() {
        let err = ModuleTable::default().require("@acme/missing").unwrap_err();
        assert_eq!(
            err.message(),
            "ModuleNotFoundError: Cannot find module \"@acme/missing\""
        );
    }

    #[test]
    fn test_from_json() {
        let scope = Scope::from_json(json!({ "title": "Hi", "import": { "pkg-x": { "val": 1 } } }))
            .unwrap();
        assert_eq!(scope.get("title"), Some(&Value::from("Hi")));
        let built = build_scope(&scope);
        assert!(built.modules.contains("pkg-x"));

        let err = Scope::from_json(json!([1, 2])).unwrap_err();
        assert_eq!(err.to_string(), "scope must be a JSON object, got an array");
    }
}
