//! Runtime values.
//!
//! Primitives are stored inline. Arrays, objects, functions and elements are
//! reference types behind `Rc`: two values are the same object exactly when
//! their pointers are equal. Interior mutability (`RefCell`/`Cell`) lets
//! author code mutate shared objects.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use livecode_types::ast::{ClassDef, FunctionDef};

use crate::element::Element;
use crate::env::EnvRef;
use crate::error::EvalResult;
use crate::evaluator::Evaluator;

pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type ObjectRef = Rc<Object>;
pub type FunctionRef = Rc<Function>;

/// A runtime value.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Symbol(Rc<Symbol>),
    Array(ArrayRef),
    Object(ObjectRef),
    Function(FunctionRef),
    Element(Rc<Element>),
}

impl Value {
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    /// A plain object with the given entries, in order.
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let obj = Object::new();
        for (k, v) in entries {
            obj.insert(k.into(), v);
        }
        Value::Object(obj)
    }

    /// A native function value.
    pub fn native(
        name: impl Into<String>,
        arity: usize,
        func: impl Fn(&mut Evaluator, &Value, &[Value]) -> EvalResult<Value> + 'static,
    ) -> Self {
        Value::Function(Function::native(name, arity, func))
    }

    /// The `typeof` string.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Array(_) | Value::Object(_) | Value::Element(_) => "object",
            Value::Function(_) => "function",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Arrays, objects, functions and elements.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Element(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionRef> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&Rc<Element>> {
        match self {
            Value::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// `===` semantics.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Element(a), Value::Element(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `Object.is` semantics: like `===` except for `NaN` and signed zero.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => {
                (a.is_nan() && b.is_nan()) || (a == b && a.is_sign_negative() == b.is_sign_negative())
            }
            _ => self.strict_equals(other),
        }
    }
}

/// Structural equality for primitives and elements, identity for other
/// reference types.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Element(a), Value::Element(b)) => a == b,
            _ => self.same_value(other),
        }
    }
}

/// Reference types print shallowly; author objects may be cyclic.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Symbol(s) => write!(f, "Symbol({:?})", s.description),
            Value::Array(items) => write!(f, "Array(len {})", items.borrow().len()),
            Value::Object(obj) => write!(f, "Object({:?})", obj.keys()),
            Value::Function(func) => write!(f, "{func:?}"),
            Value::Element(el) => write!(f, "{el:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<Element> for Value {
    fn from(e: Element) -> Self {
        Value::Element(Rc::new(e))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

/// The string form author code sees from `String(value)`, without calling
/// user-defined `toString` methods.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&number_to_string(*n)),
            Value::String(s) => f.write_str(s),
            Value::Symbol(s) => write!(f, "Symbol({})", s.description),
            Value::Array(items) => {
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    if !item.is_nullish() {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
            Value::Object(obj) if obj.is_error() => {
                let name = obj.get("name").map(|v| v.to_string());
                let message = obj.get("message").map(|v| v.to_string()).unwrap_or_default();
                let name = name.unwrap_or_else(|| "Error".into());
                if message.is_empty() {
                    f.write_str(&name)
                } else {
                    write!(f, "{name}: {message}")
                }
            }
            Value::Object(_) | Value::Element(_) => f.write_str("[object Object]"),
            Value::Function(func) => match &func.kind {
                FunctionKind::Class(_) => write!(f, "class {} {{ }}", func.name()),
                _ => write!(f, "function {}() {{ [code] }}", func.name()),
            },
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Numbers
// ══════════════════════════════════════════════════════════════════════════════

/// JavaScript `Number.prototype.toString()` for radix 10.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".into();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.into();
    }
    if n == 0.0 {
        return "0".into();
    }
    if n < 0.0 {
        return format!("-{}", number_to_string(-n));
    }

    // Shortest round-trip digits and decimal exponent.
    let sci = format!("{n:e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exp: i32 = exp.parse().unwrap_or(0);
    let k = digits.len() as i32;
    let point = exp + 1;

    if k <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{int}.{frac}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat((-point) as usize))
    } else {
        let sign = if point - 1 >= 0 { "+" } else { "-" };
        let e = (point - 1).abs();
        if k == 1 {
            format!("{digits}e{sign}{e}")
        } else {
            format!("{}.{}e{sign}{e}", &digits[..1], &digits[1..])
        }
    }
}

/// A non-negative integral number usable as an array index.
pub fn as_index(n: f64) -> Option<usize> {
    (n >= 0.0 && n.fract() == 0.0 && n < u32::MAX as f64).then_some(n as usize)
}

/// A canonical array index key such as `"3"`.
pub fn parse_index(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

// ══════════════════════════════════════════════════════════════════════════════
// Symbols
// ══════════════════════════════════════════════════════════════════════════════

/// A unique symbol. Identity is pointer identity.
#[derive(Debug)]
pub struct Symbol {
    pub description: String,
}

impl Symbol {
    pub fn new(description: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            description: description.into(),
        })
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Objects
// ══════════════════════════════════════════════════════════════════════════════

/// An insertion-ordered property bag with an optional prototype.
#[derive(Default)]
pub struct Object {
    props: RefCell<IndexMap<String, Value>>,
    proto: RefCell<Option<ObjectRef>>,
    frozen: Cell<bool>,
    /// Set on error instances and on the error prototypes.
    error: Cell<bool>,
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object").field("keys", &self.keys()).finish()
    }
}

impl Object {
    pub fn new() -> ObjectRef {
        Rc::new(Self::default())
    }

    pub fn with_proto(proto: Option<ObjectRef>) -> ObjectRef {
        let obj = Self::default();
        *obj.proto.borrow_mut() = proto;
        Rc::new(obj)
    }

    /// Own property.
    pub fn get_own(&self, key: &str) -> Option<Value> {
        self.props.borrow().get(key).cloned()
    }

    /// Property lookup along the prototype chain.
    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some(v) = self.get_own(key) {
            return Some(v);
        }
        let mut current = self.proto();
        while let Some(obj) = current {
            if let Some(v) = obj.get_own(key) {
                return Some(v);
            }
            current = obj.proto();
        }
        None
    }

    /// Set an own property. Returns `false` when the object is frozen.
    pub fn set(&self, key: impl Into<String>, value: Value) -> bool {
        if self.frozen.get() {
            return false;
        }
        self.props.borrow_mut().insert(key.into(), value);
        true
    }

    /// Set an own property even on a frozen object. Used while building
    /// built-ins.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.props.borrow_mut().insert(key.into(), value);
    }

    pub fn remove(&self, key: &str) -> bool {
        if self.frozen.get() {
            return false;
        }
        self.props.borrow_mut().shift_remove(key);
        true
    }

    pub fn has_own(&self, key: &str) -> bool {
        self.props.borrow().contains_key(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> Vec<String> {
        self.props.borrow().keys().cloned().collect()
    }

    pub fn entries(&self) -> Vec<(String, Value)> {
        self.props
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.props.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.borrow().is_empty()
    }

    pub fn proto(&self) -> Option<ObjectRef> {
        self.proto.borrow().clone()
    }

    pub fn set_proto(&self, proto: Option<ObjectRef>) {
        *self.proto.borrow_mut() = proto;
    }

    pub fn freeze(&self) {
        self.frozen.set(true);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.get()
    }

    pub(crate) fn mark_error(&self) {
        self.error.set(true);
    }

    /// Whether this object is an error instance: it or something on its
    /// prototype chain is marked as an error.
    pub fn is_error(&self) -> bool {
        if self.error.get() {
            return true;
        }
        let mut current = self.proto();
        while let Some(obj) = current {
            if obj.error.get() {
                return true;
            }
            current = obj.proto();
        }
        false
    }

    /// Whether `target` is on this object's prototype chain.
    pub fn inherits_from(&self, target: &ObjectRef) -> bool {
        let mut current = self.proto();
        while let Some(obj) = current {
            if Rc::ptr_eq(&obj, target) {
                return true;
            }
            current = obj.proto();
        }
        false
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Functions
// ══════════════════════════════════════════════════════════════════════════════

pub type NativeFn = Rc<dyn Fn(&mut Evaluator, &Value, &[Value]) -> EvalResult<Value>>;

/// A callable value. Functions carry their own properties (`prototype`,
/// static class members, `displayName`, ...).
pub struct Function {
    name: RefCell<String>,
    pub kind: FunctionKind,
    props: RefCell<IndexMap<String, Value>>,
}

pub enum FunctionKind {
    /// A function or arrow defined in author code.
    Closure(Closure),
    /// A built-in. `constructor` natives accept `new`.
    Native {
        func: NativeFn,
        arity: usize,
        constructor: bool,
    },
    Class(Rc<Class>),
    /// The result of `Function.prototype.bind`.
    Bound {
        target: Value,
        this: Value,
        args: Vec<Value>,
    },
}

pub struct Closure {
    pub def: Rc<FunctionDef>,
    pub env: EnvRef,
    /// The object `super.x` resolves against, for methods.
    pub home: Option<Value>,
}

pub struct Class {
    pub def: Rc<ClassDef>,
    /// Scope the class body closes over; binds the class name.
    pub env: EnvRef,
    pub parent: Option<Value>,
    pub prototype: ObjectRef,
}

impl Function {
    pub fn new(name: impl Into<String>, kind: FunctionKind) -> FunctionRef {
        Rc::new(Self {
            name: RefCell::new(name.into()),
            kind,
            props: RefCell::new(IndexMap::new()),
        })
    }

    pub fn native(
        name: impl Into<String>,
        arity: usize,
        func: impl Fn(&mut Evaluator, &Value, &[Value]) -> EvalResult<Value> + 'static,
    ) -> FunctionRef {
        Self::new(
            name,
            FunctionKind::Native {
                func: Rc::new(func),
                arity,
                constructor: false,
            },
        )
    }

    /// A native that may be called with `new`. The evaluator creates the
    /// receiver from the function's `prototype` property.
    pub fn native_constructor(
        name: impl Into<String>,
        arity: usize,
        func: impl Fn(&mut Evaluator, &Value, &[Value]) -> EvalResult<Value> + 'static,
    ) -> FunctionRef {
        Self::new(
            name,
            FunctionKind::Native {
                func: Rc::new(func),
                arity,
                constructor: true,
            },
        )
    }

    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    /// Name an anonymous function after the binding it is assigned to.
    pub fn infer_name(&self, name: &str) {
        let mut current = self.name.borrow_mut();
        if current.is_empty() {
            *current = name.to_string();
        }
    }

    /// The JS `length`: declared parameters before the first default or rest.
    pub fn arity(&self) -> usize {
        match &self.kind {
            FunctionKind::Closure(c) => c.def.required_params(),
            FunctionKind::Native { arity, .. } => *arity,
            FunctionKind::Class(class) => class
                .def
                .constructor()
                .map_or(0, |ctor| ctor.required_params()),
            FunctionKind::Bound { target, args, .. } => target
                .as_function()
                .map(|f| f.arity().saturating_sub(args.len()))
                .unwrap_or(0),
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, FunctionKind::Class(_))
    }

    pub fn is_arrow(&self) -> bool {
        matches!(&self.kind, FunctionKind::Closure(c) if c.def.is_arrow)
    }

    /// Whether `new` may be applied.
    pub fn is_constructor(&self) -> bool {
        match &self.kind {
            FunctionKind::Closure(c) => !c.def.is_arrow && c.home.is_none(),
            FunctionKind::Native { constructor, .. } => *constructor,
            FunctionKind::Class(_) => true,
            FunctionKind::Bound { target, .. } => {
                target.as_function().is_some_and(|f| f.is_constructor())
            }
        }
    }

    pub fn get_own(&self, key: &str) -> Option<Value> {
        self.props.borrow().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.props.borrow_mut().insert(key.into(), value);
    }

    pub fn remove(&self, key: &str) {
        self.props.borrow_mut().shift_remove(key);
    }

    pub fn keys(&self) -> Vec<String> {
        self.props
            .borrow()
            .keys()
            .filter(|k| *k != "prototype")
            .cloned()
            .collect()
    }

    /// Own property, then static members inherited from a parent class.
    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some(v) = self.get_own(key) {
            return Some(v);
        }
        match &self.kind {
            FunctionKind::Class(class) => class
                .parent
                .as_ref()
                .and_then(Value::as_function)
                .and_then(|parent| parent.get(key)),
            _ => None,
        }
    }

    /// The `prototype` object, for constructors.
    pub fn prototype(&self) -> Option<ObjectRef> {
        match &self.kind {
            FunctionKind::Class(class) => Some(class.prototype.clone()),
            _ => match self.get_own("prototype") {
                Some(Value::Object(proto)) => Some(proto),
                _ => None,
            },
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            FunctionKind::Closure(_) => "closure",
            FunctionKind::Native { .. } => "native",
            FunctionKind::Class(_) => "class",
            FunctionKind::Bound { .. } => "bound",
        };
        write!(f, "Function({kind} {:?})", self.name.borrow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_to_string() {
        let cases = [
            (1.0, "1"),
            (-2.5, "-2.5"),
            (0.1 + 0.2, "0.30000000000000004"),
            (1e21, "1e+21"),
            (123456789012.0, "123456789012"),
            (1.5e-7, "1.5e-7"),
            (0.000001, "0.000001"),
            (f64::NAN, "NaN"),
            (f64::NEG_INFINITY, "-Infinity"),
            (-0.0, "0"),
        ];
        for (n, expected) in cases {
            assert_eq!(number_to_string(n), expected, "formatting {n}");
        }
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::from("").is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(Value::array(vec![]).is_truthy());
        assert!(Value::from("0").is_truthy());
    }

    #[test]
    fn test_reference_identity() {
        let a = Value::object([("x", Value::from(1))]);
        let b = Value::object([("x", Value::from(1))]);
        assert!(a.strict_equals(&a.clone()));
        assert!(!a.strict_equals(&b));
    }

    #[test]
    fn test_prototype_chain_lookup() {
        let base = Object::new();
        base.insert("greet", Value::from("hi"));
        let child = Object::with_proto(Some(base.clone()));
        assert_eq!(child.get("greet"), Some(Value::from("hi")));
        assert!(!child.has_own("greet"));
        assert!(child.inherits_from(&base));
    }

    #[test]
    fn test_frozen_object_rejects_writes() {
        let obj = Object::new();
        obj.freeze();
        assert!(!obj.set("a", Value::Null));
        assert!(obj.get("a").is_none());
    }

    #[test]
    fn test_array_display() {
        let v = Value::array(vec![Value::from(1), Value::Null, Value::from("x")]);
        assert_eq!(v.to_string(), "1,,x");
    }

    #[test]
    fn test_index_keys() {
        assert_eq!(parse_index("12"), Some(12));
        assert_eq!(parse_index("012"), None);
        assert_eq!(parse_index("-1"), None);
        assert_eq!(as_index(2.0), Some(2));
        assert_eq!(as_index(2.5), None);
    }
}
