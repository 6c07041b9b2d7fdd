//! livecode tree-walking interpreter.
//!
//! Runs the script text the transpiler produces: a JavaScript subset with
//! closures, classes, destructuring, spread, optional chaining and
//! `try`/`catch`, plus the built-in globals and the `React`-shaped runtime
//! base that desugared markup calls into.
//!
//! Values are reference counted and single-threaded; every [`Evaluator`]
//! owns its globals, so calls never share state.

mod bind;
pub(crate) mod builtins;
pub mod element;
pub mod env;
pub mod error;
pub mod evaluator;
mod expr;
mod ops;
mod property;
pub mod realm;
pub mod runtime;
pub mod value;

pub use builtins::console::inspect;
pub use builtins::json::{from_json, parse as parse_json, stringify as stringify_json};
pub use element::{Element, ElementType};
pub use error::{ErrorKind, EvalResult, Exception, Thrown};
pub use evaluator::{ConsoleEntry, ConsoleLevel, Evaluator, MAX_CALL_DEPTH};
pub use value::{Function, FunctionKind, Object, Value};
