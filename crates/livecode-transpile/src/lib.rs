//! livecode default transpiler: JSX/TypeScript module source to executable
//! script text.
//!
//! # Output
//!
//! - JSX becomes calls to the configured factory (`React.createElement`).
//! - TypeScript annotations are erased by the parser.
//! - `import` declarations become `require("path")` calls, hoisted to the top.
//! - `export` declarations become assignments to the `exports` object;
//!   `export default x` becomes `exports.default = x`.
//! - Module code is preceded by a `"use strict";` directive and the
//!   `__esModule` marker.

pub mod emitter;
pub mod error;
pub mod expr;
pub mod jsx;
pub mod module;
pub mod stmt;
pub mod transpiler;

pub use error::{TranspileError, TranspileResult};
pub use transpiler::{transpile, Transpile, TranspileOptions, Transpiler};
