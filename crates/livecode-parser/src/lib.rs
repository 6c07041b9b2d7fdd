//! livecode parser: converts a token stream into an AST.
//!
//! Accepts modern JavaScript with JSX, and optionally TypeScript, whose
//! annotations are erased while parsing.

mod parse_decl;
mod parse_expr;
mod parse_jsx;
mod parse_stmt;
mod parse_type;
mod parser;

pub use parse_jsx::{clean_jsx_text, decode_entities};
pub use parser::{parse, ParseMode, ParseOptions, ParseResult, Parser};
