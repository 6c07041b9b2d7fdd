//! livecode lexer: converts playground source text into a token stream.

pub mod lexer;
pub mod token;

pub use lexer::{is_ident_continue, is_ident_start, tokenize, LexResult, Lexer};
pub use token::{Token, TokenKind, ALL_KEYWORDS};
