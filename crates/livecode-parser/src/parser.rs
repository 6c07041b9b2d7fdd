//! Core parser infrastructure: token cursor, error reporting, helpers.

use livecode_lexer::token::{Token, TokenKind};
use livecode_lexer::Lexer;
use livecode_types::ast::{Ident, Program};
use livecode_types::{Diagnostic, Diagnostics, SourceFile, Span};

/// What kind of source text is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// A module: `import`/`export` and JSX are allowed, `return` is only
    /// valid inside functions.
    #[default]
    Module,
    /// The body of a function: a top-level `return` is allowed, modules and
    /// JSX are not.
    FunctionBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub mode: ParseMode,
    /// Accept and erase TypeScript annotations.
    pub typescript: bool,
}

impl ParseOptions {
    pub fn module() -> Self {
        Self::default()
    }

    pub fn function_body() -> Self {
        Self {
            mode: ParseMode::FunctionBody,
            typescript: false,
        }
    }

    pub fn with_typescript(mut self, typescript: bool) -> Self {
        self.typescript = typescript;
        self
    }
}

/// Maximum nesting of expressions and statements before the parser bails
/// out instead of overflowing the stack.
const MAX_DEPTH: u32 = 100;

/// The livecode parser.
///
/// Consumes a token stream produced by the lexer and builds an AST.
/// Collects errors and attempts recovery when possible.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    /// Returned by `peek` past the end of the stream.
    eof: Token,
    source_file: &'src SourceFile,
    errors: Diagnostics,
    pub(crate) options: ParseOptions,
    /// Number of enclosing function bodies.
    pub(crate) function_depth: u32,
    /// Current recursion depth.
    pub(crate) depth: u32,
    /// Parsing the head of a `for` statement, where `in` is not an operator.
    pub(crate) no_in: bool,
}

/// Result of parsing.
pub struct ParseResult {
    pub program: Program,
    pub errors: Diagnostics,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        self.errors.has_errors()
    }
}

/// Lex and parse a source file in one step.
///
/// JSX is recognised in [`ParseMode::Module`] only. Lexer diagnostics come
/// first in the returned error list.
pub fn parse(source_file: &SourceFile, options: ParseOptions) -> ParseResult {
    let lexed = Lexer::new(source_file)
        .with_jsx(options.mode == ParseMode::Module)
        .lex();
    let mut result = Parser::new(lexed.tokens, source_file, options).parse();
    let mut errors = lexed.errors;
    errors.extend(result.errors);
    result.errors = errors;
    result
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile, options: ParseOptions) -> Self {
        let end = source_file.source.len();
        let last_line = source_file.line_count() as u32;
        let eof = tokens
            .last()
            .filter(|t| t.kind == TokenKind::Eof)
            .cloned()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, Span::point(end, last_line, 1)));
        Self {
            tokens,
            pos: 0,
            eof,
            source_file,
            errors: Diagnostics::empty(),
            options,
            function_depth: 0,
            depth: 0,
            no_in: false,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::point(0, 1, 1)
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    /// Span from `start` through the last consumed token.
    pub(crate) fn span_since(&self, start: Span) -> Span {
        start.merge(self.previous_span())
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Whether the current token is the identifier `word`.
    pub(crate) fn check_word(&self, word: &str) -> bool {
        matches!(self.peek_kind(), TokenKind::Ident(name) if name == word)
    }

    pub(crate) fn eat_word(&mut self, word: &str) -> bool {
        if self.check_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Look ahead by `n` tokens from current position.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    pub(crate) fn look_ahead_token(&self, n: usize) -> &Token {
        self.tokens.get(self.pos + n).unwrap_or(&self.eof)
    }

    /// Current cursor position, for backtracking.
    pub(crate) fn save(&self) -> usize {
        self.pos
    }

    pub(crate) fn restore(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub(crate) fn newline_before(&self) -> bool {
        self.peek().newline_before
    }

    // ── Statement Termination ─────────────────────────────────────────────────

    /// Consume a `;`, or accept its automatic insertion before `}`, end of
    /// file, or a token on a new line.
    pub(crate) fn consume_semicolon(&mut self) {
        if self.eat(&TokenKind::Semicolon) {
            return;
        }
        if self.at_end() || self.check(&TokenKind::RBrace) || self.newline_before() {
            return;
        }
        self.error_at_current(format!("Expected ';', got '{}'", self.peek_kind()));
    }

    /// Whether a statement may end here without a `;` token.
    pub(crate) fn at_statement_end(&self) -> bool {
        self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.at_end()
            || self.newline_before()
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(format!(
                "Expected '{}', got '{}'",
                expected,
                self.peek_kind()
            ));
            None
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            _ => {
                self.error_at_current(format!(
                    "Expected identifier, got '{}'",
                    self.peek_kind()
                ));
                None
            }
        }
    }

    /// Identifier or reserved word, as used after `.` and for property keys.
    pub(crate) fn expect_property_name(&mut self) -> Option<Ident> {
        let kind = self.peek_kind().clone();
        match &kind {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Some(Ident::new(name.clone(), span))
            }
            _ if kind.is_keyword() => {
                let span = self.advance().span;
                Some(Ident::new(kind.to_string(), span))
            }
            _ => {
                self.error_at_current(format!(
                    "Expected property name, got '{}'",
                    self.peek_kind()
                ));
                None
            }
        }
    }

    pub(crate) fn expect_string_literal(&mut self) -> Option<String> {
        match self.peek_kind().clone() {
            TokenKind::Str(s) => {
                self.advance();
                Some(s)
            }
            _ => {
                self.error_at_current(format!(
                    "Expected string literal, got '{}'",
                    self.peek_kind()
                ));
                None
            }
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(message, span);
    }

    pub(crate) fn error_at(&mut self, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.line).unwrap_or("").to_string();
        self.errors.push(Diagnostic::new(message, span, source_line));
    }

    pub(crate) fn error_with_suggestion(
        &mut self,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        let span = self.current_span();
        let source_line = self.source_file.line(span.line).unwrap_or("").to_string();
        self.errors
            .push(Diagnostic::new(message, span, source_line).with_suggestion(suggestion));
    }

    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.at_limit()
    }

    /// Enter one level of recursion; reports and returns `false` past the
    /// nesting limit. Pair with [`Parser::leave`].
    pub(crate) fn enter(&mut self) -> bool {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            self.error_at_current("Code is nested too deeply");
            self.depth -= 1;
            return false;
        }
        true
    }

    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip tokens until a likely statement boundary.
    /// Used after an error to resume at a known-good position.
    pub(crate) fn synchronize(&mut self) {
        let start = self.pos;
        while !self.at_end() {
            if self.eat(&TokenKind::Semicolon) {
                return;
            }
            if self.check(&TokenKind::RBrace) && self.pos > start {
                return;
            }
            if self.pos > start && self.newline_before() {
                return;
            }
            self.advance();
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a `Program`.
    pub fn parse(mut self) -> ParseResult {
        let start = self.current_span();
        let mut body = Vec::new();
        while !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            let before = self.pos;
            match self.parse_statement() {
                Some(stmt) => body.push(stmt),
                None => {
                    self.synchronize();
                    if self.pos == before {
                        self.advance();
                    }
                }
            }
        }
        let span = self.span_since(start);
        ParseResult {
            program: Program { body, span },
            errors: self.errors,
        }
    }
}
