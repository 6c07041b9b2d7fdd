//! Core lexer: converts source text to a token stream.
//!
//! Features:
//! - JavaScript tokens plus the TypeScript punctuation the parser erases
//! - Template literals with `${expr}` substitutions via a mode stack
//! - JSX tags, attributes, text children and `{expr}` containers through the
//!   same mode stack
//! - Line and block comments skipped, with line breaks recorded on the next
//!   token for automatic semicolon insertion
//! - Error recovery: collects up to [`livecode_types::MAX_ERRORS`] diagnostics

use livecode_types::{Diagnostic, Diagnostics, SourceFile, Span};

use crate::token::{Token, TokenKind};

/// Lexer mode. The top of the stack decides how the next token is scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Ordinary code.
    Normal,
    /// Inside a template literal, scanning text until `` ` `` or `${`.
    Template,
    /// Inside `${...}`. `brace_depth` counts nested `{}` so the closing
    /// brace of the substitution can be told apart.
    Interpolation { brace_depth: u32 },
    /// Between `<` (or `</`) and `>` of a JSX tag.
    JsxTag { closing: bool },
    /// Between an opening tag and its closing tag.
    JsxChildren,
    /// Inside a `{...}` container in a tag or among children.
    JsxExpr { brace_depth: u32 },
}

pub struct Lexer<'src> {
    source: &'src str,
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    line: u32,
    col: u32,
    errors: Diagnostics,
    mode_stack: Vec<Mode>,
    /// Tokens to emit before the next scan (used for `${`).
    pending: Vec<Token>,
    /// Recognise JSX elements.
    jsx: bool,
    /// Kind of the last emitted token, for telling `<` apart from JSX.
    prev: Option<TokenKind>,
    /// A line break was skipped since the last emitted token.
    newline_before: bool,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    pub errors: Diagnostics,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: &source_file.source,
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: Diagnostics::empty(),
            mode_stack: vec![Mode::Normal],
            pending: Vec::new(),
            jsx: true,
            prev: None,
            newline_before: false,
        }
    }

    /// Enable or disable JSX recognition. With JSX off, `<` is always a
    /// comparison operator.
    pub fn with_jsx(mut self, jsx: bool) -> Self {
        self.jsx = jsx;
        self
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            if self.errors.at_limit() {
                break;
            }

            if let Some(pending) = self.pending.pop() {
                self.prev = Some(pending.kind.clone());
                tokens.push(pending);
                continue;
            }

            let mut token = match self.current_mode() {
                Mode::Normal | Mode::Interpolation { .. } | Mode::JsxExpr { .. } => {
                    self.scan_normal()
                }
                Mode::Template => self.scan_template_continuation(),
                Mode::JsxTag { closing } => self.scan_jsx_tag(closing),
                Mode::JsxChildren => self.scan_jsx_children(),
            };
            token.newline_before = std::mem::take(&mut self.newline_before);

            let is_eof = token.kind == TokenKind::Eof;
            self.prev = Some(token.kind.clone());
            tokens.push(token);

            if is_eof {
                break;
            }
        }

        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, self.current_span()));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Mode stack helpers
    // ─────────────────────────────────────────────────────────────

    fn current_mode(&self) -> Mode {
        *self.mode_stack.last().unwrap_or(&Mode::Normal)
    }

    fn push_mode(&mut self, mode: Mode) {
        self.mode_stack.push(mode);
    }

    fn pop_mode(&mut self) {
        if self.mode_stack.len() > 1 {
            self.mode_stack.pop();
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn current_span(&self) -> Span {
        Span::point(self.pos, self.line, self.col)
    }

    fn span_from(&self, start: usize, line: u32, col: u32) -> Span {
        Span::new(start, self.pos, line, col)
    }

    fn emit_error(&mut self, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.line).unwrap_or("").to_string();
        self.errors.push(Diagnostic::new(message, span, source_line));
    }

    fn report_unterminated(&mut self) {
        let span = self.current_span();
        if self
            .mode_stack
            .iter()
            .any(|m| matches!(m, Mode::Template | Mode::Interpolation { .. }))
        {
            self.emit_error("Unterminated template literal", span);
        } else if self.mode_stack.iter().any(|m| {
            matches!(
                m,
                Mode::JsxTag { .. } | Mode::JsxChildren | Mode::JsxExpr { .. }
            )
        }) {
            self.emit_error("Unterminated JSX element", span);
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip whitespace, line comments and block comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some('\n') => {
                    self.newline_before = true;
                    self.advance();
                }
                Some(c) if c.is_whitespace() || c == '\u{feff}' => {
                    self.advance();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(ch) = self.peek() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => self.skip_block_comment(),
                _ => break,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let (start, line, col) = (self.pos, self.line, self.col);
        self.advance();
        self.advance();
        loop {
            match self.peek() {
                None => {
                    let span = self.span_from(start, line, col);
                    self.emit_error("Unterminated block comment", span);
                    return;
                }
                Some('*') if self.peek_at(1) == Some('/') => {
                    self.advance();
                    self.advance();
                    return;
                }
                Some(ch) => {
                    if ch == '\n' {
                        self.newline_before = true;
                    }
                    self.advance();
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Normal-mode scanning
    // ─────────────────────────────────────────────────────────────

    /// Scan one token of ordinary code.
    fn scan_normal(&mut self) -> Token {
        self.skip_trivia();

        if self.errors.at_limit() {
            return Token::new(TokenKind::Eof, self.current_span());
        }

        let (start, line, col) = (self.pos, self.line, self.col);
        let Some(ch) = self.advance() else {
            self.report_unterminated();
            return Token::new(TokenKind::Eof, self.current_span());
        };

        let kind = match ch {
            '"' | '\'' => return self.scan_string(ch, start, line, col),
            '`' => return self.scan_template(start, line, col),
            '0'..='9' => return self.scan_number(ch, start, line, col),
            '.' if matches!(self.peek(), Some('0'..='9')) => {
                return self.scan_number(ch, start, line, col)
            }
            c if is_ident_start(c) => return self.scan_identifier(start, line, col),

            '+' => {
                if self.eat('+') {
                    TokenKind::PlusPlus
                } else if self.eat('=') {
                    TokenKind::PlusEq
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.eat('-') {
                    TokenKind::MinusMinus
                } else if self.eat('=') {
                    TokenKind::MinusEq
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                if self.eat('*') {
                    if self.eat('=') {
                        TokenKind::StarStarEq
                    } else {
                        TokenKind::StarStar
                    }
                } else if self.eat('=') {
                    TokenKind::StarEq
                } else {
                    TokenKind::Star
                }
            }
            // Comments were consumed by skip_trivia, and regular expression
            // literals are not part of the dialect, so `/` is division.
            '/' => {
                if self.eat('=') {
                    TokenKind::SlashEq
                } else {
                    TokenKind::Slash
                }
            }
            '%' => {
                if self.eat('=') {
                    TokenKind::PercentEq
                } else {
                    TokenKind::Percent
                }
            }
            '=' => {
                if self.eat('=') {
                    if self.eat('=') {
                        TokenKind::EqEqEq
                    } else {
                        TokenKind::EqEq
                    }
                } else if self.eat('>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Eq
                }
            }
            '!' => {
                if self.eat('=') {
                    if self.eat('=') {
                        TokenKind::BangEqEq
                    } else {
                        TokenKind::BangEq
                    }
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.jsx_starts_here() {
                    self.push_mode(Mode::JsxTag { closing: false });
                    TokenKind::JsxTagStart
                } else if self.eat('=') {
                    TokenKind::LessEq
                } else {
                    TokenKind::Less
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::GreaterEq
                } else {
                    TokenKind::Greater
                }
            }
            '&' => {
                if self.eat('&') {
                    if self.eat('=') {
                        TokenKind::AmpAmpEq
                    } else {
                        TokenKind::AmpAmp
                    }
                } else {
                    TokenKind::Amp
                }
            }
            '|' => {
                if self.eat('|') {
                    if self.eat('=') {
                        TokenKind::PipePipeEq
                    } else {
                        TokenKind::PipePipe
                    }
                } else {
                    TokenKind::Pipe
                }
            }
            '?' => {
                if self.eat('?') {
                    if self.eat('=') {
                        TokenKind::QuestionQuestionEq
                    } else {
                        TokenKind::QuestionQuestion
                    }
                } else if self.peek() == Some('.') && !matches!(self.peek_at(1), Some('0'..='9'))
                {
                    self.advance();
                    TokenKind::QuestionDot
                } else {
                    TokenKind::Question
                }
            }
            '.' => {
                if self.peek() == Some('.') && self.peek_at(1) == Some('.') {
                    self.advance();
                    self.advance();
                    TokenKind::DotDotDot
                } else {
                    TokenKind::Dot
                }
            }
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,

            '{' => {
                match self.mode_stack.last_mut() {
                    Some(Mode::Interpolation { brace_depth })
                    | Some(Mode::JsxExpr { brace_depth }) => *brace_depth += 1,
                    _ => {}
                }
                TokenKind::LBrace
            }

            '}' => match self.current_mode() {
                Mode::Interpolation { brace_depth: 0 } => {
                    // Back to the template text after the substitution.
                    self.pop_mode();
                    self.push_mode(Mode::Template);
                    TokenKind::InterpolationEnd
                }
                Mode::JsxExpr { brace_depth: 0 } => {
                    self.pop_mode();
                    TokenKind::RBrace
                }
                _ => {
                    match self.mode_stack.last_mut() {
                        Some(Mode::Interpolation { brace_depth })
                        | Some(Mode::JsxExpr { brace_depth }) => *brace_depth -= 1,
                        _ => {}
                    }
                    TokenKind::RBrace
                }
            },

            '#' if start == 0 && self.peek() == Some('!') => {
                // Shebang line.
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
                return self.scan_normal();
            }

            _ => {
                let span = self.span_from(start, line, col);
                self.emit_error(format!("Unexpected character '{ch}'"), span);
                return self.scan_normal();
            }
        };

        Token::new(kind, self.span_from(start, line, col))
    }

    /// Decide whether the `<` just consumed opens a JSX element.
    ///
    /// It does when JSX is enabled, the next character can begin a tag name
    /// (or is `>` for a fragment), and the previous token cannot end an
    /// operand. A `<` at the start of a line also opens JSX, which covers
    /// markup written after a complete statement without a semicolon.
    fn jsx_starts_here(&self) -> bool {
        if !self.jsx {
            return false;
        }
        let next_ok = matches!(self.peek(), Some(c) if c == '>' || is_ident_start(c));
        if !next_ok || self.type_params_follow() {
            return false;
        }
        match &self.prev {
            None => true,
            Some(kind) => !kind.ends_expression() || self.newline_before,
        }
    }

    /// `<T,>` and `<T extends U>`: the TSX spelling of a generic arrow's
    /// type parameters, which is never a valid tag.
    fn type_params_follow(&self) -> bool {
        let rest = &self.source[self.pos..];
        let name_len = rest
            .find(|c: char| !is_ident_continue(c))
            .unwrap_or(rest.len());
        let after = rest[name_len..].trim_start_matches([' ', '\t']);
        if after.starts_with(',') {
            return true;
        }
        match after.strip_prefix("extends") {
            Some(tail) if tail.starts_with([' ', '\t']) => {
                !tail.trim_start().starts_with(['=', '/', '>'])
            }
            _ => false,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    fn scan_number(&mut self, first: char, start: usize, line: u32, col: u32) -> Token {
        let radix = match (first, self.peek()) {
            ('0', Some('x' | 'X')) => Some(16),
            ('0', Some('b' | 'B')) => Some(2),
            ('0', Some('o' | 'O')) => Some(8),
            _ => None,
        };

        if let Some(radix) = radix {
            self.advance();
            let mut value = 0f64;
            let mut digits = 0;
            while let Some(c) = self.peek() {
                if c == '_' {
                    self.advance();
                    continue;
                }
                let Some(d) = c.to_digit(radix) else { break };
                value = value * radix as f64 + d as f64;
                digits += 1;
                self.advance();
            }
            let span = self.span_from(start, line, col);
            if digits == 0 {
                self.emit_error("Invalid number literal", span);
            }
            return Token::new(TokenKind::Number(value), span);
        }

        if first != '.' {
            self.eat_digits();
            if self.peek() == Some('.') && matches!(self.peek_at(1), Some('0'..='9')) {
                self.advance();
            }
        }
        self.eat_digits();

        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if matches!(self.peek_at(digit_at), Some('0'..='9')) {
                self.advance();
                if signed {
                    self.advance();
                }
                self.eat_digits();
            }
        }

        let span = self.span_from(start, line, col);
        let text: String = self.source[start..self.pos]
            .chars()
            .filter(|c| *c != '_')
            .collect();
        match text.parse::<f64>() {
            Ok(value) => Token::new(TokenKind::Number(value), span),
            Err(_) => {
                self.emit_error(format!("Invalid number literal '{text}'"), span);
                Token::new(TokenKind::Number(0.0), span)
            }
        }
    }

    fn eat_digits(&mut self) {
        while let Some('0'..='9' | '_') = self.peek() {
            self.advance();
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Identifiers & keywords
    // ─────────────────────────────────────────────────────────────

    fn scan_identifier(&mut self, start: usize, line: u32, col: u32) -> Token {
        while let Some(ch) = self.peek() {
            if is_ident_continue(ch) {
                self.advance();
            } else {
                break;
            }
        }

        let span = self.span_from(start, line, col);
        let text = &self.source[start..self.pos];
        let kind =
            TokenKind::from_keyword(text).unwrap_or_else(|| TokenKind::Ident(text.to_string()));
        Token::new(kind, span)
    }

    // ─────────────────────────────────────────────────────────────
    // String and template literals
    // ─────────────────────────────────────────────────────────────

    fn scan_string(&mut self, quote: char, start: usize, line: u32, col: u32) -> Token {
        let mut buf = String::new();

        loop {
            match self.peek() {
                None | Some('\n') => {
                    let span = self.span_from(start, line, col);
                    self.emit_error("Unterminated string literal", span);
                    return Token::new(TokenKind::Str(buf), span);
                }
                Some(c) if c == quote => {
                    self.advance();
                    return Token::new(TokenKind::Str(buf), self.span_from(start, line, col));
                }
                Some('\\') => {
                    if let Some(escaped) = self.scan_escape_sequence() {
                        buf.push(escaped);
                    }
                }
                Some(c) => {
                    self.advance();
                    buf.push(c);
                }
            }
        }
    }

    /// Scan a template literal starting after the opening backtick.
    fn scan_template(&mut self, start: usize, line: u32, col: u32) -> Token {
        self.scan_template_text(start, line, col, false)
    }

    /// Continue template text after a substitution's closing `}`.
    fn scan_template_continuation(&mut self) -> Token {
        let (start, line, col) = (self.pos, self.line, self.col);
        self.scan_template_text(start, line, col, true)
    }

    fn scan_template_text(&mut self, start: usize, line: u32, col: u32, resumed: bool) -> Token {
        let mut buf = String::new();

        loop {
            match self.peek() {
                None => {
                    let span = self.span_from(start, line, col);
                    self.emit_error("Unterminated template literal", span);
                    if resumed {
                        self.pop_mode();
                        return Token::new(TokenKind::TemplateEnd(buf), span);
                    }
                    return Token::new(TokenKind::Template(buf), span);
                }
                Some('`') => {
                    self.advance();
                    let span = self.span_from(start, line, col);
                    if resumed {
                        self.pop_mode();
                        return Token::new(TokenKind::TemplateEnd(buf), span);
                    }
                    return Token::new(TokenKind::Template(buf), span);
                }
                Some('\\') => {
                    if let Some(escaped) = self.scan_escape_sequence() {
                        buf.push(escaped);
                    }
                }
                Some('$') if self.peek_at(1) == Some('{') => {
                    let span = self.span_from(start, line, col);
                    let (interp_start, interp_line, interp_col) = (self.pos, self.line, self.col);
                    self.advance();
                    self.advance();
                    let interp_span = self.span_from(interp_start, interp_line, interp_col);
                    if resumed {
                        self.pop_mode();
                    }
                    self.push_mode(Mode::Interpolation { brace_depth: 0 });
                    self.pending
                        .push(Token::new(TokenKind::InterpolationStart, interp_span));
                    let kind = if resumed {
                        TokenKind::TemplatePart(buf)
                    } else {
                        TokenKind::TemplateStart(buf)
                    };
                    return Token::new(kind, span);
                }
                Some('\r') => {
                    // CRLF inside template text is read as LF.
                    self.advance();
                    if self.peek() != Some('\n') {
                        buf.push('\n');
                    }
                }
                Some(c) => {
                    self.advance();
                    buf.push(c);
                }
            }
        }
    }

    /// Scan an escape sequence starting at the `\`.
    /// Returns `None` for line continuations and invalid escapes.
    fn scan_escape_sequence(&mut self) -> Option<char> {
        let (start, line, col) = (self.pos, self.line, self.col);
        self.advance();

        let Some(ch) = self.advance() else {
            let span = self.span_from(start, line, col);
            self.emit_error("Unexpected end of file in escape sequence", span);
            return None;
        };

        let escaped = match ch {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            '0' if !matches!(self.peek(), Some('0'..='9')) => '\0',
            'x' => return self.scan_hex_escape(2, start, line, col),
            'u' if self.peek() == Some('{') => {
                self.advance();
                let mut value = 0u32;
                while let Some(d) = self.peek().and_then(|c| c.to_digit(16)) {
                    value = value.saturating_mul(16).saturating_add(d);
                    self.advance();
                }
                if !self.eat('}') {
                    let span = self.span_from(start, line, col);
                    self.emit_error("Invalid Unicode escape sequence", span);
                    return None;
                }
                return self.char_from_code(value, start, line, col);
            }
            'u' => return self.scan_hex_escape(4, start, line, col),
            '\r' => {
                self.eat('\n');
                return None;
            }
            '\n' => return None,
            other => other,
        };
        Some(escaped)
    }

    fn scan_hex_escape(&mut self, len: usize, start: usize, line: u32, col: u32) -> Option<char> {
        let value = self.read_hex(len);
        let Some(mut value) = value else {
            let span = self.span_from(start, line, col);
            self.emit_error("Invalid hexadecimal escape sequence", span);
            return None;
        };
        // A high surrogate followed by `\uDC00`-`\uDFFF` forms one code point.
        if len == 4
            && (0xD800..=0xDBFF).contains(&value)
            && self.peek() == Some('\\')
            && self.peek_at(1) == Some('u')
        {
            let save = (self.pos, self.line, self.col);
            self.advance();
            self.advance();
            match self.read_hex(4) {
                Some(low) if (0xDC00..=0xDFFF).contains(&low) => {
                    value = 0x10000 + ((value - 0xD800) << 10) + (low - 0xDC00);
                }
                _ => (self.pos, self.line, self.col) = save,
            }
        }
        self.char_from_code(value, start, line, col)
    }

    fn read_hex(&mut self, len: usize) -> Option<u32> {
        let mut value = 0u32;
        for _ in 0..len {
            let d = self.peek()?.to_digit(16)?;
            value = value * 16 + d;
            self.advance();
        }
        Some(value)
    }

    fn char_from_code(&mut self, value: u32, start: usize, line: u32, col: u32) -> Option<char> {
        if let Some(c) = char::from_u32(value) {
            return Some(c);
        }
        let span = self.span_from(start, line, col);
        self.emit_error(format!("Invalid code point {value:#x}"), span);
        Some(char::REPLACEMENT_CHARACTER)
    }

    // ─────────────────────────────────────────────────────────────
    // JSX
    // ─────────────────────────────────────────────────────────────

    /// Scan one token inside a JSX tag: names, `=`, attribute strings,
    /// `{` containers and the tag terminators.
    fn scan_jsx_tag(&mut self, closing: bool) -> Token {
        self.skip_trivia();
        let (start, line, col) = (self.pos, self.line, self.col);
        let Some(ch) = self.advance() else {
            self.report_unterminated();
            return Token::new(TokenKind::Eof, self.current_span());
        };

        let kind = match ch {
            '>' => {
                self.pop_mode();
                if closing {
                    // Leave the children of the element just closed.
                    self.pop_mode();
                } else {
                    self.push_mode(Mode::JsxChildren);
                }
                TokenKind::JsxTagEnd
            }
            '/' if self.peek() == Some('>') => {
                self.advance();
                self.pop_mode();
                TokenKind::JsxSelfClose
            }
            '=' => TokenKind::Eq,
            // Element as an attribute value: `icon=<Star />`
            '<' if !closing => {
                self.push_mode(Mode::JsxTag { closing: false });
                TokenKind::JsxTagStart
            }
            '{' => {
                self.push_mode(Mode::JsxExpr { brace_depth: 0 });
                TokenKind::LBrace
            }
            '"' | '\'' => {
                let text_start = self.pos;
                while let Some(c) = self.peek() {
                    if c == ch {
                        break;
                    }
                    self.advance();
                }
                let text = self.source[text_start..self.pos].to_string();
                if !self.eat(ch) {
                    let span = self.span_from(start, line, col);
                    self.emit_error("Unterminated JSX attribute string", span);
                }
                TokenKind::JsxString(text)
            }
            c if is_ident_start(c) => {
                while let Some(c) = self.peek() {
                    if is_ident_continue(c) || matches!(c, '-' | ':' | '.') {
                        self.advance();
                    } else {
                        break;
                    }
                }
                TokenKind::JsxIdent(self.source[start..self.pos].to_string())
            }
            _ => {
                let span = self.span_from(start, line, col);
                self.emit_error(format!("Unexpected character '{ch}' in JSX tag"), span);
                return self.scan_jsx_tag(closing);
            }
        };

        Token::new(kind, self.span_from(start, line, col))
    }

    /// Scan raw text, a nested tag opener or a `{` container between tags.
    fn scan_jsx_children(&mut self) -> Token {
        let (start, line, col) = (self.pos, self.line, self.col);
        match self.peek() {
            None => {
                self.report_unterminated();
                Token::new(TokenKind::Eof, self.current_span())
            }
            Some('<') => {
                self.advance();
                let kind = if self.eat('/') {
                    self.push_mode(Mode::JsxTag { closing: true });
                    TokenKind::JsxCloseTagStart
                } else {
                    self.push_mode(Mode::JsxTag { closing: false });
                    TokenKind::JsxTagStart
                };
                Token::new(kind, self.span_from(start, line, col))
            }
            Some('{') => {
                self.advance();
                self.push_mode(Mode::JsxExpr { brace_depth: 0 });
                Token::new(TokenKind::LBrace, self.span_from(start, line, col))
            }
            Some(_) => {
                while let Some(c) = self.peek() {
                    if c == '<' || c == '{' {
                        break;
                    }
                    self.advance();
                }
                let text = self.source[start..self.pos].to_string();
                Token::new(TokenKind::JsxText(text), self.span_from(start, line, col))
            }
        }
    }
}

/// Characters that may begin an identifier.
pub fn is_ident_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphabetic()
}

/// Characters that may continue an identifier.
pub fn is_ident_continue(c: char) -> bool {
    c == '$' || c == '_' || c == '\u{200c}' || c == '\u{200d}' || c.is_alphanumeric()
}

/// Lex `source` with JSX enabled, using a throwaway [`SourceFile`].
pub fn tokenize(source: &str) -> LexResult {
    let file = SourceFile::new("input", source);
    Lexer::new(&file).lex()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ident_chars() {
        assert!(is_ident_start('$'));
        assert!(is_ident_start('é'));
        assert!(!is_ident_start('1'));
        assert!(is_ident_continue('1'));
        assert!(!is_ident_continue('-'));
    }

    #[test]
    fn test_tokenize_ends_with_eof() {
        let result = tokenize("");
        assert_eq!(result.tokens.len(), 1);
        assert_eq!(result.tokens[0].kind, TokenKind::Eof);
    }
}
