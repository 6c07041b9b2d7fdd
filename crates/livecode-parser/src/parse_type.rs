//! TypeScript erasure.
//!
//! Type annotations carry no runtime meaning in the playground, so instead of
//! building type nodes the parser skips them. The `try_*` helpers never
//! report errors and are safe for speculative parsing (generic call
//! arguments); the other entry points report "Invalid type annotation".

use livecode_lexer::token::TokenKind;
use livecode_types::ast::Stmt;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Reporting Entry Points
    // ══════════════════════════════════════════════════════════════════════════

    /// Skip `: Type` if present.
    pub(crate) fn skip_type_annotation(&mut self) -> Option<()> {
        if self.eat(&TokenKind::Colon) {
            self.skip_type()
        } else {
            Some(())
        }
    }

    pub(crate) fn skip_type(&mut self) -> Option<()> {
        if self.try_skip_type() {
            Some(())
        } else {
            self.error_at_current(format!(
                "Invalid type annotation near '{}'",
                self.peek_kind()
            ));
            None
        }
    }

    /// Skip `<A, B>` type arguments.
    pub(crate) fn skip_type_args(&mut self) -> Option<()> {
        if self.try_skip_type_args() {
            Some(())
        } else {
            self.error_at_current("Invalid type arguments");
            None
        }
    }

    /// Skip `<T extends U = V, ...>` type parameters.
    pub(crate) fn skip_type_params(&mut self) -> Option<()> {
        if self.try_skip_type_params() {
            Some(())
        } else {
            self.error_at_current("Invalid type parameters");
            None
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Speculative Skipping
    // ══════════════════════════════════════════════════════════════════════════

    /// `Type = ["|" | "&"] Operand { ("|" | "&") Operand } [extends Type ? Type : Type]`
    pub(crate) fn try_skip_type(&mut self) -> bool {
        if !self.eat(&TokenKind::Pipe) {
            self.eat(&TokenKind::Amp);
        }
        loop {
            if !self.try_skip_type_operand() {
                return false;
            }
            if self.eat(&TokenKind::Pipe) || self.eat(&TokenKind::Amp) {
                continue;
            }
            break;
        }
        if self.eat(&TokenKind::Extends) {
            return self.try_skip_type()
                && self.eat(&TokenKind::Question)
                && self.try_skip_type()
                && self.eat(&TokenKind::Colon)
                && self.try_skip_type();
        }
        true
    }

    fn try_skip_type_operand(&mut self) -> bool {
        while let TokenKind::Ident(word) = self.peek_kind() {
            let is_prefix = matches!(word.as_str(), "keyof" | "readonly" | "unique" | "infer")
                && matches!(
                    self.look_ahead(1),
                    TokenKind::Ident(_) | TokenKind::LParen | TokenKind::LBracket
                );
            if !is_prefix {
                break;
            }
            self.advance();
        }

        let ok = match self.peek_kind() {
            TokenKind::Ident(_) => {
                self.advance();
                while self.check(&TokenKind::Dot) {
                    self.advance();
                    if !matches!(self.peek_kind(), TokenKind::Ident(_)) {
                        return false;
                    }
                    self.advance();
                }
                if self.check(&TokenKind::Less) && !self.try_skip_type_args() {
                    return false;
                }
                // Type predicate: `value is Foo`
                if self.check_word("is") && !self.newline_before() {
                    self.advance();
                    return self.try_skip_type();
                }
                true
            }
            TokenKind::Null
            | TokenKind::Void
            | TokenKind::This
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Number(_)
            | TokenKind::Str(_)
            | TokenKind::Template(_) => {
                self.advance();
                true
            }
            TokenKind::Minus => {
                self.advance();
                matches!(self.advance().kind, TokenKind::Number(_))
            }
            TokenKind::TypeOf => {
                self.advance();
                if !matches!(self.advance().kind, TokenKind::Ident(_)) {
                    return false;
                }
                while self.eat(&TokenKind::Dot) {
                    if !matches!(self.advance().kind, TokenKind::Ident(_)) {
                        return false;
                    }
                }
                true
            }
            TokenKind::LParen => {
                // Parenthesised type or function type `(a: A) => R`.
                if !self.skip_balanced() {
                    return false;
                }
                if self.eat(&TokenKind::Arrow) {
                    return self.try_skip_type();
                }
                true
            }
            TokenKind::Less => {
                // Generic function type `<T>(x: T) => T`.
                self.try_skip_type_params()
                    && self.check(&TokenKind::LParen)
                    && self.skip_balanced()
                    && self.eat(&TokenKind::Arrow)
                    && self.try_skip_type()
            }
            TokenKind::New => {
                self.advance();
                self.check(&TokenKind::LParen)
                    && self.skip_balanced()
                    && self.eat(&TokenKind::Arrow)
                    && self.try_skip_type()
            }
            TokenKind::LBracket | TokenKind::LBrace => self.skip_balanced(),
            _ => false,
        };
        if !ok {
            return false;
        }

        // Array and indexed-access suffixes: `T[]`, `T["key"]`
        while self.check(&TokenKind::LBracket) && !self.newline_before() {
            if !self.skip_balanced() {
                return false;
            }
        }
        true
    }

    /// `< Type {, Type} >`
    pub(crate) fn try_skip_type_args(&mut self) -> bool {
        if !self.eat(&TokenKind::Less) {
            return false;
        }
        loop {
            if !self.try_skip_type() {
                return false;
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
            if self.check(&TokenKind::Greater) {
                break;
            }
        }
        self.eat(&TokenKind::Greater)
    }

    /// `< [const|in|out] Name [extends Type] [= Type] {, ...} >`
    pub(crate) fn try_skip_type_params(&mut self) -> bool {
        if !self.eat(&TokenKind::Less) {
            return false;
        }
        while !self.check(&TokenKind::Greater) {
            while matches!(self.peek_kind(), TokenKind::Ident(w) if w == "out" || w == "const")
                && matches!(self.look_ahead(1), TokenKind::Ident(_))
            {
                self.advance();
            }
            if self.check(&TokenKind::In) {
                self.advance();
            }
            if !matches!(self.advance().kind, TokenKind::Ident(_)) {
                return false;
            }
            if self.eat(&TokenKind::Extends) && !self.try_skip_type() {
                return false;
            }
            if self.eat(&TokenKind::Eq) && !self.try_skip_type() {
                return false;
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.eat(&TokenKind::Greater)
    }

    /// Skip a bracketed group starting at `(`, `[` or `{`, including nested
    /// groups of any bracket kind.
    fn skip_balanced(&mut self) -> bool {
        if !matches!(
            self.peek_kind(),
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace
        ) {
            return false;
        }
        let mut depth = 0u32;
        loop {
            match self.advance().kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return true;
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Declarations Without Runtime Effect
    // ══════════════════════════════════════════════════════════════════════════

    /// `interface X ...`, `type X = ...` or `declare ...` at a statement start.
    pub(crate) fn at_type_declaration(&self) -> bool {
        if !self.options.typescript {
            return false;
        }
        let TokenKind::Ident(word) = self.peek_kind() else {
            return false;
        };
        let next_is_name = matches!(self.look_ahead(1), TokenKind::Ident(_))
            && !self.look_ahead_token(1).newline_before;
        match word.as_str() {
            "interface" => next_is_name,
            "type" => {
                next_is_name && matches!(self.look_ahead(2), TokenKind::Eq | TokenKind::Less)
            }
            "declare" => {
                !self.look_ahead_token(1).newline_before
                    && (next_is_name
                        || matches!(
                            self.look_ahead(1),
                            TokenKind::Const
                                | TokenKind::Let
                                | TokenKind::Var
                                | TokenKind::Function
                                | TokenKind::Class
                        ))
            }
            _ => false,
        }
    }

    /// Skip a declaration recognised by [`Parser::at_type_declaration`].
    pub(crate) fn skip_type_declaration(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        let word = match self.advance().kind {
            TokenKind::Ident(word) => word,
            _ => return None,
        };
        match word.as_str() {
            "interface" => {
                self.expect_identifier()?;
                if self.check(&TokenKind::Less) {
                    self.skip_type_params()?;
                }
                if self.eat(&TokenKind::Extends) {
                    loop {
                        self.skip_type()?;
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                if !self.check(&TokenKind::LBrace) || !self.skip_balanced() {
                    self.error_at_current("Expected interface body");
                    return None;
                }
            }
            "type" => {
                self.expect_identifier()?;
                if self.check(&TokenKind::Less) {
                    self.skip_type_params()?;
                }
                self.expect(&TokenKind::Eq)?;
                self.skip_type()?;
                self.consume_semicolon();
            }
            _ => {
                // `declare ...`: skip to the end of the statement.
                while !self.at_end() {
                    if self.eat(&TokenKind::Semicolon) {
                        break;
                    }
                    if self.check(&TokenKind::RBrace) || self.newline_before() {
                        break;
                    }
                    if matches!(
                        self.peek_kind(),
                        TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace
                    ) {
                        if !self.skip_balanced() {
                            break;
                        }
                    } else {
                        self.advance();
                    }
                }
            }
        }
        Some(Stmt::Empty(self.span_since(start)))
    }

    pub(crate) fn is_index_signature(&self) -> bool {
        self.check(&TokenKind::LBracket)
            && matches!(self.look_ahead(1), TokenKind::Ident(_))
            && self.look_ahead(2) == &TokenKind::Colon
    }

    /// `[key: string]: Type;` inside a class body.
    pub(crate) fn skip_index_signature(&mut self) -> Option<()> {
        if !self.skip_balanced() {
            self.error_at_current("Invalid index signature");
            return None;
        }
        self.skip_type_annotation()?;
        self.consume_semicolon();
        Some(())
    }
}
