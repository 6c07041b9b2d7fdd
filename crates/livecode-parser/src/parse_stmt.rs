//! Statement parsing.

use livecode_lexer::token::TokenKind;
use livecode_types::ast::*;

use crate::parser::{ParseMode, Parser};

impl<'src> Parser<'src> {
    /// Parse a block of statements: `{ stmts... }`
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            if let Some(stmt) = self.parse_statement() {
                stmts.push(stmt);
            } else {
                self.synchronize();
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Some(Block {
            stmts,
            span: self.span_since(start),
        })
    }

    /// Parse a function body block, allowing `return`.
    pub(crate) fn parse_function_block(&mut self) -> Option<Block> {
        self.function_depth += 1;
        let saved_no_in = std::mem::take(&mut self.no_in);
        let block = self.parse_block();
        self.no_in = saved_no_in;
        self.function_depth -= 1;
        block
    }

    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        if !self.enter() {
            return None;
        }
        let stmt = self.parse_statement_inner();
        self.leave();
        stmt
    }

    fn parse_statement_inner(&mut self) -> Option<Stmt> {
        match self.peek_kind() {
            TokenKind::LBrace => self.parse_block().map(Stmt::Block),
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let decl = self.parse_var_decl(true)?;
                self.consume_semicolon();
                Some(Stmt::Var(decl))
            }
            TokenKind::Function => self.parse_function_decl().map(Stmt::Function),
            TokenKind::Class => self.parse_class_decl().map(Stmt::Class),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::Do => self.parse_do_while_stmt(),
            TokenKind::Switch => self.parse_switch_stmt(),
            TokenKind::Break | TokenKind::Continue => self.parse_jump_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::Throw => self.parse_throw_stmt(),
            TokenKind::Try => self.parse_try_stmt(),
            TokenKind::Semicolon => {
                let span = self.advance().span;
                Some(Stmt::Empty(span))
            }
            TokenKind::Import
                if !matches!(self.look_ahead(1), TokenKind::LParen | TokenKind::Dot) =>
            {
                if self.options.mode == ParseMode::FunctionBody {
                    self.error_with_suggestion(
                        "Cannot use import statement outside a module",
                        "Pass values in through the scope instead",
                    );
                    return None;
                }
                self.parse_import_decl()
            }
            TokenKind::Export => {
                if self.options.mode == ParseMode::FunctionBody {
                    self.error_at_current("Unexpected token 'export'");
                    return None;
                }
                self.parse_export_decl()
            }
            TokenKind::Ident(word) if word == "async" && !self.newline_before_ahead(1) => {
                self.error_at_current("async functions are not supported");
                None
            }
            TokenKind::Ident(_) if self.look_ahead(1) == &TokenKind::Colon => {
                self.error_at_current("Labeled statements are not supported");
                None
            }
            TokenKind::Ident(_) if self.at_type_declaration() => self.skip_type_declaration(),
            _ => self.parse_expression_statement(),
        }
    }

    fn newline_before_ahead(&self, n: usize) -> bool {
        self.look_ahead_token(n).newline_before
    }

    fn parse_expression_statement(&mut self) -> Option<Stmt> {
        let expr = self.parse_expression()?;
        let span = expr.span;
        self.consume_semicolon();
        Some(Stmt::Expr(ExprStmt { expr, span }))
    }

    /// `var|let|const pattern [= init], ...` without the trailing `;`.
    ///
    /// `require_init` enforces initializers on `const` (not in `for` heads).
    pub(crate) fn parse_var_decl(&mut self, require_init: bool) -> Option<VarDecl> {
        let start = self.current_span();
        let kind = match self.advance().kind {
            TokenKind::Var => VarKind::Var,
            TokenKind::Let => VarKind::Let,
            _ => VarKind::Const,
        };
        let mut declarations = Vec::new();
        loop {
            let pattern = self.parse_binding_pattern()?;
            if self.options.typescript {
                // Definite assignment assertion: `let x!: T`
                self.eat(&TokenKind::Bang);
                self.skip_type_annotation()?;
            }
            let init = if self.eat(&TokenKind::Eq) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            let destructures = !matches!(pattern, Pattern::Ident(_));
            if require_init && init.is_none() && (kind == VarKind::Const || destructures) {
                self.error_at(
                    "Missing initializer in declaration",
                    pattern.span(),
                );
            }
            declarations.push(VarDeclarator { pattern, init });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Some(VarDecl {
            kind,
            declarations,
            span: self.span_since(start),
        })
    }

    /// `if (test) stmt [else stmt]`
    fn parse_if_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance();
        self.expect(&TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Some(Stmt::If(IfStmt {
            test,
            consequent,
            alternate,
            span: self.span_since(start),
        }))
    }

    /// `for (init; test; update) body`, `for (x of xs) body`, `for (k in o) body`
    fn parse_for_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance();
        if self.check_word("await") {
            self.error_at_current("for await is not supported");
            return None;
        }
        self.expect(&TokenKind::LParen)?;

        let saved_no_in = std::mem::replace(&mut self.no_in, true);
        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else if matches!(
            self.peek_kind(),
            TokenKind::Var | TokenKind::Let | TokenKind::Const
        ) {
            Some(ForInit::Var(self.parse_var_decl(false)?))
        } else {
            Some(ForInit::Expr(self.parse_expression()?))
        };
        self.no_in = saved_no_in;

        let each_kind = if self.eat_word("of") {
            Some(ForEachKind::Of)
        } else if self.eat(&TokenKind::In) {
            Some(ForEachKind::In)
        } else {
            None
        };

        if let Some(kind) = each_kind {
            let target = match init {
                Some(ForInit::Var(mut decl)) if decl.declarations.len() == 1 => {
                    let declarator = decl.declarations.remove(0);
                    if declarator.init.is_some() {
                        self.error_at(
                            "for-in/of loop variable declaration may not have an initializer",
                            decl.span,
                        );
                    }
                    ForEachTarget::Decl(decl.kind, declarator.pattern)
                }
                Some(ForInit::Expr(Expr {
                    kind: ExprKind::Ident(name),
                    span,
                })) => ForEachTarget::Ident(Ident::new(name, span)),
                _ => {
                    self.error_at("Invalid left-hand side in for-loop", start);
                    return None;
                }
            };
            let iterable = if kind == ForEachKind::Of {
                self.parse_assignment()?
            } else {
                self.parse_expression()?
            };
            self.expect(&TokenKind::RParen)?;
            let body = Box::new(self.parse_statement()?);
            return Some(Stmt::ForEach(ForEachStmt {
                kind,
                target,
                iterable,
                body,
                span: self.span_since(start),
            }));
        }

        if let Some(ForInit::Var(decl)) = &init {
            if decl.kind == VarKind::Const {
                if let Some(d) = decl.declarations.iter().find(|d| d.init.is_none()) {
                    self.error_at("Missing initializer in const declaration", d.pattern.span());
                }
            }
        }

        self.expect(&TokenKind::Semicolon)?;
        let test = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::Semicolon)?;
        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::RParen)?;
        let body = Box::new(self.parse_statement()?);
        Some(Stmt::For(ForStmt {
            init,
            test,
            update,
            body,
            span: self.span_since(start),
        }))
    }

    fn parse_while_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance();
        self.expect(&TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        let body = Box::new(self.parse_statement()?);
        Some(Stmt::While(WhileStmt {
            test,
            body,
            span: self.span_since(start),
        }))
    }

    /// `do body while (test)`. The trailing `;` is always optional.
    fn parse_do_while_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance();
        let body = Box::new(self.parse_statement()?);
        self.expect(&TokenKind::While)?;
        self.expect(&TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        self.eat(&TokenKind::Semicolon);
        Some(Stmt::DoWhile(WhileStmt {
            test,
            body,
            span: self.span_since(start),
        }))
    }

    fn parse_switch_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance();
        self.expect(&TokenKind::LParen)?;
        let discriminant = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::LBrace)?;

        let mut cases = Vec::new();
        let mut seen_default = false;
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let case_start = self.current_span();
            let test = if self.eat(&TokenKind::Case) {
                Some(self.parse_expression()?)
            } else if self.eat(&TokenKind::Default) {
                if seen_default {
                    self.error_at(
                        "More than one default clause in switch statement",
                        case_start,
                    );
                }
                seen_default = true;
                None
            } else {
                self.error_at_current(format!(
                    "Expected 'case' or 'default', got '{}'",
                    self.peek_kind()
                ));
                return None;
            };
            self.expect(&TokenKind::Colon)?;
            let mut body = Vec::new();
            while !matches!(
                self.peek_kind(),
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
            ) {
                if self.too_many_errors() {
                    break;
                }
                if let Some(stmt) = self.parse_statement() {
                    body.push(stmt);
                } else {
                    self.synchronize();
                }
            }
            cases.push(SwitchCase {
                test,
                body,
                span: self.span_since(case_start),
            });
        }
        self.expect(&TokenKind::RBrace)?;
        Some(Stmt::Switch(SwitchStmt {
            discriminant,
            cases,
            span: self.span_since(start),
        }))
    }

    /// `break` / `continue`. Labels are not supported.
    fn parse_jump_stmt(&mut self) -> Option<Stmt> {
        let token = self.advance();
        if matches!(self.peek_kind(), TokenKind::Ident(_)) && !self.newline_before() {
            self.error_at_current("Labeled statements are not supported");
            return None;
        }
        self.consume_semicolon();
        Some(if token.kind == TokenKind::Break {
            Stmt::Break(token.span)
        } else {
            Stmt::Continue(token.span)
        })
    }

    fn parse_return_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        if self.function_depth == 0 && self.options.mode == ParseMode::Module {
            self.error_at_current("Illegal return statement");
            return None;
        }
        self.advance();
        // A line break after `return` ends the statement.
        let argument = if self.at_statement_end() {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_semicolon();
        Some(Stmt::Return(ReturnStmt {
            argument,
            span: self.span_since(start),
        }))
    }

    fn parse_throw_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance();
        if self.newline_before() {
            self.error_at_current("Illegal newline after throw");
            return None;
        }
        let argument = self.parse_expression()?;
        self.consume_semicolon();
        Some(Stmt::Throw(ThrowStmt {
            argument,
            span: self.span_since(start),
        }))
    }

    /// `try block [catch [(param)] block] [finally block]`
    fn parse_try_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance();
        let block = self.parse_block()?;

        let handler = if self.eat(&TokenKind::Catch) {
            let param = if self.eat(&TokenKind::LParen) {
                let pattern = self.parse_binding_pattern()?;
                if self.options.typescript {
                    self.skip_type_annotation()?;
                }
                self.expect(&TokenKind::RParen)?;
                Some(pattern)
            } else {
                None
            };
            let body = self.parse_block()?;
            Some(CatchClause { param, body })
        } else {
            None
        };

        let finalizer = if self.eat(&TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            self.error_at_current("Missing catch or finally after try");
            return None;
        }

        Some(Stmt::Try(TryStmt {
            block,
            handler,
            finalizer,
            span: self.span_since(start),
        }))
    }
}
