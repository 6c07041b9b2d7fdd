//! Expression parsing with full operator precedence.
//!
//! Precedence (lowest → highest):
//! 1. `,` (sequence)
//! 2. `=`, `+=`, ... (assignment, right-assoc), arrow functions
//! 3. `? :` (conditional)
//! 4. `??`
//! 5. `||`
//! 6. `&&`
//! 7. `==`, `!=`, `===`, `!==`
//! 8. `<`, `>`, `<=`, `>=`, `instanceof`, `in`, TypeScript `as`/`satisfies`
//! 9. `+`, `-`
//! 10. `*`, `/`, `%`
//! 11. `**` (right-assoc)
//! 12. unary `! - + typeof void delete`, prefix `++ --`
//! 13. postfix `++ --`
//! 14. `.`, `?.`, `[]`, `()` (member access / call), `new`

use std::rc::Rc;

use livecode_lexer::token::TokenKind;
use livecode_types::ast::*;

use crate::parser::Parser;

/// A binary operator as classified by the precedence table.
#[derive(Clone, Copy)]
enum Infix {
    Binary(BinOp),
    Logical(LogicalOp),
}

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Points
    // ══════════════════════════════════════════════════════════════════════════

    /// `Expression = Assignment { "," Assignment }`
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        let first = self.parse_assignment()?;
        if !self.check(&TokenKind::Comma) {
            return Some(first);
        }
        let start = first.span;
        let mut exprs = vec![first];
        while self.eat(&TokenKind::Comma) {
            exprs.push(self.parse_assignment()?);
        }
        Some(Expr::new(ExprKind::Sequence(exprs), self.span_since(start)))
    }

    /// Run `f` with the `in` operator re-enabled (inside brackets, `in` is
    /// always an operator even in a `for` head).
    pub(crate) fn with_in<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::take(&mut self.no_in);
        let result = f(self);
        self.no_in = saved;
        result
    }

    /// `Assignment = ArrowFunction | Conditional [ AssignOp Assignment ]`
    pub(crate) fn parse_assignment(&mut self) -> Option<Expr> {
        if !self.enter() {
            return None;
        }
        let result = self.parse_assignment_inner();
        self.leave();
        result
    }

    fn parse_assignment_inner(&mut self) -> Option<Expr> {
        if self.is_arrow_start() {
            return self.parse_arrow_function();
        }
        if self.check_word("async")
            && matches!(
                self.look_ahead(1),
                TokenKind::Function | TokenKind::LParen | TokenKind::Ident(_)
            )
            && !self.look_ahead_token(1).newline_before
        {
            self.error_at_current("async functions are not supported");
            return None;
        }

        let target = self.parse_conditional()?;
        let Some(op) = self.assign_op() else {
            return Some(target);
        };
        if !is_valid_assign_target(&target, op == AssignOp::Assign) {
            self.error_at("Invalid left-hand side in assignment", target.span);
            return None;
        }
        self.advance();
        let value = self.parse_assignment()?;
        let span = target.span.merge(value.span);
        Some(Expr::new(
            ExprKind::Assign {
                target: Box::new(target),
                op,
                value: Box::new(value),
            },
            span,
        ))
    }

    fn assign_op(&self) -> Option<AssignOp> {
        Some(match self.peek_kind() {
            TokenKind::Eq => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::Add,
            TokenKind::MinusEq => AssignOp::Sub,
            TokenKind::StarEq => AssignOp::Mul,
            TokenKind::SlashEq => AssignOp::Div,
            TokenKind::PercentEq => AssignOp::Mod,
            TokenKind::StarStarEq => AssignOp::Pow,
            TokenKind::AmpAmpEq => AssignOp::And,
            TokenKind::PipePipeEq => AssignOp::Or,
            TokenKind::QuestionQuestionEq => AssignOp::Nullish,
            _ => return None,
        })
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Arrow Functions
    // ══════════════════════════════════════════════════════════════════════════

    /// Whether the cursor is at `ident =>` or `( ... ) =>` (with an optional
    /// TypeScript return type between `)` and `=>`).
    fn is_arrow_start(&self) -> bool {
        match self.peek_kind() {
            TokenKind::Ident(_) => {
                self.look_ahead(1) == &TokenKind::Arrow && !self.look_ahead_token(1).newline_before
            }
            TokenKind::LParen => {
                let Some(close) = self.matching_paren_offset() else {
                    return false;
                };
                let after = self.look_ahead_token(close + 1);
                match after.kind {
                    TokenKind::Arrow => !after.newline_before,
                    TokenKind::Colon if self.options.typescript => {
                        self.arrow_after_return_type(close + 2)
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Offset from the cursor of the `)` matching the `(` at the cursor.
    fn matching_paren_offset(&self) -> Option<usize> {
        let mut depth = 0u32;
        let mut n = 0;
        loop {
            match self.look_ahead(n) {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(n);
                    }
                }
                TokenKind::Eof => return None,
                _ => {}
            }
            n += 1;
        }
    }

    /// Scan a return type annotation starting `n` tokens ahead and report
    /// whether `=>` follows it on the same line.
    fn arrow_after_return_type(&self, mut n: usize) -> bool {
        let mut depth = 0u32;
        loop {
            let token = self.look_ahead_token(n);
            if depth == 0 && token.newline_before {
                return false;
            }
            match token.kind {
                TokenKind::Arrow if depth == 0 => return true,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace | TokenKind::Less => {
                    depth += 1
                }
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace | TokenKind::Greater => {
                    if depth == 0 {
                        return false;
                    }
                    depth -= 1;
                }
                TokenKind::Semicolon | TokenKind::Comma | TokenKind::Eq | TokenKind::Eof
                    if depth == 0 =>
                {
                    return false
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            n += 1;
        }
    }

    /// `ident => body` or `(params) [: R] => body`
    fn parse_arrow_function(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let params = if let TokenKind::Ident(_) = self.peek_kind() {
            let ident = self.expect_identifier()?;
            vec![Param {
                pattern: Pattern::Ident(ident),
                default: None,
                rest: false,
            }]
        } else {
            let params = self.with_in(|p| p.parse_params())?;
            if self.options.typescript {
                self.skip_type_annotation()?;
            }
            params
        };
        self.expect(&TokenKind::Arrow)?;

        let body = if self.check(&TokenKind::LBrace) {
            FunctionBody::Block(self.parse_function_block()?)
        } else {
            self.function_depth += 1;
            let expr = self.parse_assignment();
            self.function_depth -= 1;
            FunctionBody::Expr(Box::new(expr?))
        };

        let span = self.span_since(start);
        Some(Expr::new(
            ExprKind::Arrow(Rc::new(FunctionDef {
                name: None,
                params,
                body,
                is_arrow: true,
                span,
            })),
            span,
        ))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// `Conditional = Binary [ "?" Assignment ":" Assignment ]`
    fn parse_conditional(&mut self) -> Option<Expr> {
        let test = self.parse_binary(1)?;
        if !self.eat(&TokenKind::Question) {
            return Some(test);
        }
        let consequent = self.with_in(|p| p.parse_assignment())?;
        self.expect(&TokenKind::Colon)?;
        let alternate = self.parse_assignment()?;
        let span = test.span.merge(alternate.span);
        Some(Expr::new(
            ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            span,
        ))
    }

    /// Precedence of the infix operator at the cursor.
    fn infix_op(&self) -> Option<(u8, Infix)> {
        Some(match self.peek_kind() {
            TokenKind::QuestionQuestion => (1, Infix::Logical(LogicalOp::Nullish)),
            TokenKind::PipePipe => (2, Infix::Logical(LogicalOp::Or)),
            TokenKind::AmpAmp => (3, Infix::Logical(LogicalOp::And)),
            TokenKind::EqEq => (6, Infix::Binary(BinOp::Eq)),
            TokenKind::BangEq => (6, Infix::Binary(BinOp::NotEq)),
            TokenKind::EqEqEq => (6, Infix::Binary(BinOp::StrictEq)),
            TokenKind::BangEqEq => (6, Infix::Binary(BinOp::StrictNotEq)),
            TokenKind::Less => (7, Infix::Binary(BinOp::Less)),
            TokenKind::Greater => (7, Infix::Binary(BinOp::Greater)),
            TokenKind::LessEq => (7, Infix::Binary(BinOp::LessEq)),
            TokenKind::GreaterEq => (7, Infix::Binary(BinOp::GreaterEq)),
            TokenKind::InstanceOf => (7, Infix::Binary(BinOp::InstanceOf)),
            TokenKind::In if !self.no_in => (7, Infix::Binary(BinOp::In)),
            TokenKind::Plus => (9, Infix::Binary(BinOp::Add)),
            TokenKind::Minus => (9, Infix::Binary(BinOp::Sub)),
            TokenKind::Star => (10, Infix::Binary(BinOp::Mul)),
            TokenKind::Slash => (10, Infix::Binary(BinOp::Div)),
            TokenKind::Percent => (10, Infix::Binary(BinOp::Mod)),
            TokenKind::StarStar => (11, Infix::Binary(BinOp::Pow)),
            _ => return None,
        })
    }

    /// Precedence climbing over the binary and logical operators.
    fn parse_binary(&mut self, min_prec: u8) -> Option<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            if self.options.typescript
                && min_prec <= 7
                && (self.check_word("as") || self.check_word("satisfies"))
                && !self.newline_before()
            {
                self.advance();
                if !self.eat(&TokenKind::Const) {
                    self.skip_type()?;
                }
                left.span = self.span_since(left.span);
                continue;
            }

            let Some((prec, op)) = self.infix_op() else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.advance();
            let next_min = if matches!(op, Infix::Binary(BinOp::Pow)) {
                prec
            } else {
                prec + 1
            };
            let right = self.parse_binary(next_min)?;
            let span = left.span.merge(right.span);
            let kind = match op {
                Infix::Binary(op) => ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                Infix::Logical(op) => ExprKind::Logical {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
            };
            left = Expr::new(kind, span);
        }
        Some(left)
    }

    /// `Unary = ("!" | "-" | "+" | "typeof" | "void" | "delete") Unary
    ///        | ("++" | "--") Unary | Postfix`
    fn parse_unary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let op = match self.peek_kind() {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::TypeOf => Some(UnaryOp::TypeOf),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(op) = op {
            if !self.enter() {
                return None;
            }
            self.advance();
            let operand = self.parse_unary();
            self.leave();
            let operand = operand?;
            return Some(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                self.span_since(start),
            ));
        }

        if matches!(self.peek_kind(), TokenKind::PlusPlus | TokenKind::MinusMinus) {
            let op = if self.advance().kind == TokenKind::PlusPlus {
                UpdateOp::Inc
            } else {
                UpdateOp::Dec
            };
            let target = self.parse_unary()?;
            if !is_simple_target(&target) {
                self.error_at("Invalid left-hand side expression in prefix operation", target.span);
                return None;
            }
            return Some(Expr::new(
                ExprKind::Update {
                    op,
                    prefix: true,
                    target: Box::new(target),
                },
                self.span_since(start),
            ));
        }

        self.parse_postfix()
    }

    /// `Postfix = CallMember [ "++" | "--" ]` (no line break before the operator)
    fn parse_postfix(&mut self) -> Option<Expr> {
        let expr = self.parse_call_member()?;
        let op = match self.peek_kind() {
            TokenKind::PlusPlus if !self.newline_before() => UpdateOp::Inc,
            TokenKind::MinusMinus if !self.newline_before() => UpdateOp::Dec,
            _ => return Some(expr),
        };
        if !is_simple_target(&expr) {
            self.error_at_current("Invalid left-hand side expression in postfix operation");
            return None;
        }
        self.advance();
        let span = self.span_since(expr.span);
        Some(Expr::new(
            ExprKind::Update {
                op,
                prefix: false,
                target: Box::new(expr),
            },
            span,
        ))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Member Access & Calls
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_call_member(&mut self) -> Option<Expr> {
        let mut expr = if self.check(&TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };

        loop {
            match self.peek_kind() {
                TokenKind::Dot | TokenKind::LBracket => {
                    expr = self.parse_member_suffix(expr, false)?;
                }
                TokenKind::QuestionDot => {
                    self.advance();
                    if self.check(&TokenKind::LParen) {
                        let args = self.parse_arguments()?;
                        let span = self.span_since(expr.span);
                        expr = Expr::new(
                            ExprKind::Call {
                                callee: Box::new(expr),
                                args,
                                optional: true,
                            },
                            span,
                        );
                    } else {
                        expr = self.parse_member_suffix(expr, true)?;
                    }
                }
                TokenKind::LParen => {
                    let args = self.parse_arguments()?;
                    let span = self.span_since(expr.span);
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                            optional: false,
                        },
                        span,
                    );
                }
                // Non-null assertion `value!`
                TokenKind::Bang if self.options.typescript && !self.newline_before() => {
                    self.advance();
                }
                // Explicit type arguments on a call: `useState<string>("")`
                TokenKind::Less if self.options.typescript => {
                    let saved = self.save();
                    if self.try_skip_type_args() && self.check(&TokenKind::LParen) {
                        continue;
                    }
                    self.restore(saved);
                    break;
                }
                TokenKind::Template(_) | TokenKind::TemplateStart(_) => {
                    self.error_at_current("Tagged templates are not supported");
                    return None;
                }
                _ => break,
            }
        }
        Some(expr)
    }

    /// Parse one `.name` / `[expr]` suffix (the `?.` has already been
    /// consumed when `optional` is set).
    fn parse_member_suffix(&mut self, object: Expr, optional: bool) -> Option<Expr> {
        let property = if self.eat(&TokenKind::LBracket) {
            let prop = self.with_in(|p| p.parse_expression())?;
            self.expect(&TokenKind::RBracket)?;
            MemberProp::Computed(Box::new(prop))
        } else {
            if !optional {
                self.expect(&TokenKind::Dot)?;
            }
            MemberProp::Named(self.expect_property_name()?)
        };
        let span = self.span_since(object.span);
        Some(Expr::new(
            ExprKind::Member {
                object: Box::new(object),
                property,
                optional,
            },
            span,
        ))
    }

    /// A primary expression followed by `.name` and `[expr]` suffixes only,
    /// as used for `new` callees and `extends` clauses.
    pub(crate) fn parse_lhs_no_call(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;
        while matches!(self.peek_kind(), TokenKind::Dot | TokenKind::LBracket) {
            expr = self.parse_member_suffix(expr, false)?;
        }
        Some(expr)
    }

    /// `new Callee [<T>] [(args)]`
    fn parse_new(&mut self) -> Option<Expr> {
        let start = self.current_span();
        self.expect(&TokenKind::New)?;
        if self.check(&TokenKind::Dot) {
            self.error_at_current("new.target is not supported");
            return None;
        }
        let callee = if self.check(&TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_lhs_no_call()?
        };
        if self.options.typescript && self.check(&TokenKind::Less) {
            let saved = self.save();
            if !self.try_skip_type_args() {
                self.restore(saved);
            }
        }
        let args = if self.check(&TokenKind::LParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Some(Expr::new(
            ExprKind::New {
                callee: Box::new(callee),
                args,
            },
            self.span_since(start),
        ))
    }

    /// `( [ ["..."] Assignment {, ["..."] Assignment} [,] ] )`
    pub(crate) fn parse_arguments(&mut self) -> Option<Vec<ArrayElement>> {
        self.expect(&TokenKind::LParen)?;
        let args = self.with_in(|p| {
            let mut args = Vec::new();
            while !p.check(&TokenKind::RParen) && !p.at_end() {
                if p.eat(&TokenKind::DotDotDot) {
                    args.push(ArrayElement::Spread(p.parse_assignment()?));
                } else {
                    args.push(ArrayElement::Expr(p.parse_assignment()?));
                }
                if !p.eat(&TokenKind::Comma) {
                    break;
                }
            }
            Some(args)
        })?;
        self.expect(&TokenKind::RParen)?;
        Some(args)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary Expressions
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> Option<Expr> {
        let token = self.peek().clone();
        let span = token.span;
        let kind = match token.kind {
            TokenKind::Number(n) => {
                self.advance();
                ExprKind::Number(n)
            }
            TokenKind::Str(s) => {
                self.advance();
                ExprKind::String(s)
            }
            TokenKind::Template(s) => {
                self.advance();
                ExprKind::Template(vec![TemplatePart::Literal(s)])
            }
            TokenKind::TemplateStart(_) => return self.parse_template(),
            TokenKind::True => {
                self.advance();
                ExprKind::Bool(true)
            }
            TokenKind::False => {
                self.advance();
                ExprKind::Bool(false)
            }
            TokenKind::Null => {
                self.advance();
                ExprKind::Null
            }
            TokenKind::This => {
                self.advance();
                ExprKind::This
            }
            TokenKind::Super => {
                self.advance();
                if !matches!(self.peek_kind(), TokenKind::LParen | TokenKind::Dot) {
                    self.error_at_current("'super' keyword unexpected here");
                    return None;
                }
                ExprKind::Super
            }
            TokenKind::Ident(name) => {
                self.advance();
                ExprKind::Ident(name)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.with_in(|p| p.parse_expression())?;
                self.expect(&TokenKind::RParen)?;
                return Some(Expr::new(
                    ExprKind::Paren(Box::new(inner)),
                    self.span_since(span),
                ));
            }
            TokenKind::LBracket => return self.parse_array_literal(),
            TokenKind::LBrace => return self.parse_object_literal(),
            TokenKind::Function => {
                let func = self.parse_function(false)?;
                return Some(Expr::new(
                    ExprKind::Function(Rc::new(func)),
                    self.span_since(span),
                ));
            }
            TokenKind::Class => {
                let class = self.parse_class(false)?;
                return Some(Expr::new(
                    ExprKind::Class(Rc::new(class)),
                    self.span_since(span),
                ));
            }
            TokenKind::JsxTagStart => {
                let element = self.parse_jsx_element()?;
                return Some(Expr::new(
                    ExprKind::Jsx(Box::new(element)),
                    self.span_since(span),
                ));
            }
            TokenKind::Slash | TokenKind::SlashEq => {
                self.error_at_current("Regular expression literals are not supported");
                return None;
            }
            TokenKind::Import => {
                self.error_at_current("Dynamic import is not supported");
                return None;
            }
            TokenKind::Less if self.options.typescript => {
                let saved = self.save();
                if self.try_skip_type_params() && self.is_arrow_start() {
                    return self.parse_arrow_function();
                }
                self.restore(saved);
                self.error_with_suggestion(
                    "Angle-bracket type assertions are not supported",
                    "Use 'value as Type' instead",
                );
                return None;
            }
            _ => {
                self.error_at_current(format!("Unexpected token '{}'", token.kind));
                return None;
            }
        };
        Some(Expr::new(kind, span))
    }

    /// Template literal with substitutions:
    /// `TemplateStart ${ Expr } { TemplatePart ${ Expr } } TemplateEnd`
    fn parse_template(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let mut parts = Vec::new();
        if let TokenKind::TemplateStart(text) = self.advance().kind {
            if !text.is_empty() {
                parts.push(TemplatePart::Literal(text));
            }
        }
        loop {
            self.expect(&TokenKind::InterpolationStart)?;
            let expr = self.with_in(|p| p.parse_expression())?;
            parts.push(TemplatePart::Expr(expr));
            self.expect(&TokenKind::InterpolationEnd)?;
            match self.peek_kind().clone() {
                TokenKind::TemplatePart(text) => {
                    self.advance();
                    if !text.is_empty() {
                        parts.push(TemplatePart::Literal(text));
                    }
                }
                TokenKind::TemplateEnd(text) => {
                    self.advance();
                    if !text.is_empty() {
                        parts.push(TemplatePart::Literal(text));
                    }
                    break;
                }
                _ => {
                    self.error_at_current("Unterminated template literal");
                    return None;
                }
            }
        }
        Some(Expr::new(ExprKind::Template(parts), self.span_since(start)))
    }

    /// `[ elem, , ...spread ]`: holes read as `undefined`.
    fn parse_array_literal(&mut self) -> Option<Expr> {
        let start = self.current_span();
        self.expect(&TokenKind::LBracket)?;
        let elements = self.with_in(|p| {
            let mut elements = Vec::new();
            while !p.check(&TokenKind::RBracket) && !p.at_end() {
                if p.check(&TokenKind::Comma) {
                    let hole = p.advance().span;
                    elements.push(ArrayElement::Expr(Expr::new(
                        ExprKind::Ident("undefined".to_string()),
                        hole,
                    )));
                    continue;
                }
                if p.eat(&TokenKind::DotDotDot) {
                    elements.push(ArrayElement::Spread(p.parse_assignment()?));
                } else {
                    elements.push(ArrayElement::Expr(p.parse_assignment()?));
                }
                if !p.eat(&TokenKind::Comma) {
                    break;
                }
            }
            Some(elements)
        })?;
        self.expect(&TokenKind::RBracket)?;
        Some(Expr::new(ExprKind::Array(elements), self.span_since(start)))
    }

    /// `{ key: value, shorthand, method() {}, [computed]: v, ...spread }`
    fn parse_object_literal(&mut self) -> Option<Expr> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace)?;
        let props = self.with_in(|p| {
            let mut props = Vec::new();
            while !p.check(&TokenKind::RBrace) && !p.at_end() {
                props.push(p.parse_object_prop()?);
                if !p.eat(&TokenKind::Comma) {
                    break;
                }
            }
            Some(props)
        })?;
        self.expect(&TokenKind::RBrace)?;
        Some(Expr::new(ExprKind::Object(props), self.span_since(start)))
    }

    fn parse_object_prop(&mut self) -> Option<ObjectProp> {
        if self.eat(&TokenKind::DotDotDot) {
            return Some(ObjectProp::Spread(self.parse_assignment()?));
        }
        let is_modifier = (self.check_word("get") || self.check_word("set") || self.check_word("async"))
            && !matches!(
                self.look_ahead(1),
                TokenKind::Colon | TokenKind::Comma | TokenKind::RBrace | TokenKind::LParen
            );
        if is_modifier {
            self.error_at_current("Getters, setters and async methods are not supported");
            return None;
        }

        let key_token = self.peek().clone();
        let key = self.parse_property_key()?;

        if self.check(&TokenKind::LParen) || (self.options.typescript && self.check(&TokenKind::Less))
        {
            let (params, body) = self.parse_function_rest()?;
            let name = match &key {
                PropKey::Ident(n) => Some(Ident::new(n.clone(), key_token.span)),
                _ => None,
            };
            let func = Rc::new(FunctionDef {
                name,
                params,
                body: FunctionBody::Block(body),
                is_arrow: false,
                span: self.span_since(key_token.span),
            });
            return Some(ObjectProp::Method { key, func });
        }

        if self.eat(&TokenKind::Colon) {
            let value = self.parse_assignment()?;
            return Some(ObjectProp::KeyValue { key, value });
        }

        match key_token.kind {
            TokenKind::Ident(name)
                if matches!(self.peek_kind(), TokenKind::Comma | TokenKind::RBrace) =>
            {
                Some(ObjectProp::Shorthand(Ident::new(name, key_token.span)))
            }
            _ => {
                self.error_at_current(format!(
                    "Unexpected token '{}' in object literal",
                    self.peek_kind()
                ));
                None
            }
        }
    }
}

/// `Ident`, a non-optional member access, or a parenthesised one of those.
fn is_simple_target(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Ident(_) => true,
        ExprKind::Member { optional, .. } => !optional,
        ExprKind::Paren(inner) => is_simple_target(inner),
        _ => false,
    }
}

/// Plain `=` also accepts array and object destructuring targets.
fn is_valid_assign_target(expr: &Expr, allow_destructuring: bool) -> bool {
    if is_simple_target(expr) {
        return true;
    }
    if !allow_destructuring {
        return false;
    }
    match &expr.kind {
        ExprKind::Array(elements) => elements.iter().all(|e| match e {
            ArrayElement::Expr(e) | ArrayElement::Spread(e) => match &e.kind {
                ExprKind::Assign {
                    target,
                    op: AssignOp::Assign,
                    ..
                } => is_valid_assign_target(target, true),
                _ => is_valid_assign_target(e, true),
            },
        }),
        ExprKind::Object(props) => props.iter().all(|p| match p {
            ObjectProp::KeyValue { value, .. } => is_valid_assign_target(value, true),
            ObjectProp::Shorthand(_) => true,
            ObjectProp::Spread(e) => is_simple_target(e),
            ObjectProp::Method { .. } => false,
        }),
        _ => false,
    }
}
