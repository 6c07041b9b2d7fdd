//! Declaration parsing: functions, classes, binding patterns, and the
//! `import`/`export` forms of module code.

use std::rc::Rc;

use livecode_lexer::token::TokenKind;
use livecode_types::ast::*;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Functions
    // ══════════════════════════════════════════════════════════════════════════

    /// `function name(params) { body }`
    pub(crate) fn parse_function_decl(&mut self) -> Option<Rc<FunctionDef>> {
        let func = self.parse_function(true)?;
        Some(Rc::new(func))
    }

    /// Parse `function [name](params) { body }`. The name is required for
    /// declarations.
    pub(crate) fn parse_function(&mut self, require_name: bool) -> Option<FunctionDef> {
        let start = self.current_span();
        self.expect(&TokenKind::Function)?;
        if self.check(&TokenKind::Star) {
            self.error_at_current("Generator functions are not supported");
            return None;
        }
        let name = if matches!(self.peek_kind(), TokenKind::Ident(_)) {
            Some(self.expect_identifier()?)
        } else {
            if require_name {
                self.error_at_current(format!(
                    "Function statements require a function name, got '{}'",
                    self.peek_kind()
                ));
                return None;
            }
            None
        };
        let (params, body) = self.parse_function_rest()?;
        Some(FunctionDef {
            name,
            params,
            body: FunctionBody::Block(body),
            is_arrow: false,
            span: self.span_since(start),
        })
    }

    /// `[<T>](params)[: R] { body }` shared by functions and methods.
    pub(crate) fn parse_function_rest(&mut self) -> Option<(Vec<Param>, Block)> {
        if self.options.typescript && self.check(&TokenKind::Less) {
            self.skip_type_params()?;
        }
        let params = self.parse_params()?;
        if self.options.typescript {
            self.skip_type_annotation()?;
        }
        let body = self.parse_function_block()?;
        Some((params, body))
    }

    /// `( [param {, param}] [,] )`
    pub(crate) fn parse_params(&mut self) -> Option<Vec<Param>> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.at_end() {
            // A `this: T` parameter only exists for the type checker.
            if self.options.typescript
                && self.check(&TokenKind::This)
                && self.look_ahead(1) == &TokenKind::Colon
            {
                self.advance();
                self.skip_type_annotation()?;
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
                continue;
            }
            let param = self.parse_param()?;
            let is_rest = param.rest;
            params.push(param);
            if is_rest && !self.check(&TokenKind::RParen) {
                self.error_at_current("Rest parameter must be last formal parameter");
                return None;
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Some(params)
    }

    fn parse_param(&mut self) -> Option<Param> {
        if self.options.typescript {
            self.skip_modifiers();
        }
        let rest = self.eat(&TokenKind::DotDotDot);
        let pattern = self.parse_binding_pattern()?;
        if self.options.typescript {
            self.eat(&TokenKind::Question);
            self.skip_type_annotation()?;
        }
        let default = if self.eat(&TokenKind::Eq) {
            Some(self.parse_assignment()?)
        } else {
            None
        };
        Some(Param {
            pattern,
            default,
            rest,
        })
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Classes
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn parse_class_decl(&mut self) -> Option<Rc<ClassDef>> {
        Some(Rc::new(self.parse_class(true)?))
    }

    /// `class [Name] [extends Expr] { members }`
    pub(crate) fn parse_class(&mut self, require_name: bool) -> Option<ClassDef> {
        let start = self.current_span();
        self.expect(&TokenKind::Class)?;
        let name = if matches!(self.peek_kind(), TokenKind::Ident(w) if w != "implements") {
            Some(self.expect_identifier()?)
        } else {
            if require_name {
                self.error_at_current("Class statements require a class name");
                return None;
            }
            None
        };
        if self.options.typescript && self.check(&TokenKind::Less) {
            self.skip_type_params()?;
        }
        let superclass = if self.eat(&TokenKind::Extends) {
            let expr = self.parse_lhs_no_call()?;
            if self.options.typescript && self.check(&TokenKind::Less) {
                self.skip_type_args()?;
            }
            Some(expr)
        } else {
            None
        };
        if self.options.typescript && self.eat_word("implements") {
            loop {
                self.skip_type()?;
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(&TokenKind::LBrace)?;
        let mut members = Vec::new();
        let mut has_constructor = false;
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            if self.eat(&TokenKind::Semicolon) {
                continue;
            }
            match self.parse_class_member() {
                Some(Some(member)) => {
                    if matches!(member, ClassMember::Constructor(_)) {
                        if has_constructor {
                            self.error_at(
                                "A class may only have one constructor",
                                self.previous_span(),
                            );
                        }
                        has_constructor = true;
                    }
                    members.push(member);
                }
                Some(None) => {}
                None => self.synchronize(),
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Some(ClassDef {
            name,
            superclass,
            members,
            span: self.span_since(start),
        })
    }

    /// Parse one class member. `Some(None)` is a member that only exists for
    /// the type checker (index signature, abstract declaration).
    fn parse_class_member(&mut self) -> Option<Option<ClassMember>> {
        let mut is_static = false;
        if self.check_word("static") && self.starts_member_key(1) {
            self.advance();
            is_static = true;
        }
        if self.options.typescript {
            let had_declare = self.check_word("declare") && self.starts_member_key(1);
            self.skip_modifiers();
            if self.check(&TokenKind::LBracket) && self.is_index_signature() {
                self.skip_index_signature()?;
                return Some(None);
            }
            if had_declare {
                self.parse_property_key()?;
                self.eat(&TokenKind::Question);
                self.skip_type_annotation()?;
                self.consume_semicolon();
                return Some(None);
            }
        }
        if (self.check_word("get") || self.check_word("set")) && self.starts_member_key(1) {
            self.error_at_current("Getters and setters are not supported");
            return None;
        }
        if self.check_word("async") && self.starts_member_key(1) {
            self.error_at_current("async methods are not supported");
            return None;
        }

        let key_start = self.current_span();
        let key = self.parse_property_key()?;
        if self.options.typescript {
            if !self.eat(&TokenKind::Question) {
                self.eat(&TokenKind::Bang);
            }
        }

        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Less) {
            let (params, body) = self.parse_function_rest()?;
            let is_constructor =
                !is_static && matches!(&key, PropKey::Ident(n) | PropKey::String(n) if n == "constructor");
            let name = match &key {
                PropKey::Ident(n) => Some(Ident::new(n.clone(), key_start)),
                _ => None,
            };
            let func = Rc::new(FunctionDef {
                name,
                params,
                body: FunctionBody::Block(body),
                is_arrow: false,
                span: self.span_since(key_start),
            });
            if is_constructor {
                return Some(Some(ClassMember::Constructor(func)));
            }
            return Some(Some(ClassMember::Method {
                key,
                func,
                is_static,
            }));
        }

        if self.options.typescript {
            self.skip_type_annotation()?;
        }
        let value = if self.eat(&TokenKind::Eq) {
            self.function_depth += 1;
            let value = self.parse_assignment();
            self.function_depth -= 1;
            Some(value?)
        } else {
            None
        };
        self.consume_semicolon();
        Some(Some(ClassMember::Field {
            key,
            value,
            is_static,
        }))
    }

    /// Whether the token `n` ahead can begin a member key, meaning a word
    /// like `static` or `get` at the current position is a modifier.
    fn starts_member_key(&self, n: usize) -> bool {
        let kind = self.look_ahead(n);
        matches!(
            kind,
            TokenKind::Ident(_)
                | TokenKind::Str(_)
                | TokenKind::Number(_)
                | TokenKind::LBracket
        ) || kind.is_keyword()
    }

    /// Skip TypeScript access modifiers preceding a member or parameter.
    pub(crate) fn skip_modifiers(&mut self) {
        const MODIFIERS: &[&str] = &[
            "public", "private", "protected", "readonly", "abstract", "override", "declare",
        ];
        while let TokenKind::Ident(word) = self.peek_kind() {
            if MODIFIERS.contains(&word.as_str()) && self.starts_member_key(1) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Property key in an object literal, class body or object pattern.
    pub(crate) fn parse_property_key(&mut self) -> Option<PropKey> {
        match self.peek_kind().clone() {
            TokenKind::Str(s) => {
                self.advance();
                Some(PropKey::String(s))
            }
            TokenKind::Number(n) => {
                self.advance();
                Some(PropKey::Number(n))
            }
            TokenKind::LBracket => {
                self.advance();
                let expr = self.parse_assignment()?;
                self.expect(&TokenKind::RBracket)?;
                Some(PropKey::Computed(Box::new(expr)))
            }
            _ => {
                let ident = self.expect_property_name()?;
                Some(PropKey::Ident(ident.name))
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Binding Patterns
    // ══════════════════════════════════════════════════════════════════════════

    /// `ident`, `{ a, b: c = 1, ...rest }` or `[a, , b = 2, ...rest]`
    pub(crate) fn parse_binding_pattern(&mut self) -> Option<Pattern> {
        match self.peek_kind() {
            TokenKind::LBrace => self.parse_object_pattern(),
            TokenKind::LBracket => self.parse_array_pattern(),
            _ => self.expect_identifier().map(Pattern::Ident),
        }
    }

    fn parse_pattern_elem(&mut self) -> Option<PatternElem> {
        let pattern = self.parse_binding_pattern()?;
        let default = if self.eat(&TokenKind::Eq) {
            Some(self.parse_assignment()?)
        } else {
            None
        };
        Some(PatternElem { pattern, default })
    }

    fn parse_object_pattern(&mut self) -> Option<Pattern> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace)?;
        let mut props = Vec::new();
        let mut rest = None;
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.eat(&TokenKind::DotDotDot) {
                rest = Some(self.expect_identifier()?);
                self.eat(&TokenKind::Comma);
                break;
            }
            let key_token = self.peek().clone();
            let key = self.parse_property_key()?;
            let value = if self.eat(&TokenKind::Colon) {
                self.parse_pattern_elem()?
            } else {
                let TokenKind::Ident(name) = key_token.kind else {
                    self.error_at("Unexpected token in object pattern", key_token.span);
                    return None;
                };
                let default = if self.eat(&TokenKind::Eq) {
                    Some(self.parse_assignment()?)
                } else {
                    None
                };
                PatternElem {
                    pattern: Pattern::Ident(Ident::new(name, key_token.span)),
                    default,
                }
            };
            props.push(ObjectPatternProp { key, value });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Some(Pattern::Object {
            props,
            rest,
            span: self.span_since(start),
        })
    }

    fn parse_array_pattern(&mut self) -> Option<Pattern> {
        let start = self.current_span();
        self.expect(&TokenKind::LBracket)?;
        let mut elements = Vec::new();
        let mut rest = None;
        while !self.check(&TokenKind::RBracket) && !self.at_end() {
            if self.eat(&TokenKind::Comma) {
                elements.push(None);
                continue;
            }
            if self.eat(&TokenKind::DotDotDot) {
                rest = Some(Box::new(self.parse_binding_pattern()?));
                self.eat(&TokenKind::Comma);
                break;
            }
            elements.push(Some(self.parse_pattern_elem()?));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBracket)?;
        Some(Pattern::Array {
            elements,
            rest,
            span: self.span_since(start),
        })
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Modules
    // ══════════════════════════════════════════════════════════════════════════

    /// ```text
    /// import "path";
    /// import Default [, { a, b as c } | , * as ns] from "path";
    /// import { a, b as c } from "path";
    /// import * as ns from "path";
    /// ```
    pub(crate) fn parse_import_decl(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.expect(&TokenKind::Import)?;

        if self.options.typescript
            && self.check_word("type")
            && !matches!(self.look_ahead(1), TokenKind::Ident(w) if w == "from")
            && !matches!(self.look_ahead(1), TokenKind::Comma)
        {
            // `import type { A } from "x"` has no runtime effect.
            while !self.at_end() && !matches!(self.peek_kind(), TokenKind::Str(_)) {
                self.advance();
            }
            self.expect_string_literal()?;
            self.consume_semicolon();
            return Some(Stmt::Empty(self.span_since(start)));
        }

        let mut specifiers = Vec::new();
        if let TokenKind::Str(source) = self.peek_kind().clone() {
            self.advance();
            self.consume_semicolon();
            return Some(Stmt::Import(ImportDecl {
                source,
                specifiers,
                span: self.span_since(start),
            }));
        }

        if matches!(self.peek_kind(), TokenKind::Ident(_)) {
            specifiers.push(ImportSpecifier::Default(self.expect_identifier()?));
            if !self.eat(&TokenKind::Comma) {
                return self.finish_import(start, specifiers);
            }
        }

        if self.eat(&TokenKind::Star) {
            if !self.eat_word("as") {
                self.error_at_current("Expected 'as' after '*' in import");
                return None;
            }
            specifiers.push(ImportSpecifier::Namespace(self.expect_identifier()?));
        } else if self.eat(&TokenKind::LBrace) {
            while !self.check(&TokenKind::RBrace) && !self.at_end() {
                let type_only = self.options.typescript
                    && self.check_word("type")
                    && !matches!(
                        self.look_ahead(1),
                        TokenKind::Comma | TokenKind::RBrace
                    )
                    && !matches!(self.look_ahead(1), TokenKind::Ident(w) if w == "as");
                if type_only {
                    self.advance();
                }
                let imported_token = self.peek().clone();
                let imported = match &imported_token.kind {
                    TokenKind::Str(s) => {
                        self.advance();
                        s.clone()
                    }
                    _ => self.expect_property_name()?.name,
                };
                let local = if self.eat_word("as") {
                    self.expect_identifier()?
                } else if matches!(imported_token.kind, TokenKind::Ident(_)) {
                    Ident::new(imported.clone(), imported_token.span)
                } else {
                    self.error_at(
                        format!("Unexpected reserved word '{imported}' in import"),
                        imported_token.span,
                    );
                    return None;
                };
                if !type_only {
                    specifiers.push(ImportSpecifier::Named { imported, local });
                }
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RBrace)?;
        } else {
            self.error_at_current(format!(
                "Unexpected token '{}' in import",
                self.peek_kind()
            ));
            return None;
        }

        self.finish_import(start, specifiers)
    }

    fn finish_import(
        &mut self,
        start: livecode_types::Span,
        specifiers: Vec<ImportSpecifier>,
    ) -> Option<Stmt> {
        if !self.eat_word("from") {
            self.error_at_current(format!("Expected 'from', got '{}'", self.peek_kind()));
            return None;
        }
        let source = self.expect_string_literal()?;
        self.consume_semicolon();
        Some(Stmt::Import(ImportDecl {
            source,
            specifiers,
            span: self.span_since(start),
        }))
    }

    /// ```text
    /// export default function [name]() {}
    /// export default class [Name] {}
    /// export default <expr>;
    /// export const|let|var|function|class ...
    /// export { a, b as c } [from "path"];
    /// export * from "path";
    /// ```
    pub(crate) fn parse_export_decl(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.expect(&TokenKind::Export)?;

        let kind = match self.peek_kind() {
            TokenKind::Default => {
                self.advance();
                match self.peek_kind() {
                    TokenKind::Function => {
                        ExportKind::DefaultFunction(Rc::new(self.parse_function(false)?))
                    }
                    TokenKind::Class => ExportKind::DefaultClass(Rc::new(self.parse_class(false)?)),
                    TokenKind::Ident(w) if w == "interface" && self.options.typescript => {
                        self.skip_type_declaration()?;
                        return Some(Stmt::Empty(self.span_since(start)));
                    }
                    _ => {
                        let expr = self.parse_assignment()?;
                        self.consume_semicolon();
                        ExportKind::DefaultExpr(expr)
                    }
                }
            }
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let decl = self.parse_var_decl(true)?;
                self.consume_semicolon();
                ExportKind::Decl(Box::new(Stmt::Var(decl)))
            }
            TokenKind::Function => {
                ExportKind::Decl(Box::new(Stmt::Function(self.parse_function_decl()?)))
            }
            TokenKind::Class => ExportKind::Decl(Box::new(Stmt::Class(self.parse_class_decl()?))),
            TokenKind::Star => {
                self.advance();
                if self.check_word("as") {
                    self.error_at_current("'export * as' is not supported");
                    return None;
                }
                if !self.eat_word("from") {
                    self.error_at_current("Expected 'from' after 'export *'");
                    return None;
                }
                let source = self.expect_string_literal()?;
                self.consume_semicolon();
                ExportKind::All { source }
            }
            TokenKind::LBrace => {
                self.advance();
                let mut specifiers = Vec::new();
                while !self.check(&TokenKind::RBrace) && !self.at_end() {
                    if self.options.typescript
                        && self.check_word("type")
                        && matches!(self.look_ahead(1), TokenKind::Ident(_))
                    {
                        self.advance();
                        self.expect_property_name()?;
                        if self.eat_word("as") {
                            self.expect_property_name()?;
                        }
                    } else {
                        let local = self.expect_property_name()?.name;
                        let exported = if self.eat_word("as") {
                            self.expect_property_name()?.name
                        } else {
                            local.clone()
                        };
                        specifiers.push(ExportSpecifier { local, exported });
                    }
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RBrace)?;
                let source = if self.eat_word("from") {
                    Some(self.expect_string_literal()?)
                } else {
                    None
                };
                self.consume_semicolon();
                ExportKind::Named { specifiers, source }
            }
            // `export type { A, B } [from "x"]`
            TokenKind::Ident(w)
                if w == "type"
                    && self.options.typescript
                    && self.look_ahead(1) == &TokenKind::LBrace =>
            {
                self.advance();
                self.advance();
                while !self.check(&TokenKind::RBrace) && !self.at_end() {
                    self.advance();
                }
                self.expect(&TokenKind::RBrace)?;
                if self.eat_word("from") {
                    self.expect_string_literal()?;
                }
                self.consume_semicolon();
                return Some(Stmt::Empty(self.span_since(start)));
            }
            TokenKind::Ident(_) if self.options.typescript && self.at_type_declaration() => {
                self.skip_type_declaration()?;
                return Some(Stmt::Empty(self.span_since(start)));
            }
            _ => {
                self.error_at_current(format!(
                    "Unexpected token '{}' after 'export'",
                    self.peek_kind()
                ));
                return None;
            }
        };

        Some(Stmt::Export(ExportDecl {
            kind,
            span: self.span_since(start),
        }))
    }
}
