//! Ensures source code carries an `export default` marker.
//!
//! Snippets in documentation are often bare markup (`<Button />`) or a lone
//! component declaration. The normalizer finds the first top-level statement
//! that can stand as the module's result and prefixes it with
//! `export default `. This is a single first-match scan over the token
//! stream, not a parse: later candidates are never considered.

use std::borrow::Cow;

use livecode_lexer::{tokenize, Token, TokenKind};

const EXPORT_PREFIX: &str = "export default ";

/// Add `export default ` in front of the first exportable top-level
/// statement, unless the code already has a default export.
///
/// Lexical errors are ignored; the lexer recovers and the transpiler reports
/// them later.
pub fn normalize(code: &str) -> Cow<'_, str> {
    let tokens = tokenize(code).tokens;
    if has_default_export(&tokens) {
        return Cow::Borrowed(code);
    }
    match first_candidate(&tokens) {
        Some(offset) => {
            let mut out = String::with_capacity(code.len() + EXPORT_PREFIX.len());
            out.push_str(&code[..offset]);
            out.push_str(EXPORT_PREFIX);
            out.push_str(&code[offset..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(code),
    }
}

fn depth_change(kind: &TokenKind) -> i32 {
    match kind {
        TokenKind::LParen
        | TokenKind::LBracket
        | TokenKind::LBrace
        | TokenKind::InterpolationStart
        | TokenKind::JsxTagStart => 1,
        TokenKind::RParen
        | TokenKind::RBracket
        | TokenKind::RBrace
        | TokenKind::InterpolationEnd
        | TokenKind::JsxSelfClose
        | TokenKind::JsxCloseTagStart => -1,
        _ => 0,
    }
}

/// Pairs each token with the nesting depth it appears at.
fn with_depth(tokens: &[Token]) -> impl Iterator<Item = (usize, &Token, i32)> {
    let mut depth = 0;
    tokens.iter().enumerate().map(move |(i, token)| {
        let at = depth;
        depth = (depth + depth_change(&token.kind)).max(0);
        (i, token, at)
    })
}

/// `export default …` or `export { x as default }` at depth zero.
fn has_default_export(tokens: &[Token]) -> bool {
    with_depth(tokens).any(|(i, token, depth)| {
        if depth != 0 || token.kind != TokenKind::Export {
            return false;
        }
        match tokens.get(i + 1).map(|t| &t.kind) {
            Some(TokenKind::Default) => true,
            Some(TokenKind::LBrace) => tokens[i + 2..]
                .iter()
                .take_while(|t| t.kind != TokenKind::RBrace && t.kind != TokenKind::Eof)
                .any(|t| t.kind == TokenKind::Default),
            _ => false,
        }
    })
}

/// Byte offset of the first statement start that is markup, a function or
/// class declaration, or an arrow function.
fn first_candidate(tokens: &[Token]) -> Option<usize> {
    let mut prev: Option<&Token> = None;
    for (i, token, depth) in with_depth(tokens) {
        if token.kind == TokenKind::Eof {
            break;
        }
        if starts_statement(prev, token, depth) && is_candidate(tokens, i) {
            return Some(token.span.start);
        }
        prev = Some(token);
    }
    None
}

/// A statement starts at the first token, after a top-level `;`, or on a
/// new top-level line whose previous token completed an expression.
fn starts_statement(prev: Option<&Token>, token: &Token, depth: i32) -> bool {
    let Some(prev) = prev else {
        return true;
    };
    if depth != 0 {
        return false;
    }
    prev.kind == TokenKind::Semicolon || (token.newline_before && prev.kind.ends_expression())
}

fn is_candidate(tokens: &[Token], i: usize) -> bool {
    let next = tokens.get(i + 1).map(|t| &t.kind);
    match &tokens[i].kind {
        TokenKind::JsxTagStart | TokenKind::Function | TokenKind::Class => true,
        TokenKind::Ident(_) => next == Some(&TokenKind::Arrow),
        TokenKind::LParen => closing_paren(tokens, i)
            .and_then(|close| tokens.get(close + 1))
            .is_some_and(|t| t.kind == TokenKind::Arrow),
        _ => false,
    }
}

fn closing_paren(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            TokenKind::Eof => return None,
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bare_markup_is_exported() {
        assert_eq!(normalize("<Foo/>"), "export default <Foo/>");
    }

    #[test]
    fn test_existing_export_is_borrowed() {
        let code = "const A = 1;\nexport default A;";
        assert!(matches!(normalize(code), Cow::Borrowed(_)));
        let named = "const A = 1;\nexport { A as default };";
        assert_eq!(normalize(named), named);
    }

    #[test]
    fn test_function_declaration() {
        assert_eq!(
            normalize("function App() {\n  return <div/>;\n}"),
            "export default function App() {\n  return <div/>;\n}"
        );
    }

    #[test]
    fn test_class_declaration() {
        let code = "const x = 1;\nclass App extends React.Component {\n  render() { return <i/>; }\n}";
        assert_eq!(
            normalize(code),
            "const x = 1;\nexport default class App extends React.Component {\n  render() { return <i/>; }\n}"
        );
    }

    #[test]
    fn test_arrow_statement_forms() {
        assert_eq!(normalize("() => <b/>"), "export default () => <b/>");
        assert_eq!(normalize("props => <b/>"), "export default props => <b/>");
    }

    #[test]
    fn test_markup_after_declarations() {
        let code = "const A = () => <div/>;\n<A />";
        assert_eq!(normalize(code), "const A = () => <div/>;\nexport default <A />");
    }

    #[test]
    fn test_continuation_lines_are_not_statements() {
        let code = "const App = () =>\n  <div/>";
        assert_eq!(normalize(code), code);
    }

    #[test]
    fn test_nested_markup_is_skipped() {
        let code = "const x = (\n  <div/>\n);";
        assert_eq!(normalize(code), code);
    }

    #[test]
    fn test_export_inside_string_does_not_count() {
        assert_eq!(
            normalize("'export default';\n<p/>"),
            "'export default';\nexport default <p/>"
        );
    }

    #[test]
    fn test_nothing_to_export() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("const a = 1;"), "const a = 1;");
    }
}
