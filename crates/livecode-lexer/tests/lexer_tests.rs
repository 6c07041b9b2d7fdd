//! Lexer tests.
//!
//! Covers: keywords and contextual words, operators, numbers, strings and
//! escapes, template literals with substitutions, comments and line breaks,
//! JSX tags/attributes/text/containers, the `<` disambiguation, error
//! recovery and determinism.

use livecode_lexer::{Lexer, TokenKind};
use livecode_types::SourceFile;
use pretty_assertions::assert_eq;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source text and return just the token kinds (excluding final Eof).
fn kinds(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("test.jsx", source);
    Lexer::new(&sf)
        .lex()
        .tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

fn kinds_no_jsx(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("test.js", source);
    Lexer::new(&sf)
        .with_jsx(false)
        .lex()
        .tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

fn first_error(source: &str) -> String {
    let sf = SourceFile::new("test.jsx", source);
    Lexer::new(&sf)
        .lex()
        .errors
        .errors
        .first()
        .map(|e| e.message.clone())
        .unwrap_or_default()
}

fn ident(s: &str) -> TokenKind {
    TokenKind::Ident(s.to_string())
}

fn jsx_ident(s: &str) -> TokenKind {
    TokenKind::JsxIdent(s.to_string())
}

// ─────────────────────────────────────────────────────────────────────
// Keywords & identifiers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_reserved_keywords() {
    let pairs = [
        ("const", TokenKind::Const),
        ("function", TokenKind::Function),
        ("export", TokenKind::Export),
        ("default", TokenKind::Default),
        ("typeof", TokenKind::TypeOf),
        ("instanceof", TokenKind::InstanceOf),
        ("null", TokenKind::Null),
    ];
    for (src, expected) in pairs {
        assert_eq!(kinds(src), vec![expected], "keyword '{src}'");
    }
}

#[test]
fn test_every_listed_keyword_is_recognised() {
    for kw in livecode_lexer::ALL_KEYWORDS {
        let k = kinds(kw);
        assert_eq!(k.len(), 1);
        assert!(k[0].is_keyword(), "'{kw}' should lex as a keyword");
        assert_eq!(k[0].to_string(), *kw);
    }
}

#[test]
fn test_contextual_words_are_identifiers() {
    for word in ["of", "from", "as", "async", "static", "type", "interface", "undefined"] {
        assert_eq!(kinds(word), vec![ident(word)]);
    }
}

#[test]
fn test_identifier_characters() {
    assert_eq!(
        kinds("$el _private café x1"),
        vec![ident("$el"), ident("_private"), ident("café"), ident("x1")]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Operators & punctuation
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_multi_char_operators() {
    assert_eq!(
        kinds("=== !== == != => ** **= ?? ??= ?. ... && || &&= ||= ++ --"),
        vec![
            TokenKind::EqEqEq,
            TokenKind::BangEqEq,
            TokenKind::EqEq,
            TokenKind::BangEq,
            TokenKind::Arrow,
            TokenKind::StarStar,
            TokenKind::StarStarEq,
            TokenKind::QuestionQuestion,
            TokenKind::QuestionQuestionEq,
            TokenKind::QuestionDot,
            TokenKind::DotDotDot,
            TokenKind::AmpAmp,
            TokenKind::PipePipe,
            TokenKind::AmpAmpEq,
            TokenKind::PipePipeEq,
            TokenKind::PlusPlus,
            TokenKind::MinusMinus,
        ]
    );
}

#[test]
fn test_question_dot_before_digit_is_conditional() {
    assert_eq!(
        kinds("a?.5:1"),
        vec![
            ident("a"),
            TokenKind::Question,
            TokenKind::Number(0.5),
            TokenKind::Colon,
            TokenKind::Number(1.0),
        ]
    );
}

#[test]
fn test_comparison_after_identifier() {
    assert_eq!(
        kinds("a < b"),
        vec![ident("a"), TokenKind::Less, ident("b")]
    );
    assert_eq!(
        kinds("count <= limit"),
        vec![ident("count"), TokenKind::LessEq, ident("limit")]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_numbers() {
    assert_eq!(
        kinds("42 3.14 .5 1e3 2.5E-2 0xff 0b101 0o17 1_000"),
        vec![
            TokenKind::Number(42.0),
            TokenKind::Number(3.14),
            TokenKind::Number(0.5),
            TokenKind::Number(1000.0),
            TokenKind::Number(0.025),
            TokenKind::Number(255.0),
            TokenKind::Number(5.0),
            TokenKind::Number(15.0),
            TokenKind::Number(1000.0),
        ]
    );
}

#[test]
fn test_member_access_on_number_result() {
    assert_eq!(
        kinds("x.length"),
        vec![ident("x"), TokenKind::Dot, ident("length")]
    );
}

#[test]
fn test_strings_both_quotes() {
    assert_eq!(
        kinds(r#""double" 'single'"#),
        vec![
            TokenKind::Str("double".into()),
            TokenKind::Str("single".into())
        ]
    );
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        kinds(r#""a\nb\t\"q\" \x41 B \u{1F600} 😀""#),
        vec![TokenKind::Str("a\nb\t\"q\" A B 😀 😀".into())]
    );
}

#[test]
fn test_unterminated_string() {
    assert_eq!(first_error("'abc"), "Unterminated string literal");
}

#[test]
fn test_template_without_substitution() {
    assert_eq!(
        kinds("`plain\ntext`"),
        vec![TokenKind::Template("plain\ntext".into())]
    );
}

#[test]
fn test_template_with_substitutions() {
    assert_eq!(
        kinds("`a ${x} b ${ {k: 1}.k } c`"),
        vec![
            TokenKind::TemplateStart("a ".into()),
            TokenKind::InterpolationStart,
            ident("x"),
            TokenKind::InterpolationEnd,
            TokenKind::TemplatePart(" b ".into()),
            TokenKind::InterpolationStart,
            TokenKind::LBrace,
            ident("k"),
            TokenKind::Colon,
            TokenKind::Number(1.0),
            TokenKind::RBrace,
            TokenKind::Dot,
            ident("k"),
            TokenKind::InterpolationEnd,
            TokenKind::TemplateEnd(" c".into()),
        ]
    );
}

#[test]
fn test_nested_template() {
    assert_eq!(
        kinds("`${`in${y}`}`"),
        vec![
            TokenKind::TemplateStart("".into()),
            TokenKind::InterpolationStart,
            TokenKind::TemplateStart("in".into()),
            TokenKind::InterpolationStart,
            ident("y"),
            TokenKind::InterpolationEnd,
            TokenKind::TemplateEnd("".into()),
            TokenKind::InterpolationEnd,
            TokenKind::TemplateEnd("".into()),
        ]
    );
}

#[test]
fn test_unterminated_template() {
    assert_eq!(first_error("`abc"), "Unterminated template literal");
}

// ─────────────────────────────────────────────────────────────────────
// Comments & line breaks
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        kinds("a // line\n/* block\n comment */ b"),
        vec![ident("a"), ident("b")]
    );
}

#[test]
fn test_newline_before_flag() {
    let sf = SourceFile::new("t.js", "a\nb /* x\n */ c d");
    let tokens = Lexer::new(&sf).lex().tokens;
    let flags: Vec<bool> = tokens.iter().map(|t| t.newline_before).collect();
    assert_eq!(flags, vec![false, true, true, false, false]);
}

#[test]
fn test_spans_track_lines_and_offsets() {
    let sf = SourceFile::new("t.js", "let x\n  = 10");
    let tokens = Lexer::new(&sf).lex().tokens;
    let eq = &tokens[2];
    assert_eq!(eq.kind, TokenKind::Eq);
    assert_eq!((eq.span.line, eq.span.col), (2, 3));
    assert_eq!((eq.span.start, eq.span.end), (8, 9));
    assert_eq!(sf.slice(tokens[3].span), "10");
}

#[test]
fn test_unterminated_block_comment() {
    assert_eq!(first_error("a /* never closed"), "Unterminated block comment");
}

// ─────────────────────────────────────────────────────────────────────
// JSX
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_jsx_element_with_text() {
    assert_eq!(
        kinds("<div>Hi</div>"),
        vec![
            TokenKind::JsxTagStart,
            jsx_ident("div"),
            TokenKind::JsxTagEnd,
            TokenKind::JsxText("Hi".into()),
            TokenKind::JsxCloseTagStart,
            jsx_ident("div"),
            TokenKind::JsxTagEnd,
        ]
    );
}

#[test]
fn test_jsx_attributes() {
    assert_eq!(
        kinds(r#"<a href="x\y" data-id='7' on={f} {...rest} disabled />"#),
        vec![
            TokenKind::JsxTagStart,
            jsx_ident("a"),
            jsx_ident("href"),
            TokenKind::Eq,
            TokenKind::JsxString(r"x\y".into()),
            jsx_ident("data-id"),
            TokenKind::Eq,
            TokenKind::JsxString("7".into()),
            jsx_ident("on"),
            TokenKind::Eq,
            TokenKind::LBrace,
            ident("f"),
            TokenKind::RBrace,
            TokenKind::LBrace,
            TokenKind::DotDotDot,
            ident("rest"),
            TokenKind::RBrace,
            jsx_ident("disabled"),
            TokenKind::JsxSelfClose,
        ]
    );
}

#[test]
fn test_jsx_fragment_and_member_tag() {
    assert_eq!(
        kinds("<><Foo.Bar/></>"),
        vec![
            TokenKind::JsxTagStart,
            TokenKind::JsxTagEnd,
            TokenKind::JsxTagStart,
            jsx_ident("Foo.Bar"),
            TokenKind::JsxSelfClose,
            TokenKind::JsxCloseTagStart,
            TokenKind::JsxTagEnd,
        ]
    );
}

#[test]
fn test_jsx_expression_container_with_nested_markup() {
    assert_eq!(
        kinds("<ul>{xs.map(x => <li>{x}</li>)}</ul>"),
        vec![
            TokenKind::JsxTagStart,
            jsx_ident("ul"),
            TokenKind::JsxTagEnd,
            TokenKind::LBrace,
            ident("xs"),
            TokenKind::Dot,
            ident("map"),
            TokenKind::LParen,
            ident("x"),
            TokenKind::Arrow,
            TokenKind::JsxTagStart,
            jsx_ident("li"),
            TokenKind::JsxTagEnd,
            TokenKind::LBrace,
            ident("x"),
            TokenKind::RBrace,
            TokenKind::JsxCloseTagStart,
            jsx_ident("li"),
            TokenKind::JsxTagEnd,
            TokenKind::RParen,
            TokenKind::RBrace,
            TokenKind::JsxCloseTagStart,
            jsx_ident("ul"),
            TokenKind::JsxTagEnd,
        ]
    );
}

#[test]
fn test_jsx_object_literal_inside_container() {
    assert_eq!(
        kinds("<p style={{ color: c }} />"),
        vec![
            TokenKind::JsxTagStart,
            jsx_ident("p"),
            jsx_ident("style"),
            TokenKind::Eq,
            TokenKind::LBrace,
            TokenKind::LBrace,
            ident("color"),
            TokenKind::Colon,
            ident("c"),
            TokenKind::RBrace,
            TokenKind::RBrace,
            TokenKind::JsxSelfClose,
        ]
    );
}

#[test]
fn test_jsx_after_return_and_comparison_after_value() {
    let k = kinds("return <b/>; x < y");
    assert_eq!(k[1], TokenKind::JsxTagStart);
    assert_eq!(k[k.len() - 2], TokenKind::Less);
}

#[test]
fn test_jsx_on_new_line_after_statement() {
    let k = kinds("foo()\n<Foo/>");
    assert_eq!(k[3], TokenKind::JsxTagStart);
}

#[test]
fn test_generic_arrow_type_params_are_not_markup() {
    assert_eq!(
        kinds("f = <T,>(x)"),
        vec![
            ident("f"),
            TokenKind::Eq,
            TokenKind::Less,
            ident("T"),
            TokenKind::Comma,
            TokenKind::Greater,
            TokenKind::LParen,
            ident("x"),
            TokenKind::RParen,
        ]
    );
    assert_eq!(kinds("f = <T extends U>(x)")[2], TokenKind::Less);
    assert_eq!(kinds("f = <T extends />")[2], TokenKind::JsxTagStart);
}

#[test]
fn test_jsx_disabled() {
    assert_eq!(
        kinds_no_jsx("<div>"),
        vec![TokenKind::Less, ident("div"), TokenKind::Greater]
    );
}

#[test]
fn test_code_after_jsx_returns_to_normal_mode() {
    let k = kinds("const a = <i/>; const b = 1");
    assert_eq!(k[k.len() - 1], TokenKind::Number(1.0));
    assert!(k.contains(&TokenKind::Semicolon));
}

#[test]
fn test_unterminated_jsx_element() {
    assert_eq!(first_error("<div>text"), "Unterminated JSX element");
}

// ─────────────────────────────────────────────────────────────────────
// Error recovery & determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unexpected_character_recovers() {
    let sf = SourceFile::new("t.js", "a @ b");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.total_errors, 1);
    assert_eq!(result.errors.errors[0].message, "Unexpected character '@'");
    assert_eq!(result.errors.errors[0].source_line, "a @ b");
    let k: Vec<_> = result.tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(k, vec![ident("a"), ident("b"), TokenKind::Eof]);
}

#[test]
fn test_error_limit_stops_lexing() {
    let src = "@ ".repeat(40);
    let sf = SourceFile::new("t.js", src);
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.errors.len(), livecode_types::MAX_ERRORS);
    assert_eq!(result.tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
}

#[test]
fn test_lexing_is_deterministic() {
    let src = "export default function App({ n = 1 }) { return <p a={`${n}`}>x</p> }";
    let first = kinds(src);
    for _ in 0..50 {
        assert_eq!(kinds(src), first);
    }
}
