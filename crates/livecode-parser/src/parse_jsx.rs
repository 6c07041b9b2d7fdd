//! JSX element parsing.
//!
//! Text children are cleaned up the way JSX compilers do it: lines are
//! trimmed, whitespace-only lines that contain a newline disappear and
//! the remaining lines are joined with a single space. HTML entities are
//! decoded in text and in quoted attribute values.

use livecode_lexer::token::TokenKind;
use livecode_types::ast::*;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse `<Name attrs...>children</Name>`, `<Name />` or `<>...</>`.
    /// The cursor is at a `JsxTagStart`.
    pub(crate) fn parse_jsx_element(&mut self) -> Option<JsxElement> {
        if !self.enter() {
            return None;
        }
        let result = self.parse_jsx_element_inner();
        self.leave();
        result
    }

    fn parse_jsx_element_inner(&mut self) -> Option<JsxElement> {
        let start = self.current_span();
        self.expect(&TokenKind::JsxTagStart)?;

        // Fragment: `<>`
        if self.eat(&TokenKind::JsxTagEnd) {
            let children = self.parse_jsx_children()?;
            self.expect(&TokenKind::JsxCloseTagStart)?;
            if !self.check(&TokenKind::JsxTagEnd) {
                self.error_at_current("Expected corresponding JSX closing tag for <>");
                return None;
            }
            self.advance();
            return Some(JsxElement {
                name: JsxName::Fragment,
                attributes: Vec::new(),
                children,
                span: self.span_since(start),
            });
        }

        let raw_name = self.expect_jsx_name()?;
        let mut attributes = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::JsxSelfClose => {
                    self.advance();
                    return Some(JsxElement {
                        name: JsxName::classify(&raw_name),
                        attributes,
                        children: Vec::new(),
                        span: self.span_since(start),
                    });
                }
                TokenKind::JsxTagEnd => {
                    self.advance();
                    break;
                }
                TokenKind::LBrace => attributes.push(self.parse_jsx_spread_attribute()?),
                TokenKind::JsxIdent(_) => attributes.push(self.parse_jsx_attribute()?),
                _ => {
                    self.error_at_current(format!(
                        "Unexpected token '{}' in JSX tag <{raw_name}>",
                        self.peek_kind()
                    ));
                    return None;
                }
            }
        }

        let children = self.parse_jsx_children()?;
        self.expect(&TokenKind::JsxCloseTagStart)?;
        let closing_span = self.current_span();
        let closing = match self.peek_kind() {
            TokenKind::JsxIdent(name) => Some(name.clone()),
            _ => None,
        };
        if closing.as_deref() != Some(raw_name.as_str()) {
            self.error_at(
                format!("Expected corresponding JSX closing tag for <{raw_name}>"),
                closing_span,
            );
            return None;
        }
        self.advance();
        self.expect(&TokenKind::JsxTagEnd)?;

        Some(JsxElement {
            name: JsxName::classify(&raw_name),
            attributes,
            children,
            span: self.span_since(start),
        })
    }

    fn expect_jsx_name(&mut self) -> Option<String> {
        match self.peek_kind().clone() {
            TokenKind::JsxIdent(name) => {
                self.advance();
                Some(name)
            }
            other => {
                self.error_at_current(format!("Expected JSX tag name, got '{other}'"));
                None
            }
        }
    }

    /// `name`, `name="text"`, `name={expr}` or `name=<Element />`
    fn parse_jsx_attribute(&mut self) -> Option<JsxAttribute> {
        let start = self.current_span();
        let name = self.expect_jsx_name()?;
        if !self.eat(&TokenKind::Eq) {
            return Some(JsxAttribute::Named {
                name,
                value: None,
                span: start,
            });
        }

        let value = match self.peek_kind().clone() {
            TokenKind::JsxString(text) => {
                self.advance();
                JsxAttrValue::String(decode_entities(&text))
            }
            TokenKind::LBrace => {
                self.advance();
                if self.check(&TokenKind::RBrace) {
                    self.error_at_current(
                        "JSX attributes must only be assigned a non-empty expression",
                    );
                    return None;
                }
                let expr = self.with_in(|p| p.parse_assignment())?;
                self.expect(&TokenKind::RBrace)?;
                JsxAttrValue::Expr(expr)
            }
            TokenKind::JsxTagStart => JsxAttrValue::Element(Box::new(self.parse_jsx_element()?)),
            other => {
                self.error_at_current(format!("Unexpected token '{other}' in JSX attribute value"));
                return None;
            }
        };
        Some(JsxAttribute::Named {
            name,
            value: Some(value),
            span: self.span_since(start),
        })
    }

    /// `{...expr}`
    fn parse_jsx_spread_attribute(&mut self) -> Option<JsxAttribute> {
        self.expect(&TokenKind::LBrace)?;
        if !self.eat(&TokenKind::DotDotDot) {
            self.error_with_suggestion(
                "Expected '...' in JSX spread attribute",
                "Attributes need a name, for example name={value}",
            );
            return None;
        }
        let expr = self.with_in(|p| p.parse_assignment())?;
        self.expect(&TokenKind::RBrace)?;
        Some(JsxAttribute::Spread(expr))
    }

    /// Children up to (not including) the closing `</`.
    fn parse_jsx_children(&mut self) -> Option<Vec<JsxChild>> {
        let mut children = Vec::new();
        loop {
            match self.peek_kind().clone() {
                TokenKind::JsxCloseTagStart => break,
                TokenKind::JsxText(raw) => {
                    self.advance();
                    if let Some(text) = clean_jsx_text(&raw) {
                        children.push(JsxChild::Text(text));
                    }
                }
                TokenKind::JsxTagStart => {
                    children.push(JsxChild::Element(self.parse_jsx_element()?));
                }
                TokenKind::LBrace => {
                    self.advance();
                    // `{}` and `{/* comment */}` render nothing.
                    if self.eat(&TokenKind::RBrace) {
                        continue;
                    }
                    if self.check(&TokenKind::DotDotDot) {
                        self.error_at_current("Spread children are not supported");
                        return None;
                    }
                    let expr = self.with_in(|p| p.parse_expression())?;
                    self.expect(&TokenKind::RBrace)?;
                    children.push(JsxChild::Expr(expr));
                }
                TokenKind::Eof => {
                    self.error_at_current("Unterminated JSX contents");
                    return None;
                }
                other => {
                    self.error_at_current(format!("Unexpected token '{other}' in JSX"));
                    return None;
                }
            }
        }
        Some(children)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Text Handling
// ══════════════════════════════════════════════════════════════════════════════

/// Apply JSX whitespace rules to a raw text child. Returns `None` when
/// nothing remains.
pub fn clean_jsx_text(raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw.split('\n').collect();
    let last = lines.len() - 1;
    let mut out = String::new();

    for (i, line) in lines.iter().enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let mut trimmed = line;
        if i != 0 {
            trimmed = trimmed.trim_start_matches([' ', '\t']);
        }
        if i != last {
            trimmed = trimmed.trim_end_matches([' ', '\t']);
        }
        if trimmed.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(trimmed);
    }

    if out.is_empty() {
        None
    } else {
        Some(decode_entities(&out))
    }
}

/// Decode HTML character references (`&amp;`, `&#123;`, `&#x7B;`).
/// Unknown references are kept verbatim.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_reference(&rest[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "laquo" => '«',
        "raquo" => '»',
        "bull" => '•',
        "middot" => '·',
        "times" => '×',
        "divide" => '÷',
        "larr" => '←',
        "rarr" => '→',
        "uarr" => '↑',
        "darr" => '↓',
        "euro" => '€',
        "pound" => '£',
        "yen" => '¥',
        "cent" => '¢',
        "deg" => '°',
        "plusmn" => '±',
        "hearts" => '♥',
        "check" => '✓',
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_on_one_line_is_kept() {
        assert_eq!(clean_jsx_text("  Hello world  ").as_deref(), Some("  Hello world  "));
    }

    #[test]
    fn multiline_text_is_joined() {
        assert_eq!(
            clean_jsx_text("\n    Hello\n    world\n  ").as_deref(),
            Some("Hello world")
        );
    }

    #[test]
    fn whitespace_with_newline_disappears() {
        assert_eq!(clean_jsx_text("\n    \n  "), None);
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(decode_entities("a &amp; b &lt;3 &#65;&#x42;"), "a & b <3 AB");
        assert_eq!(decode_entities("&unknown; &"), "&unknown; &");
    }
}
