//! Output buffer with indentation tracking, plus literal formatting.

use std::collections::HashMap;

use livecode_lexer::{is_ident_continue, is_ident_start};

use crate::transpiler::TranspileOptions;

const INDENT: &str = "  ";

/// Accumulates transpiled text.
pub struct Emitter<'o> {
    out: String,
    indent: usize,
    pub(crate) options: &'o TranspileOptions,
    /// Set when a default import needs the interop helper.
    pub(crate) needs_interop: bool,
    /// Module temporaries handed out so far, per base name.
    temp_names: HashMap<String, usize>,
}

impl<'o> Emitter<'o> {
    pub fn new(options: &'o TranspileOptions) -> Self {
        Self {
            out: String::new(),
            indent: 0,
            options,
            needs_interop: false,
            temp_names: HashMap::new(),
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    pub fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Write the indentation for a new line.
    pub fn start_line(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    pub fn end_line(&mut self) {
        self.out.push('\n');
    }

    /// Write a complete line.
    pub fn line(&mut self, text: &str) {
        self.start_line();
        self.write(text);
        self.end_line();
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// A fresh `_name` temporary for the module at `path`.
    pub fn module_temp(&mut self, path: &str) -> String {
        let base: String = path
            .rsplit('/')
            .find(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
            .unwrap_or("module")
            .chars()
            .map(|c| if is_ident_continue(c) { c } else { '_' })
            .collect();
        let count = self.temp_names.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            format!("_{base}")
        } else {
            format!("_{base}{count}")
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Literal Formatting
// ══════════════════════════════════════════════════════════════════════════════

/// A double-quoted string literal for `value`.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// The raw text of a template literal chunk.
pub fn escape_template(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '`' => out.push_str("\\`"),
            '\\' => out.push_str("\\\\"),
            '\r' => out.push_str("\\r"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            c => out.push(c),
        }
    }
    out
}

pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        format!("{n}")
    }
}

/// Whether `name` can be written as a bare property key.
pub fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_ident_start(c) => chars.all(is_ident_continue),
        _ => false,
    }
}

/// `name` as an object key: bare when possible, quoted otherwise.
pub fn property_key(name: &str) -> String {
    if is_identifier_name(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\"b\\c\nd"), r#""a\"b\\c\nd""#);
        assert_eq!(quote("\u{1}"), r#""\u0001""#);
    }

    #[test]
    fn test_escape_template() {
        assert_eq!(escape_template("a`b${c}$d"), "a\\`b\\${c}$d");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
    }

    #[test]
    fn test_property_key() {
        assert_eq!(property_key("className"), "className");
        assert_eq!(property_key("aria-label"), "\"aria-label\"");
    }

    #[test]
    fn test_module_temp_names() {
        let options = TranspileOptions::default();
        let mut e = Emitter::new(&options);
        assert_eq!(e.module_temp("react"), "_react");
        assert_eq!(e.module_temp("./utils/"), "_utils");
        assert_eq!(e.module_temp("@ui/button-group"), "_button_group");
        assert_eq!(e.module_temp("react"), "_react2");
    }
}
