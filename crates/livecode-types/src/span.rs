use serde::{Deserialize, Serialize};
use std::fmt;

/// Source location span.
///
/// `start`/`end` are byte offsets into the source text. `line`/`col` are
/// 1-based and describe the start of the span, for human-readable messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub col: u32,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize, line: u32, col: u32) -> Self {
        Self {
            start,
            end,
            line,
            col,
        }
    }

    /// Create a zero-width span at a single position.
    pub fn point(offset: usize, line: u32, col: u32) -> Self {
        Self::new(offset, offset, line, col)
    }

    /// Merge two spans into one that covers both.
    ///
    /// The line/column of the merged span is taken from whichever span
    /// starts first.
    pub fn merge(self, other: Span) -> Span {
        let (line, col) = if other.start < self.start {
            (other.line, other.col)
        } else {
            (self.line, self.col)
        };
        Span::new(
            self.start.min(other.start),
            self.end.max(other.end),
            line,
            col,
        )
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Holds the source text for error reporting.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub source: String,
    /// Cached line start byte offsets for fast line lookup.
    line_starts: Vec<usize>,
}

impl SourceFile {
    /// Create a new source file.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            name: name.into(),
            source,
            line_starts,
        }
    }

    /// Extract a source line by 1-based line number.
    ///
    /// Returns `None` if the line number is out of range.
    pub fn line(&self, line_number: u32) -> Option<&str> {
        let idx = line_number.checked_sub(1)? as usize;
        if idx >= self.line_starts.len() {
            return None;
        }
        let start = self.line_starts[idx];
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&s| s.saturating_sub(1))
            .unwrap_or(self.source.len());
        let line = &self.source[start..end];
        Some(line.trim_end_matches('\r'))
    }

    /// Get the total number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// The source text covered by `span`, or `""` if it is out of range.
    pub fn slice(&self, span: Span) -> &str {
        self.source.get(span.start..span.end).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_point() {
        let s = Span::point(7, 1, 8);
        assert_eq!(s.start, 7);
        assert_eq!(s.end, 7);
        assert!(s.is_empty());
        assert_eq!(s.line, 1);
        assert_eq!(s.col, 8);
    }

    #[test]
    fn test_span_merge_keeps_earliest_position() {
        let a = Span::new(20, 25, 2, 3);
        let b = Span::new(4, 9, 1, 5);
        let merged = a.merge(b);
        assert_eq!(merged.start, 4);
        assert_eq!(merged.end, 25);
        assert_eq!((merged.line, merged.col), (1, 5));
        assert_eq!(merged.len(), 21);
    }

    #[test]
    fn test_span_display() {
        let s = Span::new(40, 48, 3, 7);
        assert_eq!(format!("{s}"), "3:7");
    }

    #[test]
    fn test_source_file_line_extraction() {
        let src = SourceFile::new("demo.jsx", "line one\nline two\nline three");
        assert_eq!(src.line(1), Some("line one"));
        assert_eq!(src.line(2), Some("line two"));
        assert_eq!(src.line(3), Some("line three"));
        assert_eq!(src.line(0), None);
        assert_eq!(src.line(4), None);
    }

    #[test]
    fn test_source_file_crlf() {
        let src = SourceFile::new("demo.jsx", "line one\r\nline two\r\n");
        assert_eq!(src.line(1), Some("line one"));
        assert_eq!(src.line(2), Some("line two"));
    }

    #[test]
    fn test_source_file_slice() {
        let src = SourceFile::new("demo.jsx", "const a = <div/>;");
        assert_eq!(src.slice(Span::new(10, 16, 1, 11)), "<div/>");
        assert_eq!(src.slice(Span::new(10, 99, 1, 11)), "");
    }

    #[test]
    fn test_source_file_empty() {
        let src = SourceFile::new("demo.jsx", "");
        assert_eq!(src.line_count(), 1);
        assert_eq!(src.line(1), Some(""));
    }
}
