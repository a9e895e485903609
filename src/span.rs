// src/span.rs

/// Source location span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,    // Byte offset
    pub end: usize,      // Byte offset (exclusive)
    pub line: u32,       // Start line (1-indexed)
    pub column: u32,     // Start column (1-indexed)
    pub end_line: u32,   // End line (1-indexed)
    pub end_column: u32, // End column (1-indexed, exclusive)
}

impl Span {
    /// Create a new span with explicit end position
    pub fn new_with_end(
        start: usize,
        end: usize,
        line: u32,
        column: u32,
        end_line: u32,
        end_column: u32,
    ) -> Self {
        Self {
            start,
            end,
            line,
            column,
            end_line,
            end_column,
        }
    }

    /// Create a new span, computing end position for single-line tokens
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        let length = end.saturating_sub(start);
        Self {
            start,
            end,
            line,
            column,
            end_line: line,
            end_column: column + length as u32,
        }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
            line: self.line,
            column: self.column,
            end_line: other.end_line,
            end_column: other.end_column,
        }
    }

    /// Byte length of the span
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.len()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_computes_end_column() {
        let span = Span::new(10, 15, 2, 4);
        assert_eq!(span.len(), 5);
        assert_eq!(span.end_line, 2);
        assert_eq!(span.end_column, 9);
    }

    #[test]
    fn merge_spans_line_boundaries() {
        let a = Span::new(0, 3, 1, 1);
        let b = Span::new_with_end(10, 14, 3, 2, 3, 6);
        let merged = a.merge(b);
        assert_eq!(merged.start, 0);
        assert_eq!(merged.end, 14);
        assert_eq!(merged.line, 1);
        assert_eq!(merged.end_line, 3);
    }

    #[test]
    fn converts_to_source_span() {
        let span = Span::new(4, 9, 1, 5);
        let source: miette::SourceSpan = span.into();
        assert_eq!(source.offset(), 4);
        assert_eq!(source.len(), 5);
    }
}
