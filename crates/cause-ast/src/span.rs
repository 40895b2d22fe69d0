// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source location tracking.

/// A byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// Line-start table for turning byte offsets into [`Location`]s.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        LineIndex { starts }
    }

    /// Locate a byte offset. Columns count bytes, not characters.
    pub fn locate(&self, offset: usize) -> Location {
        let line = self.starts.partition_point(|&start| start <= offset).max(1);
        Location {
            line,
            column: offset - self.starts[line - 1] + 1,
        }
    }

    /// Text of a 1-based line, without its newline.
    pub fn line<'a>(&self, source: &'a str, line: usize) -> Option<&'a str> {
        let start = *self.starts.get(line.checked_sub(1)?)?;
        let end = self
            .starts
            .get(line)
            .map(|&next| next - 1)
            .unwrap_or(source.len());
        source.get(start..end).map(|text| text.trim_end_matches('\r'))
    }

    pub fn lines(&self) -> usize {
        self.starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_first_line() {
        let index = LineIndex::new("a + b");
        assert_eq!(index.locate(0), Location { line: 1, column: 1 });
        assert_eq!(index.locate(4), Location { line: 1, column: 5 });
    }

    #[test]
    fn locate_across_lines() {
        let src = "f(\n  x,\n  y)";
        let index = LineIndex::new(src);
        assert_eq!(index.lines(), 3);
        assert_eq!(index.locate(2), Location { line: 1, column: 3 });
        assert_eq!(index.locate(5), Location { line: 2, column: 3 });
        assert_eq!(index.line(src, 2), Some("  x,"));
        assert_eq!(index.line(src, 3), Some("  y)"));
        assert_eq!(index.line(src, 4), None);
    }

    #[test]
    fn crlf_lines_are_trimmed() {
        let src = "a\r\nb";
        let index = LineIndex::new(src);
        assert_eq!(index.line(src, 1), Some("a"));
        assert_eq!(index.locate(3), Location { line: 2, column: 1 });
    }

    #[test]
    fn span_union() {
        let joined = Span::new(4, 6).to(Span::new(1, 2));
        assert_eq!(joined, Span::new(1, 6));
        assert_eq!(joined.len(), 5);
        assert!(Span::new(3, 3).is_empty());
    }
}
