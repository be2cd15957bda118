//! Source documents
//!
//! A [`Document`] owns the text being formatted and hands out [`SourceLine`]s, the
//! 0-indexed view the reformatter works on. Line terminators are not part of a line's
//! text; the document remembers which terminator it uses so formatted output can keep it.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::FmtError;

/// One line of a document: its position and its text without the terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub index: usize,
    pub text: &'a str,
}

impl<'a> SourceLine<'a> {
    pub fn new(index: usize, text: &'a str) -> Self {
        Self { index, text }
    }
}

/// Line terminator convention of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// The convention of the first terminator found, `Lf` if there is none.
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(pos) if pos > 0 && text.as_bytes()[pos - 1] == b'\r' => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }
}

/// Byte layout of one line inside the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LineSpan {
    /// Start of the line content
    pub start: usize,
    /// End of the line content, terminator excluded
    pub end: usize,
    /// End of the terminator (equal to `end` on an unterminated last line)
    pub next: usize,
}

/// Text to be formatted, split into lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    spans: Vec<LineSpan>,
    line_ending: LineEnding,
}

impl Document {
    /// Build a document from in-memory text.
    pub fn from_string<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        let spans = compute_line_spans(&text);
        let line_ending = LineEnding::detect(&text);
        Document {
            text,
            spans,
            line_ending,
        }
    }

    /// Read a document from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FmtError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| FmtError::io(path, err))?;
        Ok(Self::from_string(text))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn line_count(&self) -> usize {
        self.spans.len()
    }

    /// Text of a single line, terminator excluded.
    pub fn line(&self, index: usize) -> Option<&str> {
        self.spans
            .get(index)
            .map(|span| &self.text[span.start..span.end])
    }

    /// All lines in document order.
    pub fn lines(&self) -> impl Iterator<Item = SourceLine<'_>> + '_ {
        self.spans
            .iter()
            .enumerate()
            .map(|(index, span)| SourceLine::new(index, &self.text[span.start..span.end]))
    }

    /// Whether the last line carries a terminator.
    pub fn ends_with_newline(&self) -> bool {
        self.text.ends_with('\n')
    }

    pub(crate) fn spans(&self) -> &[LineSpan] {
        &self.spans
    }
}

/// Split text on `\n`, dropping one `\r` before each terminator.
///
/// A trailing terminator does not open an extra empty line, and empty text has no lines.
fn compute_line_spans(text: &str) -> Vec<LineSpan> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut start = 0usize;

    for (pos, byte) in bytes.iter().enumerate() {
        if *byte == b'\n' {
            let end = if pos > start && bytes[pos - 1] == b'\r' {
                pos - 1
            } else {
                pos
            };
            spans.push(LineSpan {
                start,
                end,
                next: pos + 1,
            });
            start = pos + 1;
        }
    }

    if start < text.len() {
        spans.push(LineSpan {
            start,
            end: text.len(),
            next: text.len(),
        });
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(doc: &Document) -> Vec<&str> {
        doc.lines().map(|line| line.text).collect()
    }

    #[test]
    fn test_empty_document_has_no_lines() {
        let doc = Document::from_string("");
        assert_eq!(doc.line_count(), 0);
        assert!(!doc.ends_with_newline());
    }

    #[test]
    fn test_lines_are_zero_indexed() {
        let doc = Document::from_string("a\nb\nc");
        let indices: Vec<_> = doc.lines().map(|line| line.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(texts(&doc), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_trailing_newline_does_not_add_a_line() {
        let doc = Document::from_string("a\nb\n");
        assert_eq!(texts(&doc), vec!["a", "b"]);
        assert!(doc.ends_with_newline());
    }

    #[test]
    fn test_blank_lines_are_kept() {
        let doc = Document::from_string("a\n\n\nb\n");
        assert_eq!(texts(&doc), vec!["a", "", "", "b"]);
    }

    #[test]
    fn test_crlf_is_stripped_and_detected() {
        let doc = Document::from_string("f() {\r\n  x;\r\n}\r\n");
        assert_eq!(texts(&doc), vec!["f() {", "  x;", "}"]);
        assert_eq!(doc.line_ending(), LineEnding::CrLf);
    }

    #[test]
    fn test_line_ending_detection_uses_first_terminator() {
        assert_eq!(LineEnding::detect("a\nb\r\n"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("a\r\nb\n"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("no terminator"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("\n"), LineEnding::Lf);
    }

    #[test]
    fn test_line_lookup() {
        let doc = Document::from_string("first\nsecond");
        assert_eq!(doc.line(1), Some("second"));
        assert_eq!(doc.line(2), None);
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = Document::from_path("/nonexistent/dir/main.bu").unwrap_err();
        assert!(matches!(err, FmtError::Io { .. }));
    }
}
