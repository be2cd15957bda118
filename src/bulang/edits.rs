//! Applying edit instructions
//!
//! The reformatter only proposes line replacements. This module is the consumer side:
//! it writes them back into a document, converts them to byte-offset spans for callers
//! that speak offsets, and restricts them to a line range.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::document::{Document, LineEnding};
use super::formatting::{reformat, EditInstruction};

/// Replacement of one line's content, addressed by byte offsets into the source text.
///
/// The span never covers the line terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEditSpan {
    pub start: usize,
    pub end: usize,
    pub new_text: String,
}

/// Half-open span of 0-indexed lines: `start` is formatted, `end` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Restrict the range to a document of `line_count` lines, keeping at least one line.
    pub fn clamp(self, line_count: usize) -> Self {
        let start = self.start.min(line_count);
        let mut end = self.end.min(line_count);
        if end <= start {
            end = (start + 1).min(line_count.max(1));
        }
        LineRange { start, end }
    }

    pub fn contains(&self, line: usize) -> bool {
        line >= self.start && line < self.end
    }
}

/// Parses `START:END`, both 0-indexed line numbers.
impl FromStr for LineRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once(':')
            .ok_or_else(|| format!("expected START:END, got '{s}'"))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|e| format!("invalid line number '{part}': {e}"))
        };
        Ok(LineRange::new(parse(start)?, parse(end)?))
    }
}

/// Produce edits for the entire document.
pub fn document_edits(document: &Document) -> Vec<EditInstruction> {
    let edits = reformat(document.lines());
    tracing::debug!(
        lines = document.line_count(),
        edits = edits.len(),
        "reformatted document"
    );
    edits
}

/// Produce edits limited to the provided line range.
pub fn format_range(document: &Document, range: LineRange) -> Vec<EditInstruction> {
    let clamped = range.clamp(document.line_count());
    reformat(document.lines().filter(|line| clamped.contains(line.index)))
}

/// Format the whole document and return the resulting text.
pub fn format_document(document: &Document) -> String {
    apply_edits(document, &document_edits(document))
}

/// Write instructions into the document using its own line ending.
pub fn apply_edits(document: &Document, edits: &[EditInstruction]) -> String {
    apply_edits_with(document, edits, document.line_ending())
}

/// Write instructions into the document, joining split lines with `line_ending`.
///
/// Lines without an instruction are copied unchanged together with their original
/// terminator. Instructions pointing past the last line are ignored; when two target
/// the same line the later one wins.
pub fn apply_edits_with(
    document: &Document,
    edits: &[EditInstruction],
    line_ending: LineEnding,
) -> String {
    if edits.is_empty() {
        return document.text().to_string();
    }

    let replacements: BTreeMap<usize, &str> = edits
        .iter()
        .map(|edit| (edit.line, edit.new_text.as_str()))
        .collect();

    let text = document.text();
    let mut output = String::with_capacity(text.len() + edits.len() * 4);
    for (index, span) in document.spans().iter().enumerate() {
        match replacements.get(&index) {
            Some(new_text) => push_with_line_ending(&mut output, new_text, line_ending),
            None => output.push_str(&text[span.start..span.end]),
        }
        output.push_str(&text[span.end..span.next]);
    }
    output
}

/// Convert instructions to byte spans over the original text, in ascending order.
pub fn to_text_edits(document: &Document, edits: &[EditInstruction]) -> Vec<TextEditSpan> {
    to_text_edits_with(document, edits, document.line_ending())
}

/// Like [`to_text_edits`], joining split lines with `line_ending`.
pub fn to_text_edits_with(
    document: &Document,
    edits: &[EditInstruction],
    line_ending: LineEnding,
) -> Vec<TextEditSpan> {
    let spans = document.spans();
    let mut result: Vec<TextEditSpan> = edits
        .iter()
        .filter_map(|edit| {
            let span = spans.get(edit.line)?;
            let mut new_text = String::with_capacity(edit.new_text.len() + 1);
            push_with_line_ending(&mut new_text, &edit.new_text, line_ending);
            Some(TextEditSpan {
                start: span.start,
                end: span.end,
                new_text,
            })
        })
        .collect();
    result.sort_by_key(|span| span.start);
    result
}

fn push_with_line_ending(output: &mut String, text: &str, line_ending: LineEnding) {
    match line_ending {
        LineEnding::Lf => output.push_str(text),
        LineEnding::CrLf => {
            let mut parts = text.split('\n');
            if let Some(first) = parts.next() {
                output.push_str(first);
            }
            for part in parts {
                output.push_str("\r\n");
                output.push_str(part);
            }
        }
    }
}
