//! Brace reformatting
//!
//! Converts K&R brace placement into Allman placement, one line at a time.
//!
//! A line qualifies when its last non-whitespace character is an opening brace and
//! something other than whitespace precedes it:
//!
//!     process teste() {        ->  process teste()
//!                                  {
//!
//! The indentation of the statement is copied verbatim onto the brace line, so tabs
//! and spaces survive byte for byte. Lines are classified independently: a line never
//! looks at its neighbours, and unbalanced braces elsewhere have no effect.
//!
//! Anything that doesn't match is left alone. There is no failure mode.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::document::SourceLine;

/// Whitespace as editors see it: ASCII blanks, no-break and typographic spaces, line
/// and paragraph separators, and the byte order mark. U+0085 is not included.
const WHITESPACE: &str =
    r"\t\n\x0B\x0C\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}";

/// Characters that may appear inside a line: anything but a line break.
const LINE_CHAR: &str = r"[^\n\r\x{2028}\x{2029}]";

/// Indentation, then code ending in a non-whitespace character, then the trailing brace.
static TRAILING_BRACE: Lazy<Regex> = Lazy::new(|| {
    let ws = format!("[{WHITESPACE}]");
    let non_ws = format!("[^{WHITESPACE}]");
    let pattern = format!(r"^({ws}*)({LINE_CHAR}*{non_ws}){ws}*\{{{ws}*$");
    Regex::new(&pattern).expect("brace pattern is valid")
});

/// A single line replacement produced by the reformatter.
///
/// `new_text` may span several lines; it always uses `\n` between them; the caller
/// decides which line terminator ends up in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditInstruction {
    pub line: usize,
    pub new_text: String,
}

impl EditInstruction {
    pub fn new(line: usize, new_text: impl Into<String>) -> Self {
        Self {
            line,
            new_text: new_text.into(),
        }
    }
}

/// The captures of a line that ends in an opening brace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BraceSplit<'a> {
    pub indent: &'a str,
    pub code: &'a str,
}

impl BraceSplit<'_> {
    /// Render the statement line followed by the brace on its own line.
    pub fn replacement(&self) -> String {
        let mut text = String::with_capacity(self.indent.len() * 2 + self.code.len() + 2);
        text.push_str(self.indent);
        text.push_str(self.code);
        text.push('\n');
        text.push_str(self.indent);
        text.push('{');
        text
    }
}

/// Match a single line against the trailing-brace rule.
pub fn split_line(text: &str) -> Option<BraceSplit<'_>> {
    let captures = TRAILING_BRACE.captures(text)?;
    let indent = captures.get(1).map_or("", |m| m.as_str());
    let code = captures.get(2)?.as_str();
    Some(BraceSplit { indent, code })
}

/// Produce the instruction for one line, if it needs one.
pub fn reformat_line(index: usize, text: &str) -> Option<EditInstruction> {
    let split = split_line(text)?;
    tracing::trace!(line = index, code = split.code, "splitting trailing brace");
    Some(EditInstruction::new(index, split.replacement()))
}

/// Reformat a sequence of lines.
///
/// Instructions come out in input order, one per matching line.
pub fn reformat<'a, I>(lines: I) -> Vec<EditInstruction>
where
    I: IntoIterator<Item = SourceLine<'a>>,
{
    lines
        .into_iter()
        .filter_map(|line| reformat_line(line.index, line.text))
        .collect()
}
