//! # bulang-fmt
//!
//! Brace-style formatter for the bulang scripting language.
//!
//! The formatter moves an opening brace that trails a statement onto its own line,
//! aligned with the statement (K&R to Allman). It works line by line and proposes
//! replacements instead of rewriting text directly:
//!
//! - [formatting](bulang::formatting) holds the rule and produces edit instructions
//! - [document](bulang::document) splits source text into 0-indexed lines
//! - [edits](bulang::edits) applies instructions, converts them to byte spans, and
//!   restricts them to a line range
//! - [registry](bulang::registry) looks formatters up by language id
//! - [config](bulang::config) loads layered settings for the command-line tool

pub mod bulang;

pub use bulang::document::{Document, SourceLine};
pub use bulang::formatting::{reformat, EditInstruction};
