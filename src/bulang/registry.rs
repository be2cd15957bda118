//! Formatter registry
//!
//! Editors look formatters up by language identifier and call them once per "format
//! document" request. This module provides that lookup for Rust callers: each
//! formatter implements [`DocumentFormatter`] and is registered with a
//! [`FormatterRegistry`] under its language id.

use std::collections::HashMap;

use super::document::Document;
use super::edits::{document_edits, format_range, LineRange};
use super::error::FmtError;
use super::formatting::EditInstruction;

/// Language id the brace formatter registers under
pub const BULANG_LANGUAGE_ID: &str = "bulang";

/// Trait for document formatters
///
/// Implementors inspect a document and propose line replacements. They must not keep
/// state between calls.
pub trait DocumentFormatter: Send + Sync {
    /// The language this formatter handles (e.g., "bulang")
    fn language_id(&self) -> &str;

    /// Compute the edits for a document
    fn provide_edits(&self, document: &Document) -> Vec<EditInstruction>;

    /// Compute the edits for the lines inside `range` only
    fn provide_range_edits(&self, document: &Document, range: LineRange) -> Vec<EditInstruction> {
        let range = range.clamp(document.line_count());
        self.provide_edits(document)
            .into_iter()
            .filter(|edit| range.contains(edit.line))
            .collect()
    }

    /// Optional description of this formatter
    fn description(&self) -> &str {
        ""
    }
}

/// K&R to Allman brace formatter for bulang sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct BraceFormatter;

impl DocumentFormatter for BraceFormatter {
    fn language_id(&self) -> &str {
        BULANG_LANGUAGE_ID
    }

    fn provide_edits(&self, document: &Document) -> Vec<EditInstruction> {
        document_edits(document)
    }

    fn provide_range_edits(&self, document: &Document, range: LineRange) -> Vec<EditInstruction> {
        format_range(document, range)
    }

    fn description(&self) -> &str {
        "Moves trailing opening braces onto their own line (Allman style)"
    }
}

/// Formatters by language id; at most one per language.
pub struct FormatterRegistry {
    formatters: HashMap<String, Box<dyn DocumentFormatter>>,
}

impl FormatterRegistry {
    /// A registry with no formatters; see [`FormatterRegistry::with_defaults`].
    pub fn new() -> Self {
        FormatterRegistry {
            formatters: HashMap::new(),
        }
    }

    /// The registry the command line uses: just [`BraceFormatter`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(BraceFormatter);
        registry
    }

    /// Add `formatter` under its own language id, dropping any earlier one for that id.
    pub fn register<F: DocumentFormatter + 'static>(&mut self, formatter: F) {
        let language = formatter.language_id().to_string();
        if self.formatters.contains_key(&language) {
            tracing::debug!(language = %language, "replacing registered formatter");
        }
        self.formatters.insert(language, Box::new(formatter));
    }

    pub fn get(&self, language: &str) -> Option<&dyn DocumentFormatter> {
        self.formatters.get(language).map(Box::as_ref)
    }

    pub fn has(&self, language: &str) -> bool {
        self.formatters.contains_key(language)
    }

    fn lookup(&self, language: &str) -> Result<&dyn DocumentFormatter, FmtError> {
        self.get(language)
            .ok_or_else(|| FmtError::LanguageNotFound(language.to_string()))
    }

    /// Edits for the whole document from the formatter for `language`.
    pub fn provide_edits(
        &self,
        language: &str,
        document: &Document,
    ) -> Result<Vec<EditInstruction>, FmtError> {
        Ok(self.lookup(language)?.provide_edits(document))
    }

    /// Edits for `range` only, from the formatter for `language`.
    pub fn provide_range_edits(
        &self,
        language: &str,
        document: &Document,
        range: LineRange,
    ) -> Result<Vec<EditInstruction>, FmtError> {
        Ok(self.lookup(language)?.provide_range_edits(document, range))
    }

    /// Language ids in alphabetical order.
    pub fn list_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self.formatters.keys().cloned().collect();
        languages.sort_unstable();
        languages
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("languages", &self.list_languages())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UppercaseFormatter;
    impl DocumentFormatter for UppercaseFormatter {
        fn language_id(&self) -> &str {
            "shout"
        }
        fn provide_edits(&self, document: &Document) -> Vec<EditInstruction> {
            document
                .lines()
                .map(|line| EditInstruction::new(line.index, line.text.to_uppercase()))
                .collect()
        }
    }

    #[test]
    fn test_registry_creation() {
        let registry = FormatterRegistry::new();
        assert!(registry.list_languages().is_empty());
    }

    #[test]
    fn test_defaults_register_bulang() {
        let registry = FormatterRegistry::default();
        assert!(registry.has(BULANG_LANGUAGE_ID));
        assert_eq!(registry.list_languages(), vec!["bulang"]);
        assert!(!registry.get("bulang").unwrap().description().is_empty());
    }

    #[test]
    fn test_registry_provide_edits() {
        let registry = FormatterRegistry::with_defaults();
        let document = Document::from_string("process teste() {\n}\n");
        let edits = registry.provide_edits("bulang", &document).unwrap();
        assert_eq!(edits, vec![EditInstruction::new(0, "process teste()\n{")]);
    }

    #[test]
    fn test_registry_unknown_language() {
        let registry = FormatterRegistry::with_defaults();
        let document = Document::from_string("x {\n");
        let result = registry.provide_edits("cobol", &document);
        assert_eq!(result, Err(FmtError::LanguageNotFound("cobol".into())));
    }

    #[test]
    fn test_registry_range_edits() {
        let registry = FormatterRegistry::with_defaults();
        let document = Document::from_string("a {\nb {\nc {\n");
        let edits = registry
            .provide_range_edits("bulang", &document, LineRange::new(1, 2))
            .unwrap();
        assert_eq!(edits, vec![EditInstruction::new(1, "b\n{")]);
    }

    #[test]
    fn test_default_range_edits_filter_full_result() {
        let document = Document::from_string("one\ntwo\nthree\n");
        let edits = UppercaseFormatter.provide_range_edits(&document, LineRange::new(2, 9));
        assert_eq!(edits, vec![EditInstruction::new(2, "THREE")]);
    }

    #[test]
    fn test_register_replaces_same_language() {
        struct QuietBrace;
        impl DocumentFormatter for QuietBrace {
            fn language_id(&self) -> &str {
                BULANG_LANGUAGE_ID
            }
            fn provide_edits(&self, _document: &Document) -> Vec<EditInstruction> {
                Vec::new()
            }
        }

        let mut registry = FormatterRegistry::with_defaults();
        registry.register(QuietBrace);
        assert_eq!(registry.list_languages(), vec!["bulang"]);

        let document = Document::from_string("x {\n");
        assert!(registry.provide_edits("bulang", &document).unwrap().is_empty());
        assert_eq!(
            registry.provide_range_edits("cobol", &document, LineRange::new(0, 1)),
            Err(FmtError::LanguageNotFound("cobol".into()))
        );
    }

    #[test]
    fn test_registry_register_custom() {
        let mut registry = FormatterRegistry::with_defaults();
        registry.register(UppercaseFormatter);
        assert_eq!(registry.list_languages(), vec!["bulang", "shout"]);

        let document = Document::from_string("hi\n");
        let edits = registry.provide_edits("shout", &document).unwrap();
        assert_eq!(edits, vec![EditInstruction::new(0, "HI")]);
    }
}
