//! Configuration loading
//!
//! Settings come from `defaults/bulang-fmt.default.toml`, compiled into the crate, then
//! from any `bulang-fmt.toml` files, then from command-line flags. A later layer
//! replaces individual keys of an earlier one; it never replaces whole tables.

use std::path::Path;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;

use super::document::{Document, LineEnding};
use super::error::FmtError;

const DEFAULT_TOML: &str = include_str!("../../defaults/bulang-fmt.default.toml");

/// File picked up from the working directory when present
pub const CONFIG_FILE_NAME: &str = "bulang-fmt.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FmtConfig {
    pub formatting: FormattingConfig,
    pub files: FilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormattingConfig {
    pub language: String,
    pub line_ending: LineEndingPolicy,
}

/// Which files a directory argument expands to.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    pub extensions: Vec<String>,
    pub recursive: bool,
}

impl FilesConfig {
    /// Whether `path` carries one of the configured extensions.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|wanted| wanted == ext))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEndingPolicy {
    Preserve,
    Lf,
    Crlf,
}

impl LineEndingPolicy {
    /// Terminator to use for lines split in `document`.
    pub fn resolve(self, document: &Document) -> LineEnding {
        match self {
            LineEndingPolicy::Preserve => document.line_ending(),
            LineEndingPolicy::Lf => LineEnding::Lf,
            LineEndingPolicy::Crlf => LineEnding::CrLf,
        }
    }
}

/// Stacks TOML files and key overrides on top of the compiled-in defaults.
///
/// Layers are applied in the order they are added.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let defaults = File::from_str(DEFAULT_TOML, FileFormat::Toml);
        Self {
            builder: Config::builder().add_source(defaults),
        }
    }

    /// Add a TOML file given with `--config`; `build` fails if it does not exist.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), true)
    }

    /// Add a TOML file that is skipped when absent, such as `bulang-fmt.toml`.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), false)
    }

    fn layer(mut self, path: &Path, required: bool) -> Self {
        let file = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(file);
        self
    }

    /// Set one dotted key, e.g. `formatting.language` from `--language`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, FmtError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Merge every layer into an [`FmtConfig`].
    pub fn build(self) -> Result<FmtConfig, FmtError> {
        Ok(self.builder.build()?.try_deserialize()?)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The compiled-in settings with nothing layered on top.
pub fn load_defaults() -> Result<FmtConfig, FmtError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.formatting.language, "bulang");
        assert_eq!(config.formatting.line_ending, LineEndingPolicy::Preserve);
        assert_eq!(config.files.extensions, vec!["bu".to_string()]);
        assert!(!config.files.recursive);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("formatting.line_ending", "crlf")
            .expect("override to apply")
            .set_override("files.recursive", true)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.formatting.line_ending, LineEndingPolicy::Crlf);
        assert!(config.files.recursive);
    }

    #[test]
    fn layers_user_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[files]\nextensions = [\"bu\", \"bul\"]\n").unwrap();

        let config = Loader::new().with_file(&path).build().unwrap();
        assert_eq!(config.files.extensions, vec!["bu", "bul"]);
        assert_eq!(config.formatting.language, "bulang");
    }

    #[test]
    fn later_layers_replace_single_keys() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join(CONFIG_FILE_NAME);
        let explicit = dir.path().join("explicit.toml");
        fs::write(&project, "[files]\nextensions = [\"bul\"]\nrecursive = true\n").unwrap();
        fs::write(&explicit, "[files]\nrecursive = false\n").unwrap();

        let config = Loader::new()
            .with_optional_file(&project)
            .with_file(&explicit)
            .set_override("formatting.language", "other")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.files.extensions, vec!["bul"]);
        assert!(!config.files.recursive);
        assert_eq!(config.formatting.language, "other");
        assert_eq!(config.formatting.line_ending, LineEndingPolicy::Preserve);
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let result = Loader::new().with_file("/nonexistent/bulang-fmt.toml").build();
        assert!(matches!(result, Err(FmtError::Config(_))));
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/nonexistent/bulang-fmt.toml")
            .build()
            .unwrap();
        assert_eq!(config.formatting.language, "bulang");
    }

    #[test]
    fn extension_matching() {
        let config = load_defaults().unwrap();
        assert!(config.files.matches(Path::new("scripts/main.bu")));
        assert!(!config.files.matches(Path::new("scripts/main.c")));
        assert!(!config.files.matches(Path::new("Makefile")));
    }

    #[test]
    fn line_ending_policy_resolution() {
        let document = Document::from_string("a\r\nb\r\n");
        assert_eq!(LineEndingPolicy::Preserve.resolve(&document), LineEnding::CrLf);
        assert_eq!(LineEndingPolicy::Lf.resolve(&document), LineEnding::Lf);
        assert_eq!(LineEndingPolicy::Crlf.resolve(&document), LineEnding::CrLf);
    }
}
