//! Errors at the edges of the formatter
//!
//! Reformatting itself cannot fail. These cover reading and writing files, loading
//! configuration, and looking up a formatter by language.

use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum FmtError {
    /// Reading or writing a file failed
    Io { path: String, message: String },
    /// Configuration could not be loaded or deserialized
    Config(String),
    /// No formatter registered for the language
    LanguageNotFound(String),
    /// Output could not be serialized
    Serialization(String),
}

impl FmtError {
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        FmtError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for FmtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FmtError::Io { path, message } => write!(f, "IO error on '{path}': {message}"),
            FmtError::Config(msg) => write!(f, "Configuration error: {msg}"),
            FmtError::LanguageNotFound(id) => {
                write!(f, "No formatter registered for language '{id}'")
            }
            FmtError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for FmtError {}

impl From<config::ConfigError> for FmtError {
    fn from(err: config::ConfigError) -> Self {
        FmtError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for FmtError {
    fn from(err: serde_json::Error) -> Self {
        FmtError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = FmtError::LanguageNotFound("cobol".into());
        assert_eq!(err.to_string(), "No formatter registered for language 'cobol'");

        let err = FmtError::io(
            Path::new("main.bu"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.to_string(), "IO error on 'main.bu': missing");
    }
}
