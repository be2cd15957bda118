//! Expansion of command-line paths into the inputs to format

use std::path::{Path, PathBuf};

use bulang_fmt::bulang::config::FilesConfig;
use bulang_fmt::bulang::error::FmtError;
use walkdir::WalkDir;

/// Where a document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    pub fn display_name(&self) -> String {
        match self {
            Input::Stdin => "<stdin>".to_string(),
            Input::File(path) => path.display().to_string(),
        }
    }
}

/// Turn arguments into inputs.
///
/// `-` is stdin, files are taken as given, and directories expand to the files whose
/// extension is configured (sorted by name, descending only when `recursive` is set).
pub fn collect_inputs(paths: &[String], files: &FilesConfig) -> Result<Vec<Input>, FmtError> {
    let mut inputs = Vec::new();
    for arg in paths {
        if arg == "-" {
            inputs.push(Input::Stdin);
            continue;
        }
        let path = Path::new(arg);
        if path.is_dir() {
            let found = scan_directory(path, files)?;
            if found.is_empty() {
                tracing::warn!(dir = %path.display(), "no matching files in directory");
            }
            inputs.extend(found.into_iter().map(Input::File));
        } else {
            inputs.push(Input::File(path.to_path_buf()));
        }
    }
    Ok(inputs)
}

fn scan_directory(root: &Path, files: &FilesConfig) -> Result<Vec<PathBuf>, FmtError> {
    let max_depth = if files.recursive { usize::MAX } else { 1 };
    let mut found = Vec::new();
    for entry in WalkDir::new(root)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|err| FmtError::Io {
            path: root.display().to_string(),
            message: err.to_string(),
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && files.matches(path) {
            found.push(path.to_path_buf());
        }
    }
    Ok(found)
}
