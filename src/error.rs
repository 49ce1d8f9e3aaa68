use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced while locating entry points or inspecting a project layout.
///
/// "No entry point" is not an error: lookups return `Ok(None)` for that case.
#[derive(Error, Debug)]
pub enum LaunchError {
    /// A file or directory could not be opened, read, created or removed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The first line of a source file is not a package declaration.
    #[error("malformed source {path}: expected a package declaration, found {line:?}")]
    MalformedSource { path: PathBuf, line: String },
    /// tree-sitter gave up on a source file.
    #[error("failed to parse {path}")]
    Parse { path: PathBuf },
    /// The bundled grammar does not match the tree-sitter runtime.
    #[error("failed to load Kotlin grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    /// Neither `KOTLIN_HOME` nor `KT_HOME` is set.
    #[error("Kotlin home is not configured (set KOTLIN_HOME or KT_HOME)")]
    MissingKotlinHome,
    /// Directory traversal failed.
    #[error("failed to walk source tree: {0}")]
    Walk(#[from] walkdir::Error),
}

impl LaunchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LaunchError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LaunchError>;
