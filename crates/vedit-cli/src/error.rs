//! Error handling for the vedit CLI.
//!
//! Library errors convert into [`CliError`] through `#[from]`; `main` turns
//! whatever reaches it into a miette report. Per-edit failures of the
//! mutation server are not errors at all: they are collected as rejected
//! changes and returned to the caller.

use std::path::PathBuf;

use thiserror::Error;
use vedit_analysis::AnalysisError;
use vedit_annotate::AnnotateError;
use vedit_config::ConfigError;

mod miette;

pub use self::miette::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration loading or validation failed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A source file could not be read or parsed
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Annotation of a file failed
    #[error("Annotation error: {0}")]
    Annotate(#[from] AnnotateError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Mutation server errors
    #[error("Server error: {0}")]
    Server(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_from_config_error() {
        let err: CliError = ConfigError::NotFound(PathBuf::from("vedit.toml")).into();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("vedit.toml"));
    }

    #[test]
    fn test_cli_error_from_analysis_error() {
        let err: CliError = AnalysisError::Parse {
            path: PathBuf::from("src/App.jsx"),
            message: "Unexpected token".into(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Analysis error"));
        assert!(msg.contains("src/App.jsx"));
    }

    #[test]
    fn test_file_not_found_message() {
        let err = CliError::FileNotFound(PathBuf::from("src/Missing.jsx"));
        assert_eq!(err.to_string(), "File not found: src/Missing.jsx");
    }
}
