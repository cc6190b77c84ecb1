//! Error types for module loading.
//!
//! These never reach classification callers: a module that cannot be read or
//! parsed simply contributes nothing, and whatever referenced it degrades to
//! `external`/`unknown`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("File '{path}' is too large ({size} bytes, max {max})")]
    FileTooLarge {
        path: PathBuf,
        size: usize,
        max: usize,
    },
}

impl AnalysisError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
