use std::path::PathBuf;

use thiserror::Error;
use vedit_analysis::AnalysisError;
use vedit_gen::GenError;

/// Errors that abort annotation of one file.
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Failed to patch {path}: {source}")]
    Patch {
        path: PathBuf,
        #[source]
        source: GenError,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AnnotateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnnotateError>;
