//! Error types for parsing and patching source text

use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while parsing or patching source
#[derive(Error, Debug, Diagnostic)]
pub enum GenError {
    /// Source could not be parsed
    #[error("Parse failed: {context}{}", reason.as_ref().map(|r| format!(" - {}", r)).unwrap_or_default())]
    #[diagnostic(code(vedit::gen::parse_failed))]
    ParseFailed {
        context: String,
        reason: Option<String>,
    },

    /// Two edits touch the same bytes
    #[error("Conflicting edit at {start}..{end}: overlaps an earlier edit at {other_start}..{other_end}")]
    #[diagnostic(
        code(vedit::gen::patch_conflict),
        help("Each region of a file can only be changed once per batch")
    )]
    PatchConflict {
        start: u32,
        end: u32,
        other_start: u32,
        other_end: u32,
    },

    /// Edit range does not fit the source
    #[error("Edit range {start}..{end} is outside the source (length {len})")]
    #[diagnostic(code(vedit::gen::out_of_bounds))]
    OutOfBounds { start: u32, end: u32, len: u32 },
}

impl GenError {
    /// Create a ParseFailed error
    pub fn parse_failed(context: impl Into<String>) -> Self {
        Self::ParseFailed {
            context: context.into(),
            reason: None,
        }
    }

    /// Create a ParseFailed error with reason
    pub fn parse_failed_with_reason(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseFailed {
            context: context.into(),
            reason: Some(reason.into()),
        }
    }
}

/// Result type for parse and patch operations
pub type Result<T> = std::result::Result<T, GenError>;
