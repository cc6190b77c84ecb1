//! Source-level building blocks shared by the annotator and the edit server.
//!
//! Nothing here regenerates code from an AST. Every change is expressed as a
//! span splice over the original text so formatting, comments and line
//! numbers survive untouched.

pub mod error;
pub mod fragment;
pub mod jsx;
pub mod line_index;
pub mod parser;
pub mod patch;

pub use error::{GenError, Result};
pub use line_index::LineIndex;
pub use parser::{ParseOptions, ParsedProgram, parse};
pub use patch::SourcePatch;
