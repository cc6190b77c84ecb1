//! Metadata annotation for JSX sources.
//!
//! The [`Annotator`] walks every element of a file, asks the
//! [`vedit_analysis::Analyzer`] where its data comes from, and stamps the
//! answer onto the opening tag as `x-*` attributes. Raw expression children
//! of native elements are wrapped in a `display: contents` span so the editor
//! can target them.
//!
//! Edits are insertions only: line numbers survive, runtime behaviour does
//! not change, and running the pass again over its own output is a no-op.
//!
//! ```no_run
//! use std::path::Path;
//! use vedit_analysis::{Analyzer, AnalyzerConfig};
//! use vedit_annotate::Annotator;
//!
//! let mut analyzer = Analyzer::new(AnalyzerConfig::new("."));
//! let mut annotator = Annotator::new(&mut analyzer);
//! let report = annotator.annotate_tree(Path::new("src"), true)?;
//! println!("stamped {} elements", report.stamped);
//! # Ok::<(), vedit_annotate::AnnotateError>(())
//! ```

pub mod annotator;
pub mod error;
pub mod meta;
pub mod rules;

pub use annotator::{Annotated, AnnotationReport, Annotator};
pub use error::{AnnotateError, Result};
pub use meta::ElementMeta;
