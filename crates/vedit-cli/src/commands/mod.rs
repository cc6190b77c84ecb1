//! Command implementations for the vedit CLI.
//!
//! - [`serve`] - Mutation server
//! - [`annotate`] - Metadata annotation of files and trees
//! - [`inspect`] - Provenance report for one file
//!
//! Each command provides an `execute` function taking its parsed arguments
//! and the global project arguments.

pub mod annotate;
pub mod inspect;
pub mod serve;

pub use annotate::execute as annotate_execute;
pub use inspect::execute as inspect_execute;
pub use serve::execute as serve_execute;
