//! Command-line interface definition for vedit.
//!
//! # Command Structure
//!
//! - `vedit serve` - Run the mutation server that applies visual edits
//! - `vedit annotate` - Stamp metadata attributes onto JSX elements
//! - `vedit inspect` - Print the provenance of each element as JSON

mod commands;
mod tests;

use std::path::PathBuf;

use clap::{Args, Parser};

pub use commands::{AnnotateArgs, Command, InspectArgs, ServeArgs};

/// vedit - visual editing for JSX projects
#[derive(Parser, Debug)]
#[command(
    name = "vedit",
    version,
    about = "Visual editing toolchain for JSX projects",
    long_about = "vedit annotates JSX elements with source metadata, traces where their\n\
                  rendered values come from, and serves an endpoint that writes visual\n\
                  edits back into the source files."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Where to find the project and its configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Path to a vedit.toml file
    ///
    /// Defaults to `vedit.toml` in the project root when present.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Frontend project root
    ///
    /// Every edited file must live below it. Defaults to the current
    /// directory.
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,
}
