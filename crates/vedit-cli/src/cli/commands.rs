use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Available vedit subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the mutation server
    ///
    /// Accepts batches of visual edits over HTTP and writes them back into
    /// the project's source files, recording each change in git.
    Serve(ServeArgs),

    /// Stamp metadata attributes onto JSX elements
    ///
    /// Prints the annotated source of a single file, or rewrites files in
    /// place with --write.
    Annotate(AnnotateArgs),

    /// Print the provenance of each element in a file as JSON
    Inspect(InspectArgs),
}

/// Arguments for the serve command
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Interface to bind
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Shared secret expected in the x-api-key header
    ///
    /// Can also be set with VEDIT_SERVER__API_KEY or server.api_key.
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Do not record edits in git
    #[arg(long)]
    pub no_git: bool,
}

/// Arguments for the annotate command
#[derive(Args, Debug, Clone)]
pub struct AnnotateArgs {
    /// Files or directories to annotate
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Rewrite files in place instead of printing
    #[arg(short, long)]
    pub write: bool,

    /// Index every component usage in the project before annotating
    ///
    /// Lets props be traced to call sites in files that are not part of
    /// this run.
    #[arg(long)]
    pub eager_index: bool,
}

/// Arguments for the inspect command
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Source file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Only report elements whose opening tag is on this line
    #[arg(short, long, value_name = "N")]
    pub line: Option<u32>,
}
