//! vedit - visual editing toolchain for JSX projects.
//!
//! Parses arguments, initializes logging and dispatches to the command
//! implementations.

use clap::Parser;
use miette::Result;
use vedit_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let project = args.project;
    let result = match args.command {
        cli::Command::Serve(serve_args) => commands::serve_execute(serve_args, &project).await,
        cli::Command::Annotate(annotate_args) => commands::annotate_execute(annotate_args, &project),
        cli::Command::Inspect(inspect_args) => commands::inspect_execute(inspect_args, &project),
    };

    result.map_err(error::cli_error_to_miette)
}
