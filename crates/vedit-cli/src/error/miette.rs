//! Miette diagnostic conversion for CLI errors.

use miette::Report;
use vedit_config::ConfigError;

use crate::error::CliError;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => config_error_to_miette(e),
        CliError::Annotate(e) => miette::miette!("{}", e),
        CliError::Server(msg) => miette::miette!(
            "Server error: {}\n\nHint: Check that the port is free or pass --port",
            msg
        ),
        _ => miette::miette!("{}", err),
    }
}

fn config_error_to_miette(err: ConfigError) -> Report {
    match err {
        ConfigError::NotFound(path) => miette::miette!(
            "Config file not found: {}\n\nHint: Create a vedit.toml in the project root or drop --config",
            path.display()
        ),
        ConfigError::InvalidPattern { pattern, reason } => miette::miette!(
            "Invalid origin pattern '{}': {}\n\nHint: server.allowed_origins entries are regular expressions",
            pattern,
            reason
        ),
        other => miette::miette!("Configuration error: {}", other),
    }
}
