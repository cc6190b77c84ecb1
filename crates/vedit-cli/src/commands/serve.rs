//! Serve command implementation.

use crate::cli::{ProjectArgs, ServeArgs};
use crate::error::Result;
use crate::{config, server};

/// Execute the serve command.
///
/// Flags override `VEDIT_*` variables, which override `vedit.toml`.
///
/// # Errors
///
/// Returns errors for:
/// - Invalid configuration or origin patterns
/// - A missing API key
/// - Failure to bind the configured address
pub async fn execute(args: ServeArgs, project: &ProjectArgs) -> Result<()> {
    let config = config::load_with_overrides(project, Some(&args))?;
    server::serve(&config).await
}
