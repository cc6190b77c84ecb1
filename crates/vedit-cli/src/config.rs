//! Configuration loading for CLI commands.
//!
//! Priority: CLI flags > `VEDIT_*` environment variables > `vedit.toml` >
//! defaults. The lower layers come from [`ConfigDiscovery`]; flags are merged
//! on top here.

use std::path::{Path, PathBuf};

use figment::providers::Serialized;
use path_clean::PathClean;
use vedit_config::{ConfigDiscovery, VeditConfig};

use crate::cli::{ProjectArgs, ServeArgs};
use crate::error::Result;

/// Absolute project root from `--root`, or the current directory.
pub fn project_root(args: &ProjectArgs) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match &args.root {
        Some(root) => absolute(root, &cwd),
        None => cwd,
    })
}

/// Load configuration for commands that only read the project.
pub fn load(args: &ProjectArgs) -> Result<VeditConfig> {
    load_with_overrides(args, None)
}

/// Load configuration, merging `serve` flags over the server section.
pub fn load_with_overrides(args: &ProjectArgs, serve: Option<&ServeArgs>) -> Result<VeditConfig> {
    let root = project_root(args)?;
    let explicit = match &args.config {
        Some(path) => Some(absolute(path, &std::env::current_dir()?)),
        None => None,
    };

    let discovery = ConfigDiscovery::new(&root);
    let mut figment = discovery.figment(explicit.as_deref())?;

    if let Some(serve) = serve {
        if let Some(host) = &serve.host {
            figment = figment.merge(Serialized::default("server.host", host));
        }
        if let Some(port) = serve.port {
            figment = figment.merge(Serialized::default("server.port", port));
        }
        if let Some(key) = &serve.api_key {
            figment = figment.merge(Serialized::default("server.api_key", key));
        }
        if serve.no_git {
            figment = figment.merge(Serialized::default("vcs.enabled", false));
        }
    }

    let mut config = discovery.extract(figment)?;
    config.project.root = config.project.root.clean();
    tracing::debug!(root = %config.project.root.display(), "Loaded configuration");
    Ok(config)
}

/// `path` made absolute against the current directory and cleaned.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    Ok(absolute(path, &std::env::current_dir()?))
}

fn absolute(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.clean()
    } else {
        cwd.join(path).clean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn project(temp: &TempDir) -> ProjectArgs {
        ProjectArgs {
            config: None,
            root: Some(temp.path().to_path_buf()),
        }
    }

    #[test]
    #[serial]
    fn test_cli_overrides_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("vedit.toml"),
            "[server]\nport = 9000\napi_key = \"from-file\"\n",
        )
        .unwrap();

        let serve = ServeArgs {
            port: Some(7000),
            no_git: true,
            ..ServeArgs::default()
        };
        let config = load_with_overrides(&project(&temp), Some(&serve)).unwrap();
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.api_key.as_deref(), Some("from-file"));
        assert!(!config.vcs.enabled);
    }

    #[test]
    #[serial]
    fn test_root_is_absolute_and_clean() {
        let temp = TempDir::new().unwrap();
        let config = load(&project(&temp)).unwrap();
        assert!(config.project.root.is_absolute());
        assert_eq!(config.project.root, temp.path().to_path_buf().clean());
        assert_eq!(config.project.src_root(), temp.path().join("src").clean());
    }

    #[test]
    #[serial]
    fn test_missing_explicit_config() {
        let temp = TempDir::new().unwrap();
        let args = ProjectArgs {
            config: Some(temp.path().join("nope.toml")),
            root: Some(temp.path().to_path_buf()),
        };
        assert!(load(&args).is_err());
    }
}
