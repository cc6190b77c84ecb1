//! File-based config discovery and layered loading.
//!
//! Priority, lowest to highest: built-in defaults, `vedit.toml`, `VEDIT_*`
//! environment variables, then whatever the caller merges on top of
//! [`ConfigDiscovery::figment`] (CLI flags).

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};

use crate::config::VeditConfig;
use crate::error::{ConfigError, Result};

/// Conventional config file name, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "vedit.toml";

/// Environment variable prefix. Nested keys are separated by `__`,
/// e.g. `VEDIT_SERVER__API_KEY`.
pub const ENV_PREFIX: &str = "VEDIT_";

/// Finds and loads vedit configuration for a project root.
///
/// # Example
///
/// ```no_run
/// use vedit_config::ConfigDiscovery;
///
/// let config = ConfigDiscovery::new(".").load(None).unwrap();
/// println!("serving on {}", config.server.bind_address());
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find `vedit.toml` in the root directory.
    pub fn find(&self) -> Option<PathBuf> {
        let path = self.root.join(CONFIG_FILE_NAME);
        path.is_file().then_some(path)
    }

    /// Build the layered figment without extracting it.
    ///
    /// An explicit path must exist; the conventional file is optional.
    pub fn figment(&self, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(VeditConfig::default()));

        let file = match explicit {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => Some(path.to_path_buf()),
            None => self.find(),
        };

        if let Some(path) = file {
            tracing::debug!("loading config from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extract and validate a figment produced by [`Self::figment`].
    pub fn extract(&self, figment: Figment) -> Result<VeditConfig> {
        let config: VeditConfig = figment.extract().map_err(|e| ConfigError::InvalidValue {
            field: "configuration".to_string(),
            hint: Some(format!("{} (check {} syntax and field types)", e, CONFIG_FILE_NAME)),
        })?;

        let config = config.rooted_at(&self.root);
        config.validate()?;
        Ok(config)
    }

    /// Load defaults, the config file and environment overrides.
    pub fn load(&self, explicit: Option<&Path>) -> Result<VeditConfig> {
        let figment = self.figment(explicit)?;
        self.extract(figment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_load_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let discovery = ConfigDiscovery::new(temp.path());

        assert!(discovery.find().is_none());
        let config = discovery.load(None).unwrap();
        assert_eq!(config.server.port, 4567);
        assert_eq!(config.project.root, temp.path().join("."));
    }

    #[test]
    #[serial]
    fn test_load_toml_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            r#"
[project]
src_dir = "app"
max_depth = 5

[server]
port = 9000
api_key = "secret"
"#,
        )
        .unwrap();

        let discovery = ConfigDiscovery::new(temp.path());
        let config = discovery.load(None).unwrap();
        assert_eq!(config.project.src_dir, PathBuf::from("app"));
        assert_eq!(config.project.max_depth, 5);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.api_key.as_deref(), Some("secret"));
        // Untouched sections keep their defaults
        assert_eq!(config.vcs.user_name, "visual-edit");
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "[server]\napi_key = \"from-file\"\n",
        )
        .unwrap();

        unsafe {
            std::env::set_var("VEDIT_SERVER__API_KEY", "from-env");
        }
        let config = ConfigDiscovery::new(temp.path()).load(None);
        unsafe {
            std::env::remove_var("VEDIT_SERVER__API_KEY");
        }

        assert_eq!(config.unwrap().server.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    #[serial]
    fn test_explicit_missing_file() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        let result = ConfigDiscovery::new(temp.path()).load(Some(&missing));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    #[serial]
    fn test_invalid_type_reports_error() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "[server]\nport = \"not a number\"\n",
        )
        .unwrap();

        let result = ConfigDiscovery::new(temp.path()).load(None);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
