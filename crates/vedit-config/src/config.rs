//! Configuration types for the analyzer, the annotator and the edit server.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Top-level configuration, one section per subsystem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VeditConfig {
    pub project: ProjectConfig,
    pub server: ServerConfig,
    pub vcs: VcsConfig,
}

impl VeditConfig {
    /// Validate values that serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ConfigError::invalid_value(
                "server.port",
                "port must be between 1 and 65535",
            ));
        }
        if self.project.extensions.is_empty() {
            return Err(ConfigError::invalid_value(
                "project.extensions",
                "at least one source extension is required",
            ));
        }
        if let Some(ext) = self.project.extensions.iter().find(|e| !e.starts_with('.')) {
            return Err(ConfigError::invalid_value(
                "project.extensions",
                format!("extension '{}' must start with a dot", ext),
            ));
        }
        self.server.compile_origins()?;
        Ok(())
    }

    /// Resolve relative paths against `base` (usually the directory holding the config file).
    pub fn rooted_at(mut self, base: &Path) -> Self {
        if self.project.root.is_relative() {
            self.project.root = base.join(&self.project.root);
        }
        self
    }
}

/// Where first-party source lives and how module specifiers map onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Frontend project root. Every edited file must live below it.
    pub root: PathBuf,

    /// Source directory, relative to `root`.
    pub src_dir: PathBuf,

    /// Specifier prefix that maps onto `src_dir` (e.g. `@/data/prices`).
    pub alias_prefix: String,

    /// Extensions tried, in order, when resolving extensionless specifiers.
    pub extensions: Vec<String>,

    /// Directory names never searched or edited.
    pub ignore_dirs: Vec<String>,

    /// Where a component file is assumed to live when no file matches.
    pub components_dir: PathBuf,

    /// Cross-file recursion cap for dynamic and portal detection.
    pub max_depth: usize,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            src_dir: default_src_dir(),
            alias_prefix: default_alias_prefix(),
            extensions: default_extensions(),
            ignore_dirs: default_ignore_dirs(),
            components_dir: default_components_dir(),
            max_depth: default_max_depth(),
        }
    }
}

impl ProjectConfig {
    /// Absolute source root (`root/src_dir`).
    pub fn src_root(&self) -> PathBuf {
        self.root.join(&self.src_dir)
    }

    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignore_dirs.iter().any(|d| d == name)
    }
}

/// HTTP mutation endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Shared secret expected in the `x-api-key` header.
    pub api_key: Option<String>,

    /// Regex patterns an `Origin` header must fully match to receive CORS headers.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: None,
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl ServerConfig {
    /// Compile `allowed_origins`, anchoring each pattern at both ends.
    pub fn compile_origins(&self) -> Result<Vec<Regex>> {
        self.allowed_origins
            .iter()
            .map(|pattern| {
                let anchored = anchor(pattern);
                Regex::new(&anchored).map_err(|e| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn anchor(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 2);
    if !pattern.starts_with('^') {
        out.push('^');
    }
    out.push_str(pattern);
    if !pattern.ends_with('$') {
        out.push('$');
    }
    out
}

/// Identity used when recording edits in version control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VcsConfig {
    pub enabled: bool,
    pub user_name: String,
    pub user_email: String,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            user_name: default_vcs_user(),
            user_email: default_vcs_email(),
        }
    }
}

fn default_src_dir() -> PathBuf {
    PathBuf::from("src")
}

fn default_alias_prefix() -> String {
    "@/".into()
}

fn default_extensions() -> Vec<String> {
    [".tsx", ".ts", ".jsx", ".js"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_ignore_dirs() -> Vec<String> {
    ["node_modules", "public", ".git", "build", "dist", "coverage"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_components_dir() -> PathBuf {
    PathBuf::from("src/components")
}

fn default_max_depth() -> usize {
    3
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    4567
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        r"https?://(localhost|127\.0\.0\.1)(:\d+)?".into(),
        r"https://([a-zA-Z0-9-]+\.)*emergent\.sh".into(),
        r"https://([a-zA-Z0-9-]+\.)*emergentagent\.com".into(),
        r"https://([a-zA-Z0-9-]+\.)*appspot\.com".into(),
    ]
}

fn default_vcs_user() -> String {
    "visual-edit".into()
}

fn default_vcs_email() -> String {
    "support@emergent.sh".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin_allowed(config: &ServerConfig, origin: &str) -> bool {
        config
            .compile_origins()
            .unwrap()
            .iter()
            .any(|re| re.is_match(origin))
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = VeditConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.project.max_depth, 3);
        assert_eq!(config.project.src_root(), PathBuf::from("./src"));
    }

    #[test]
    fn test_default_origins() {
        let server = ServerConfig::default();
        assert!(origin_allowed(&server, "http://localhost:3000"));
        assert!(origin_allowed(&server, "https://127.0.0.1"));
        assert!(origin_allowed(&server, "https://preview.emergentagent.com"));
        assert!(origin_allowed(&server, "https://a.b.appspot.com"));
        assert!(!origin_allowed(&server, "http://preview.emergent.sh"));
        assert!(!origin_allowed(&server, "https://evil.com"));
        assert!(!origin_allowed(&server, "https://localhost.evil.com"));
    }

    #[test]
    fn test_invalid_origin_pattern() {
        let mut config = VeditConfig::default();
        config.server.allowed_origins = vec!["https://(".into()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_extension_without_dot_rejected() {
        let mut config = VeditConfig::default();
        config.project.extensions = vec!["tsx".into()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_rooted_at() {
        let config = VeditConfig::default().rooted_at(Path::new("/srv/app"));
        assert_eq!(config.project.root, PathBuf::from("/srv/app/."));
    }
}
