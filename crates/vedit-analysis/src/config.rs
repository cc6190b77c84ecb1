//! Analyzer configuration types.

use std::fmt;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use vedit_config::ProjectConfig;

/// Default cross-file recursion cap for dynamic and portal detection.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Maximum file size in bytes (10 MB).
///
/// Larger files are never parsed; anything imported from them classifies
/// as external.
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Maximum depth for cross-file recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MaxDepth(pub usize);

impl MaxDepth {
    pub fn new(depth: usize) -> Self {
        Self(depth)
    }

    pub fn value(&self) -> usize {
        self.0
    }

    /// Whether a recursion at `depth` has gone past the cap.
    pub fn exceeded(&self, depth: usize) -> bool {
        depth > self.0
    }
}

impl Default for MaxDepth {
    fn default() -> Self {
        Self(DEFAULT_MAX_DEPTH)
    }
}

impl From<usize> for MaxDepth {
    fn from(depth: usize) -> Self {
        Self(depth)
    }
}

/// Settings for one analysis session.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Project root. Nothing outside it is parsed.
    pub root: PathBuf,

    /// Directory that the alias prefix maps onto.
    pub src_root: PathBuf,

    /// Alias prefix for first-party specifiers (`@/`).
    pub alias_prefix: String,

    /// Extensions tried in order, with leading dots.
    pub extensions: Vec<String>,

    /// Directory names skipped when walking the project.
    pub ignore_dirs: Vec<String>,

    /// Cross-file recursion cap.
    pub max_depth: MaxDepth,
}

impl AnalyzerConfig {
    /// Build a config rooted at `root` with default conventions.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let project = ProjectConfig {
            root: root.as_ref().to_path_buf(),
            ..ProjectConfig::default()
        };
        Self::from_project(&project)
    }

    pub fn from_project(project: &ProjectConfig) -> Self {
        let root = project.root.clean();
        Self {
            src_root: root.join(&project.src_dir),
            root,
            alias_prefix: project.alias_prefix.clone(),
            extensions: project.extensions.clone(),
            ignore_dirs: project.ignore_dirs.clone(),
            max_depth: MaxDepth::new(project.max_depth),
        }
    }

    /// Whether a specifier is first-party (alias-rooted or relative).
    pub fn is_first_party(&self, specifier: &str) -> bool {
        specifier.starts_with(self.alias_prefix.as_str())
            || specifier.starts_with("./")
            || specifier.starts_with("../")
    }

    /// Whether `path` has one of the configured source extensions.
    pub fn has_source_extension(&self, path: &Path) -> bool {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }
}

/// Result of module resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveResult {
    /// Module resolved to a local file path.
    Local(PathBuf),

    /// Bare specifier; third-party code is never analyzed.
    External(String),

    /// First-party specifier with no matching file.
    Unresolved(String),
}

impl ResolveResult {
    pub fn is_local(&self) -> bool {
        matches!(self, ResolveResult::Local(_))
    }

    pub fn is_external(&self) -> bool {
        matches!(self, ResolveResult::External(_))
    }

    pub fn local_path(&self) -> Option<&Path> {
        match self {
            ResolveResult::Local(path) => Some(path),
            _ => None,
        }
    }

    pub fn into_local(self) -> Option<PathBuf> {
        match self {
            ResolveResult::Local(path) => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for ResolveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveResult::Local(path) => write!(f, "Local({})", path.display()),
            ResolveResult::External(name) => write!(f, "External({})", name),
            ResolveResult::Unresolved(specifier) => write!(f, "Unresolved({})", specifier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_project_cleans_root() {
        let config = AnalyzerConfig::new("/srv/app/./");
        assert_eq!(config.root, PathBuf::from("/srv/app"));
        assert_eq!(config.src_root, PathBuf::from("/srv/app/src"));
        assert_eq!(config.max_depth, MaxDepth::new(3));
    }

    #[test]
    fn test_first_party_specifiers() {
        let config = AnalyzerConfig::new("/srv/app");
        assert!(config.is_first_party("@/data/prices"));
        assert!(config.is_first_party("./Row"));
        assert!(config.is_first_party("../lib/util"));
        assert!(!config.is_first_party("react"));
        assert!(!config.is_first_party("@radix-ui/react-dialog"));
    }

    #[test]
    fn test_max_depth_exceeded() {
        let depth = MaxDepth::default();
        assert!(!depth.exceeded(3));
        assert!(depth.exceeded(4));
    }
}
