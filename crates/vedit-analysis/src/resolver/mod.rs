//! Module resolution for first-party source.
//!
//! Alias-rooted and relative specifiers resolve to files under the project;
//! bare specifiers are third-party and never analyzed.

mod aliases;
mod extensions;

pub use aliases::resolve_path_alias;
pub use extensions::{EXTENSIONS, resolve_with_extensions, try_extensions, try_index_files};

use std::path::{Path, PathBuf};

use path_clean::PathClean;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::{AnalyzerConfig, ResolveResult};

/// Memoizing module resolver.
///
/// Results are cached by `(from_file, specifier)` for the resolver's
/// lifetime, so repeated lookups are stable even if files appear later.
#[derive(Debug)]
pub struct ModuleResolver {
    config: AnalyzerConfig,
    memo: FxHashMap<(PathBuf, String), ResolveResult>,
}

impl ModuleResolver {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            memo: FxHashMap::default(),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Resolve `specifier` as imported from `from`.
    ///
    /// 1. Alias prefix maps onto the source root
    /// 2. `./` and `../` resolve against the importer's directory
    /// 3. Anything else is external
    ///
    /// Candidates then try the extension list and `index.<ext>`.
    pub fn resolve(&mut self, specifier: &str, from: &Path) -> ResolveResult {
        let key = (from.to_path_buf(), specifier.to_string());
        if let Some(cached) = self.memo.get(&key) {
            return cached.clone();
        }

        let result = self.resolve_uncached(specifier, from);
        debug!(specifier, from = %from.display(), result = %result, "Resolved module");
        self.memo.insert(key, result.clone());
        result
    }

    fn resolve_uncached(&self, specifier: &str, from: &Path) -> ResolveResult {
        let base = if let Some(path) =
            resolve_path_alias(specifier, &self.config.alias_prefix, &self.config.src_root)
        {
            path
        } else if specifier.starts_with("./") || specifier.starts_with("../") {
            let dir = from.parent().unwrap_or(Path::new(""));
            dir.join(specifier).clean()
        } else {
            return ResolveResult::External(specifier.to_string());
        };

        resolve_with_extensions(base, &self.config.extensions)
    }

    /// Number of memoized lookups.
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> (TempDir, ModuleResolver) {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src/data")).unwrap();
        fs::create_dir_all(temp.path().join("src/components")).unwrap();
        fs::write(temp.path().join("src/data/services.js"), "").unwrap();
        fs::write(temp.path().join("src/components/Row.jsx"), "").unwrap();
        let resolver = ModuleResolver::new(AnalyzerConfig::new(temp.path()));
        (temp, resolver)
    }

    #[test]
    fn test_resolve_relative() {
        let (temp, mut resolver) = project();
        let from = temp.path().join("src/components/List.jsx");
        let result = resolver.resolve("../data/services", &from);
        assert_eq!(
            result.local_path(),
            Some(temp.path().join("src/data/services.js").clean().as_path())
        );
    }

    #[test]
    fn test_resolve_alias() {
        let (temp, mut resolver) = project();
        let from = temp.path().join("src/App.jsx");
        let result = resolver.resolve("@/components/Row", &from);
        assert!(result.is_local());
    }

    #[test]
    fn test_resolve_external() {
        let (temp, mut resolver) = project();
        let from = temp.path().join("src/App.jsx");
        assert_eq!(
            resolver.resolve("react", &from),
            ResolveResult::External("react".to_string())
        );
    }

    #[test]
    fn test_resolution_is_memoized() {
        let (temp, mut resolver) = project();
        let from = temp.path().join("src/App.jsx");
        let first = resolver.resolve("./components/Row", &from);
        // Later filesystem changes do not affect a memoized answer
        fs::remove_file(temp.path().join("src/components/Row.jsx")).unwrap();
        let second = resolver.resolve("./components/Row", &from);
        assert_eq!(first, second);
        assert_eq!(resolver.memo_len(), 1);
    }
}
