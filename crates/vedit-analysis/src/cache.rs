//! Parsed-module cache keyed by absolute path and invalidated by mtime.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::config::MAX_FILE_SIZE;
use crate::error::{AnalysisError, Result};
use crate::model::{ModuleModel, lower_source};

#[derive(Debug)]
struct CacheEntry {
    mtime: Option<SystemTime>,
    /// `None` records a failed load so it is not retried until the file changes.
    model: Option<Arc<ModuleModel>>,
}

/// Models of every module loaded in this session.
#[derive(Debug, Default)]
pub struct ModuleCache {
    entries: FxHashMap<PathBuf, CacheEntry>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached model for `path`, reparsing when the file's mtime changed.
    ///
    /// Read and parse failures are logged and yield `None`.
    pub fn get_or_load(&mut self, path: &Path) -> Option<Arc<ModuleModel>> {
        let mtime = modified(path);
        if let Some(entry) = self.entries.get(path) {
            if entry.mtime == mtime {
                debug!(path = %path.display(), "Module cache hit");
                return entry.model.clone();
            }
        }

        let model = match load(path) {
            Ok(model) => Some(Arc::new(model)),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Skipping module");
                None
            }
        };
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                mtime,
                model: model.clone(),
            },
        );
        model
    }

    /// Parse `source` as the current contents of `path` and cache the result.
    ///
    /// Used when the caller already holds the text (annotation passes).
    pub fn insert_source(&mut self, path: &Path, source: &str) -> Result<Arc<ModuleModel>> {
        let model = Arc::new(lower_source(path, source)?);
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                mtime: modified(path),
                model: Some(model.clone()),
            },
        );
        Ok(model)
    }

    /// Already-cached model, without touching the filesystem.
    pub fn peek(&self, path: &Path) -> Option<Arc<ModuleModel>> {
        self.entries.get(path).and_then(|e| e.model.clone())
    }

    /// Drop the cached model for `path`. Returns whether one was present.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    /// Paths of successfully loaded modules, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, e)| e.model.is_some())
            .map(|(p, _)| p.clone())
            .collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Read and lower one file, enforcing [`MAX_FILE_SIZE`].
fn load(path: &Path) -> Result<ModuleModel> {
    if let Ok(metadata) = std::fs::metadata(path) {
        if metadata.len() > MAX_FILE_SIZE as u64 {
            return Err(AnalysisError::FileTooLarge {
                path: path.to_path_buf(),
                size: metadata.len() as usize,
                max: MAX_FILE_SIZE,
            });
        }
    }
    let source = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
    lower_source(path, &source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cache_hit_returns_same_model() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("A.jsx");
        fs::write(&file, "export const A = () => <div />;").unwrap();

        let mut cache = ModuleCache::new();
        let first = cache.get_or_load(&file).unwrap();
        let second = cache.get_or_load(&file).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_invalidate_forces_reparse() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("A.jsx");
        fs::write(&file, "export const A = () => <div />;").unwrap();

        let mut cache = ModuleCache::new();
        let first = cache.get_or_load(&file).unwrap();
        fs::write(&file, "export const A = () => <div><span /></div>;").unwrap();
        assert!(cache.invalidate(&file));
        let second = cache.get_or_load(&file).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.elements.len(), 2);
    }

    #[test]
    fn test_parse_failure_yields_none() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("Broken.jsx");
        fs::write(&file, "export const = <div").unwrap();

        let mut cache = ModuleCache::new();
        assert!(cache.get_or_load(&file).is_none());
        assert!(cache.paths().is_empty());
    }

    #[test]
    fn test_missing_file_yields_none() {
        let mut cache = ModuleCache::new();
        assert!(cache.get_or_load(Path::new("/nonexistent/A.jsx")).is_none());
    }

    #[test]
    fn test_insert_source() {
        let mut cache = ModuleCache::new();
        let path = Path::new("/virtual/B.jsx");
        let model = cache.insert_source(path, "const B = () => <p />;").unwrap();
        assert_eq!(model.elements.len(), 1);
        assert!(cache.peek(path).is_some());
        assert_eq!(cache.paths(), vec![path.to_path_buf()]);
    }
}
