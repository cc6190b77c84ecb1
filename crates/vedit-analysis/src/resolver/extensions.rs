//! Extension resolution for module files.
//!
//! Handles trying the configured source extensions (`.tsx`, `.ts`, `.jsx`,
//! `.js`) and directory index files when resolving imports.

use std::path::{Path, PathBuf};

use crate::config::ResolveResult;

/// Default extensions, in resolution order.
pub const EXTENSIONS: &[&str] = &[".tsx", ".ts", ".jsx", ".js"];

/// Try the path as written, then with each extension appended.
///
/// Extensions are appended rather than substituted so `Row.styles` tries
/// `Row.styles.tsx`, not `Row.tsx`.
pub fn try_extensions(base: &Path, extensions: &[String]) -> Option<PathBuf> {
    let name = base.file_name()?.to_str()?;
    for ext in extensions {
        let candidate = if name.ends_with(ext.as_str()) {
            base.to_path_buf()
        } else {
            base.with_file_name(format!("{name}{ext}"))
        };
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Try `index.<ext>` inside a directory.
pub fn try_index_files(dir: &Path, extensions: &[String]) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }
    extensions
        .iter()
        .map(|ext| dir.join(format!("index{ext}")))
        .find(|index| index.is_file())
}

/// Resolve a candidate path with extension and index file fallbacks.
pub fn resolve_with_extensions(candidate: PathBuf, extensions: &[String]) -> ResolveResult {
    if let Some(resolved) = try_extensions(&candidate, extensions) {
        return ResolveResult::Local(resolved);
    }
    if let Some(resolved) = try_index_files(&candidate, extensions) {
        return ResolveResult::Local(resolved);
    }
    ResolveResult::Unresolved(candidate.to_string_lossy().to_string())
}
