//! Path alias handling for module resolution.
//!
//! The alias prefix (`@/` by default) maps onto the project's source root.

use std::path::{Path, PathBuf};

use path_clean::PathClean;

/// Resolve an alias-rooted specifier (`@/components/Row`) against `src_root`.
///
/// Returns `None` when `specifier` does not start with `prefix`.
pub fn resolve_path_alias(specifier: &str, prefix: &str, src_root: &Path) -> Option<PathBuf> {
    let rest = specifier.strip_prefix(prefix)?;
    let rest = rest.trim_start_matches('/');
    Some(src_root.join(rest).clean())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_maps_to_src_root() {
        let resolved = resolve_path_alias("@/data/prices", "@/", Path::new("/app/src"));
        assert_eq!(resolved, Some(PathBuf::from("/app/src/data/prices")));
    }

    #[test]
    fn test_alias_cleans_segments() {
        let resolved = resolve_path_alias("@/a/../b", "@/", Path::new("/app/src"));
        assert_eq!(resolved, Some(PathBuf::from("/app/src/b")));
    }

    #[test]
    fn test_non_alias_ignored() {
        assert_eq!(resolve_path_alias("./Row", "@/", Path::new("/app/src")), None);
        assert_eq!(resolve_path_alias("@radix-ui/react", "@/", Path::new("/app/src")), None);
    }
}
