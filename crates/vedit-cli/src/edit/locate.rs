//! Mapping edit requests onto files, and the path guard every write passes.

use std::fs;
use std::path::{Component, Path, PathBuf};

use path_clean::PathClean;
use vedit_analysis::resolver::{resolve_path_alias, resolve_with_extensions};
use vedit_analysis::{AnalyzerConfig, ResolveResult};
use vedit_annotate::rules::identity_file_name;
use walkdir::WalkDir;

/// Directory names that are never written to.
const FORBIDDEN_DIRS: &[&str] = &["node_modules", "public"];

/// Find the first file under `root` whose name without a `.js`, `.jsx`,
/// `.ts` or `.tsx` extension equals `name`.
///
/// Directories named in `ignore_dirs` are not descended into. Siblings are
/// visited in name order so the result is stable.
pub fn find_source_file(root: &Path, name: &str, ignore_dirs: &[String]) -> Option<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !ignore_dirs.iter().any(|dir| entry.file_name() == dir.as_str())
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .find(|entry| identity_file_name(entry.path()) == name)
        .map(|entry| entry.into_path())
}

/// Where a component file is assumed to live when nothing matches.
pub fn default_component_path(root: &Path, components_dir: &Path, name: &str) -> PathBuf {
    root.join(components_dir).join(format!("{name}.js")).clean()
}

/// Check that `path` may be written: inside `root`, free of `..`, and
/// outside dependency and static-asset directories.
///
/// The check runs on the lexical path and again on its symlink-resolved
/// location, so a link inside the root cannot point a write elsewhere.
/// Returns the normalized path.
pub fn check_path_allowed(root: &Path, path: &Path) -> Result<PathBuf, String> {
    let forbidden = || format!("Forbidden path: {}", path.display());
    if path.components().any(|c| c == Component::ParentDir) {
        return Err(forbidden());
    }
    let normalized = path.clean();
    let root = root.clean();
    if !is_inside(&root, &normalized) {
        return Err(forbidden());
    }

    let real_root = fs::canonicalize(&root).unwrap_or_else(|_| root.clone());
    let real_path = resolve_links(&normalized);
    if !is_inside(&real_root, &real_path) {
        tracing::warn!(
            path = %normalized.display(),
            target = %real_path.display(),
            "Path resolves outside the project root"
        );
        return Err(forbidden());
    }
    Ok(normalized)
}

/// Below `root` and outside every forbidden directory.
fn is_inside(root: &Path, path: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };
    !relative.components().any(|c| match c {
        Component::Normal(name) => FORBIDDEN_DIRS.iter().any(|dir| name == *dir),
        _ => false,
    })
}

/// Canonical form of `path`, resolving links through its deepest existing
/// ancestor when the path itself does not exist yet.
fn resolve_links(path: &Path) -> PathBuf {
    let mut missing = Vec::new();
    let mut current = path;
    loop {
        if let Ok(real) = fs::canonicalize(current) {
            return missing.iter().rev().fold(real, |acc, name| acc.join(name));
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                current = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

/// Resolve the file a variable edit targets.
///
/// An absolute path wins. Otherwise `@/` specifiers map onto the source
/// root, and `./`/`../` specifiers resolve against it.
pub fn resolve_variable_source(
    config: &AnalyzerConfig,
    source_file: Option<&str>,
    source_file_abs: Option<&Path>,
) -> Result<PathBuf, String> {
    if let Some(abs) = source_file_abs {
        return Ok(abs.to_path_buf());
    }
    let Some(specifier) = source_file else {
        return Err("sourceFile or sourceFileAbs is required for variableEdit".to_string());
    };

    let candidate = if let Some(path) =
        resolve_path_alias(specifier, &config.alias_prefix, &config.src_root)
    {
        path
    } else if specifier.starts_with("./") || specifier.starts_with("../") {
        config.src_root.join(specifier).clean()
    } else {
        return Err(format!("Could not resolve source file: {specifier}"));
    };

    match resolve_with_extensions(candidate, &config.extensions) {
        ResolveResult::Local(path) => Ok(path),
        _ => Err(format!("Could not resolve source file: {specifier}")),
    }
}

/// `/`-prefixed path of `path` relative to `root`, as reported in edit records.
pub fn display_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{}", joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ignore() -> Vec<String> {
        ["node_modules", "public", ".git", "build", "dist", "coverage"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_find_source_file_skips_ignored_dirs() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("node_modules/ui")).unwrap();
        fs::create_dir_all(root.join("src/components")).unwrap();
        fs::write(root.join("node_modules/ui/Hero.js"), "").unwrap();
        fs::write(root.join("src/components/Hero.jsx"), "").unwrap();
        fs::write(root.join("src/components/HeroCard.jsx"), "").unwrap();

        let found = find_source_file(root, "Hero", &ignore()).unwrap();
        assert_eq!(found, root.join("src/components/Hero.jsx"));
        assert!(find_source_file(root, "Missing", &ignore()).is_none());
    }

    #[test]
    fn test_default_component_path() {
        let path = default_component_path(Path::new("/app"), Path::new("src/components"), "Promo");
        assert_eq!(path, PathBuf::from("/app/src/components/Promo.js"));
    }

    #[test]
    fn test_check_path_allowed() {
        let root = Path::new("/app");
        assert_eq!(
            check_path_allowed(root, Path::new("/app/src/App.jsx")),
            Ok(PathBuf::from("/app/src/App.jsx"))
        );
        assert!(check_path_allowed(root, Path::new("/app/../etc/passwd")).is_err());
        assert!(check_path_allowed(root, Path::new("/other/src/App.jsx")).is_err());
        assert!(check_path_allowed(root, Path::new("/application/src/App.jsx")).is_err());
        assert!(check_path_allowed(root, Path::new("/app/node_modules/x/index.js")).is_err());
        assert!(check_path_allowed(root, Path::new("/app/public/index.js")).is_err());
        assert!(check_path_allowed(root, Path::new("/app/src/publicity/Ad.jsx")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_check_path_allowed_follows_symlinks() {
        let temp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(outside.path().join("secret.js"), "").unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("src/link")).unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("secret.js"),
            root.join("src/alias.js"),
        )
        .unwrap();

        assert!(check_path_allowed(root, &root.join("src/link/secret.js")).is_err());
        assert!(check_path_allowed(root, &root.join("src/link/new/file.js")).is_err());
        assert!(check_path_allowed(root, &root.join("src/alias.js")).is_err());
        assert_eq!(
            check_path_allowed(root, &root.join("src/components/New.jsx")),
            Ok(root.join("src/components/New.jsx"))
        );
    }

    #[test]
    fn test_resolve_variable_source() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src/data/menu")).unwrap();
        fs::write(root.join("src/data/prices.js"), "").unwrap();
        fs::write(root.join("src/data/menu/index.ts"), "").unwrap();
        let config = AnalyzerConfig::new(root);
        let src = config.src_root.clone();

        assert_eq!(
            resolve_variable_source(&config, Some("@/data/prices"), None),
            Ok(src.join("data/prices.js"))
        );
        assert_eq!(
            resolve_variable_source(&config, Some("./data/menu"), None),
            Ok(src.join("data/menu/index.ts"))
        );
        assert!(resolve_variable_source(&config, Some("lodash"), None).is_err());
        assert!(resolve_variable_source(&config, Some("@/data/missing"), None).is_err());
        assert!(resolve_variable_source(&config, None, None).is_err());

        let abs = Path::new("/anywhere/data.js");
        assert_eq!(
            resolve_variable_source(&config, Some("@/data/prices"), Some(abs)),
            Ok(abs.to_path_buf())
        );
    }

    #[test]
    fn test_display_path() {
        assert_eq!(
            display_path(Path::new("/app"), Path::new("/app/src/data/prices.js")),
            "/src/data/prices.js"
        );
    }
}
