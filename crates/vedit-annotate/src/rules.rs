//! Which elements may carry metadata.

use std::path::Path;

use vedit_analysis::analyzer::OVERLAY_ROOTS;

/// Components that are never stamped: router primitives, React built-ins
/// and icons whose markup must stay untouched.
pub const EXCLUDED_COMPONENTS: &[&str] = &[
    // Routing
    "Route",
    "Routes",
    "Switch",
    "Redirect",
    "Navigate",
    "Outlet",
    "Link",
    "NavLink",
    // React
    "Fragment",
    "Suspense",
    "StrictMode",
    "ErrorBoundary",
    "Provider",
    "Consumer",
    // Primitives that measure or forward their child
    "Slot",
    "CommandInput",
    "CommandDialog",
    // Icons
    "X",
    "Check",
    "Plus",
    "Minus",
    "Search",
    "Menu",
    "Settings",
    "User",
    "Home",
    "ChevronRight",
    "ChevronLeft",
    "ChevronUp",
    "ChevronDown",
    "ArrowRight",
    "ArrowLeft",
];

/// Containers that validate their direct children.
pub const STRICT_PARENTS: &[&str] = &[
    "Routes",
    "Switch",
    "BrowserRouter",
    "Router",
    "MemoryRouter",
    "HashRouter",
];

pub fn is_excluded_component(name: &str) -> bool {
    EXCLUDED_COMPONENTS.contains(&name)
}

/// Router containers and overlay roots.
pub fn is_strict_parent(name: &str) -> bool {
    STRICT_PARENTS.contains(&name) || OVERLAY_ROOTS.contains(&name)
}

/// File name used in element identities: the base name without a
/// `.js`/`.jsx`/`.ts`/`.tsx` extension.
pub fn identity_file_name(path: &Path) -> String {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return "unknown".to_string();
    };
    for ext in [".tsx", ".jsx", ".ts", ".js"] {
        if let Some(stem) = name.strip_suffix(ext) {
            return stem.to_string();
        }
    }
    name.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_file_name() {
        assert_eq!(identity_file_name(Path::new("/app/src/App.jsx")), "App");
        assert_eq!(identity_file_name(Path::new("src/ui/button.tsx")), "button");
        assert_eq!(identity_file_name(Path::new("data.test.js")), "data.test");
        assert_eq!(identity_file_name(Path::new("styles.css")), "styles.css");
        assert_eq!(identity_file_name(Path::new("/")), "unknown");
    }

    #[test]
    fn test_strict_parents() {
        assert!(is_strict_parent("Routes"));
        assert!(is_strict_parent("Dialog"));
        assert!(!is_strict_parent("DialogPortal"));
        assert!(!is_strict_parent("div"));
    }
}
