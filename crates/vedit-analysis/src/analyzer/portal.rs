//! Portal-like component detection.
//!
//! Overlay primitives render their children detached from the normal tree
//! or require a specific child structure, so their usages must never be
//! wrapped or replaced.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;

use super::Analyzer;
use crate::config::ResolveResult;
use crate::model::{
    Binding, ElementId, ExportTarget, JsxElement, JsxSummary, ModuleModel,
};

/// Overlay root components.
pub const OVERLAY_ROOTS: &[&str] = &[
    "Dialog",
    "Popover",
    "Tooltip",
    "DropdownMenu",
    "ContextMenu",
    "AlertDialog",
    "HoverCard",
    "Select",
    "Menubar",
    "NavigationMenu",
    "Sheet",
    "Drawer",
    "Toast",
    "Command",
];

static PORTAL_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(Trigger|Portal|Content|Overlay|Viewport|Anchor|Arrow)$")
        .expect("portal suffix pattern is valid")
});

/// Overlay root, or a name ending in an overlay part suffix.
pub fn is_portalish_name(name: &str) -> bool {
    OVERLAY_ROOTS.contains(&name) || PORTAL_SUFFIX.is_match(name)
}

/// Elements whose direct children are rendered in their place: anything
/// with `asChild`, `*Trigger` and `Slot`.
pub fn is_slot_parent(parent: &JsxElement) -> bool {
    parent.has_attr("asChild")
        || parent
            .tag()
            .is_some_and(|name| name.ends_with("Trigger") || name == "Slot")
}

fn is_capitalized(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase())
}

impl Analyzer {
    /// Whether `element` must be treated as portal-like.
    pub fn detect_portal_like(&mut self, model: &ModuleModel, element: ElementId) -> bool {
        let Some(el) = model.element(element) else {
            return false;
        };
        if el.tag().is_some_and(is_portalish_name) {
            return true;
        }
        if model.parent_of(element).is_some_and(is_slot_parent) {
            return true;
        }
        self.usage_is_composite_portal(model, element)
    }

    /// Whether the component used by `element` renders a portal-like element
    /// somewhere in its definition, up to the depth cap.
    pub fn usage_is_composite_portal(&mut self, model: &ModuleModel, element: ElementId) -> bool {
        let Some(el) = model.element(element) else {
            return false;
        };
        let Some(name) = el.name.as_deref().filter(|n| is_capitalized(n)) else {
            return false;
        };
        let Some(binding) = model.lookup(el.site.scope, name) else {
            return false;
        };
        let mut seen = FxHashSet::default();
        seen.insert(name.to_string());
        self.binding_has_portals(model, binding, &mut seen, 0)
    }

    fn file_export_has_portals(&mut self, path: &Path, export: &str, depth: usize) -> bool {
        if self.config.max_depth.exceeded(depth) {
            return false;
        }
        let key = (path.to_path_buf(), export.to_string());
        if let Some(&cached) = self.portals.get(&key) {
            return cached;
        }
        self.portals.insert(key.clone(), false);

        let Some(model) = self.modules.get_or_load(path) else {
            return false;
        };
        let mut seen = FxHashSet::default();
        let result = match model.export(export).map(|e| e.target.clone()) {
            Some(ExportTarget::Local(local)) => match model.module_binding(&local) {
                Some(binding) => {
                    seen.insert(local);
                    self.binding_has_portals(&model, binding, &mut seen, depth)
                }
                None => false,
            },
            Some(ExportTarget::ReExport { source, imported }) => {
                match self.resolver.resolve(&source, path) {
                    ResolveResult::Local(next) => {
                        self.file_export_has_portals(&next, &imported, depth + 1)
                    }
                    _ => false,
                }
            }
            Some(ExportTarget::DefaultExpr { summary, .. }) => {
                self.summary_has_portals(&model, &summary, &mut seen, depth)
            }
            None => false,
        };
        self.portals.insert(key, result);
        result
    }

    fn binding_has_portals(
        &mut self,
        model: &ModuleModel,
        binding: &Binding,
        seen: &mut FxHashSet<String>,
        depth: usize,
    ) -> bool {
        match binding {
            Binding::Function(summary) | Binding::Class(summary) => {
                self.summary_has_portals(model, summary, seen, depth)
            }
            Binding::Var { declarator, .. } => match model.declarator(*declarator) {
                Some(decl) => self.summary_has_portals(model, &decl.init_summary, seen, depth),
                None => false,
            },
            Binding::Import { import, specifier } => {
                let Some((entry, spec)) = model.import(*import, *specifier) else {
                    return false;
                };
                let Some(export) = spec.kind.export_name() else {
                    return false;
                };
                match self.resolver.resolve(&entry.source, &model.path) {
                    ResolveResult::Local(path) => {
                        self.file_export_has_portals(&path, export, depth + 1)
                    }
                    _ => false,
                }
            }
            Binding::Param { .. } => false,
        }
    }

    fn summary_has_portals(
        &mut self,
        model: &ModuleModel,
        summary: &JsxSummary,
        seen: &mut FxHashSet<String>,
        depth: usize,
    ) -> bool {
        if summary.names.iter().any(|name| is_portalish_name(name)) {
            return true;
        }
        for name in &summary.names {
            if !is_capitalized(name) || !seen.insert(name.clone()) {
                continue;
            }
            let Some(binding) = model.module_binding(name) else {
                continue;
            };
            if self.binding_has_portals(model, binding, seen, depth) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::model::lower_source;

    #[test]
    fn test_portalish_names() {
        assert!(is_portalish_name("Dialog"));
        assert!(is_portalish_name("DialogContent"));
        assert!(is_portalish_name("SelectTrigger"));
        assert!(is_portalish_name("TooltipArrow"));
        assert!(!is_portalish_name("Card"));
        assert!(!is_portalish_name("ContentList"));
    }

    #[test]
    fn test_detect_portal_like() {
        let model = lower_source(
            "/app/src/Page.jsx",
            r#"
function Confirm() { return <Dialog><DialogContent>Sure?</DialogContent></Dialog>; }
function Wrapper() { return <Confirm />; }
function Plain() { return <p>Hi</p>; }
export default function Page() {
  return (
    <main>
      <DialogTrigger asChild><Button>Open</Button></DialogTrigger>
      <Wrapper />
      <Plain />
    </main>
  );
}
"#,
        )
        .unwrap();
        let mut analyzer = Analyzer::new(AnalyzerConfig::new("/app"));
        let id = |name: &str| model.elements.iter().position(|e| e.tag() == Some(name)).unwrap();

        assert!(analyzer.detect_portal_like(&model, id("DialogContent")));
        assert!(analyzer.detect_portal_like(&model, id("Button")));
        assert!(analyzer.detect_portal_like(&model, id("Wrapper")));
        assert!(!analyzer.detect_portal_like(&model, id("Plain")));
        assert!(!analyzer.detect_portal_like(&model, id("main")));
    }
}
