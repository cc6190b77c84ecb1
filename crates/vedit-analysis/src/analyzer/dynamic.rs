//! Dynamic-composite detection.
//!
//! A component is dynamic when its rendered markup contains a non-empty
//! `{expression}`, a spread attribute or a spread child. Identifiers and call
//! arguments are unwound; zero-argument calls are assumed dynamic.

use std::path::Path;

use rustc_hash::FxHashSet;

use super::Analyzer;
use crate::config::ResolveResult;
use crate::model::{
    Binding, ElementId, Expr, ExprKind, ExportTarget, MODULE_SCOPE, ModuleModel, ScopeId,
};

impl Analyzer {
    /// Whether the component used by `element` renders dynamic markup.
    pub fn detect_dynamic_composite(&mut self, model: &ModuleModel, element: ElementId) -> bool {
        let Some(el) = model.element(element) else {
            return false;
        };
        let Some(name) = el.name.as_deref() else {
            return false;
        };
        let Some(binding) = model.lookup(el.site.scope, name) else {
            return false;
        };
        let mut seen = FxHashSet::default();
        seen.insert(name.to_string());
        self.binding_is_dynamic(model, binding, &mut seen, 0)
    }

    /// Whether `export` of `path` is a dynamic component.
    ///
    /// Results are cached per `(file, export)`; a provisional `false` is
    /// stored before recursing so import cycles terminate.
    pub fn file_export_is_dynamic(&mut self, path: &Path, export: &str, depth: usize) -> bool {
        if self.config.max_depth.exceeded(depth) {
            return false;
        }
        let key = (path.to_path_buf(), export.to_string());
        if let Some(&cached) = self.dynamic.get(&key) {
            return cached;
        }
        self.dynamic.insert(key.clone(), false);

        let Some(model) = self.modules.get_or_load(path) else {
            return false;
        };
        let result = match model.export(export).map(|e| e.target.clone()) {
            Some(ExportTarget::Local(local)) => match model.module_binding(&local) {
                Some(binding) => {
                    let mut seen = FxHashSet::default();
                    seen.insert(local);
                    self.binding_is_dynamic(&model, binding, &mut seen, depth)
                }
                None => false,
            },
            Some(ExportTarget::ReExport { source, imported }) => {
                match self.resolver.resolve(&source, path) {
                    ResolveResult::Local(next) => {
                        self.file_export_is_dynamic(&next, &imported, depth + 1)
                    }
                    _ => false,
                }
            }
            Some(ExportTarget::DefaultExpr { expr, summary }) => match expr {
                Some(expr) => {
                    let mut seen = FxHashSet::default();
                    self.expr_is_dynamic(&model, &expr, MODULE_SCOPE, &mut seen, depth)
                }
                None => summary.dynamic,
            },
            None => false,
        };
        self.dynamic.insert(key, result);
        result
    }

    fn binding_is_dynamic(
        &mut self,
        model: &ModuleModel,
        binding: &Binding,
        seen: &mut FxHashSet<String>,
        depth: usize,
    ) -> bool {
        match binding {
            Binding::Function(summary) | Binding::Class(summary) => summary.dynamic,
            Binding::Var { declarator, .. } => {
                let Some(decl) = model.declarator(*declarator) else {
                    return false;
                };
                match &decl.init {
                    Some(init) => self.expr_is_dynamic(model, init, decl.scope, seen, depth),
                    None => false,
                }
            }
            Binding::Import { import, specifier } => {
                let Some((entry, spec)) = model.import(*import, *specifier) else {
                    return false;
                };
                let Some(export) = spec.kind.export_name() else {
                    return false;
                };
                match self.resolver.resolve(&entry.source, &model.path) {
                    ResolveResult::Local(path) => {
                        self.file_export_is_dynamic(&path, export, depth + 1)
                    }
                    _ => false,
                }
            }
            Binding::Param { .. } => false,
        }
    }

    fn expr_is_dynamic(
        &mut self,
        model: &ModuleModel,
        expr: &Expr,
        scope: ScopeId,
        seen: &mut FxHashSet<String>,
        depth: usize,
    ) -> bool {
        match &expr.kind {
            ExprKind::Ident(name) => {
                if !seen.insert(name.clone()) {
                    return false;
                }
                match model.lookup(scope, name) {
                    Some(binding) => self.binding_is_dynamic(model, binding, seen, depth),
                    None => false,
                }
            }
            ExprKind::Call { args, .. } => {
                args.is_empty()
                    || args
                        .iter()
                        .any(|arg| self.expr_is_dynamic(model, arg, scope, seen, depth))
            }
            ExprKind::Function(summary) | ExprKind::Jsx(summary) => summary.dynamic,
            ExprKind::Object(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::analyzer::Analyzer;
    use crate::config::AnalyzerConfig;
    use crate::model::{ModuleModel, lower_source};

    fn element_named(model: &ModuleModel, name: &str) -> usize {
        model.elements.iter().position(|e| e.tag() == Some(name)).unwrap()
    }

    #[test]
    fn test_same_file_components() {
        let model = lower_source(
            "/app/src/Page.jsx",
            r#"
function Static() { return <p>Hello</p>; }
function Dynamic({ name }) { return <p>{name}</p>; }
const Spread = (props) => <p {...props} />;
const Memo = memo(() => <p>{value}</p>);
const Lazy = lazy();
export default function Page() {
  return <main><Static /><Dynamic /><Spread /><Memo /><Lazy /></main>;
}
"#,
        )
        .unwrap();
        let mut analyzer = Analyzer::new(AnalyzerConfig::new("/app"));
        let cases = [
            ("Static", false),
            ("Dynamic", true),
            ("Spread", true),
            ("Memo", true),
            ("Lazy", true),
        ];
        for (name, expected) in cases {
            let id = element_named(&model, name);
            assert_eq!(analyzer.detect_dynamic_composite(&model, id), expected, "{name}");
        }
    }

    #[test]
    fn test_unknown_component_is_static() {
        let model = lower_source("/app/src/Page.jsx", "const Page = () => <Missing />;").unwrap();
        let mut analyzer = Analyzer::new(AnalyzerConfig::new("/app"));
        assert!(!analyzer.detect_dynamic_composite(&model, 0));
    }

    #[test]
    fn test_self_reference_terminates() {
        let model = lower_source(
            "/app/src/Page.jsx",
            "const Loop = wrap(Loop);\nconst Page = () => <Loop />;",
        )
        .unwrap();
        let mut analyzer = Analyzer::new(AnalyzerConfig::new("/app"));
        let id = element_named(&model, "Loop");
        assert!(!analyzer.detect_dynamic_composite(&model, id));
    }
}
