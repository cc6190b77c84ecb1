//! Prop tracing: following a component parameter back to the call site
//! that passed it.

use std::path::Path;

use tracing::debug;

use super::{Analyzer, PropKey, PropSource, TraceState};
use crate::config::ResolveResult;
use crate::model::{AttrValue, Binding, ElementId, ExportTarget, ImportKind, JsxAttr, ModuleModel};
use crate::provenance::Provenance;

impl Analyzer {
    /// Origin of prop `prop` of `component`, a component defined in `model`.
    ///
    /// Same-file usages win; then prop sources recorded while annotating
    /// other files; then a scan of every module loaded so far. Untraceable
    /// props give `None`.
    pub fn trace_prop_to_source(
        &mut self,
        model: &ModuleModel,
        prop: &str,
        component: &str,
    ) -> Option<Provenance> {
        self.trace_in(model, prop, component, &mut TraceState::default())
    }

    pub(crate) fn trace_in(
        &mut self,
        model: &ModuleModel,
        prop: &str,
        component: &str,
        trace: &mut TraceState,
    ) -> Option<Provenance> {
        let key: PropKey = (model.path.clone(), component.to_string(), prop.to_string());
        if !trace.enter(&key) {
            return None;
        }
        let result = self.trace_uncached(model, prop, component, &key, trace);
        trace.exit();
        result
    }

    fn trace_uncached(
        &mut self,
        model: &ModuleModel,
        prop: &str,
        component: &str,
        key: &PropKey,
        trace: &mut TraceState,
    ) -> Option<Provenance> {
        for element in &model.elements {
            if element.tag() != Some(component) {
                continue;
            }
            if let Some(expr) = element.attr_expr(prop) {
                return Some(self.classify_expr_in(model, expr, &element.site, trace));
            }
        }

        if let Some(recorded) = self.prop_sources.get(key) {
            debug!(component, prop, from = %recorded.from_file.display(), "Prop source cache hit");
            return Some(recorded.source.clone());
        }

        let exported = exported_names(model, component);
        self.scan_loaded_modules(&model.path, prop, component, &exported, key, trace)
    }

    /// Look through every loaded module for an import of `component_file`
    /// and a usage that passes `prop`.
    ///
    /// `exported` lists the names `component` is exported under; a default
    /// import only counts when `default` is among them.
    fn scan_loaded_modules(
        &mut self,
        component_file: &Path,
        prop: &str,
        component: &str,
        exported: &[String],
        key: &PropKey,
        trace: &mut TraceState,
    ) -> Option<Provenance> {
        for path in self.modules.paths() {
            if path == component_file {
                continue;
            }
            let Some(other) = self.modules.peek(&path) else {
                continue;
            };

            for import in &other.imports {
                let local = import
                    .specifiers
                    .iter()
                    .filter(|spec| match &spec.kind {
                        ImportKind::Named(name) => {
                            name == component || exported.iter().any(|e| e == name)
                        }
                        ImportKind::Default => exported.iter().any(|e| e == "default"),
                        ImportKind::Namespace => false,
                    })
                    .map(|spec| spec.local.as_str())
                    .last();
                let Some(local) = local else {
                    continue;
                };
                if self.resolver.resolve(&import.source, &other.path).local_path()
                    != Some(component_file)
                {
                    continue;
                }

                for element in &other.elements {
                    if element.tag() != Some(local) {
                        continue;
                    }
                    let Some(expr) = element.attr_expr(prop) else {
                        continue;
                    };
                    let source = self.classify_expr_in(&other, expr, &element.site, trace);
                    self.prop_sources.insert(
                        key.clone(),
                        PropSource {
                            array_context: source.array_context.clone(),
                            source: source.clone(),
                            from_file: path.clone(),
                        },
                    );
                    return Some(source);
                }
            }
        }
        None
    }

    /// Record what a usage of an imported component passes for each prop.
    ///
    /// Keyed by the component's file, its export name (or the local name for
    /// default imports) and the prop name.
    pub fn record_prop_sources(&mut self, model: &ModuleModel, element: ElementId) {
        let Some(el) = model.element(element) else {
            return;
        };
        let Some(name) = el.name.as_deref() else {
            return;
        };
        let Some(Binding::Import { import, specifier }) = model.lookup(el.site.scope, name) else {
            return;
        };
        let Some((entry, spec)) = model.import(*import, *specifier) else {
            return;
        };
        let component = match &spec.kind {
            ImportKind::Named(export) => export.clone(),
            ImportKind::Default => spec.local.clone(),
            ImportKind::Namespace => return,
        };
        let ResolveResult::Local(component_file) = self.resolver.resolve(&entry.source, &model.path)
        else {
            return;
        };

        for attr in &el.attrs {
            let JsxAttr::Attr {
                name: prop,
                value: AttrValue::Expr {
                    expr: Some(expr), ..
                },
                ..
            } = attr
            else {
                continue;
            };
            let source = self.classify_expression(model, expr, &el.site);
            let array_context = match el.site.frame {
                Some(frame) => self.array_iteration_context(model, frame),
                None => None,
            }
            .or_else(|| source.array_context.clone());

            self.prop_sources.insert(
                (component_file.clone(), component.clone(), prop.clone()),
                PropSource {
                    source,
                    array_context,
                    from_file: model.path.clone(),
                },
            );
        }
    }
}

/// Names under which the module-scope binding `local` is exported.
fn exported_names(model: &ModuleModel, local: &str) -> Vec<String> {
    model
        .exports
        .iter()
        .filter(|entry| matches!(&entry.target, ExportTarget::Local(name) if name == local))
        .map(|entry| entry.exported.clone())
        .collect()
}
