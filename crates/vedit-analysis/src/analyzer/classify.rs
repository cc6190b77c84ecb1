//! Expression, identifier and member-access classification.

use std::path::Path;

use super::{Analyzer, ExportInfo, TraceState};
use crate::config::ResolveResult;
use crate::model::{
    Binding, Declarator, Expr, ExprKind, ExportTarget, FrameId, ImportId, ImportKind,
    ModuleModel, Site,
};
use crate::provenance::{ArrayContext, Provenance, SourceType, ValueType};

/// Hooks whose results are component state.
pub const STATE_HOOKS: &[&str] = &["useState", "useReducer", "useContext", "useMemo", "useCallback"];

impl Analyzer {
    /// Classify an expression embedded in markup at `site`.
    pub fn classify_expression(&mut self, model: &ModuleModel, expr: &Expr, site: &Site) -> Provenance {
        self.classify_expr_in(model, expr, site, &mut TraceState::default())
    }

    pub fn classify_identifier(&mut self, model: &ModuleModel, name: &str, site: &Site) -> Provenance {
        self.classify_ident_in(model, name, site, false, &mut TraceState::default())
    }

    /// Classify `a.b.c` by its root, attaching the property path.
    pub fn classify_member_access(&mut self, model: &ModuleModel, expr: &Expr, site: &Site) -> Provenance {
        self.classify_member_in(model, expr, site, false, &mut TraceState::default())
    }

    /// Context of the iteration `frame`, when its callback takes a plain
    /// item parameter.
    pub fn array_iteration_context(&mut self, model: &ModuleModel, frame: FrameId) -> Option<ArrayContext> {
        self.array_context_in(model, frame, &mut TraceState::default())
    }

    /// Initializer shape of `name` as exported from `path`, following
    /// re-exports up to the depth cap.
    pub fn export_info(&mut self, path: &Path, name: &str) -> Option<ExportInfo> {
        self.export_info_at(path, name, 0)
    }

    pub(crate) fn classify_expr_in(
        &mut self,
        model: &ModuleModel,
        expr: &Expr,
        site: &Site,
        trace: &mut TraceState,
    ) -> Provenance {
        match &expr.kind {
            ExprKind::Ident(name) => self.classify_ident_in(model, name, site, false, trace),
            ExprKind::Member { .. } => self.classify_member_in(model, expr, site, false, trace),
            ExprKind::Call { .. }
            | ExprKind::Conditional
            | ExprKind::Logical
            | ExprKind::Binary => Provenance::new(SourceType::Computed),
            ExprKind::Template { .. } => Provenance::new(SourceType::Template),
            _ => Provenance::unknown(),
        }
    }

    pub(crate) fn classify_ident_in(
        &mut self,
        model: &ModuleModel,
        name: &str,
        site: &Site,
        skip_array: bool,
        trace: &mut TraceState,
    ) -> Provenance {
        let Some(binding) = model.lookup(site.scope, name) else {
            return Provenance::external(name);
        };

        if !skip_array {
            if let Some(context) = self.item_context(model, site, name, trace) {
                return Provenance::array_item(context, None);
            }
        }

        match binding {
            Binding::Param {
                destructured,
                callback,
            } => {
                if *destructured || !*callback {
                    self.classify_prop(model, name, site, trace)
                } else {
                    Provenance::named(SourceType::Unknown, name)
                }
            }
            Binding::Var { declarator, destructured } => match model.declarator(*declarator) {
                Some(decl) => classify_declarator(model, decl, name, *destructured),
                None => Provenance::named(SourceType::Unknown, name),
            },
            Binding::Import { import, specifier } => {
                self.classify_import(model, *import, *specifier, name)
            }
            Binding::Function(_) | Binding::Class(_) => Provenance::named(SourceType::Unknown, name),
        }
    }

    pub(crate) fn classify_member_in(
        &mut self,
        model: &ModuleModel,
        expr: &Expr,
        site: &Site,
        skip_array: bool,
        trace: &mut TraceState,
    ) -> Provenance {
        let path = expr.property_path();
        let Some(root) = expr.member_root().ident() else {
            return Provenance::unknown().with_path(path);
        };

        if !skip_array {
            if let Some(context) = self.item_context(model, site, root, trace) {
                return Provenance::array_item(context, None).with_path(path);
            }
        }

        self.classify_ident_in(model, root, site, true, trace)
            .with_path(path)
    }

    /// Context of the innermost enclosing iteration whose item parameter is
    /// `name`.
    fn item_context(
        &mut self,
        model: &ModuleModel,
        site: &Site,
        name: &str,
        trace: &mut TraceState,
    ) -> Option<ArrayContext> {
        let mut current = site.frame;
        while let Some(id) = current {
            let frame = model.frames.get(id)?;
            if frame.item_param.as_deref() == Some(name) {
                return self.array_context_in(model, id, trace);
            }
            current = frame.site.frame;
        }
        None
    }

    pub(crate) fn array_context_in(
        &mut self,
        model: &ModuleModel,
        frame: FrameId,
        trace: &mut TraceState,
    ) -> Option<ArrayContext> {
        let frame = model.frames.get(frame)?;
        let item_param = frame.item_param.clone()?;

        let (info, is_editable) = match &frame.array.kind {
            ExprKind::Ident(name) => {
                let info = self.classify_ident_in(model, name, &frame.site, true, trace);
                let editable = info.is_editable && info.value_type == Some(ValueType::Array);
                (Some(info), editable)
            }
            // Arrays nested in objects are never editable in place
            ExprKind::Member { .. } => (
                Some(self.classify_member_in(model, &frame.array, &frame.site, true, trace)),
                false,
            ),
            _ => (None, false),
        };

        Some(ArrayContext {
            array_var: info.as_ref().and_then(|i| i.var_name.clone()),
            array_file: info.as_ref().and_then(|i| i.file.clone()),
            abs_file: info.as_ref().and_then(|i| i.abs_file.clone()),
            array_line: info.as_ref().and_then(|i| i.line),
            item_param,
            index_param: frame.index_param.clone(),
            is_editable,
            source_type: info.map(|i| i.source_type),
        })
    }

    /// A component parameter: report the traced origin when it is editable.
    fn classify_prop(
        &mut self,
        model: &ModuleModel,
        name: &str,
        site: &Site,
        trace: &mut TraceState,
    ) -> Provenance {
        let traced = match &site.owner {
            Some(component) => self.trace_in(model, name, component, trace),
            None => None,
        };

        match traced {
            Some(traced) if traced.is_editable => Provenance {
                var_name: traced.var_name.clone(),
                prop_name: Some(name.to_string()),
                file: traced.file.clone(),
                abs_file: traced.abs_file.clone(),
                line: traced.line,
                path: traced.path.clone(),
                value_type: traced.value_type,
                is_editable: true,
                array_context: traced.array_context.clone(),
                traced_from: Some(Box::new(traced)),
                ..Provenance::new(SourceType::Prop)
            },
            _ => Provenance::named(SourceType::Prop, name),
        }
    }

    fn classify_import(
        &mut self,
        model: &ModuleModel,
        import: ImportId,
        specifier: usize,
        name: &str,
    ) -> Provenance {
        let Some((entry, spec)) = model.import(import, specifier) else {
            return Provenance::external(name);
        };
        let Some(export) = spec.kind.export_name() else {
            return Provenance::named(SourceType::Unknown, name);
        };
        if !self.config.is_first_party(&entry.source) {
            return Provenance::external(name);
        }
        let ResolveResult::Local(path) = self.resolver.resolve(&entry.source, &model.path) else {
            return Provenance::external(name);
        };

        let info = self.export_info(&path, export);
        let var_name = match (&info, &spec.kind) {
            (Some(info), _) => info.local_name.clone(),
            (None, ImportKind::Named(export)) => export.clone(),
            (None, _) => name.to_string(),
        };
        Provenance {
            var_name: Some(var_name),
            file: Some(entry.source.clone()),
            abs_file: Some(info.as_ref().map_or(path, |i| i.file.clone())),
            line: info.as_ref().and_then(|i| i.line),
            value_type: info.as_ref().and_then(|i| i.value_type),
            is_editable: info.as_ref().is_some_and(|i| i.is_editable),
            ..Provenance::new(SourceType::StaticImported)
        }
    }

    pub(crate) fn export_info_at(&mut self, path: &Path, name: &str, depth: usize) -> Option<ExportInfo> {
        let key = (path.to_path_buf(), name.to_string());
        if let Some(cached) = self.exports.get(&key) {
            return cached.clone();
        }
        if self.config.max_depth.exceeded(depth) {
            return None;
        }
        // Provisional entry so import cycles terminate
        self.exports.insert(key.clone(), None);

        let model = self.modules.get_or_load(path)?;
        let info = match model.export(name).map(|e| e.target.clone()) {
            Some(ExportTarget::Local(local)) => self.binding_export_info(&model, &local, depth),
            Some(ExportTarget::ReExport { source, imported }) => {
                match self.resolver.resolve(&source, path) {
                    ResolveResult::Local(next) => self.export_info_at(&next, &imported, depth + 1),
                    _ => None,
                }
            }
            Some(ExportTarget::DefaultExpr { .. }) | None => None,
        };
        self.exports.insert(key, info.clone());
        info
    }

    fn binding_export_info(&mut self, model: &ModuleModel, local: &str, depth: usize) -> Option<ExportInfo> {
        match model.module_binding(local)? {
            Binding::Var {
                declarator,
                destructured: false,
            } => model.declarator(*declarator).map(|decl| declarator_info(model, decl)),
            Binding::Import { import, specifier } => {
                let (entry, spec) = model.import(*import, *specifier)?;
                let export = spec.kind.export_name()?.to_string();
                let source = entry.source.clone();
                let next = self.resolver.resolve(&source, &model.path).into_local()?;
                self.export_info_at(&next, &export, depth + 1)
            }
            _ => None,
        }
    }
}

fn value_type_of(expr: Option<&Expr>) -> Option<ValueType> {
    match &expr?.kind {
        ExprKind::Str { .. } | ExprKind::Num { .. } => Some(ValueType::Literal),
        ExprKind::Array(_) => Some(ValueType::Array),
        ExprKind::Object(_) => Some(ValueType::Object),
        _ => None,
    }
}

fn declarator_info(model: &ModuleModel, decl: &Declarator) -> ExportInfo {
    let value_type = value_type_of(decl.init.as_ref());
    ExportInfo {
        file: model.path.clone(),
        local_name: decl.name.clone().unwrap_or_default(),
        line: Some(decl.line),
        value_type,
        is_editable: decl.is_const() && value_type.is_some(),
    }
}

fn classify_declarator(model: &ModuleModel, decl: &Declarator, name: &str, destructured: bool) -> Provenance {
    let init = decl.init.as_ref();
    if init
        .and_then(Expr::call_name)
        .is_some_and(|callee| STATE_HOOKS.contains(&callee))
    {
        return Provenance::named(SourceType::State, name);
    }

    match value_type_of(init) {
        Some(value_type) if decl.is_const() && !destructured => Provenance {
            abs_file: Some(model.path.clone()),
            line: Some(decl.line),
            value_type: Some(value_type),
            is_editable: true,
            ..Provenance::named(SourceType::StaticLocal, name)
        },
        _ => Provenance::named(SourceType::Unknown, name),
    }
}
