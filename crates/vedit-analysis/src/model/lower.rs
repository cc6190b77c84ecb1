//! Lowering from an OXC program into a [`ModuleModel`].

use std::path::PathBuf;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ArrowFunctionExpression, BindingPattern, BindingPatternKind, CallExpression, ChainElement,
    Class, ClassType, ComputedMemberExpression, Declaration, ExportDefaultDeclaration,
    ExportDefaultDeclarationKind, ExportNamedDeclaration, Expression, FormalParameters, Function,
    FunctionType, ImportDeclaration, ImportDeclarationSpecifier, JSXAttributeItem,
    JSXAttributeName, JSXAttributeValue, JSXChild, JSXElement, JSXElementName, JSXExpression,
    ModuleDeclaration, ModuleExportName, ObjectPropertyKind, Program, StaticMemberExpression,
    VariableDeclaration, VariableDeclarationKind, VariableDeclarator,
};
use oxc_ast_visit::{Visit, walk};
use oxc_semantic::ScopeFlags;
use oxc_span::GetSpan;
use rustc_hash::FxHashMap;
use vedit_gen::{LineIndex, ParseOptions, parse};

use super::{
    AttrValue, Binding, ChildKind, Declarator, ElementId, ExportEntry, ExportTarget, Expr,
    ExprKind, FrameId, ITERATION_METHODS, ImportEntry, ImportKind, ImportSpecifier,
    IterationFrame, JsxAttr, JsxChild, JsxElement, JsxSummary, MODULE_SCOPE, MemberProp,
    ModuleModel, Property, Scope, ScopeId, Site, Span, VarKind, render_index,
};
use crate::error::{AnalysisError, Result};

/// Parse `source` and lower it into an owned model.
///
/// `path` picks the dialect (TypeScript or JavaScript, always with JSX) and is
/// recorded on the model; the file itself is not read.
pub fn lower_source(path: impl Into<PathBuf>, source: &str) -> Result<ModuleModel> {
    let path = path.into();
    let allocator = Allocator::default();
    let parsed = parse(&allocator, source, ParseOptions::from_path(&path)).map_err(|e| {
        AnalysisError::Parse {
            path: path.clone(),
            message: e.to_string(),
        }
    })?;

    let mut lowerer = Lowerer::new(path, source);
    lowerer.collect_module_declarations(&parsed.program);
    lowerer.visit_program(&parsed.program);
    Ok(lowerer.model)
}

struct Lowerer<'s> {
    source: &'s str,
    model: ModuleModel,
    scope_stack: Vec<ScopeId>,
    frame_stack: Vec<FrameId>,
    owner_stack: Vec<String>,
    /// Callback function start offset -> frame it belongs to.
    callbacks: FxHashMap<u32, FrameId>,
    callback_depth: usize,
    decl_kind: VarKind,
    /// Open elements with the start offsets of their direct element children.
    element_stack: Vec<(ElementId, Vec<u32>)>,
}

impl<'s> Lowerer<'s> {
    fn new(path: PathBuf, source: &'s str) -> Self {
        Self {
            source,
            model: ModuleModel {
                path,
                line_index: LineIndex::new(source),
                scopes: vec![Scope::default()],
                imports: Vec::new(),
                exports: Vec::new(),
                declarators: Vec::new(),
                elements: Vec::new(),
                frames: Vec::new(),
            },
            scope_stack: vec![MODULE_SCOPE],
            frame_stack: Vec::new(),
            owner_stack: Vec::new(),
            callbacks: FxHashMap::default(),
            callback_depth: 0,
            decl_kind: VarKind::Other,
            element_stack: Vec::new(),
        }
    }

    fn current_scope(&self) -> ScopeId {
        self.scope_stack.last().copied().unwrap_or(MODULE_SCOPE)
    }

    fn site(&self) -> Site {
        Site {
            scope: self.current_scope(),
            frame: self.frame_stack.last().copied(),
            owner: self.owner_stack.last().cloned(),
        }
    }

    fn line(&self, offset: u32) -> u32 {
        self.model.line_index.line(offset)
    }

    fn bind(&mut self, name: String, binding: Binding) {
        let scope = self.current_scope();
        if let Some(scope) = self.model.scopes.get_mut(scope) {
            scope.bindings.insert(name, binding);
        }
    }

    // ----- module declarations -----

    fn collect_module_declarations(&mut self, program: &Program<'_>) {
        for stmt in &program.body {
            let Some(decl) = stmt.as_module_declaration() else {
                continue;
            };
            match decl {
                ModuleDeclaration::ImportDeclaration(import) => self.collect_import(import),
                ModuleDeclaration::ExportNamedDeclaration(named) => {
                    self.collect_named_export(named)
                }
                ModuleDeclaration::ExportDefaultDeclaration(default) => {
                    self.collect_default_export(default)
                }
                _ => {}
            }
        }
    }

    fn collect_import(&mut self, import: &ImportDeclaration<'_>) {
        let id = self.model.imports.len();
        let mut specifiers = Vec::new();
        if let Some(specs) = &import.specifiers {
            for spec in specs {
                let (local, kind) = match spec {
                    ImportDeclarationSpecifier::ImportSpecifier(named) => (
                        named.local.name.to_string(),
                        ImportKind::Named(module_export_name(&named.imported)),
                    ),
                    ImportDeclarationSpecifier::ImportDefaultSpecifier(default) => {
                        (default.local.name.to_string(), ImportKind::Default)
                    }
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(ns) => {
                        (ns.local.name.to_string(), ImportKind::Namespace)
                    }
                };
                specifiers.push(ImportSpecifier { local, kind });
            }
        }

        let module_scope = &mut self.model.scopes[MODULE_SCOPE];
        for (index, spec) in specifiers.iter().enumerate() {
            module_scope.bindings.insert(
                spec.local.clone(),
                Binding::Import {
                    import: id,
                    specifier: index,
                },
            );
        }
        self.model.imports.push(ImportEntry {
            source: import.source.value.to_string(),
            specifiers,
        });
    }

    fn collect_named_export(&mut self, named: &ExportNamedDeclaration<'_>) {
        if let Some(source) = &named.source {
            for spec in &named.specifiers {
                self.model.exports.push(ExportEntry {
                    exported: module_export_name(&spec.exported),
                    target: ExportTarget::ReExport {
                        source: source.value.to_string(),
                        imported: module_export_name(&spec.local),
                    },
                });
            }
            return;
        }

        for spec in &named.specifiers {
            self.model.exports.push(ExportEntry {
                exported: module_export_name(&spec.exported),
                target: ExportTarget::Local(module_export_name(&spec.local)),
            });
        }

        let names = match &named.declaration {
            Some(Declaration::VariableDeclaration(var)) => var
                .declarations
                .iter()
                .flat_map(|d| binding_names(&d.id))
                .collect(),
            Some(Declaration::FunctionDeclaration(func)) => {
                func.id.iter().map(|id| id.name.to_string()).collect()
            }
            Some(Declaration::ClassDeclaration(class)) => {
                class.id.iter().map(|id| id.name.to_string()).collect()
            }
            _ => Vec::new(),
        };
        for name in names {
            self.model.exports.push(ExportEntry {
                exported: name.clone(),
                target: ExportTarget::Local(name),
            });
        }
    }

    fn collect_default_export(&mut self, default: &ExportDefaultDeclaration<'_>) {
        let target = match &default.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) => match &func.id {
                Some(id) => ExportTarget::Local(id.name.to_string()),
                None => {
                    let summary = JsxSummary::of_function(func);
                    ExportTarget::DefaultExpr {
                        expr: Some(Expr::new(
                            func.span.into(),
                            ExprKind::Function(summary.clone()),
                        )),
                        summary,
                    }
                }
            },
            ExportDefaultDeclarationKind::ClassDeclaration(class) => match &class.id {
                Some(id) => ExportTarget::Local(id.name.to_string()),
                None => ExportTarget::DefaultExpr {
                    expr: None,
                    summary: JsxSummary::of_class(class),
                },
            },
            kind => match kind.as_expression() {
                Some(Expression::Identifier(ident)) => ExportTarget::Local(ident.name.to_string()),
                Some(expr) => ExportTarget::DefaultExpr {
                    expr: Some(lower_expr(expr, self.source)),
                    summary: JsxSummary::of_expression(expr),
                },
                None => return,
            },
        };
        self.model.exports.push(ExportEntry {
            exported: "default".to_string(),
            target,
        });
    }

    // ----- functions -----

    fn enter_function(&mut self, start: u32, params: &FormalParameters<'_>) -> bool {
        let frame = self.callbacks.remove(&start);
        let id = self.model.scopes.len();
        self.model.scopes.push(Scope {
            parent: Some(self.current_scope()),
            bindings: FxHashMap::default(),
            frame,
        });
        self.scope_stack.push(id);

        let callback = frame.is_some();
        if callback {
            self.callback_depth += 1;
        }
        for param in &params.items {
            self.bind_param(&param.pattern, callback);
        }
        if let Some(rest) = &params.rest {
            self.bind_param(&rest.argument, callback);
        }
        callback
    }

    fn exit_function(&mut self, callback: bool) {
        self.scope_stack.pop();
        if callback {
            self.callback_depth -= 1;
        }
    }

    fn bind_param(&mut self, pattern: &BindingPattern<'_>, callback: bool) {
        let destructured = !matches!(pattern.kind, BindingPatternKind::BindingIdentifier(_));
        for name in binding_names(pattern) {
            self.bind(
                name,
                Binding::Param {
                    destructured,
                    callback,
                },
            );
        }
    }

    fn iteration_frame(&mut self, call: &CallExpression<'_>) -> Option<FrameId> {
        let Expression::StaticMemberExpression(member) = &call.callee else {
            return None;
        };
        let method = member.property.name.as_str();
        if !ITERATION_METHODS.contains(&method) {
            return None;
        }

        let (params, callback_start) = match call.arguments.first().and_then(|a| a.as_expression())
        {
            Some(Expression::ArrowFunctionExpression(func)) => {
                (Some(&func.params), Some(func.span.start))
            }
            Some(Expression::FunctionExpression(func)) => {
                (Some(&func.params), Some(func.span.start))
            }
            _ => (None, None),
        };
        let param_name = |index: usize| {
            params
                .and_then(|p| p.items.get(index))
                .and_then(|p| match &p.pattern.kind {
                    BindingPatternKind::BindingIdentifier(ident) => Some(ident.name.to_string()),
                    _ => None,
                })
        };

        let id = self.model.frames.len();
        self.model.frames.push(IterationFrame {
            method: method.to_string(),
            array: lower_expr(&member.object, self.source),
            item_param: param_name(0),
            index_param: param_name(1),
            site: self.site(),
            line: self.line(call.span.start),
        });
        if let Some(start) = callback_start {
            self.callbacks.insert(start, id);
        }
        Some(id)
    }

    // ----- JSX -----

    fn lower_element(&mut self, el: &JSXElement<'_>) -> (JsxElement, Vec<u32>) {
        let opening = &el.opening_element;
        let (name, member_property) = match &opening.name {
            JSXElementName::Identifier(ident) => (Some(ident.name.to_string()), None),
            JSXElementName::IdentifierReference(ident) => (Some(ident.name.to_string()), None),
            JSXElementName::MemberExpression(member) => {
                (None, Some(member.property.name.to_string()))
            }
            _ => (None, None),
        };

        let attrs = opening
            .attributes
            .iter()
            .map(|item| match item {
                JSXAttributeItem::Attribute(attr) => JsxAttr::Attr {
                    name: match &attr.name {
                        JSXAttributeName::Identifier(ident) => ident.name.to_string(),
                        JSXAttributeName::NamespacedName(ns) => {
                            format!("{}:{}", ns.namespace.name, ns.name.name)
                        }
                    },
                    span: attr.span.into(),
                    value: match &attr.value {
                        None => AttrValue::None,
                        Some(JSXAttributeValue::StringLiteral(lit)) => AttrValue::Str {
                            value: lit.value.to_string(),
                            span: lit.span.into(),
                        },
                        Some(JSXAttributeValue::ExpressionContainer(container)) => {
                            AttrValue::Expr {
                                expr: lower_jsx_expression(&container.expression, self.source),
                                span: container.span.into(),
                            }
                        }
                        Some(JSXAttributeValue::Element(inner)) => AttrValue::Markup {
                            span: inner.span.into(),
                        },
                        Some(JSXAttributeValue::Fragment(inner)) => AttrValue::Markup {
                            span: inner.span.into(),
                        },
                    },
                },
                JSXAttributeItem::SpreadAttribute(spread) => JsxAttr::Spread {
                    span: spread.span.into(),
                },
            })
            .collect();

        let mut direct = Vec::new();
        let children = el
            .children
            .iter()
            .map(|child| {
                let span: Span = child.span().into();
                let kind = match child {
                    JSXChild::Text(_) => ChildKind::Text(span.slice(self.source).to_string()),
                    JSXChild::Element(inner) => {
                        direct.push(inner.span.start);
                        ChildKind::Element
                    }
                    JSXChild::Fragment(_) => ChildKind::Fragment,
                    JSXChild::ExpressionContainer(container) => {
                        ChildKind::Expr(lower_jsx_expression(&container.expression, self.source))
                    }
                    JSXChild::Spread(_) => ChildKind::Spread,
                };
                JsxChild { span, kind }
            })
            .collect();

        let parent = self
            .element_stack
            .last()
            .and_then(|(id, direct)| direct.contains(&el.span.start).then_some(*id));

        let element = JsxElement {
            name,
            member_property,
            span: el.span.into(),
            opening: opening.span.into(),
            name_end: opening
                .type_arguments
                .as_ref()
                .map_or(opening.name.span().end, |args| args.span.end),
            line: self.line(opening.span.start),
            attrs,
            children,
            closing_start: el.closing_element.as_ref().map(|c| c.span.start),
            parent,
            site: self.site(),
            in_iteration: self.callback_depth > 0,
        };
        (element, direct)
    }
}

impl<'a> Visit<'a> for Lowerer<'_> {
    fn visit_function(&mut self, func: &Function<'a>, flags: ScopeFlags) {
        let is_declaration = matches!(func.r#type, FunctionType::FunctionDeclaration);
        let name = func.id.as_ref().map(|id| id.name.to_string());

        let mut owner = false;
        if let (true, Some(name)) = (is_declaration, name) {
            self.bind(name.clone(), Binding::Function(JsxSummary::of_function(func)));
            self.owner_stack.push(name);
            owner = true;
        }

        let callback = self.enter_function(func.span.start, &func.params);
        walk::walk_function(self, func, flags);
        self.exit_function(callback);

        if owner {
            self.owner_stack.pop();
        }
    }

    fn visit_arrow_function_expression(&mut self, arrow: &ArrowFunctionExpression<'a>) {
        let callback = self.enter_function(arrow.span.start, &arrow.params);
        walk::walk_arrow_function_expression(self, arrow);
        self.exit_function(callback);
    }

    fn visit_class(&mut self, class: &Class<'a>) {
        if matches!(class.r#type, ClassType::ClassDeclaration) {
            if let Some(id) = &class.id {
                self.bind(id.name.to_string(), Binding::Class(JsxSummary::of_class(class)));
            }
        }
        walk::walk_class(self, class);
    }

    fn visit_variable_declaration(&mut self, decl: &VariableDeclaration<'a>) {
        let kind = match decl.kind {
            VariableDeclarationKind::Var => VarKind::Var,
            VariableDeclarationKind::Let => VarKind::Let,
            VariableDeclarationKind::Const => VarKind::Const,
            _ => VarKind::Other,
        };
        let previous = std::mem::replace(&mut self.decl_kind, kind);
        walk::walk_variable_declaration(self, decl);
        self.decl_kind = previous;
    }

    fn visit_variable_declarator(&mut self, decl: &VariableDeclarator<'a>) {
        let names = binding_names(&decl.id);
        let destructured = !matches!(decl.id.kind, BindingPatternKind::BindingIdentifier(_));
        let name = if destructured {
            None
        } else {
            names.first().cloned()
        };

        let id = self.model.declarators.len();
        self.model.declarators.push(Declarator {
            name: name.clone(),
            kind: self.decl_kind,
            line: self.line(decl.span.start),
            span: decl.span.into(),
            init: decl.init.as_ref().map(|e| lower_expr(e, self.source)),
            init_summary: decl
                .init
                .as_ref()
                .map(JsxSummary::of_expression)
                .unwrap_or_default(),
            scope: self.current_scope(),
        });
        for binding in names {
            self.bind(
                binding,
                Binding::Var {
                    declarator: id,
                    destructured,
                },
            );
        }

        let owner = name
            .filter(|_| decl.init.as_ref().is_some_and(defines_component))
            .map(|n| self.owner_stack.push(n))
            .is_some();
        walk::walk_variable_declarator(self, decl);
        if owner {
            self.owner_stack.pop();
        }
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        let frame = self.iteration_frame(call);
        if let Some(frame) = frame {
            self.frame_stack.push(frame);
        }
        walk::walk_call_expression(self, call);
        if frame.is_some() {
            self.frame_stack.pop();
        }
    }

    fn visit_jsx_element(&mut self, el: &JSXElement<'a>) {
        let (element, direct) = self.lower_element(el);
        let id = self.model.elements.len();
        self.model.elements.push(element);

        self.element_stack.push((id, direct));
        walk::walk_jsx_element(self, el);
        self.element_stack.pop();
    }
}

// ----- expressions -----

pub(crate) fn lower_expr(expr: &Expression<'_>, source: &str) -> Expr {
    let span: Span = expr.span().into();
    let kind = match expr {
        Expression::Identifier(ident) => ExprKind::Ident(ident.name.to_string()),
        Expression::StringLiteral(lit) => ExprKind::Str {
            value: lit.value.to_string(),
            quote: quote_at(source, lit.span.start),
        },
        Expression::NumericLiteral(lit) => ExprKind::Num {
            value: lit.value,
            raw: span.slice(source).to_string(),
        },
        Expression::BooleanLiteral(lit) => ExprKind::Bool(lit.value),
        Expression::NullLiteral(_) => ExprKind::Null,
        Expression::TemplateLiteral(template) => ExprKind::Template {
            has_expressions: !template.expressions.is_empty(),
        },
        Expression::ArrayExpression(array) => ExprKind::Array(
            array
                .elements
                .iter()
                .map(|el| el.as_expression().map(|e| lower_expr(e, source)))
                .collect(),
        ),
        Expression::ObjectExpression(object) => ExprKind::Object(
            object
                .properties
                .iter()
                .filter_map(|prop| match prop {
                    ObjectPropertyKind::ObjectProperty(prop) => Some(Property {
                        key: prop.key.static_name().map(|k| k.to_string()),
                        span: prop.span.into(),
                        value: lower_expr(&prop.value, source),
                    }),
                    ObjectPropertyKind::SpreadProperty(_) => None,
                })
                .collect(),
        ),
        Expression::ArrowFunctionExpression(arrow) => ExprKind::Function(JsxSummary::of_arrow(arrow)),
        Expression::FunctionExpression(func) => ExprKind::Function(JsxSummary::of_function(func)),
        Expression::CallExpression(call) => return lower_call(call, source),
        Expression::StaticMemberExpression(member) => return lower_static_member(member, source),
        Expression::ComputedMemberExpression(member) => {
            return lower_computed_member(member, source);
        }
        Expression::ChainExpression(chain) => match &chain.expression {
            ChainElement::CallExpression(call) => return lower_call(call, source),
            ChainElement::StaticMemberExpression(member) => {
                return lower_static_member(member, source);
            }
            ChainElement::ComputedMemberExpression(member) => {
                return lower_computed_member(member, source);
            }
            _ => ExprKind::Other,
        },
        Expression::ConditionalExpression(_) => ExprKind::Conditional,
        Expression::LogicalExpression(_) => ExprKind::Logical,
        Expression::BinaryExpression(_) => ExprKind::Binary,
        Expression::JSXElement(_) | Expression::JSXFragment(_) => {
            ExprKind::Jsx(JsxSummary::of_expression(expr))
        }
        Expression::ParenthesizedExpression(paren) => return lower_expr(&paren.expression, source),
        Expression::TSAsExpression(e) => return lower_expr(&e.expression, source),
        Expression::TSSatisfiesExpression(e) => return lower_expr(&e.expression, source),
        Expression::TSNonNullExpression(e) => return lower_expr(&e.expression, source),
        Expression::TSTypeAssertion(e) => return lower_expr(&e.expression, source),
        _ => ExprKind::Other,
    };
    Expr::new(span, kind)
}

fn lower_call(call: &CallExpression<'_>, source: &str) -> Expr {
    let args = call
        .arguments
        .iter()
        .map(|arg| match arg.as_expression() {
            Some(expr) => lower_expr(expr, source),
            None => Expr::new(arg.span().into(), ExprKind::Other),
        })
        .collect();
    Expr::new(
        call.span.into(),
        ExprKind::Call {
            callee: Box::new(lower_expr(&call.callee, source)),
            args,
        },
    )
}

fn lower_static_member(member: &StaticMemberExpression<'_>, source: &str) -> Expr {
    Expr::new(
        member.span.into(),
        ExprKind::Member {
            object: Box::new(lower_expr(&member.object, source)),
            prop: MemberProp::Name(member.property.name.to_string()),
        },
    )
}

fn lower_computed_member(member: &ComputedMemberExpression<'_>, source: &str) -> Expr {
    let prop = match &member.expression {
        Expression::NumericLiteral(lit) => MemberProp::Index(render_index(lit.value)),
        Expression::StringLiteral(lit) => MemberProp::Key(lit.value.to_string()),
        _ => MemberProp::Computed,
    };
    Expr::new(
        member.span.into(),
        ExprKind::Member {
            object: Box::new(lower_expr(&member.object, source)),
            prop,
        },
    )
}

fn lower_jsx_expression(expr: &JSXExpression<'_>, source: &str) -> Option<Expr> {
    match expr {
        JSXExpression::EmptyExpression(_) => None,
        other => other.as_expression().map(|e| lower_expr(e, source)),
    }
}

// ----- helpers -----

fn binding_names(pattern: &BindingPattern<'_>) -> Vec<String> {
    let mut names = Vec::new();
    collect_binding_names(pattern, &mut names);
    names
}

fn collect_binding_names(pattern: &BindingPattern<'_>, names: &mut Vec<String>) {
    match &pattern.kind {
        BindingPatternKind::BindingIdentifier(ident) => names.push(ident.name.to_string()),
        BindingPatternKind::ObjectPattern(object) => {
            for prop in &object.properties {
                collect_binding_names(&prop.value, names);
            }
            if let Some(rest) = &object.rest {
                collect_binding_names(&rest.argument, names);
            }
        }
        BindingPatternKind::ArrayPattern(array) => {
            for element in array.elements.iter().flatten() {
                collect_binding_names(element, names);
            }
            if let Some(rest) = &array.rest {
                collect_binding_names(&rest.argument, names);
            }
        }
        BindingPatternKind::AssignmentPattern(assign) => collect_binding_names(&assign.left, names),
    }
}

/// Initializers that define a component: a function, or a call wrapping one
/// (`memo(() => ...)`, `forwardRef(function (props, ref) { ... })`).
fn defines_component(init: &Expression<'_>) -> bool {
    match init.without_parentheses() {
        Expression::ArrowFunctionExpression(_) | Expression::FunctionExpression(_) => true,
        Expression::CallExpression(call) => call
            .arguments
            .iter()
            .filter_map(|arg| arg.as_expression())
            .any(defines_component),
        _ => false,
    }
}

fn module_export_name(name: &ModuleExportName<'_>) -> String {
    match name {
        ModuleExportName::IdentifierName(ident) => ident.name.to_string(),
        ModuleExportName::IdentifierReference(ident) => ident.name.to_string(),
        ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
    }
}

fn quote_at(source: &str, offset: u32) -> char {
    match source.as_bytes().get(offset as usize) {
        Some(b'\'') => '\'',
        _ => '"',
    }
}
