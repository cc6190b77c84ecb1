//! Summaries of the JSX found inside a function, class or initializer.

use oxc_ast::ast::{
    ArrowFunctionExpression, Class, Expression, Function, JSXElementName, JSXExpression,
    JSXExpressionContainer, JSXOpeningElement, JSXSpreadAttribute, JSXSpreadChild,
};
use oxc_ast_visit::{Visit, walk};
use oxc_semantic::ScopeFlags;

/// What a piece of code renders, reduced to what dynamic and portal
/// detection need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsxSummary {
    /// Contains a non-empty `{expression}`, a spread attribute or a spread child.
    pub dynamic: bool,
    /// Element names rendered, deduplicated, in first-seen order.
    pub names: Vec<String>,
}

impl JsxSummary {
    pub fn of_expression(expr: &Expression<'_>) -> Self {
        let mut scan = JsxScan::default();
        scan.visit_expression(expr);
        scan.summary
    }

    pub fn of_function(func: &Function<'_>) -> Self {
        let mut scan = JsxScan::default();
        scan.visit_function(func, ScopeFlags::Function);
        scan.summary
    }

    pub fn of_arrow(arrow: &ArrowFunctionExpression<'_>) -> Self {
        let mut scan = JsxScan::default();
        scan.visit_arrow_function_expression(arrow);
        scan.summary
    }

    pub fn of_class(class: &Class<'_>) -> Self {
        let mut scan = JsxScan::default();
        scan.visit_class(class);
        scan.summary
    }

    pub fn renders_jsx(&self) -> bool {
        !self.names.is_empty()
    }
}

/// Element name used for matching: identifier tags and the property of
/// member tags.
pub(crate) fn jsx_name_of(name: &JSXElementName<'_>) -> Option<String> {
    match name {
        JSXElementName::Identifier(ident) => Some(ident.name.to_string()),
        JSXElementName::IdentifierReference(ident) => Some(ident.name.to_string()),
        JSXElementName::MemberExpression(member) => Some(member.property.name.to_string()),
        _ => None,
    }
}

#[derive(Default)]
struct JsxScan {
    summary: JsxSummary,
}

impl<'a> Visit<'a> for JsxScan {
    fn visit_jsx_opening_element(&mut self, it: &JSXOpeningElement<'a>) {
        if let Some(name) = jsx_name_of(&it.name) {
            if !self.summary.names.contains(&name) {
                self.summary.names.push(name);
            }
        }
        walk::walk_jsx_opening_element(self, it);
    }

    fn visit_jsx_expression_container(&mut self, it: &JSXExpressionContainer<'a>) {
        if !matches!(it.expression, JSXExpression::EmptyExpression(_)) {
            self.summary.dynamic = true;
        }
        walk::walk_jsx_expression_container(self, it);
    }

    fn visit_jsx_spread_attribute(&mut self, it: &JSXSpreadAttribute<'a>) {
        self.summary.dynamic = true;
        walk::walk_jsx_spread_attribute(self, it);
    }

    fn visit_jsx_spread_child(&mut self, it: &JSXSpreadChild<'a>) {
        self.summary.dynamic = true;
        walk::walk_jsx_spread_child(self, it);
    }
}
