//! JSX elements as recorded by the lowering pass.

use super::{ElementId, Expr, Site, Span};

/// One JSX element, in source pre-order.
#[derive(Debug, Clone)]
pub struct JsxElement {
    /// Tag name for `<div>` and `<Card>`; `None` for `<A.B>` and namespaced tags.
    pub name: Option<String>,
    /// Property name of a member tag (`B` in `<A.B>`).
    pub member_property: Option<String>,
    pub span: Span,
    pub opening: Span,
    /// End of the tag name, or of its type arguments when present.
    pub name_end: u32,
    /// 1-based line of the opening tag.
    pub line: u32,
    pub attrs: Vec<JsxAttr>,
    pub children: Vec<JsxChild>,
    /// Start of `</tag>`; `None` for self-closing elements.
    pub closing_start: Option<u32>,
    /// Enclosing element when this element is a direct JSX child of it.
    pub parent: Option<ElementId>,
    pub site: Site,
    /// Inside a function passed to an iteration method.
    pub in_iteration: bool,
}

#[derive(Debug, Clone)]
pub enum JsxAttr {
    Attr {
        name: String,
        span: Span,
        value: AttrValue,
    },
    Spread {
        span: Span,
    },
}

#[derive(Debug, Clone)]
pub enum AttrValue {
    /// Bare attribute (`disabled`).
    None,
    Str { value: String, span: Span },
    /// `{expr}`; `expr` is `None` for `{}`.
    Expr { expr: Option<Expr>, span: Span },
    /// Element or fragment used directly as a value.
    Markup { span: Span },
}

#[derive(Debug, Clone)]
pub struct JsxChild {
    pub span: Span,
    pub kind: ChildKind,
}

#[derive(Debug, Clone)]
pub enum ChildKind {
    /// Raw source text between tags.
    Text(String),
    Element,
    Fragment,
    /// `{expr}`; `None` for `{}` and comment-only containers.
    Expr(Option<Expr>),
    Spread,
}

impl JsxElement {
    /// Name used for component matching: the tag name, or the property of a
    /// member tag.
    pub fn tag(&self) -> Option<&str> {
        self.name.as_deref().or(self.member_property.as_deref())
    }

    pub fn is_component(&self) -> bool {
        self.name
            .as_deref()
            .is_some_and(|n| n.starts_with(|c: char| c.is_ascii_uppercase()))
    }

    pub fn is_self_closing(&self) -> bool {
        self.closing_start.is_none()
    }

    pub fn attr(&self, name: &str) -> Option<&JsxAttr> {
        self.attrs
            .iter()
            .find(|a| matches!(a, JsxAttr::Attr { name: n, .. } if n == name))
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn has_spread_attr(&self) -> bool {
        self.attrs.iter().any(|a| matches!(a, JsxAttr::Spread { .. }))
    }

    /// Whether any `x-*` metadata attribute is present.
    pub fn has_meta_attr(&self) -> bool {
        self.attrs
            .iter()
            .any(|a| matches!(a, JsxAttr::Attr { name, .. } if name.starts_with("x-")))
    }

    /// Expression passed to attribute `name`, if it is `{expr}`.
    pub fn attr_expr(&self, name: &str) -> Option<&Expr> {
        match self.attr(name)? {
            JsxAttr::Attr {
                value: AttrValue::Expr { expr, .. },
                ..
            } => expr.as_ref(),
            _ => None,
        }
    }

    /// Non-empty expression children, in order.
    pub fn expression_children(&self) -> impl Iterator<Item = &Expr> {
        self.children.iter().filter_map(|c| match &c.kind {
            ChildKind::Expr(expr) => expr.as_ref(),
            _ => None,
        })
    }

    /// A non-empty expression, spread attribute or spread child is present.
    pub fn has_any_expression(&self) -> bool {
        self.has_spread_attr()
            || self.children.iter().any(|c| match &c.kind {
                ChildKind::Expr(expr) => expr.is_some(),
                ChildKind::Spread => true,
                _ => false,
            })
    }

    pub fn has_static_text(&self) -> bool {
        self.children
            .iter()
            .any(|c| matches!(&c.kind, ChildKind::Text(text) if !text.trim().is_empty()))
    }

    /// Byte range between the opening and closing tags.
    pub fn children_span(&self) -> Option<Span> {
        self.closing_start
            .map(|end| Span::new(self.opening.end, end))
    }

    /// Offset where new attributes go: before the first spread, otherwise
    /// after the last attribute or the tag name.
    pub fn attr_insertion_point(&self) -> (u32, bool) {
        if let Some(JsxAttr::Spread { span }) = self
            .attrs
            .iter()
            .find(|a| matches!(a, JsxAttr::Spread { .. }))
        {
            return (span.start, true);
        }
        let end = self
            .attrs
            .last()
            .map(|a| match a {
                JsxAttr::Attr { span, .. } | JsxAttr::Spread { span } => span.end,
            })
            .unwrap_or(self.name_end);
        (end, false)
    }
}
