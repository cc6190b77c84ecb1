//! Owned expression tree.
//!
//! Only the shapes classification and mutation care about are kept; anything
//! else lowers to [`ExprKind::Other`].

use super::{JsxSummary, Span};

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub span: Span,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Ident(String),
    Member {
        object: Box<Expr>,
        prop: MemberProp,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Template {
        has_expressions: bool,
    },
    Conditional,
    Logical,
    Binary,
    Str {
        value: String,
        /// Quote character used in source (`"` or `'`).
        quote: char,
    },
    Num {
        value: f64,
        raw: String,
    },
    Bool(bool),
    Null,
    /// Holes and spread elements are `None`.
    Array(Vec<Option<Expr>>),
    Object(Vec<Property>),
    Function(JsxSummary),
    Jsx(JsxSummary),
    Other,
}

/// Property part of a member access.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberProp {
    /// `a.name`
    Name(String),
    /// `a[0]`, pre-rendered as `[0]`
    Index(String),
    /// `a["key"]`
    Key(String),
    /// `a[expr]`
    Computed,
}

/// One `key: value` entry of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Static key name; `None` for computed keys.
    pub key: Option<String>,
    pub span: Span,
    pub value: Expr,
}

impl Expr {
    pub fn new(span: Span, kind: ExprKind) -> Self {
        Self { span, kind }
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Literal children that need no wrapper: strings, numbers, booleans,
    /// `null` and templates without substitutions.
    pub fn is_static_literal(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Str { .. }
                | ExprKind::Num { .. }
                | ExprKind::Bool(_)
                | ExprKind::Null
                | ExprKind::Template {
                    has_expressions: false
                }
        )
    }

    /// Callee name for `name(...)` calls.
    pub fn call_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Call { callee, .. } => callee.ident(),
            _ => None,
        }
    }

    /// Root expression of a member chain (`a` in `a.b.c`).
    pub fn member_root(&self) -> &Expr {
        let mut current = self;
        while let ExprKind::Member { object, .. } = &current.kind {
            current = object;
        }
        current
    }

    /// Dot-joined property path of a member chain (`b.c` in `a.b.c`).
    ///
    /// Numeric keys render as `[n]`; computed keys are skipped.
    pub fn property_path(&self) -> String {
        let mut parts = Vec::new();
        let mut current = self;
        while let ExprKind::Member { object, prop } = &current.kind {
            match prop {
                MemberProp::Name(name) | MemberProp::Key(name) => parts.push(name.as_str()),
                MemberProp::Index(index) => parts.push(index.as_str()),
                MemberProp::Computed => {}
            }
            current = object;
        }
        parts.reverse();
        parts.join(".")
    }

    /// Value of an object literal property by key.
    pub fn property(&self, key: &str) -> Option<&Property> {
        match &self.kind {
            ExprKind::Object(props) => props.iter().find(|p| p.key.as_deref() == Some(key)),
            _ => None,
        }
    }
}

/// Render a numeric member key the way a JS engine prints it.
pub(crate) fn render_index(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() && value.abs() < 1e15 {
        format!("[{}]", value as i64)
    } else {
        format!("[{}]", value)
    }
}
