//! Owned, lifetime-free model of one source module.
//!
//! OXC ASTs borrow from an arena that lives only as long as the parse, so
//! each file is lowered once into a [`ModuleModel`] that the analyzer can
//! cache, share and query across files. The model keeps exactly what
//! classification and mutation need: scopes and bindings, imports and
//! exports, variable declarators with their initializers, iteration frames
//! and every JSX element with byte spans into the original text.

mod expr;
mod jsx;
mod lower;
mod scan;

use std::path::PathBuf;

use rustc_hash::FxHashMap;
use vedit_gen::LineIndex;

pub use expr::{Expr, ExprKind, MemberProp, Property};
pub use jsx::{AttrValue, ChildKind, JsxAttr, JsxChild, JsxElement};
pub use lower::lower_source;
pub use scan::JsxSummary;

pub(crate) use expr::render_index;

pub type ScopeId = usize;
pub type FrameId = usize;
pub type ElementId = usize;
pub type DeclaratorId = usize;
pub type ImportId = usize;

/// Module scope id.
pub const MODULE_SCOPE: ScopeId = 0;

/// Methods whose callback receives array items.
pub const ITERATION_METHODS: &[&str] = &[
    "map",
    "forEach",
    "filter",
    "reduce",
    "reduceRight",
    "flatMap",
    "find",
    "findIndex",
    "some",
    "every",
];

/// Byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        source
            .get(self.start as usize..self.end as usize)
            .unwrap_or_default()
    }
}

impl From<oxc_span::Span> for Span {
    fn from(span: oxc_span::Span) -> Self {
        Self::new(span.start, span.end)
    }
}

/// Where an expression sits: its scope, innermost iteration frame and the
/// name of the enclosing component or declarator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Site {
    pub scope: ScopeId,
    pub frame: Option<FrameId>,
    pub owner: Option<String>,
}

/// Function scope. Block scopes are folded into their function.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub bindings: FxHashMap<String, Binding>,
    /// Set when this function is the callback of an iteration call.
    pub frame: Option<FrameId>,
}

#[derive(Debug, Clone)]
pub enum Binding {
    Import {
        import: ImportId,
        specifier: usize,
    },
    Param {
        destructured: bool,
        /// Parameter of an iteration callback rather than a component.
        callback: bool,
    },
    Var {
        declarator: DeclaratorId,
        destructured: bool,
    },
    Function(JsxSummary),
    Class(JsxSummary),
}

#[derive(Debug, Clone)]
pub struct ImportEntry {
    pub source: String,
    pub specifiers: Vec<ImportSpecifier>,
}

#[derive(Debug, Clone)]
pub struct ImportSpecifier {
    pub local: String,
    pub kind: ImportKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportKind {
    Named(String),
    Default,
    Namespace,
}

impl ImportKind {
    /// Export name this specifier reads from the target module.
    pub fn export_name(&self) -> Option<&str> {
        match self {
            ImportKind::Named(name) => Some(name),
            ImportKind::Default => Some("default"),
            ImportKind::Namespace => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
    Other,
}

#[derive(Debug, Clone)]
pub struct Declarator {
    /// Identifier name; `None` for destructuring patterns.
    pub name: Option<String>,
    pub kind: VarKind,
    pub line: u32,
    pub span: Span,
    pub init: Option<Expr>,
    /// JSX found anywhere in the initializer.
    pub init_summary: JsxSummary,
    pub scope: ScopeId,
}

impl Declarator {
    pub fn is_const(&self) -> bool {
        self.kind == VarKind::Const
    }
}

#[derive(Debug, Clone)]
pub struct ExportEntry {
    pub exported: String,
    pub target: ExportTarget,
}

#[derive(Debug, Clone)]
pub enum ExportTarget {
    /// Exports a module-scope binding.
    Local(String),
    /// `export { imported as exported } from "source"`
    ReExport { source: String, imported: String },
    /// `export default <expression>` with no local name.
    DefaultExpr {
        expr: Option<Expr>,
        summary: JsxSummary,
    },
}

/// A call to one of [`ITERATION_METHODS`].
#[derive(Debug, Clone)]
pub struct IterationFrame {
    pub method: String,
    /// Receiver of the call (`items` in `items.map(...)`).
    pub array: Expr,
    /// First callback parameter, when it is a plain identifier.
    pub item_param: Option<String>,
    pub index_param: Option<String>,
    /// Where the call itself sits.
    pub site: Site,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct ModuleModel {
    pub path: PathBuf,
    pub line_index: LineIndex,
    pub scopes: Vec<Scope>,
    pub imports: Vec<ImportEntry>,
    pub exports: Vec<ExportEntry>,
    pub declarators: Vec<Declarator>,
    pub elements: Vec<JsxElement>,
    pub frames: Vec<IterationFrame>,
}

impl ModuleModel {
    /// Resolve `name` from `scope` outwards.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Binding> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scopes.get(id)?;
            if let Some(binding) = scope.bindings.get(name) {
                return Some(binding);
            }
            current = scope.parent;
        }
        None
    }

    pub fn module_binding(&self, name: &str) -> Option<&Binding> {
        self.lookup(MODULE_SCOPE, name)
    }

    pub fn import(&self, import: ImportId, specifier: usize) -> Option<(&ImportEntry, &ImportSpecifier)> {
        let entry = self.imports.get(import)?;
        Some((entry, entry.specifiers.get(specifier)?))
    }

    pub fn declarator(&self, id: DeclaratorId) -> Option<&Declarator> {
        self.declarators.get(id)
    }

    pub fn element(&self, id: ElementId) -> Option<&JsxElement> {
        self.elements.get(id)
    }

    /// Element whose span starts at `start`.
    pub fn element_at(&self, start: u32) -> Option<ElementId> {
        self.elements.iter().position(|e| e.span.start == start)
    }

    pub fn parent_of(&self, id: ElementId) -> Option<&JsxElement> {
        self.elements.get(id)?.parent.and_then(|p| self.elements.get(p))
    }

    /// Elements whose opening tag starts on `line`, in source order.
    pub fn elements_on_line(&self, line: u32) -> impl Iterator<Item = (ElementId, &JsxElement)> {
        self.elements
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.line == line)
    }

    /// Declarators binding `name`, in source order.
    pub fn declarators_named<'m>(&'m self, name: &'m str) -> impl Iterator<Item = &'m Declarator> {
        self.declarators
            .iter()
            .filter(move |d| d.name.as_deref() == Some(name))
    }

    pub fn export(&self, exported: &str) -> Option<&ExportEntry> {
        self.exports.iter().find(|e| e.exported == exported)
    }

    pub fn line(&self, offset: u32) -> u32 {
        self.line_index.line(offset)
    }
}
