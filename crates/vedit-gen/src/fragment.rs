//! Parsing of JSX child fragments supplied as strings.
//!
//! Content edits arrive as markup copied out of the rendered page, so they may
//! still carry the `x-*` metadata attributes the annotator stamped. Those are
//! stripped before the markup is spliced back into source.

use oxc_allocator::Allocator;
use oxc_ast::ast::{JSXAttribute, JSXAttributeName, Statement};
use oxc_ast_visit::{Visit, walk};
use oxc_span::Span;

use crate::parser::{ParseOptions, parse};
use crate::patch::SourcePatch;

const WRAPPER_OPEN: &str = "(<gjs-wrapper>";
const WRAPPER_CLOSE: &str = "</gjs-wrapper>)";

/// Validate `content` as a list of JSX children and strip metadata attributes.
///
/// Returns `None` when the content does not parse as JSX children; callers
/// then treat it as plain text.
///
/// ```
/// use vedit_gen::fragment::sanitize_fragment;
///
/// let clean = sanitize_fragment(r#"<b x-id="Hero_3" className="big">Hi</b>"#).unwrap();
/// assert_eq!(clean, r#"<b className="big">Hi</b>"#);
/// assert!(sanitize_fragment("<b>unclosed").is_none());
/// ```
pub fn sanitize_fragment(content: &str) -> Option<String> {
    let wrapped = format!("{}{}{}", WRAPPER_OPEN, content, WRAPPER_CLOSE);
    let allocator = Allocator::default();
    let parsed = parse(&allocator, &wrapped, ParseOptions::jsx()).ok()?;

    // Content must not close the wrapper early and start another statement
    let body = &parsed.program.body;
    if body.len() != 1 || !matches!(body[0], Statement::ExpressionStatement(_)) {
        return None;
    }

    let mut collector = MetaAttributeCollector::default();
    collector.visit_program(&parsed.program);

    let mut patch = SourcePatch::new(&wrapped);
    for span in collector.spans {
        let start = extend_over_whitespace(&wrapped, span.start);
        patch.remove(start, span.end).ok()?;
    }
    let cleaned = patch.apply();

    let end = cleaned.len().checked_sub(WRAPPER_CLOSE.len())?;
    cleaned.get(WRAPPER_OPEN.len()..end).map(str::to_string)
}

fn extend_over_whitespace(source: &str, start: u32) -> u32 {
    let prefix = &source[..start as usize];
    let trimmed = prefix.trim_end_matches([' ', '\t', '\n', '\r']);
    trimmed.len() as u32
}

#[derive(Default)]
struct MetaAttributeCollector {
    spans: Vec<Span>,
}

impl<'a> Visit<'a> for MetaAttributeCollector {
    fn visit_jsx_attribute(&mut self, attr: &JSXAttribute<'a>) {
        if let JSXAttributeName::Identifier(ident) = &attr.name {
            if ident.name.starts_with("x-") {
                self.spans.push(attr.span);
            }
        }
        walk::walk_jsx_attribute(self, attr);
    }
}
