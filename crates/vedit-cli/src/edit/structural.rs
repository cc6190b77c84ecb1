//! Class, text and content edits addressed by file, line and tag name.
//!
//! All edits for one file go through a single [`StructuralEditor`] and one
//! [`SourcePatch`], so the file is read, patched and written once per batch.
//! Each edit is planned as a set of splices and only committed to the patch
//! when every splice fits; a rejected edit leaves the patch untouched.

use rustc_hash::FxHashSet;
use vedit_analysis::model::{AttrValue, ChildKind, ElementId, ExprKind, JsxAttr, JsxElement, ModuleModel};
use vedit_analysis::{is_portalish_name, is_slot_parent};
use vedit_gen::SourcePatch;
use vedit_gen::fragment::sanitize_fragment;
use vedit_gen::jsx::{js_string_literal, render_attribute, render_attribute_value, render_jsx_text};

use super::request::{EditRequest, TextContentEdit};

/// An edit that was accepted into the patch.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedEdit {
    pub kind: &'static str,
    pub line: u32,
    pub element: String,
    pub old_data: String,
    pub new_data: String,
}

struct Planned {
    splices: Vec<(u32, u32, String)>,
    old_data: String,
    new_data: String,
}

pub struct StructuralEditor<'s> {
    model: &'s ModuleModel,
    patch: SourcePatch<'s>,
    /// `(element, edit kind)` pairs already edited.
    claimed: FxHashSet<(ElementId, &'static str)>,
}

impl<'s> StructuralEditor<'s> {
    pub fn new(model: &'s ModuleModel, source: &'s str) -> Self {
        Self {
            model,
            patch: SourcePatch::new(source),
            claimed: FxHashSet::default(),
        }
    }

    /// Plan and stage one edit.
    ///
    /// The request matches the first element on its line with the same tag
    /// name that has not yet received an edit of the same kind.
    pub fn apply(&mut self, request: &EditRequest) -> Result<AppliedEdit, String> {
        let Some(target) = request.target() else {
            return Err(format!("'{}' is not an element edit", request.kind()));
        };
        let kind = request.kind();
        let model = self.model;

        let Some((id, element)) = model.elements_on_line(target.line_number).find(|(id, el)| {
            el.name.as_deref() == Some(target.component) && !self.claimed.contains(&(*id, kind))
        }) else {
            return Err(format!(
                "No <{}> element on line {}",
                target.component, target.line_number
            ));
        };

        let source = self.patch.source();
        let planned = match request {
            EditRequest::ClassName(edit) => plan_class_name(element, &edit.class_name),
            EditRequest::TextContent(edit) => plan_text(element, edit)?,
            EditRequest::Content(edit) => {
                if element.tag().is_some_and(is_portalish_name)
                    || model.parent_of(id).is_some_and(is_slot_parent)
                {
                    return Err(format!(
                        "<{}> is portal-like; its children cannot be replaced",
                        target.component
                    ));
                }
                plan_content(element, source, &edit.content)?
            }
            EditRequest::Variable(_) | EditRequest::Unsupported => {
                return Err(format!("'{}' is not an element edit", kind));
            }
        };

        self.commit(&planned.splices)?;
        self.claimed.insert((id, kind));
        Ok(AppliedEdit {
            kind,
            line: element.line,
            element: target.component.to_string(),
            old_data: planned.old_data,
            new_data: planned.new_data,
        })
    }

    fn commit(&mut self, splices: &[(u32, u32, String)]) -> Result<(), String> {
        if let Some((start, end, _)) = splices
            .iter()
            .find(|(start, end, _)| !self.patch.can_replace(*start, *end))
        {
            return Err(format!(
                "Edit at bytes {}..{} overlaps another edit in this batch",
                start, end
            ));
        }
        for (start, end, text) in splices {
            self.patch
                .replace(*start, *end, text.clone())
                .map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    /// Whether any edit was staged.
    pub fn has_changes(&self) -> bool {
        !self.patch.is_empty()
    }

    /// Patched source text.
    pub fn finish(self) -> String {
        self.patch.apply()
    }
}

fn plan_class_name(element: &JsxElement, class_name: &str) -> Planned {
    let (splice, old_data) = match element.attr("className") {
        Some(JsxAttr::Attr {
            value: AttrValue::Str { value, span },
            ..
        }) => (
            (span.start, span.end, render_attribute_value(class_name)),
            value.clone(),
        ),
        Some(JsxAttr::Attr {
            value: AttrValue::Expr { expr, span },
            ..
        }) => {
            let old = match expr.as_ref().map(|e| &e.kind) {
                Some(ExprKind::Str { value, .. }) => value.clone(),
                _ => String::new(),
            };
            ((span.start, span.end, render_attribute_value(class_name)), old)
        }
        Some(JsxAttr::Attr {
            value: AttrValue::Markup { span },
            ..
        }) => (
            (span.start, span.end, render_attribute_value(class_name)),
            String::new(),
        ),
        Some(JsxAttr::Attr { span, .. }) => (
            (span.start, span.end, render_attribute("className", class_name)),
            String::new(),
        ),
        _ => {
            let at = attrs_end(element);
            (
                (at, at, format!(" {}", render_attribute("className", class_name))),
                String::new(),
            )
        }
    };
    Planned {
        splices: vec![splice],
        old_data,
        new_data: class_name.to_string(),
    }
}

/// Offset just after the last attribute, or after the tag name.
fn attrs_end(element: &JsxElement) -> u32 {
    element
        .attrs
        .last()
        .map(|attr| match attr {
            JsxAttr::Attr { span, .. } | JsxAttr::Spread { span } => span.end,
        })
        .unwrap_or(element.name_end)
}

fn plan_text(element: &JsxElement, edit: &TextContentEdit) -> Result<Planned, String> {
    let Some(closing) = element.closing_start else {
        return Err(format!("<{}> is self-closing and has no text", edit.component));
    };
    match (&edit.text_parts, &edit.text_content) {
        (Some(parts), _) => Ok(plan_text_parts(element, closing, parts)),
        (None, Some(text)) => Ok(plan_text_content(element, text)),
        (None, None) => Err("textContent change needs textContent or textParts".to_string()),
    }
}

/// Replace text-like children in order, appending surplus parts.
fn plan_text_parts(element: &JsxElement, closing: u32, parts: &[String]) -> Planned {
    let mut splices = Vec::new();
    let mut old_data = String::new();
    let mut used = 0;

    for child in &element.children {
        let part = parts.get(used).map(String::as_str).unwrap_or_default();
        match &child.kind {
            ChildKind::Text(text) => {
                old_data.push_str(text);
                splices.push((child.span.start, child.span.end, render_jsx_text(part)));
            }
            ChildKind::Expr(Some(expr)) => {
                let ExprKind::Str { value, quote } = &expr.kind else {
                    continue;
                };
                old_data.push_str(value);
                splices.push((expr.span.start, expr.span.end, js_string_literal(part, *quote)));
            }
            _ => continue,
        }
        used += 1;
    }

    if parts.len() > used {
        let surplus: String = parts[used..].iter().map(|p| render_jsx_text(p)).collect();
        splices.push((closing, closing, surplus));
    }

    Planned {
        splices,
        old_data,
        new_data: parts.concat(),
    }
}

/// Replace the first non-blank text child, keeping its surrounding
/// whitespace; fall back to a blank text child, then to a new first child.
fn plan_text_content(element: &JsxElement, text: &str) -> Planned {
    let texts = || {
        element.children.iter().filter_map(|child| match &child.kind {
            ChildKind::Text(value) => Some((child, value)),
            _ => None,
        })
    };

    let target = texts()
        .find(|(_, value)| !value.trim().is_empty())
        .or_else(|| texts().next());

    let (splice, old_data) = match target {
        Some((child, value)) => {
            let leading = &value[..value.len() - value.trim_start().len()];
            let trailing = &value[value.trim_end().len()..];
            let replacement = format!("{}{}{}", leading, render_jsx_text(text), trailing);
            (
                (child.span.start, child.span.end, replacement),
                value.trim().to_string(),
            )
        }
        None => (
            (element.opening.end, element.opening.end, render_jsx_text(text)),
            String::new(),
        ),
    };

    Planned {
        splices: vec![splice],
        old_data,
        new_data: text.to_string(),
    }
}

/// Replace every child with `content`, parsed as JSX when possible.
fn plan_content(element: &JsxElement, source: &str, content: &str) -> Result<Planned, String> {
    let Some(span) = element.children_span() else {
        return Err(format!(
            "<{}> is self-closing and has no children",
            element.tag().unwrap_or("element")
        ));
    };
    let replacement = sanitize_fragment(content).unwrap_or_else(|| render_jsx_text(content));
    Ok(Planned {
        splices: vec![(span.start, span.end, replacement)],
        old_data: span.slice(source).trim().to_string(),
        new_data: content.to_string(),
    })
}
