//! Edits to literal values of `const` declarations.
//!
//! A variable edit rewrites one string or number literal (or one whole array
//! element) inside the initializer of a named declarator. The target is
//! addressed by an optional array index and an optional dot-separated path of
//! object keys, mirroring the `x-source-*` attributes of the element that
//! rendered the value.

use serde_json::Value;
use vedit_analysis::model::{Declarator, Expr, ExprKind, ModuleModel};
use vedit_gen::SourcePatch;
use vedit_gen::jsx::{js_string_literal, render_json_literal};

use super::request::VariableEdit;

/// Result of a successful variable edit.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableChange {
    pub code: String,
    pub old_value: Value,
}

/// Check required fields and refuse values that could smuggle code.
///
/// Returns the variable name and the new value.
pub fn validate(edit: &VariableEdit) -> Result<(&str, &Value), String> {
    let Some(name) = edit.variable_name.as_deref().filter(|n| !n.is_empty()) else {
        return Err("Missing variableName".to_string());
    };
    let Some(value) = edit.new_value.as_ref() else {
        return Err("Missing newValue".to_string());
    };
    if contains_template_syntax(value) {
        return Err("Template literals not allowed in newValue".to_string());
    }
    Ok((name, value))
}

fn contains_template_syntax(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains("${") || s.contains('`'),
        Value::Array(items) => items.iter().any(contains_template_syntax),
        Value::Object(map) => map
            .iter()
            .any(|(key, value)| key.contains("${") || key.contains('`') || contains_template_syntax(value)),
        _ => false,
    }
}

/// Apply `edit` to the first matching `const` declarator of `model`.
///
/// `source` must be the text `model` was lowered from.
pub fn apply_variable_edit(
    model: &ModuleModel,
    source: &str,
    name: &str,
    edit: &VariableEdit,
    new_value: &Value,
) -> Result<VariableChange, String> {
    let mut last_reason = None;

    let candidates = model
        .declarators_named(name)
        .filter(|decl| edit.variable_line.is_none_or(|line| decl.line == line));

    for decl in candidates {
        match plan(decl, source, edit, new_value) {
            Ok(splice) => {
                let mut patch = SourcePatch::new(source);
                patch
                    .replace(splice.start, splice.end, splice.text)
                    .map_err(|e| e.to_string())?;
                return Ok(VariableChange {
                    code: patch.apply(),
                    old_value: splice.old_value,
                });
            }
            Err(reason) => last_reason = Some(reason),
        }
    }

    Err(match last_reason {
        Some(reason) => format!("Variable \"{}\" not found or not editable: {}", name, reason),
        None => format!("Variable \"{}\" not found or not editable", name),
    })
}

struct Splice {
    start: u32,
    end: u32,
    text: String,
    old_value: Value,
}

fn plan(decl: &Declarator, source: &str, edit: &VariableEdit, new_value: &Value) -> Result<Splice, String> {
    if !decl.is_const() {
        return Err("only const declarations are editable".to_string());
    }
    let Some(init) = decl.init.as_ref() else {
        return Err("declaration has no initializer".to_string());
    };
    let path = edit.property_path.as_deref().filter(|p| !p.is_empty());

    match (edit.array_index, path) {
        (Some(index), path) => {
            let ExprKind::Array(items) = &init.kind else {
                return Err("initializer is not an array".to_string());
            };
            let Some(slot) = usize::try_from(index).ok().and_then(|i| items.get(i)) else {
                return Err(format!("array index {} is out of range", index));
            };
            let Some(item) = slot.as_ref() else {
                return Err(format!("array element {} is a hole or spread", index));
            };
            match path {
                Some(path) => {
                    if !matches!(item.kind, ExprKind::Object(_)) {
                        return Err(format!("array element {} is not an object", index));
                    }
                    set_property(item, path, new_value)
                }
                None => Ok(Splice {
                    start: item.span.start,
                    end: item.span.end,
                    text: render_value(new_value, quote_of(item)),
                    old_value: Value::String(item.span.slice(source).to_string()),
                }),
            }
        }
        (None, Some(path)) => {
            if !matches!(init.kind, ExprKind::Object(_)) {
                return Err("initializer is not an object".to_string());
            }
            set_property(init, path, new_value)
        }
        (None, None) => set_literal(init, new_value),
    }
}

/// Descend through nested object literals and replace the leaf literal.
fn set_property(object: &Expr, path: &str, new_value: &Value) -> Result<Splice, String> {
    let (parents, leaf) = match path.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, path),
    };

    let mut current = object;
    for key in parents.into_iter().flat_map(|p| p.split('.')) {
        let Some(prop) = current.property(key) else {
            return Err(format!("property '{}' not found", key));
        };
        if !matches!(prop.value.kind, ExprKind::Object(_)) {
            return Err(format!("property '{}' is not an object", key));
        }
        current = &prop.value;
    }

    let Some(prop) = current.property(leaf) else {
        return Err(format!("property '{}' not found", leaf));
    };
    set_literal(&prop.value, new_value)
}

/// Replace a string or number literal in place.
fn set_literal(expr: &Expr, new_value: &Value) -> Result<Splice, String> {
    match &expr.kind {
        ExprKind::Str { value, quote } => Ok(Splice {
            start: expr.span.start,
            end: expr.span.end,
            text: js_string_literal(&value_as_string(new_value), *quote),
            old_value: Value::String(value.clone()),
        }),
        ExprKind::Num { value, .. } => {
            let Some(number) = value_as_number(new_value) else {
                return Err(format!("{} is not a number", new_value));
            };
            Ok(Splice {
                start: expr.span.start,
                end: expr.span.end,
                text: format_number(number),
                old_value: number_value(*value),
            })
        }
        _ => Err("value is not a string or number literal".to_string()),
    }
}

fn quote_of(expr: &Expr) -> char {
    match &expr.kind {
        ExprKind::Str { quote, .. } => *quote,
        _ => '"',
    }
}

fn render_value(value: &Value, quote: char) -> String {
    match value {
        Value::String(s) => js_string_literal(s, quote),
        other => render_json_literal(other),
    }
}

fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn value_as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}
