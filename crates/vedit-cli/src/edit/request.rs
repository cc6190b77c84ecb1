//! Wire types of the `/edit-file` endpoint.
//!
//! The editing UI builds requests from the metadata attributes stamped by
//! the annotator, so field names follow the attribute vocabulary
//! (`fileName`, `lineNumber`, `component`, `sourceFileAbs`, ...).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditBatch {
    #[serde(default)]
    pub changes: Vec<Value>,
}

/// One change of a batch, dispatched on its `type` field.
///
/// Structural types accept both the short names and the `*Edit` forms.
/// Unknown types deserialize into [`EditRequest::Unsupported`] so they can be
/// rejected on their own without failing the batch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum EditRequest {
    #[serde(rename = "className", alias = "classNameEdit")]
    ClassName(ClassNameEdit),
    #[serde(rename = "textContent", alias = "textContentEdit")]
    TextContent(TextContentEdit),
    #[serde(rename = "content", alias = "contentEdit")]
    Content(ContentEdit),
    #[serde(rename = "variableEdit")]
    Variable(VariableEdit),
    #[serde(other)]
    Unsupported,
}

impl EditRequest {
    /// Parse one raw change, describing why it is unusable on failure.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match serde_json::from_value(value.clone()) {
            Ok(EditRequest::Unsupported) => Err(unsupported_reason(value)),
            Ok(request) => Ok(request),
            Err(_) if !value.get("type").is_some_and(Value::is_string) => {
                Err(unsupported_reason(value))
            }
            Err(e) => Err(format!("Invalid {} change: {}", type_of(value), e)),
        }
    }

    /// Addressed element for structural edits.
    pub fn target(&self) -> Option<ElementTarget<'_>> {
        let (file_name, line_number, component) = match self {
            EditRequest::ClassName(e) => (&e.file_name, e.line_number, &e.component),
            EditRequest::TextContent(e) => (&e.file_name, e.line_number, &e.component),
            EditRequest::Content(e) => (&e.file_name, e.line_number, &e.component),
            EditRequest::Variable(_) | EditRequest::Unsupported => return None,
        };
        Some(ElementTarget {
            file_name,
            line_number,
            component,
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EditRequest::ClassName(_) => "className",
            EditRequest::TextContent(_) => "textContent",
            EditRequest::Content(_) => "content",
            EditRequest::Variable(_) => "variableEdit",
            EditRequest::Unsupported => "unsupported",
        }
    }
}

fn type_of(value: &Value) -> &str {
    value.get("type").and_then(Value::as_str).unwrap_or("undefined")
}

fn unsupported_reason(value: &Value) -> String {
    format!(
        "Change must have valid type ('className', 'textContent', 'content' or 'variableEdit'). Received type: {}",
        type_of(value)
    )
}

/// File, line and tag name that identify an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementTarget<'a> {
    pub file_name: &'a str,
    pub line_number: u32,
    pub component: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassNameEdit {
    pub file_name: String,
    pub line_number: u32,
    pub component: String,
    pub class_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContentEdit {
    pub file_name: String,
    pub line_number: u32,
    pub component: String,
    #[serde(default)]
    pub text_content: Option<String>,
    /// One entry per text-like child, in order.
    #[serde(default)]
    pub text_parts: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEdit {
    pub file_name: String,
    pub line_number: u32,
    pub component: String,
    /// Replacement children as JSX source.
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableEdit {
    /// Module specifier (`@/data/prices`) of the declaring file.
    #[serde(default)]
    pub source_file: Option<String>,
    /// Absolute path of the declaring file; preferred over `source_file`.
    #[serde(default)]
    pub source_file_abs: Option<PathBuf>,
    #[serde(default)]
    pub variable_name: Option<String>,
    #[serde(default)]
    pub variable_line: Option<u32>,
    #[serde(default)]
    pub array_index: Option<i64>,
    /// Dot-separated object keys, e.g. `contact.phone`.
    #[serde(default)]
    pub property_path: Option<String>,
    #[serde(default)]
    pub new_value: Option<Value>,
}

/// An applied change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRecord {
    /// Project-relative path with a leading `/`.
    pub file: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_path: Option<String>,
    pub old_data: Value,
    pub new_data: Value,
}

/// A change that was not applied, echoed back with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedRecord {
    pub change: Value,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
}

impl RejectedRecord {
    pub fn new(change: Value, reason: impl Into<String>) -> Self {
        Self {
            change,
            reason: reason.into(),
            file: None,
            line_number: None,
            element: None,
        }
    }
}

/// Response body of a processed batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResponse {
    pub status: &'static str,
    pub edits: Vec<EditRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected_changes: Vec<RejectedRecord>,
}

impl Default for EditResponse {
    fn default() -> Self {
        Self {
            status: "ok",
            edits: Vec::new(),
            rejected_changes: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_short_and_long_type_names() {
        let short = json!({
            "type": "className",
            "fileName": "Hero",
            "lineNumber": 4,
            "component": "h1",
            "className": "text-xl"
        });
        let long = json!({
            "type": "classNameEdit",
            "fileName": "Hero",
            "lineNumber": 4,
            "component": "h1",
            "className": "text-xl"
        });
        let a = EditRequest::from_value(&short).unwrap();
        let b = EditRequest::from_value(&long).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            a.target(),
            Some(ElementTarget {
                file_name: "Hero",
                line_number: 4,
                component: "h1"
            })
        );
    }

    #[test]
    fn test_unknown_and_missing_types_rejected() {
        let err = EditRequest::from_value(&json!({"type": "styleEdit", "fileName": "Hero"})).unwrap_err();
        assert!(err.ends_with("Received type: styleEdit"));

        let err = EditRequest::from_value(&json!({"fileName": "Hero"})).unwrap_err();
        assert!(err.ends_with("Received type: undefined"));
    }

    #[test]
    fn test_missing_payload_rejected() {
        let err = EditRequest::from_value(&json!({
            "type": "className",
            "fileName": "Hero",
            "lineNumber": 4,
            "component": "h1"
        }))
        .unwrap_err();
        assert!(err.starts_with("Invalid className change"));
        assert!(err.contains("className"));
    }

    #[test]
    fn test_variable_edit_fields() {
        let request = EditRequest::from_value(&json!({
            "type": "variableEdit",
            "sourceFile": "@/data/config",
            "variableName": "CONFIG",
            "propertyPath": "contact.phone",
            "newValue": "222"
        }))
        .unwrap();
        let EditRequest::Variable(edit) = request else {
            panic!("expected variable edit");
        };
        assert_eq!(edit.source_file.as_deref(), Some("@/data/config"));
        assert_eq!(edit.property_path.as_deref(), Some("contact.phone"));
        assert_eq!(edit.new_value, Some(json!("222")));
        assert_eq!(edit.array_index, None);
    }

    #[test]
    fn test_response_omits_empty_rejections() {
        let json = serde_json::to_value(EditResponse::default()).unwrap();
        assert_eq!(json, json!({"status": "ok", "edits": []}));
    }
}
