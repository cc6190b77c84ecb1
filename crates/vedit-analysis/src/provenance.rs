//! Provenance records: where a piece of rendered data comes from and
//! whether it can be edited at its origin.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Origin class of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    StaticLocal,
    StaticImported,
    Prop,
    State,
    Computed,
    Template,
    External,
    Unknown,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::StaticLocal => "static-local",
            SourceType::StaticImported => "static-imported",
            SourceType::Prop => "prop",
            SourceType::State => "state",
            SourceType::Computed => "computed",
            SourceType::Template => "template",
            SourceType::External => "external",
            SourceType::Unknown => "unknown",
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, SourceType::StaticLocal | SourceType::StaticImported)
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the value at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueType {
    Literal,
    Array,
    Object,
    ArrayItem,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Literal => "literal",
            ValueType::Array => "array",
            ValueType::Object => "object",
            ValueType::ArrayItem => "array-item",
        }
    }
}

/// The iteration an expression sits in (`ITEMS.map(item => ...)`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayContext {
    pub array_var: Option<String>,
    pub array_file: Option<String>,
    pub abs_file: Option<PathBuf>,
    pub array_line: Option<u32>,
    pub item_param: String,
    pub index_param: Option<String>,
    /// Only identifier arrays whose origin is an editable array literal.
    pub is_editable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceType>,
}

/// Classification of one markup-embedded expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var_name: Option<String>,
    /// Original prop name when the record was traced through a prop.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prop_name: Option<String>,
    /// Import specifier as written, for imported values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abs_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Dot path into the value (`address.city`, `items.[0].title`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub is_editable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_context: Option<ArrayContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traced_from: Option<Box<Provenance>>,
}

impl Provenance {
    pub fn new(source_type: SourceType) -> Self {
        Self {
            source_type,
            value_type: None,
            var_name: None,
            prop_name: None,
            file: None,
            abs_file: None,
            line: None,
            path: None,
            is_editable: false,
            array_context: None,
            traced_from: None,
        }
    }

    pub fn named(source_type: SourceType, var_name: impl Into<String>) -> Self {
        Self {
            var_name: Some(var_name.into()),
            ..Self::new(source_type)
        }
    }

    /// Identifier with no binding in scope (globals, undeclared names).
    pub fn external(var_name: impl Into<String>) -> Self {
        Self::named(SourceType::External, var_name)
    }

    pub fn unknown() -> Self {
        Self::new(SourceType::Unknown)
    }

    /// Item of an iterated array, located through its context.
    pub fn array_item(context: ArrayContext, path: Option<String>) -> Self {
        let source_type = context
            .source_type
            .filter(SourceType::is_static)
            .unwrap_or(SourceType::StaticImported);
        Self {
            source_type,
            value_type: Some(ValueType::ArrayItem),
            var_name: context.array_var.clone(),
            file: context.array_file.clone(),
            abs_file: context.abs_file.clone(),
            line: context.array_line,
            path,
            is_editable: context.is_editable,
            array_context: Some(context),
            ..Self::new(source_type)
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.path = (!path.is_empty()).then_some(path);
        self
    }

    /// Combined label: `static-local-literal`, `static-imported-array`,
    /// `array-iteration-item`, `component-prop`, `component-state`, ...
    pub fn kind(&self) -> String {
        match self.source_type {
            SourceType::StaticLocal | SourceType::StaticImported => match self.value_type {
                Some(ValueType::ArrayItem) if self.path.is_some() => {
                    format!("{}-array", self.source_type)
                }
                Some(ValueType::ArrayItem) => "array-iteration-item".to_string(),
                Some(value) => format!("{}-{}", self.source_type, value.as_str()),
                None => self.source_type.to_string(),
            },
            SourceType::Prop => "component-prop".to_string(),
            SourceType::State => "component-state".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(editable: bool) -> ArrayContext {
        ArrayContext {
            array_var: Some("PRICES".into()),
            array_file: Some("@/data/services".into()),
            abs_file: Some(PathBuf::from("/app/src/data/services.js")),
            array_line: Some(1),
            item_param: "p".into(),
            index_param: None,
            is_editable: editable,
            source_type: Some(SourceType::StaticImported),
        }
    }

    #[test]
    fn test_array_item_kind() {
        let item = Provenance::array_item(context(true), Some("price".into()));
        assert_eq!(item.kind(), "static-imported-array");
        assert_eq!(item.var_name.as_deref(), Some("PRICES"));
        assert!(item.is_editable);

        let bare = Provenance::array_item(context(false), None);
        assert_eq!(bare.kind(), "array-iteration-item");
        assert!(!bare.is_editable);
    }

    #[test]
    fn test_kind_labels() {
        let mut local = Provenance::named(SourceType::StaticLocal, "TITLE");
        local.value_type = Some(ValueType::Literal);
        assert_eq!(local.kind(), "static-local-literal");
        assert_eq!(Provenance::named(SourceType::Prop, "label").kind(), "component-prop");
        assert_eq!(Provenance::new(SourceType::State).kind(), "component-state");
        assert_eq!(Provenance::new(SourceType::Computed).kind(), "computed");
        assert_eq!(Provenance::external("window").kind(), "external");
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut record = Provenance::named(SourceType::StaticImported, "PRICES");
        record.is_editable = true;
        record.value_type = Some(ValueType::Array);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "static-imported");
        assert_eq!(json["valueType"], "array");
        assert_eq!(json["varName"], "PRICES");
        assert_eq!(json["isEditable"], true);
        assert!(json.get("arrayContext").is_none());
    }

    #[test]
    fn test_empty_path_dropped() {
        assert_eq!(Provenance::unknown().with_path("").path, None);
        assert_eq!(
            Provenance::unknown().with_path("a.b").path.as_deref(),
            Some("a.b")
        );
    }
}
