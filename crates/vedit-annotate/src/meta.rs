//! Metadata attributes stamped onto elements.
//!
//! The editing UI reads these back from the rendered DOM to build edit
//! requests, so names and value formats are a wire contract.

use vedit_analysis::{ArrayContext, Provenance};
use vedit_gen::jsx::render_attribute;

pub const ATTR_FILE_NAME: &str = "x-file-name";
pub const ATTR_LINE_NUMBER: &str = "x-line-number";
pub const ATTR_COMPONENT: &str = "x-component";
pub const ATTR_ID: &str = "x-id";
pub const ATTR_DYNAMIC: &str = "x-dynamic";
pub const ATTR_EXCLUDED: &str = "x-excluded";

/// Marker attribute of injected expression wrappers.
pub const ATTR_DYNAMIC_WRAPPER: &str = "data-ve-dynamic";

/// Opening tag of the non-rendering wrapper placed around raw expression
/// children of native elements.
pub const WRAPPER_OPEN: &str =
    r#"<span data-ve-dynamic="true" x-excluded="true" style={{ display: "contents" }}>"#;
pub const WRAPPER_CLOSE: &str = "</span>";

/// Everything stamped onto one element.
#[derive(Debug, Clone)]
pub struct ElementMeta<'a> {
    pub file_name: &'a str,
    pub line: u32,
    pub component: &'a str,
    pub dynamic: bool,
    pub excluded: bool,
    pub source: Option<&'a Provenance>,
    pub array: Option<&'a ArrayContext>,
}

impl ElementMeta<'_> {
    /// `{file}_{line}`
    pub fn id(&self) -> String {
        format!("{}_{}", self.file_name, self.line)
    }

    /// Attribute name/value pairs in stamping order.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![
            (ATTR_FILE_NAME, self.file_name.to_string()),
            (ATTR_LINE_NUMBER, self.line.to_string()),
            (ATTR_COMPONENT, self.component.to_string()),
            (ATTR_ID, self.id()),
            (ATTR_DYNAMIC, self.dynamic.to_string()),
        ];
        if self.excluded {
            attrs.push((ATTR_EXCLUDED, "true".to_string()));
        }

        if let Some(source) = self.source {
            attrs.push(("x-source-type", source.source_type.as_str().to_string()));
            if let Some(var) = &source.var_name {
                attrs.push(("x-source-var", var.clone()));
            }
            if let Some(file) = &source.file {
                attrs.push(("x-source-file", file.clone()));
            }
            if let Some(abs) = &source.abs_file {
                attrs.push(("x-source-file-abs", abs.display().to_string()));
            }
            if let Some(line) = source.line {
                attrs.push(("x-source-line", line.to_string()));
            }
            if let Some(path) = source.path.as_deref().filter(|p| !p.is_empty()) {
                attrs.push(("x-source-path", path.to_string()));
            }
            attrs.push(("x-source-editable", source.is_editable.to_string()));
        }

        if let Some(array) = self.array {
            if let Some(var) = &array.array_var {
                attrs.push(("x-array-var", var.clone()));
            }
            if let Some(file) = &array.array_file {
                attrs.push(("x-array-file", file.clone()));
            }
            if let Some(line) = array.array_line {
                attrs.push(("x-array-line", line.to_string()));
            }
            attrs.push(("x-array-item-param", array.item_param.clone()));
        }
        attrs
    }

    /// Attributes as JSX source, space separated.
    pub fn render(&self) -> String {
        self.attributes()
            .iter()
            .map(|(name, value)| render_attribute(name, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vedit_analysis::SourceType;

    #[test]
    fn test_identity_only() {
        let meta = ElementMeta {
            file_name: "Hero",
            line: 12,
            component: "h1",
            dynamic: false,
            excluded: false,
            source: None,
            array: None,
        };
        assert_eq!(
            meta.render(),
            r#"x-file-name="Hero" x-line-number="12" x-component="h1" x-id="Hero_12" x-dynamic="false""#
        );
    }

    #[test]
    fn test_source_and_array_fields() {
        let context = ArrayContext {
            array_var: Some("PRICES".into()),
            array_file: Some("@/data/services".into()),
            abs_file: Some("/app/src/data/services.js".into()),
            array_line: Some(3),
            item_param: "p".into(),
            index_param: None,
            is_editable: true,
            source_type: Some(SourceType::StaticImported),
        };
        let source = Provenance::array_item(context.clone(), Some("price".into()));
        let meta = ElementMeta {
            file_name: "Prices",
            line: 8,
            component: "span",
            dynamic: true,
            excluded: true,
            source: Some(&source),
            array: Some(&context),
        };
        let names: Vec<_> = meta.attributes().into_iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            [
                "x-file-name",
                "x-line-number",
                "x-component",
                "x-id",
                "x-dynamic",
                "x-excluded",
                "x-source-type",
                "x-source-var",
                "x-source-file",
                "x-source-file-abs",
                "x-source-line",
                "x-source-path",
                "x-source-editable",
                "x-array-var",
                "x-array-file",
                "x-array-line",
                "x-array-item-param",
            ]
        );
        let rendered = meta.render();
        assert!(rendered.contains(r#"x-source-type="static-imported""#));
        assert!(rendered.contains(r#"x-source-file-abs="/app/src/data/services.js""#));
        assert!(rendered.contains(r#"x-source-path="price""#));
    }
}
