//! Text rendering helpers for JSX attributes, JSX text and JS literals.

use serde_json::Value;

/// Render a string-valued JSX attribute.
///
/// Plain values use the `name="value"` form. Values that a quoted JSX
/// attribute cannot carry verbatim fall back to an expression container.
///
/// ```
/// use vedit_gen::jsx::render_attribute;
///
/// assert_eq!(render_attribute("x-id", "Card_12"), r#"x-id="Card_12""#);
/// assert_eq!(render_attribute("title", "say \"hi\""), r#"title={"say \"hi\""}"#);
/// ```
pub fn render_attribute(name: &str, value: &str) -> String {
    if needs_expression_attr(value) {
        format!("{}={{{}}}", name, js_string_literal(value, '"'))
    } else {
        format!("{}=\"{}\"", name, value)
    }
}

/// Render only the value part of an attribute (`"v"` or `{"v"}`).
pub fn render_attribute_value(value: &str) -> String {
    if needs_expression_attr(value) {
        format!("{{{}}}", js_string_literal(value, '"'))
    } else {
        format!("\"{}\"", value)
    }
}

fn needs_expression_attr(value: &str) -> bool {
    value.contains(['"', '&', '\n', '\r'])
}

/// Quote `value` as a JavaScript string literal using `quote` (`"` or `'`).
pub fn js_string_literal(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Render text for placement between JSX tags.
///
/// Characters with meaning in JSX children force an expression container.
pub fn render_jsx_text(text: &str) -> String {
    if text.contains(['{', '}', '<', '>']) {
        format!("{{{}}}", js_string_literal(text, '"'))
    } else {
        text.to_string()
    }
}

/// Render a JSON value as a JavaScript expression.
///
/// Object keys that are valid identifiers are emitted bare.
pub fn render_json_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => js_string_literal(s, '"'),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(render_json_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(map) => {
            let props: Vec<String> = map
                .iter()
                .map(|(key, value)| {
                    let key = if is_identifier_name(key) {
                        key.clone()
                    } else {
                        js_string_literal(key, '"')
                    };
                    format!("{}: {}", key, render_json_literal(value))
                })
                .collect();
            format!("{{ {} }}", props.join(", "))
        }
    }
}

/// ASCII-only identifier check, enough for object keys we emit.
pub fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_attribute_escapes_into_expression() {
        assert_eq!(render_attribute("className", "p-4 m-2"), r#"className="p-4 m-2""#);
        assert_eq!(render_attribute("x-source-var", "a&b"), r#"x-source-var={"a&b"}"#);
        assert_eq!(render_attribute_value("line\nbreak"), r#"{"line\nbreak"}"#);
    }

    #[test]
    fn test_js_string_literal() {
        assert_eq!(js_string_literal("it's", '\''), r"'it\'s'");
        assert_eq!(js_string_literal("it's", '"'), r#""it's""#);
        assert_eq!(js_string_literal("a\\b\t", '"'), r#""a\\b\t""#);
        assert_eq!(js_string_literal("\u{1}", '"'), r#""\u0001""#);
    }

    #[test]
    fn test_render_jsx_text() {
        assert_eq!(render_jsx_text("Book now"), "Book now");
        assert_eq!(render_jsx_text("a < b"), r#"{"a < b"}"#);
        assert_eq!(render_jsx_text("{x}"), r#"{"{x}"}"#);
    }

    #[test]
    fn test_render_json_literal() {
        let value = json!({"name": "Cut", "price": 10, "data-x": [true, null]});
        assert_eq!(
            render_json_literal(&value),
            r#"{ name: "Cut", price: 10, "data-x": [true, null] }"#
        );
        assert_eq!(render_json_literal(&json!({})), "{}");
        assert_eq!(render_json_literal(&json!(1.5)), "1.5");
    }

    #[test]
    fn test_is_identifier_name() {
        assert!(is_identifier_name("price"));
        assert!(is_identifier_name("$el_2"));
        assert!(!is_identifier_name("2x"));
        assert!(!is_identifier_name("data-x"));
        assert!(!is_identifier_name(""));
    }
}
