//! Parser façade for reading existing JavaScript/TypeScript code
//!
//! Plain `.js`/`.mjs`/`.cjs` files are parsed with JSX enabled because React
//! projects routinely keep components in `.js` files.

use std::path::Path;

use crate::error::{GenError, Result};
use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;

/// Parse options for reading source code
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Source type (JavaScript, TypeScript, JSX, TSX)
    pub source_type: SourceType,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::jsx()
    }
}

impl ParseOptions {
    /// Create parse options from file path (auto-detects source type)
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let source_type = SourceType::from_path(path.as_ref()).unwrap_or(SourceType::tsx());
        let source_type = if source_type.is_typescript() {
            source_type
        } else {
            source_type.with_jsx(true)
        };
        Self { source_type }
    }

    /// Create parse options for JSX
    pub fn jsx() -> Self {
        Self {
            source_type: SourceType::jsx(),
        }
    }
}

/// Parsed program
pub struct ParsedProgram<'a> {
    /// The parsed AST program
    pub program: oxc_ast::ast::Program<'a>,
}

/// Parse source code into an AST
///
/// Any parse error fails the whole parse; a partial AST is never returned.
///
/// # Arguments
///
/// * `allocator` - Allocator for AST nodes (must outlive the returned program)
/// * `source` - Source code to parse
/// * `options` - Parse options
pub fn parse<'a>(
    allocator: &'a Allocator,
    source: &'a str,
    options: ParseOptions,
) -> Result<ParsedProgram<'a>> {
    let parser = Parser::new(allocator, source, options.source_type);
    let result = parser.parse();

    if result.panicked || !result.errors.is_empty() {
        return Err(GenError::parse_failed_with_reason(
            "Parse errors",
            result
                .errors
                .iter()
                .map(|err| err.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        ));
    }

    Ok(ParsedProgram {
        program: result.program,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jsx_in_js_file() {
        let allocator = Allocator::default();
        let source = "export const A = () => <div className=\"a\">hi</div>;";
        let parsed = parse(&allocator, source, ParseOptions::from_path("A.js")).unwrap();
        assert_eq!(parsed.program.body.len(), 1);
    }

    #[test]
    fn test_parse_tsx() {
        let allocator = Allocator::default();
        let source = "export function A(props: { x: string }) { return <p>{props.x}</p>; }";
        let parsed = parse(&allocator, source, ParseOptions::from_path("A.tsx")).unwrap();
        assert!(parsed.program.source_type.is_typescript());
    }

    #[test]
    fn test_parse_error_reported() {
        let allocator = Allocator::default();
        let result = parse(&allocator, "const = ;", ParseOptions::jsx());
        assert!(matches!(result, Err(GenError::ParseFailed { .. })));
    }
}
