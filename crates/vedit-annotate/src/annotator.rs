//! The annotation pass.

use std::fs;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde::Serialize;
use tracing::{debug, info, warn};
use vedit_analysis::model::{ChildKind, ElementId, JsxElement, ModuleModel};
use vedit_analysis::{Analyzer, ArrayContext, Provenance, SourceType, is_portalish_name, is_slot_parent};
use vedit_gen::SourcePatch;
use walkdir::WalkDir;

use crate::error::{AnnotateError, Result};
use crate::meta::{ATTR_DYNAMIC_WRAPPER, ATTR_EXCLUDED, ElementMeta, WRAPPER_CLOSE, WRAPPER_OPEN};
use crate::rules::{identity_file_name, is_excluded_component, is_strict_parent};

/// Counters for one or more annotated files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationReport {
    pub files: usize,
    /// Elements stamped as editable candidates.
    pub stamped: usize,
    /// Elements stamped with `x-excluded="true"`.
    pub excluded: usize,
    /// Expression children wrapped in a dynamic marker.
    pub wrapped: usize,
    /// Elements left untouched by the rules or because they already carry
    /// metadata.
    pub skipped: usize,
    /// Files that could not be read or parsed.
    pub failed: usize,
}

impl AddAssign for AnnotationReport {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.stamped += other.stamped;
        self.excluded += other.excluded;
        self.wrapped += other.wrapped;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Result of annotating one file.
#[derive(Debug, Clone)]
pub struct Annotated {
    pub path: PathBuf,
    pub code: String,
    pub changed: bool,
    pub report: AnnotationReport,
}

/// Annotation session over a borrowed [`Analyzer`].
///
/// Prop sources recorded while annotating one file feed prop tracing in the
/// files annotated after it, so a session should cover a whole tree.
pub struct Annotator<'a> {
    analyzer: &'a mut Analyzer,
}

impl<'a> Annotator<'a> {
    pub fn new(analyzer: &'a mut Analyzer) -> Self {
        Self { analyzer }
    }

    pub fn analyzer(&mut self) -> &mut Analyzer {
        &mut *self.analyzer
    }

    /// Annotate `source` as the contents of `path`.
    ///
    /// All edits are insertions, so every original line keeps its number.
    pub fn annotate_source(&mut self, path: &Path, source: &str) -> Result<Annotated> {
        let path = absolutize(path);
        let model = self.analyzer.analyze_source(&path, source)?;
        let file_name = identity_file_name(&path);

        let mut patch = SourcePatch::new(source);
        let mut report = AnnotationReport {
            files: 1,
            ..AnnotationReport::default()
        };

        for (id, element) in model.elements.iter().enumerate() {
            let result = if element.is_component() {
                self.annotate_component(&model, id, element, &file_name, &mut patch, &mut report)
            } else if element.name.is_some() {
                self.annotate_native(&model, element, &file_name, &mut patch, &mut report)
            } else {
                // Member and namespaced tags
                report.skipped += 1;
                Ok(())
            };
            result.map_err(|source| AnnotateError::Patch {
                path: path.clone(),
                source,
            })?;
        }

        let changed = !patch.is_empty();
        let code = patch.apply();
        debug!(
            path = %path.display(),
            stamped = report.stamped,
            excluded = report.excluded,
            wrapped = report.wrapped,
            "Annotated source"
        );
        Ok(Annotated {
            path,
            code,
            changed,
            report,
        })
    }

    /// Annotate a file on disk, rewriting it when `write` is set and
    /// something changed.
    pub fn annotate_file(&mut self, path: &Path, write: bool) -> Result<Annotated> {
        let source = fs::read_to_string(path).map_err(|e| AnnotateError::io(path, e))?;
        let annotated = self.annotate_source(path, &source)?;
        if write && annotated.changed {
            fs::write(&annotated.path, &annotated.code)
                .map_err(|e| AnnotateError::io(&annotated.path, e))?;
            info!(path = %annotated.path.display(), "Wrote annotated file");
        }
        Ok(annotated)
    }

    /// Annotate every source file under `root`, skipping ignored
    /// directories. Files that fail are logged and counted, not fatal.
    pub fn annotate_tree(&mut self, root: &Path, write: bool) -> Result<AnnotationReport> {
        let root = absolutize(root);
        let config = self.analyzer.config().clone();
        let files: Vec<PathBuf> = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !config
                        .ignore_dirs
                        .iter()
                        .any(|dir| entry.file_name() == dir.as_str())
            })
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| config.has_source_extension(path))
            .collect();

        let mut total = AnnotationReport::default();
        for path in files {
            match self.annotate_file(&path, write) {
                Ok(annotated) => total += annotated.report,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping file");
                    total.failed += 1;
                }
            }
        }
        info!(
            root = %root.display(),
            files = total.files,
            stamped = total.stamped,
            excluded = total.excluded,
            "Annotated tree"
        );
        Ok(total)
    }

    fn annotate_component(
        &mut self,
        model: &ModuleModel,
        id: ElementId,
        element: &JsxElement,
        file_name: &str,
        patch: &mut SourcePatch<'_>,
        report: &mut AnnotationReport,
    ) -> vedit_gen::Result<()> {
        let Some(name) = element.name.as_deref() else {
            return Ok(());
        };
        let parent = element.parent.and_then(|p| model.element(p).map(|el| (p, el)));
        let strict_parent = parent
            .and_then(|(_, el)| el.tag())
            .is_some_and(is_strict_parent);
        if element.has_meta_attr() || is_excluded_component(name) || strict_parent {
            report.skipped += 1;
            return Ok(());
        }

        self.analyzer.record_prop_sources(model, id);

        let mut dynamic = element.in_iteration || element.has_any_expression();
        // Literal children decide editability on their own
        if !dynamic && !element.has_static_text() {
            dynamic = self.analyzer.detect_dynamic_composite(model, id);
        }
        let (source, array) = if dynamic {
            self.element_source(model, element)
        } else {
            (None, None)
        };

        let parent_is_portal = match parent {
            Some((parent_id, parent_el)) => {
                is_slot_parent(parent_el)
                    || (parent_el.is_component()
                        && self.analyzer.usage_is_composite_portal(model, parent_id))
            }
            None => false,
        };
        let excluded = element.has_attr("asChild")
            || is_portalish_name(name)
            || parent_is_portal
            || self.analyzer.usage_is_composite_portal(model, id);

        stamp(
            patch,
            element,
            &ElementMeta {
                file_name,
                line: element.line,
                component: name,
                dynamic,
                excluded,
                source: source.as_ref(),
                array: array.as_ref(),
            },
        )?;
        if excluded {
            report.excluded += 1;
        } else {
            report.stamped += 1;
        }
        Ok(())
    }

    fn annotate_native(
        &mut self,
        model: &ModuleModel,
        element: &JsxElement,
        file_name: &str,
        patch: &mut SourcePatch<'_>,
        report: &mut AnnotationReport,
    ) -> vedit_gen::Result<()> {
        let Some(name) = element.name.as_deref() else {
            return Ok(());
        };

        if !element.has_attr(ATTR_DYNAMIC_WRAPPER) && !element.has_attr(ATTR_EXCLUDED) {
            report.wrapped += wrap_dynamic_children(patch, element)?;
        }

        if element.has_meta_attr() {
            report.skipped += 1;
            return Ok(());
        }

        let dynamic = element.in_iteration || element.has_any_expression();
        let (source, array) = if dynamic {
            self.element_source(model, element)
        } else {
            (None, None)
        };
        stamp(
            patch,
            element,
            &ElementMeta {
                file_name,
                line: element.line,
                component: name,
                dynamic,
                excluded: false,
                source: source.as_ref(),
                array: array.as_ref(),
            },
        )?;
        report.stamped += 1;
        Ok(())
    }

    /// Provenance of the first expression child, falling back to the
    /// enclosing iteration.
    pub fn element_source(
        &mut self,
        model: &ModuleModel,
        element: &JsxElement,
    ) -> (Option<Provenance>, Option<ArrayContext>) {
        if let Some(expr) = element.expression_children().next() {
            let source = self.analyzer.classify_expression(model, expr, &element.site);
            let array = source.array_context.clone();
            return (Some(source), array);
        }

        let Some(frame) = element.site.frame else {
            return (None, None);
        };
        let Some(context) = self.analyzer.array_iteration_context(model, frame) else {
            return (None, None);
        };
        let mut source = Provenance::array_item(context.clone(), None);
        if !context.is_editable {
            source.source_type = SourceType::External;
        }
        (Some(source), Some(context))
    }
}

fn stamp(patch: &mut SourcePatch<'_>, element: &JsxElement, meta: &ElementMeta<'_>) -> vedit_gen::Result<()> {
    let (at, before_spread) = element.attr_insertion_point();
    let attrs = meta.render();
    if before_spread {
        patch.insert(at, format!("{attrs} "))
    } else {
        patch.insert(at, format!(" {attrs}"))
    }
}

/// Wrap raw expression children that are not plain literals.
fn wrap_dynamic_children(patch: &mut SourcePatch<'_>, element: &JsxElement) -> vedit_gen::Result<usize> {
    let mut wrapped = 0;
    for child in &element.children {
        let ChildKind::Expr(Some(expr)) = &child.kind else {
            continue;
        };
        if expr.is_static_literal() {
            continue;
        }
        patch.insert(child.span.start, WRAPPER_OPEN)?;
        patch.insert(child.span.end, WRAPPER_CLOSE)?;
        wrapped += 1;
    }
    Ok(wrapped)
}

/// Absolute, lexically cleaned form of `path`, so annotated paths compare
/// equal to the ones the resolver produces.
pub(crate) fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.clean();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path).clean(),
        Err(_) => path.clean(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vedit_analysis::AnalyzerConfig;

    fn annotate(source: &str) -> Annotated {
        let mut analyzer = Analyzer::new(AnalyzerConfig::new("/app"));
        Annotator::new(&mut analyzer)
            .annotate_source(Path::new("/app/src/components/Page.jsx"), source)
            .unwrap()
    }

    #[test]
    fn test_static_native_element() {
        let out = annotate(r#"export const Page = () => <div className="a">Hi</div>;"#);
        assert_eq!(
            out.code,
            r#"export const Page = () => <div className="a" x-file-name="Page" x-line-number="1" x-component="div" x-id="Page_1" x-dynamic="false">Hi</div>;"#
        );
        assert_eq!(out.report.stamped, 1);
        assert!(out.changed);
    }

    #[test]
    fn test_wraps_dynamic_child() {
        let out = annotate("const Page = () => <p>{name}{\"lit\"}</p>;");
        assert_eq!(
            out.code,
            concat!(
                r#"const Page = () => <p x-file-name="Page" x-line-number="1" x-component="p" x-id="Page_1" x-dynamic="true" "#,
                r#"x-source-type="external" x-source-var="name" x-source-editable="false">"#,
                r#"<span data-ve-dynamic="true" x-excluded="true" style={{ display: "contents" }}>{name}</span>{"lit"}</p>;"#,
            )
        );
        assert_eq!(out.report.wrapped, 1);
    }

    #[test]
    fn test_inserts_before_spread() {
        let out = annotate("const Page = (props) => <section id=\"s\" {...props} />;");
        assert!(out.code.contains(r#"<section id="s" x-file-name="Page""#));
        assert!(out.code.contains(r#"x-dynamic="true" {...props} />"#));
    }

    #[test]
    fn test_idempotent() {
        let source = r#"
const ITEMS = [{ name: "Cut" }];
export default function Page({ title }) {
  return (
    <main>
      <h1>{title}</h1>
      <ul>{ITEMS.map(item => <li key={item.name}>{item.name}</li>)}</ul>
      <Card>Static</Card>
    </main>
  );
}
"#;
        let first = annotate(source);
        let second = annotate(&first.code);
        assert_eq!(second.code, first.code);
        assert!(!second.changed);
        assert_eq!(second.report.stamped, 0);
        assert_eq!(second.report.wrapped, 0);
    }

    #[test]
    fn test_line_numbers_preserved() {
        let source = "const Page = () => (\n  <div>\n    <p>{a}</p>\n    <Card {...b} />\n  </div>\n);\n";
        let out = annotate(source);
        assert_eq!(out.code.lines().count(), source.lines().count());
        let third = out.code.lines().nth(2).unwrap();
        assert!(third.contains(r#"x-line-number="3""#));
        let fourth = out.code.lines().nth(3).unwrap();
        assert!(fourth.contains(r#"x-id="Page_4""#));
    }

    #[test]
    fn test_iteration_item_source() {
        let out = annotate(
            "const ITEMS = [{ name: \"Cut\" }];\nconst Page = () => <ul>{ITEMS.map((item, i) => <li key={i}>{item.name}</li>)}</ul>;",
        );
        let li = out.code.split("<li").nth(1).unwrap();
        assert!(li.contains(r#"x-dynamic="true""#));
        assert!(li.contains(r#"x-source-type="static-local""#));
        assert!(li.contains(r#"x-source-var="ITEMS""#));
        assert!(li.contains(r#"x-source-file-abs="/app/src/components/Page.jsx""#));
        assert!(li.contains(r#"x-source-line="1""#));
        assert!(li.contains(r#"x-source-path="name""#));
        assert!(li.contains(r#"x-source-editable="true""#));
        assert!(li.contains(r#"x-array-var="ITEMS""#));
        assert!(li.contains(r#"x-array-item-param="item""#));
    }

    #[test]
    fn test_iteration_without_expression_child() {
        let out = annotate(
            "const ITEMS = [\"a\"];\nconst Page = () => <div>{ITEMS.map(item => <img alt=\"x\" />)}</div>;",
        );
        let img = out.code.split("<img").nth(1).unwrap();
        assert!(img.contains(r#"x-dynamic="true""#));
        assert!(img.contains(r#"x-source-type="static-local""#));
        assert!(img.contains(r#"x-array-item-param="item""#));
    }

    #[test]
    fn test_component_rules() {
        let out = annotate(
            r#"
function Badge({ n }) { return <b>{n}</b>; }
export const Page = () => (
  <Routes>
    <Route path="/" />
    <Layout>
      <Badge />
      <Badge>Static</Badge>
      <Icons.Star />
      <Suspense />
    </Layout>
  </Routes>
);
"#,
        );
        assert!(out.code.contains("<Routes>"));
        assert!(out.code.contains(r#"<Route path="/" />"#));
        assert!(out.code.contains("<Layout>"));
        assert!(out.code.contains(r#"<Badge x-file-name="Page" x-line-number="7" x-component="Badge" x-id="Page_7" x-dynamic="true""#));
        assert!(out.code.contains(r#"<Badge x-file-name="Page" x-line-number="8" x-component="Badge" x-id="Page_8" x-dynamic="false">Static</Badge>"#));
        assert!(out.code.contains("<Icons.Star />"));
        assert!(out.code.contains("<Suspense />"));
    }

    #[test]
    fn test_portal_exclusion() {
        let out = annotate(
            r#"
export const Page = () => (
  <Dialog>
    <DialogPortal>
      <DialogContent className="p-4">Sure?</DialogContent>
    </DialogPortal>
    <Card>
      <DialogTrigger asChild><Button>Open</Button></DialogTrigger>
    </Card>
  </Dialog>
);
"#,
        );
        // Direct children of an overlay root are left alone
        assert!(out.code.contains("<DialogPortal>"));
        assert!(out.code.contains(
            r#"<DialogContent className="p-4" x-file-name="Page" x-line-number="5" x-component="DialogContent" x-id="Page_5" x-dynamic="false" x-excluded="true">"#
        ));
        assert!(out.code.contains(r#"x-component="DialogTrigger" x-id="Page_8" x-dynamic="false" x-excluded="true""#));
        assert!(out.code.contains(r#"x-component="Button" x-id="Page_8" x-dynamic="false" x-excluded="true""#));
        // The dialog root itself is stamped but excluded
        assert!(out.code.contains(r#"x-component="Dialog" x-id="Page_3" x-dynamic="false" x-excluded="true""#));
        assert!(out.code.contains("<Card>"));
    }

    #[test]
    fn test_parse_failure_is_an_error() {
        let mut analyzer = Analyzer::new(AnalyzerConfig::new("/app"));
        let result = Annotator::new(&mut analyzer)
            .annotate_source(Path::new("/app/src/Broken.jsx"), "const x = <div>;");
        assert!(matches!(result, Err(AnnotateError::Analysis(_))));
    }
}
