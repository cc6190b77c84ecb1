//! Inspect command implementation.

use std::fs;

use serde::Serialize;
use vedit_analysis::{Analyzer, AnalyzerConfig, ArrayContext, Provenance};
use vedit_annotate::Annotator;

use crate::cli::{InspectArgs, ProjectArgs};
use crate::config;
use crate::error::{CliError, Result};

/// One element of the report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ElementReport<'a> {
    line: u32,
    component: &'a str,
    in_iteration: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<Provenance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    array_context: Option<ArrayContext>,
}

/// Execute the inspect command, printing a JSON array to stdout.
pub fn execute(args: InspectArgs, project: &ProjectArgs) -> Result<()> {
    let config = config::load(project)?;
    let path = config::absolute_path(&args.file)?;
    if !path.is_file() {
        return Err(CliError::FileNotFound(path));
    }
    let source = fs::read_to_string(&path)?;

    let mut analyzer = Analyzer::new(AnalyzerConfig::from_project(&config.project));
    analyzer.index_project();
    let model = analyzer.analyze_source(&path, &source)?;
    let mut annotator = Annotator::new(&mut analyzer);

    let reports: Vec<ElementReport<'_>> = model
        .elements
        .iter()
        .filter(|element| args.line.is_none_or(|line| element.line == line))
        .filter_map(|element| {
            let component = element.tag()?;
            let (source, array_context) = annotator.element_source(&model, element);
            Some(ElementReport {
                line: element.line,
                component,
                in_iteration: element.in_iteration,
                source,
                array_context,
            })
        })
        .collect();

    tracing::debug!(path = %path.display(), elements = reports.len(), "Inspected file");
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
