//! Annotate command implementation.

use std::io::Write as _;

use vedit_analysis::{Analyzer, AnalyzerConfig};
use vedit_annotate::{AnnotationReport, Annotator};

use crate::cli::{AnnotateArgs, ProjectArgs};
use crate::error::{CliError, Result};
use crate::{config, ui};

/// Execute the annotate command.
///
/// Without `--write`, a single file is printed to stdout and directories
/// are only counted.
pub fn execute(args: AnnotateArgs, project: &ProjectArgs) -> Result<()> {
    let config = config::load(project)?;
    let mut analyzer = Analyzer::new(AnalyzerConfig::from_project(&config.project));
    if args.eager_index {
        let modules = analyzer.index_project();
        tracing::info!(modules, "Indexed component usages");
    }
    let mut annotator = Annotator::new(&mut analyzer);

    let mut total = AnnotationReport::default();
    for path in &args.paths {
        let path = config::absolute_path(path)?;
        if path.is_dir() {
            total += annotator.annotate_tree(&path, args.write)?;
        } else if path.is_file() {
            let annotated = annotator.annotate_file(&path, args.write)?;
            if !args.write {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(annotated.code.as_bytes())?;
                stdout.flush()?;
            }
            total += annotated.report;
        } else {
            return Err(CliError::FileNotFound(path));
        }
    }

    let summary = format!(
        "Annotated {} file(s): {} stamped, {} excluded, {} wrapped, {} skipped",
        total.files, total.stamped, total.excluded, total.wrapped, total.skipped
    );
    if total.failed > 0 {
        ui::warning(&format!("{} ({} failed)", summary, total.failed));
    } else {
        ui::success(&summary);
    }
    Ok(())
}
