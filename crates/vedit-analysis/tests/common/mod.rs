//! Shared test utilities for analysis tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use tempfile::TempDir;
use vedit_analysis::{Analyzer, AnalyzerConfig, ModuleModel};

/// Create a test project with the given files.
///
/// Returns the cleaned project root.
pub fn create_test_project(temp: &TempDir, files: &[(&str, &str)]) -> PathBuf {
    let root = temp.path().to_path_buf().clean();

    for (path, content) in files {
        let file_path = root.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|_| panic!("Failed to create parent directory for {}", path));
        }
        fs::write(&file_path, content).unwrap_or_else(|_| panic!("Failed to write file {}", path));
    }

    root
}

pub fn analyzer_for(root: &Path) -> Analyzer {
    Analyzer::new(AnalyzerConfig::new(root))
}

/// Index of the first element with `tag`.
pub fn element(model: &ModuleModel, tag: &str) -> usize {
    model
        .elements
        .iter()
        .position(|e| e.tag() == Some(tag))
        .unwrap_or_else(|| panic!("no <{tag}> in {}", model.path.display()))
}
