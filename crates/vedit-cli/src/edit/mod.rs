//! The mutation service behind `/edit-file`.
//!
//! A batch is a list of loosely typed changes. Each change is parsed on its
//! own; unusable changes are rejected individually and the rest still apply.
//! Variable edits go first, each one a read-modify-write of its declaring
//! file. Element edits are grouped by target file and applied through one
//! patch per file. Every write is guarded by a `.backup` copy and recorded in
//! git when enabled.

pub mod locate;
pub mod request;
pub mod structural;
pub mod variable;
pub mod vcs;

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;
use vedit_analysis::{AnalyzerConfig, MAX_FILE_SIZE, lower_source};
use vedit_config::{ProjectConfig, VeditConfig};

pub use request::{EditBatch, EditRecord, EditRequest, EditResponse, RejectedRecord};
pub use structural::{AppliedEdit, StructuralEditor};
pub use vcs::GitRecorder;

use request::VariableEdit;

const STRUCTURAL_COMMIT_PREFIX: &str = "visual_edit";
const VARIABLE_COMMIT_PREFIX: &str = "visual_edit_variable";

/// Applies edit batches to files below the project root.
pub struct EditService {
    root: PathBuf,
    analyzer: AnalyzerConfig,
    project: ProjectConfig,
    git: GitRecorder,
    /// Batches touch shared files; one at a time.
    lock: Mutex<()>,
}

impl EditService {
    pub fn new(config: &VeditConfig) -> Self {
        let analyzer = AnalyzerConfig::from_project(&config.project);
        let root = analyzer.root.clone();
        Self {
            git: GitRecorder::from_config(&config.vcs, &root),
            root,
            analyzer,
            project: config.project.clone(),
            lock: Mutex::new(()),
        }
    }

    /// Replace the git recorder.
    pub fn with_git(mut self, git: GitRecorder) -> Self {
        self.git = git;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Apply one batch of raw changes.
    pub fn apply(&self, changes: Vec<Value>) -> EditResponse {
        let _guard = self.lock.lock();
        let mut response = EditResponse::default();
        let mut by_file: IndexMap<String, Vec<(Value, EditRequest)>> = IndexMap::new();

        for raw in changes {
            match EditRequest::from_value(&raw) {
                Err(reason) => {
                    tracing::warn!(%reason, "Rejected change");
                    response.rejected_changes.push(RejectedRecord::new(raw, reason));
                }
                Ok(EditRequest::Variable(edit)) => match self.apply_variable(&edit) {
                    Ok(record) => response.edits.push(record),
                    Err(reason) => {
                        tracing::warn!(%reason, "Rejected variable edit");
                        response.rejected_changes.push(RejectedRecord::new(raw, reason));
                    }
                },
                Ok(request) => {
                    let file_name = request
                        .target()
                        .map(|t| t.file_name.to_string())
                        .unwrap_or_default();
                    by_file.entry(file_name).or_default().push((raw, request));
                }
            }
        }

        for (file_name, group) in by_file {
            self.apply_file(&file_name, group, &mut response);
        }

        tracing::info!(
            applied = response.edits.len(),
            rejected = response.rejected_changes.len(),
            "Processed edit batch"
        );
        response
    }

    fn apply_variable(&self, edit: &VariableEdit) -> Result<EditRecord, String> {
        let (name, new_value) = variable::validate(edit)?;
        let path = locate::resolve_variable_source(
            &self.analyzer,
            edit.source_file.as_deref(),
            edit.source_file_abs.as_deref(),
        )?;
        let path = locate::check_path_allowed(&self.root, &path)?;
        let rel_path = locate::display_path(&self.root, &path);
        if !path.is_file() {
            return Err(format!("File not found: {}", rel_path));
        }

        let source = read_source(&path)?;
        let model = lower_source(&path, &source).map_err(|e| format!("Parse error: {}", e))?;
        let change = variable::apply_variable_edit(&model, &source, name, edit, new_value)?;
        self.persist(&path, &change.code, VARIABLE_COMMIT_PREFIX)?;

        tracing::info!(file = %rel_path, variable = name, "Applied variable edit");
        Ok(EditRecord {
            file: rel_path,
            kind: "variableEdit",
            line_number: None,
            element: None,
            variable_name: Some(name.to_string()),
            array_index: edit.array_index,
            property_path: edit.property_path.clone(),
            old_data: change.old_value,
            new_data: new_value.clone(),
        })
    }

    fn apply_file(&self, file_name: &str, group: Vec<(Value, EditRequest)>, response: &mut EditResponse) {
        let located = locate::find_source_file(&self.root, file_name, &self.project.ignore_dirs)
            .unwrap_or_else(|| {
                locate::default_component_path(&self.root, &self.project.components_dir, file_name)
            });
        let rel_path = locate::display_path(&self.root, &located);

        let (path, source) = match self.load_target(file_name, &located) {
            Ok(loaded) => loaded,
            Err(reason) => {
                tracing::warn!(file = %rel_path, %reason, "Rejected edits for file");
                reject_group(group, &rel_path, &reason, response);
                return;
            }
        };
        let model = match lower_source(&path, &source) {
            Ok(model) => model,
            Err(e) => {
                let reason = format!("Parse error: {}", e);
                tracing::warn!(file = %rel_path, %reason, "Rejected edits for file");
                reject_group(group, &rel_path, &reason, response);
                return;
            }
        };

        let mut editor = StructuralEditor::new(&model, &source);
        let mut applied = Vec::new();
        for (raw, request) in group {
            match editor.apply(&request) {
                Ok(edit) => applied.push((raw, request, edit)),
                Err(reason) => {
                    tracing::warn!(file = %rel_path, %reason, "Rejected change");
                    response
                        .rejected_changes
                        .push(rejected(raw, &request, &rel_path, reason));
                }
            }
        }

        if editor.has_changes() {
            let code = editor.finish();
            if let Err(reason) = self.persist(&path, &code, STRUCTURAL_COMMIT_PREFIX) {
                tracing::warn!(file = %rel_path, %reason, "Write failed");
                for (raw, request, _) in applied {
                    response
                        .rejected_changes
                        .push(rejected(raw, &request, &rel_path, reason.clone()));
                }
                return;
            }
            tracing::info!(file = %rel_path, edits = applied.len(), "Applied element edits");
        }

        response
            .edits
            .extend(applied.into_iter().map(|(_, _, edit)| EditRecord {
                file: rel_path.clone(),
                kind: edit.kind,
                line_number: Some(edit.line),
                element: Some(edit.element),
                variable_name: None,
                array_index: None,
                property_path: None,
                old_data: Value::String(edit.old_data),
                new_data: Value::String(edit.new_data),
            }));
    }

    fn load_target(&self, file_name: &str, located: &Path) -> Result<(PathBuf, String), String> {
        let path = locate::check_path_allowed(&self.root, located)
            .map_err(|_| format!("Forbidden path for file {}", file_name))?;
        if !path.is_file() {
            return Err(format!(
                "File not found: {}",
                locate::display_path(&self.root, &path)
            ));
        }
        let source = read_source(&path)?;
        Ok((path, source))
    }

    /// Write `code` to `path` behind a `.backup` copy, then commit.
    fn persist(&self, path: &Path, code: &str, prefix: &str) -> Result<(), String> {
        let backup = backup_path(path);
        fs::copy(path, &backup)
            .map_err(|e| format!("Failed to back up {}: {}", path.display(), e))?;

        if let Err(e) = fs::write(path, code) {
            if let Err(restore) = fs::copy(&backup, path) {
                tracing::error!(file = %path.display(), "Failed to restore backup: {}", restore);
            }
            let _ = fs::remove_file(&backup);
            return Err(format!("Failed to write {}: {}", path.display(), e));
        }

        self.git.record(path, prefix);

        if let Err(e) = fs::remove_file(&backup) {
            tracing::warn!(file = %backup.display(), "Failed to remove backup: {}", e);
        }
        Ok(())
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".backup");
    PathBuf::from(name)
}

fn read_source(path: &Path) -> Result<String, String> {
    let metadata = fs::metadata(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    if metadata.len() > MAX_FILE_SIZE as u64 {
        return Err(format!(
            "File too large: {} ({} bytes)",
            path.display(),
            metadata.len()
        ));
    }
    fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

fn rejected(raw: Value, request: &EditRequest, file: &str, reason: String) -> RejectedRecord {
    let target = request.target();
    RejectedRecord {
        change: raw,
        reason,
        file: Some(file.to_string()),
        line_number: target.map(|t| t.line_number),
        element: target.map(|t| t.component.to_string()),
    }
}

fn reject_group(group: Vec<(Value, EditRequest)>, file: &str, reason: &str, response: &mut EditResponse) {
    for (raw, request) in group {
        response
            .rejected_changes
            .push(rejected(raw, &request, file, reason.to_string()));
    }
}
