//! Commits each successful write so edits can be reviewed and reverted.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, bail};
use vedit_config::VcsConfig;

/// Runs `git add` and `git commit` for one file at a time.
///
/// Failures are logged and never abort an edit.
#[derive(Debug, Clone)]
pub struct GitRecorder {
    enabled: bool,
    user_name: String,
    user_email: String,
    root: PathBuf,
    program: String,
}

impl GitRecorder {
    pub fn from_config(config: &VcsConfig, root: &Path) -> Self {
        Self {
            enabled: config.enabled,
            user_name: config.user_name.clone(),
            user_email: config.user_email.clone(),
            root: root.to_path_buf(),
            program: "git".to_string(),
        }
    }

    /// Use another executable in place of `git`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Stage and commit `file` with message `<prefix>_<unix millis>`.
    ///
    /// Returns whether a commit was made.
    pub fn record(&self, file: &Path, prefix: &str) -> bool {
        if !self.enabled {
            return false;
        }
        let message = format!("{}_{}", prefix, chrono::Utc::now().timestamp_millis());
        match self.commit(file, &message) {
            Ok(()) => {
                tracing::debug!(file = %file.display(), %message, "Committed edit");
                true
            }
            Err(e) => {
                tracing::warn!(file = %file.display(), "Git commit failed: {:#}", e);
                false
            }
        }
    }

    fn commit(&self, file: &Path, message: &str) -> anyhow::Result<()> {
        let file = file.to_string_lossy();
        self.git(&["add", "--", &file]).context("git add")?;
        self.git(&["commit", "-m", message, "--", &file])
            .context("git commit")?;
        Ok(())
    }

    fn git(&self, args: &[&str]) -> anyhow::Result<()> {
        let output = Command::new(&self.program)
            .arg("-c")
            .arg(format!("user.name={}", self.user_name))
            .arg("-c")
            .arg(format!("user.email={}", self.user_email))
            .args(args)
            .current_dir(&self.root)
            .output()
            .with_context(|| format!("failed to run {}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{} exited with {}: {}", self.program, output.status, stderr.trim());
        }
        Ok(())
    }
}
