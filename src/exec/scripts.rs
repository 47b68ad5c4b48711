use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::exec::runner::{ProcessOutput, SharedRunner};

/// The commit and revert scripts plus the interpreter that runs them.
///
/// Script paths are handed to the interpreter as configured, so relative
/// paths resolve against the working directory of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSet {
    pub interpreter: String,
    pub commit: PathBuf,
    pub revert: PathBuf,
}

impl ScriptSet {
    pub fn new(interpreter: impl Into<String>, script_dir: &Path, commit: &str, revert: &str) -> Self {
        Self {
            interpreter: interpreter.into(),
            commit: script_dir.join(commit),
            revert: script_dir.join(revert),
        }
    }

    pub fn commit_args(&self) -> Vec<String> {
        vec![self.commit.to_string_lossy().to_string()]
    }

    pub fn revert_args(&self, hash: &str) -> Vec<String> {
        vec![self.revert.to_string_lossy().to_string(), hash.to_string()]
    }
}

impl Default for ScriptSet {
    fn default() -> Self {
        Self::new("bash", Path::new("./jupyter_fs/script"), "commit.sh", "revert.sh")
    }
}

/// Runs the scripts against a fixed working directory.
pub struct ScriptExecutor {
    pub scripts: ScriptSet,
    pub work_dir: PathBuf,
    runner: SharedRunner,
}

impl ScriptExecutor {
    pub fn new(scripts: ScriptSet, work_dir: PathBuf, runner: SharedRunner) -> Self {
        Self {
            scripts,
            work_dir,
            runner,
        }
    }

    pub fn work_dir_display(&self) -> String {
        self.work_dir.to_string_lossy().to_string()
    }

    pub async fn commit(&self) -> Result<ProcessOutput> {
        self.run(self.scripts.commit_args()).await
    }

    pub async fn revert(&self, hash: &str) -> Result<ProcessOutput> {
        self.run(self.scripts.revert_args(hash)).await
    }

    async fn run(&self, args: Vec<String>) -> Result<ProcessOutput> {
        let program = self.scripts.interpreter.clone();
        let cwd = self.work_dir.clone();
        let runner = self.runner.clone();

        tracing::info!(program = %program, args = ?args, cwd = %cwd.display(), "running script");

        let output = tokio::task::spawn_blocking(move || runner.run(&program, &args, &cwd))
            .await
            .map_err(|e| AppError::Internal(format!("Script task failed: {}", e)))??;

        tracing::debug!(
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "script finished"
        );
        if !output.success() {
            tracing::warn!(exit_code = ?output.exit_code, stderr = %output.stderr.trim_end(), "script exited unsuccessfully");
        }

        Ok(output)
    }
}

pub type SharedExecutor = Arc<ScriptExecutor>;
