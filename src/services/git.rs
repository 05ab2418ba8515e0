//! Source-control collaborator.
//!
//! The release workflow and incremental validation only talk to git through
//! the `SourceControl` trait; `GitCli` shells out to the `git` binary and
//! waits for each command to finish.

use std::path::PathBuf;
use std::process::Command;

use crate::error::{AppError, Result};

pub trait SourceControl {
    /// Contents of `path` at `revision`, `None` if it doesn't exist there.
    fn show_file(&self, revision: &str, path: &str) -> Result<Option<String>>;

    /// Paths staged for the next commit.
    fn staged_files(&self) -> Result<Vec<String>>;

    fn add(&self, path: &str) -> Result<()>;

    fn commit(&self, message: &str) -> Result<()>;

    /// Create an annotated tag.
    fn tag(&self, name: &str, message: &str) -> Result<()>;

    /// Push `branch` and all tags to `remote`.
    fn push(&self, remote: &str, branch: &str) -> Result<()>;
}

/// `git` command-line backend.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    /// Run a git command and return its stdout on success.
    fn run_git(&self, args: &[&str]) -> Result<String> {
        let command = format!("git {}", args.join(" "));
        log::debug!("Running {command}");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| AppError::external(&command, format!("failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::external(
                command,
                format!(
                    "exited with status {}: {}",
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl SourceControl for GitCli {
    fn show_file(&self, revision: &str, path: &str) -> Result<Option<String>> {
        let object = format!("{revision}:{path}");
        match self.run_git(&["show", &object]) {
            Ok(content) => Ok(Some(content)),
            Err(e) => {
                log::debug!("{e}");
                Ok(None)
            }
        }
    }

    fn staged_files(&self) -> Result<Vec<String>> {
        let out = self.run_git(&["diff", "--cached", "--name-only"])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    fn add(&self, path: &str) -> Result<()> {
        self.run_git(&["add", path]).map(|_| ())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.run_git(&["commit", "-m", message]).map(|_| ())
    }

    fn tag(&self, name: &str, message: &str) -> Result<()> {
        self.run_git(&["tag", "-a", name, "-m", message]).map(|_| ())
    }

    fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.run_git(&["push", remote, branch, "--tags"]).map(|_| ())
    }
}
