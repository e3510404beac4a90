//! Scoped git subprocess invocations
//!
//! Every command runs with an explicit working directory, never the ambient
//! one. Output is forced to the C locale so the fallback text matching in
//! [`GitError`] sees stable English messages.

use std::path::Path;
use std::process::Output;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::config::GitSettings;

/// Substrings (lowercase) that indicate a credential or permission problem
const AUTH_FAILURE_PATTERNS: &[&str] = &["could not read", "authentication failed", "access rights"];

/// Message git prints when cloning into a populated directory
const DESTINATION_EXISTS_PATTERN: &str = "already exists and is not an empty directory";

/// A failed git invocation
#[derive(Error, Debug)]
pub enum GitError {
    /// The git binary could not be started
    #[error("Failed to run git {operation}: {source}")]
    Spawn {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// git ran and exited unsuccessfully
    #[error("git {operation} failed ({}): {}", describe_code(.code), .stderr.trim())]
    Failed {
        operation: &'static str,
        code: Option<i32>,
        stderr: String,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl GitError {
    /// The git subcommand that failed
    pub fn operation(&self) -> &'static str {
        match self {
            GitError::Spawn { operation, .. } | GitError::Failed { operation, .. } => operation,
        }
    }

    /// Captured stderr, empty when git never started
    pub fn stderr(&self) -> &str {
        match self {
            GitError::Spawn { .. } => "",
            GitError::Failed { stderr, .. } => stderr,
        }
    }

    /// Whether a clone failed because the destination is already populated
    pub fn is_destination_collision(&self) -> bool {
        self.operation() == "clone"
            && self
                .stderr()
                .to_lowercase()
                .contains(DESTINATION_EXISTS_PATTERN)
    }

    /// Whether the failure looks like a credential or permission problem
    pub fn is_auth_failure(&self) -> bool {
        match self {
            GitError::Spawn { .. } => false,
            GitError::Failed { .. } => looks_like_auth_failure(&self.to_string()),
        }
    }
}

/// Case-insensitive match of `text` against known authentication failure messages
pub fn looks_like_auth_failure(text: &str) -> bool {
    let text = text.to_lowercase();
    AUTH_FAILURE_PATTERNS
        .iter()
        .any(|pattern| text.contains(pattern))
}

/// Runner for git subprocesses
#[derive(Debug, Clone)]
pub struct Git {
    binary: String,
    terminal_prompt: bool,
}

impl Default for Git {
    fn default() -> Self {
        Self::new(&GitSettings::default())
    }
}

impl Git {
    /// Create a runner from git settings
    pub fn new(settings: &GitSettings) -> Self {
        Self {
            binary: settings.binary.clone(),
            terminal_prompt: settings.terminal_prompt,
        }
    }

    fn command(&self, workdir: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.current_dir(workdir)
            .env("LC_ALL", "C")
            .kill_on_drop(true);
        if !self.terminal_prompt {
            cmd.env("GIT_TERMINAL_PROMPT", "0");
        }
        cmd
    }

    async fn output(&self, operation: &'static str, mut cmd: Command) -> Result<Output, GitError> {
        debug!(operation, command = ?cmd.as_std(), "Running git");

        let output = cmd
            .output()
            .await
            .map_err(|source| GitError::Spawn { operation, source })?;

        if !output.status.success() {
            return Err(GitError::Failed {
                operation,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(output)
    }

    /// Clone `url` into `target`, running from `workdir`
    pub async fn clone_repo(&self, url: &str, target: &Path, workdir: &Path) -> Result<(), GitError> {
        let mut cmd = self.command(workdir);
        cmd.arg("clone").arg("--").arg(url).arg(target);
        self.output("clone", cmd).await.map(|_| ())
    }

    /// Add a new remote
    pub async fn add_remote(&self, repo: &Path, name: &str, url: &str) -> Result<(), GitError> {
        let mut cmd = self.command(repo);
        cmd.arg("remote").arg("add").arg(name).arg(url);
        self.output("remote add", cmd).await.map(|_| ())
    }

    /// Point an existing remote at a new URL
    pub async fn set_remote_url(&self, repo: &Path, name: &str, url: &str) -> Result<(), GitError> {
        let mut cmd = self.command(repo);
        cmd.arg("remote").arg("set-url").arg(name).arg(url);
        self.output("remote set-url", cmd).await.map(|_| ())
    }

    /// Fetch every ref from `remote`, pruning deleted remote-tracking branches
    pub async fn fetch_prune(&self, repo: &Path, remote: &str) -> Result<(), GitError> {
        let mut cmd = self.command(repo);
        cmd.arg("fetch").arg("--prune").arg(remote);
        self.output("fetch", cmd).await.map(|_| ())
    }

    /// Switch to `branch`, discarding conflicting working-tree edits
    ///
    /// When `start_point` is given the branch is created from it and set to
    /// track it.
    pub async fn checkout(
        &self,
        repo: &Path,
        branch: &str,
        start_point: Option<&str>,
    ) -> Result<(), GitError> {
        let mut cmd = self.command(repo);
        cmd.arg("checkout").arg("--force");
        match start_point {
            Some(start) => {
                cmd.arg("-b").arg(branch).arg("--track").arg(start);
            }
            None => {
                cmd.arg(branch);
            }
        }
        cmd.arg("--");
        self.output("checkout", cmd).await.map(|_| ())
    }

    /// Hard-reset the current branch to `revision`
    pub async fn reset_hard(&self, repo: &Path, revision: &str) -> Result<(), GitError> {
        let mut cmd = self.command(repo);
        cmd.arg("reset").arg("--hard").arg(revision).arg("--");
        self.output("reset", cmd).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(operation: &'static str, stderr: &str) -> GitError {
        GitError::Failed {
            operation,
            code: Some(128),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_auth_patterns_case_insensitive() {
        assert!(looks_like_auth_failure(
            "fatal: Could not read Username for 'https://github.com': terminal prompts disabled"
        ));
        assert!(looks_like_auth_failure("remote: Authentication Failed for ..."));
        assert!(looks_like_auth_failure(
            "Please make sure you have the correct ACCESS RIGHTS"
        ));
        assert!(!looks_like_auth_failure("fatal: repository not found"));
    }

    #[test]
    fn test_git_error_auth_classification() {
        assert!(failed("fetch", "fatal: Authentication failed for 'x'").is_auth_failure());
        assert!(!failed("fetch", "fatal: couldn't find remote ref main").is_auth_failure());

        let spawn = GitError::Spawn {
            operation: "clone",
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no git"),
        };
        assert!(!spawn.is_auth_failure());
    }

    #[test]
    fn test_destination_collision() {
        let err = failed(
            "clone",
            "fatal: destination path 'demo' already exists and is not an empty directory.",
        );
        assert!(err.is_destination_collision());

        // Same text from another subcommand is not a clone collision
        let err = failed(
            "fetch",
            "fatal: destination path 'demo' already exists and is not an empty directory.",
        );
        assert!(!err.is_destination_collision());
    }

    #[test]
    fn test_error_display() {
        let err = failed("reset", "fatal: ambiguous argument 'origin/main'\n");
        assert_eq!(
            err.to_string(),
            "git reset failed (exit code 128): fatal: ambiguous argument 'origin/main'"
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let git = Git::new(&GitSettings {
            binary: "/nonexistent/git-binary".to_string(),
            ..GitSettings::default()
        });
        let dir = tempfile::tempdir().unwrap();

        let err = git.fetch_prune(dir.path(), "origin").await.unwrap_err();
        assert!(matches!(err, GitError::Spawn { operation: "fetch", .. }));
    }
}
