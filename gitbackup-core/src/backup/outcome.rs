//! Per-repository outcomes and the run summary

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::RepositoryDescriptor;
use crate::Error;

/// Result of synchronizing one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Freshly cloned into an empty or missing target
    Cloned,
    /// Existing checkout force-synced to the remote default branch
    Updated,
    /// Target exists but is not a git working copy; left untouched
    SkippedNotARepo,
    /// Target would escape the backup root; nothing was done
    SkippedUnsafePath,
    /// Clone or force-sync failed
    Failed {
        reason: String,
        /// The error text looks like a credential or permission problem
        auth_hint: bool,
    },
}

impl SyncOutcome {
    /// Map a per-repository error onto its outcome
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::UnsafePath { .. } => SyncOutcome::SkippedUnsafePath,
            Error::NotARepo(_) => SyncOutcome::SkippedNotARepo,
            other => SyncOutcome::Failed {
                reason: other.to_string(),
                auth_hint: other.is_auth_failure(),
            },
        }
    }

    /// Whether this outcome is a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, SyncOutcome::Failed { .. })
    }

    /// Short human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            SyncOutcome::Cloned => "cloned",
            SyncOutcome::Updated => "updated",
            SyncOutcome::SkippedNotARepo => "skipped (not a git repository)",
            SyncOutcome::SkippedUnsafePath => "skipped (unsafe path)",
            SyncOutcome::Failed { .. } => "failed",
        }
    }
}

/// Outcome of one repository within a run
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryReport {
    /// Repository name
    pub name: String,
    /// Owner-qualified name
    pub full_name: String,
    /// Local target, absent when it could not be derived safely
    pub path: Option<PathBuf>,
    /// What happened
    #[serde(flatten)]
    pub outcome: SyncOutcome,
}

/// Tally of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub attempted: usize,
    pub cloned: usize,
    pub updated: usize,
    pub skipped_not_a_repo: usize,
    pub skipped_unsafe_path: usize,
    pub failed: usize,
    /// Failures whose error text points at credentials or permissions
    pub likely_auth_failures: usize,
    pub repositories: Vec<RepositoryReport>,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl RunSummary {
    /// Start an empty summary stamped with the current time
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            attempted: 0,
            cloned: 0,
            updated: 0,
            skipped_not_a_repo: 0,
            skipped_unsafe_path: 0,
            failed: 0,
            likely_auth_failures: 0,
            repositories: Vec::new(),
        }
    }

    /// Record the outcome for one repository and return its report
    pub fn record(
        &mut self,
        repo: &RepositoryDescriptor,
        path: Option<PathBuf>,
        outcome: SyncOutcome,
    ) -> &RepositoryReport {
        self.attempted += 1;
        match &outcome {
            SyncOutcome::Cloned => self.cloned += 1,
            SyncOutcome::Updated => self.updated += 1,
            SyncOutcome::SkippedNotARepo => self.skipped_not_a_repo += 1,
            SyncOutcome::SkippedUnsafePath => self.skipped_unsafe_path += 1,
            SyncOutcome::Failed { auth_hint, .. } => {
                self.failed += 1;
                if *auth_hint {
                    self.likely_auth_failures += 1;
                }
            }
        }

        self.repositories.push(RepositoryReport {
            name: repo.name.clone(),
            full_name: repo.full_name.clone(),
            path,
            outcome,
        });
        &self.repositories[self.repositories.len() - 1]
    }

    /// Stamp the finish time
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Reports for repositories that failed
    pub fn failures(&self) -> impl Iterator<Item = &RepositoryReport> {
        self.repositories.iter().filter(|r| r.outcome.is_failure())
    }

    /// Number of repositories skipped for any reason
    pub fn skipped(&self) -> usize {
        self.skipped_not_a_repo + self.skipped_unsafe_path
    }
}
