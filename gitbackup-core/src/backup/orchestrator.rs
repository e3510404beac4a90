//! Sequential run over every listed repository

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use super::layout::BackupLayout;
use super::outcome::{RepositoryReport, RunSummary};
use super::sync::{SyncPlan, Synchronizer};
use super::RepositoryDescriptor;
use crate::git::Git;
use crate::Result;

/// A dry-run decision for one repository
#[derive(Debug, Clone, Serialize)]
pub struct PlannedSync {
    pub repository: RepositoryDescriptor,
    #[serde(flatten)]
    pub plan: SyncPlan,
}

/// Drives the synchronizer over a repository list
///
/// Repositories are processed one at a time; each git invocation finishes
/// before the next repository starts.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    synchronizer: Synchronizer,
}

impl Orchestrator {
    /// Create an orchestrator for an explicit layout and git runner
    pub fn new(layout: BackupLayout, git: Git) -> Self {
        Self {
            synchronizer: Synchronizer::new(layout, git),
        }
    }

    /// The layout repositories are mirrored under
    pub fn layout(&self) -> &BackupLayout {
        self.synchronizer.layout()
    }

    /// Create the backup root
    ///
    /// Failing here is fatal for the run, unlike any per-repository error.
    pub fn prepare(&self) -> Result<()> {
        self.layout().ensure_root()?;
        info!(root = %self.layout().root().display(), "Backup directory ready");
        Ok(())
    }

    /// Synchronize every repository in order
    ///
    /// `observer` sees each report as soon as it is produced. A failed
    /// repository never stops the loop.
    pub async fn run<F>(&self, repos: &[RepositoryDescriptor], mut observer: F) -> RunSummary
    where
        F: FnMut(usize, &RepositoryReport),
    {
        info!(count = repos.len(), "Processing repositories sequentially");
        for (target, names) in self.shared_targets(repos) {
            warn!(
                target = %target.display(),
                repos = ?names,
                "Several repositories share one local target; the last one wins"
            );
        }

        let mut summary = RunSummary::new();
        for (index, repo) in repos.iter().enumerate() {
            let outcome = self.synchronizer.sync(repo).await;
            let path = self.synchronizer.target_for(repo);
            let report = summary.record(repo, path, outcome);
            observer(index, report);
        }
        summary.finish();

        if summary.failed > 0 {
            warn!(
                attempted = summary.attempted,
                failed = summary.failed,
                likely_auth = summary.likely_auth_failures,
                "Run finished with failures"
            );
        } else {
            info!(attempted = summary.attempted, "Run finished");
        }

        summary
    }

    /// Local targets claimed by more than one listed repository
    ///
    /// Targets are keyed by bare name, so same-named repositories from
    /// different owners collide.
    pub fn shared_targets(&self, repos: &[RepositoryDescriptor]) -> Vec<(PathBuf, Vec<String>)> {
        let mut claims: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
        for repo in repos {
            if let Some(target) = self.synchronizer.target_for(repo) {
                claims.entry(target).or_default().push(repo.full_name.clone());
            }
        }

        claims.into_iter().filter(|(_, names)| names.len() > 1).collect()
    }

    /// Report what a run would do without creating or modifying anything
    pub fn plan(&self, repos: &[RepositoryDescriptor]) -> Vec<PlannedSync> {
        repos
            .iter()
            .map(|repo| PlannedSync {
                repository: repo.clone(),
                plan: self.synchronizer.plan(repo),
            })
            .collect()
    }
}
