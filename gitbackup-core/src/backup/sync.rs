//! Clone-or-reconcile for a single repository
//!
//! The synchronizer walks a fixed sequence for every repository:
//!
//! 1. Derive the local target and reject anything outside the backup root.
//! 2. Clone into the target when it is missing or empty.
//! 3. When the target is already populated, leave it alone unless it is the
//!    root of a git working copy.
//! 4. For a working copy: repoint `origin` if needed, fetch with pruning,
//!    check out the default branch and hard-reset it to the remote tip.
//!
//! Errors never escape [`Synchronizer::sync`]; they become a
//! [`SyncOutcome`].

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::layout::BackupLayout;
use super::outcome::SyncOutcome;
use super::probe;
use super::RepositoryDescriptor;
use crate::git::{same_clone_url, Git, GitRepo};
use crate::{Error, Result};

/// Remote every mirrored checkout tracks
pub const ORIGIN: &str = "origin";

/// What a sync would do, without doing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "plan", rename_all = "snake_case")]
pub enum SyncPlan {
    /// Target is missing or empty
    Clone,
    /// Target is an existing working copy
    Update,
    /// Target exists and is not a working copy
    SkipNotARepo,
    /// Target would escape the backup root
    SkipUnsafePath,
    /// The target could not be inspected
    ProbeFailed { reason: String },
}

impl SyncPlan {
    /// Short human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            SyncPlan::Clone => "would clone",
            SyncPlan::Update => "would force-sync",
            SyncPlan::SkipNotARepo => "would skip (not a git repository)",
            SyncPlan::SkipUnsafePath => "would skip (unsafe path)",
            SyncPlan::ProbeFailed { .. } => "cannot inspect target",
        }
    }
}

/// Brings one local directory in line with one remote repository
#[derive(Debug, Clone)]
pub struct Synchronizer {
    layout: BackupLayout,
    git: Git,
}

impl Synchronizer {
    /// Create a synchronizer writing under `layout`
    pub fn new(layout: BackupLayout, git: Git) -> Self {
        Self { layout, git }
    }

    /// The layout targets are derived from
    pub fn layout(&self) -> &BackupLayout {
        &self.layout
    }

    /// Mirror `repo` into its local target
    pub async fn sync(&self, repo: &RepositoryDescriptor) -> SyncOutcome {
        let result = match self.layout.target_for(&repo.name) {
            Ok(target) => self.clone_or_reconcile(repo, &target).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => {
                info!(repo = %repo.full_name, outcome = outcome.label(), "Repository synchronized");
                outcome
            }
            Err(e) => {
                let outcome = SyncOutcome::from_error(&e);
                match outcome {
                    SyncOutcome::Failed { auth_hint, .. } => {
                        error!(repo = %repo.full_name, error = %e, auth_hint, "Repository sync failed");
                    }
                    _ => warn!(repo = %repo.full_name, reason = %e, "Repository skipped"),
                }
                outcome
            }
        }
    }

    /// Decide what [`Synchronizer::sync`] would do, touching nothing
    pub fn plan(&self, repo: &RepositoryDescriptor) -> SyncPlan {
        let target = match self.layout.target_for(&repo.name) {
            Ok(target) => target,
            Err(_) => return SyncPlan::SkipUnsafePath,
        };
        if self.layout.verify_on_disk(&repo.name, &target).is_err() {
            return SyncPlan::SkipUnsafePath;
        }

        match probe::is_occupied(&target) {
            Ok(false) => SyncPlan::Clone,
            Ok(true) if probe::is_version_control_root(&target) => SyncPlan::Update,
            Ok(true) => SyncPlan::SkipNotARepo,
            Err(e) => SyncPlan::ProbeFailed {
                reason: e.to_string(),
            },
        }
    }

    /// Local target for `repo`, if it can be derived safely
    pub fn target_for(&self, repo: &RepositoryDescriptor) -> Option<PathBuf> {
        self.layout.target_for(&repo.name).ok()
    }

    async fn clone_or_reconcile(&self, repo: &RepositoryDescriptor, target: &Path) -> Result<SyncOutcome> {
        self.layout.ensure_root()?;
        self.layout.verify_on_disk(&repo.name, target)?;

        if probe::is_occupied(target)? {
            debug!(repo = %repo.full_name, target = %target.display(), "Target already populated");
            return self.reconcile(repo, target).await;
        }

        info!(repo = %repo.full_name, target = %target.display(), "Cloning");
        match self
            .git
            .clone_repo(&repo.clone_url, target, self.layout.root())
            .await
        {
            Ok(()) => {
                self.check_out_default_branch(repo, target).await?;
                Ok(SyncOutcome::Cloned)
            }
            Err(e) if e.is_destination_collision() => {
                debug!(repo = %repo.full_name, "Clone collided with existing directory");
                self.reconcile(repo, target).await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Move a fresh clone onto the listed default branch when the remote
    /// HEAD names a different one
    async fn check_out_default_branch(&self, repo: &RepositoryDescriptor, target: &Path) -> Result<()> {
        let start_point = {
            let local = GitRepo::open_root(target)?;
            if !local.has_remote_branches(ORIGIN)? {
                info!(repo = %repo.full_name, "Cloned an empty repository");
                return Ok(());
            }
            if local.current_branch()?.as_deref() == Some(repo.default_branch.as_str()) {
                return Ok(());
            }
            if local.has_local_branch(&repo.default_branch) {
                None
            } else {
                Some(repo.tracking_ref(ORIGIN))
            }
        };

        debug!(repo = %repo.full_name, branch = %repo.default_branch, "Switching fresh clone to default branch");
        self.git
            .checkout(target, &repo.default_branch, start_point.as_deref())
            .await?;
        Ok(())
    }

    async fn reconcile(&self, repo: &RepositoryDescriptor, target: &Path) -> Result<SyncOutcome> {
        if !probe::is_version_control_root(target) {
            return Err(Error::NotARepo(target.to_path_buf()));
        }

        self.force_sync(repo, target).await?;
        Ok(SyncOutcome::Updated)
    }

    /// Make the default branch of the checkout at `target` an exact copy of
    /// the remote's
    ///
    /// Local commits, staged changes and tracked edits on that branch are
    /// discarded. Untracked files are left in place.
    pub async fn force_sync(&self, repo: &RepositoryDescriptor, target: &Path) -> Result<()> {
        info!(repo = %repo.full_name, branch = %repo.default_branch, "Force-syncing existing checkout");

        // The remote must point at the right place before anything is fetched
        let origin = GitRepo::open_root(target)?.find_remote(ORIGIN)?;
        match origin {
            None => {
                info!(repo = %repo.full_name, url = %repo.clone_url, "Adding missing origin remote");
                self.git.add_remote(target, ORIGIN, &repo.clone_url).await?;
            }
            Some(remote) if !same_clone_url(&remote.url, &repo.clone_url) => {
                info!(
                    repo = %repo.full_name,
                    from = %remote.url,
                    to = %repo.clone_url,
                    "Repointing origin remote"
                );
                self.git.set_remote_url(target, ORIGIN, &repo.clone_url).await?;
            }
            Some(_) => debug!(repo = %repo.full_name, "Origin remote already matches"),
        }

        self.git.fetch_prune(target, ORIGIN).await?;

        if !GitRepo::open_root(target)?.has_remote_branches(ORIGIN)? {
            info!(repo = %repo.full_name, "Remote repository is empty, nothing to check out");
            return Ok(());
        }

        let tracking = repo.tracking_ref(ORIGIN);
        let has_branch = GitRepo::open_root(target)?.has_local_branch(&repo.default_branch);
        let start_point = if has_branch { None } else { Some(tracking.as_str()) };
        self.git
            .checkout(target, &repo.default_branch, start_point)
            .await?;

        self.git.reset_hard(target, &tracking).await?;

        Ok(())
    }
}
