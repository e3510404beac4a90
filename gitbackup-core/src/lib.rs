//! gitbackup core - mirroring GitHub repositories to local disk
//!
//! This crate holds everything that does not talk to the GitHub API:
//! configuration, secrets, git plumbing and the clone-or-reconcile logic.

pub mod backup;
pub mod config;
pub mod error;
pub mod git;
pub mod secrets;

pub use backup::{
    BackupLayout, Orchestrator, RepositoryDescriptor, RepositorySelection, RunSummary,
    SyncOutcome, Synchronizer,
};
pub use config::{Config, GitSettings};
pub use error::{Error, Result};
pub use git::{Git, GitError, GitRepo};
pub use secrets::Secrets;
