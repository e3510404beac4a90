//! Git operations for gitbackup
//!
//! Mutating operations shell out to the git binary; inspection of existing
//! working copies goes through git2.

mod command;
#[cfg(test)]
pub(crate) mod fixtures;
mod repo;
mod url;

pub use command::{looks_like_auth_failure, Git, GitError};
pub use repo::{GitRepo, RemoteInfo};
pub use url::{normalize_clone_url, same_clone_url};
