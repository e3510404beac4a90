//! Git working copy inspection

use std::path::{Path, PathBuf};

use git2::{BranchType, Repository};

use crate::{Error, Result};

/// Information about a git remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteInfo {
    /// Name of the remote (e.g., "origin")
    pub name: String,
    /// URL of the remote
    pub url: String,
}

/// A git working copy opened at its top-level directory
pub struct GitRepo {
    /// The underlying git2 repository
    repo: Repository,
    /// Path to the repository root
    root: PathBuf,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl GitRepo {
    /// Open the working copy rooted exactly at `path`
    ///
    /// Unlike discovery this does not search parent directories: a
    /// subdirectory of some other checkout is rejected, as is a bare
    /// repository or a `.git` directory passed directly.
    pub fn open_root(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let repo = Repository::open(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                Error::NotARepo(path.to_path_buf())
            } else {
                Error::Other(format!("Git error: {}", e))
            }
        })?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| Error::NotARepo(path.to_path_buf()))?;

        let root = path.canonicalize()?;
        if workdir.canonicalize()? != root {
            return Err(Error::NotARepo(path.to_path_buf()));
        }

        Ok(Self { repo, root })
    }

    /// Check whether `path` is the top-level directory of a working copy
    ///
    /// Any error while probing counts as "not a repository".
    pub fn is_repository_root(path: impl AsRef<Path>) -> bool {
        Self::open_root(path).is_ok()
    }

    /// Get the repository root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up a remote by name, `None` when it is not configured
    pub fn find_remote(&self, name: &str) -> Result<Option<RemoteInfo>> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(Some(RemoteInfo {
                name: name.to_string(),
                url: remote.url().unwrap_or_default().to_string(),
            })),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(Error::Other(format!("Failed to read remote '{}': {}", name, e))),
        }
    }

    /// Whether a local branch with this name exists
    pub fn has_local_branch(&self, name: &str) -> bool {
        self.repo.find_branch(name, BranchType::Local).is_ok()
    }

    /// Whether any remote-tracking branch exists for `remote`
    ///
    /// False after fetching from an empty repository.
    pub fn has_remote_branches(&self, remote: &str) -> Result<bool> {
        let mut refs = self
            .repo
            .references_glob(&format!("refs/remotes/{}/*", remote))
            .map_err(|e| Error::Other(format!("Failed to list refs of '{}': {}", remote, e)))?;
        Ok(refs.next().is_some())
    }

    /// Get the current branch name
    pub fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(Error::Other(format!("Failed to get HEAD: {}", e))),
        };

        if head.is_branch() {
            Ok(head.shorthand().map(|s| s.to_string()))
        } else {
            // Detached HEAD
            Ok(None)
        }
    }

    /// Commit id HEAD points at, `None` on an unborn branch
    pub fn head_commit(&self) -> Result<Option<String>> {
        match self.repo.head() {
            Ok(head) => Ok(head.target().map(|oid| oid.to_string())),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(None),
            Err(e) => Err(Error::Other(format!("Failed to get HEAD: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::fixtures::{git, Upstream};

    #[test]
    fn test_open_non_git_dir() {
        let dir = tempfile::tempdir().unwrap();
        let result = GitRepo::open_root(dir.path());
        assert!(matches!(result, Err(Error::NotARepo(_))));
        assert!(!GitRepo::is_repository_root(dir.path()));
    }

    #[test]
    fn test_missing_path_is_not_a_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!GitRepo::is_repository_root(dir.path().join("missing")));
    }

    #[test]
    fn test_root_and_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let upstream = Upstream::new(dir.path(), "demo", "main");
        let checkout = dir.path().join("checkout");
        git(dir.path(), &["clone", &upstream.url(), "checkout"]);
        std::fs::create_dir(checkout.join("nested")).unwrap();

        assert!(GitRepo::is_repository_root(&checkout));
        assert!(!GitRepo::is_repository_root(checkout.join("nested")));
        assert!(!GitRepo::is_repository_root(checkout.join(".git")));
    }

    #[test]
    fn test_bare_repository_is_not_a_root() {
        let dir = tempfile::tempdir().unwrap();
        let upstream = Upstream::new(dir.path(), "demo", "main");
        assert!(!GitRepo::is_repository_root(upstream.bare_path()));
    }

    #[test]
    fn test_remotes_and_branches() {
        let dir = tempfile::tempdir().unwrap();
        let upstream = Upstream::new(dir.path(), "demo", "trunk");
        let checkout = dir.path().join("checkout");
        git(dir.path(), &["clone", &upstream.url(), "checkout"]);

        let repo = GitRepo::open_root(&checkout).unwrap();
        let origin = repo.find_remote("origin").unwrap().unwrap();
        assert_eq!(origin.url, upstream.url());
        assert!(repo.find_remote("upstream").unwrap().is_none());
        assert!(repo.has_remote_branches("origin").unwrap());
        assert!(!repo.has_remote_branches("upstream").unwrap());

        assert_eq!(repo.current_branch().unwrap().as_deref(), Some("trunk"));
        assert!(repo.has_local_branch("trunk"));
        assert!(!repo.has_local_branch("main"));
        assert_eq!(repo.head_commit().unwrap(), Some(upstream.tip()));
    }
}
