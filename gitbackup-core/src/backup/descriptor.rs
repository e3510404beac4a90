//! Remote repository descriptors and selection

use serde::{Deserialize, Serialize};

/// A remote repository to mirror
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    /// Repository name, used as the local directory name
    pub name: String,
    /// Owner-qualified name (e.g. "owner/repo")
    pub full_name: String,
    /// URL to clone and fetch from
    pub clone_url: String,
    /// Branch the remote designates as primary
    pub default_branch: String,
    /// Whether the repository is private
    #[serde(default)]
    pub private: bool,
    /// Whether the repository is a fork
    #[serde(default)]
    pub fork: bool,
    /// Whether the repository is archived
    #[serde(default)]
    pub archived: bool,
}

impl RepositoryDescriptor {
    /// Create a descriptor with no owner qualification and all flags unset
    pub fn new(
        name: impl Into<String>,
        clone_url: impl Into<String>,
        default_branch: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            full_name: name.clone(),
            name,
            clone_url: clone_url.into(),
            default_branch: default_branch.into(),
            private: false,
            fork: false,
            archived: false,
        }
    }

    /// Remote-tracking ref of the default branch on `remote`
    pub fn tracking_ref(&self, remote: &str) -> String {
        format!("{}/{}", remote, self.default_branch)
    }
}

/// Which listed repositories to mirror
#[derive(Debug, Clone, Default)]
pub struct RepositorySelection {
    /// Leave out archived repositories
    pub skip_archived: bool,
    /// Leave out forks
    pub skip_forks: bool,
    /// Only keep repositories whose name or full name matches one of these
    pub only: Vec<String>,
}

impl RepositorySelection {
    /// Whether a single repository is selected
    pub fn includes(&self, repo: &RepositoryDescriptor) -> bool {
        if self.skip_archived && repo.archived {
            return false;
        }
        if self.skip_forks && repo.fork {
            return false;
        }
        self.only.is_empty()
            || self.only.iter().any(|wanted| {
                wanted.eq_ignore_ascii_case(&repo.name) || wanted.eq_ignore_ascii_case(&repo.full_name)
            })
    }

    /// Keep the selected repositories, preserving order
    pub fn apply(&self, repos: Vec<RepositoryDescriptor>) -> Vec<RepositoryDescriptor> {
        repos.into_iter().filter(|repo| self.includes(repo)).collect()
    }
}
