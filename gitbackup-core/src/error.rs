//! Error types for gitbackup

use std::path::PathBuf;

use thiserror::Error;

use crate::git::GitError;

/// Result type alias for gitbackup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for gitbackup operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A git subprocess failed
    #[error(transparent)]
    Git(#[from] GitError),

    /// The local target for a repository would land outside the backup root
    #[error("Unsafe target path {} for repository '{name}'", .path.display())]
    UnsafePath { name: String, path: PathBuf },

    /// An existing directory is not the root of a git working copy
    #[error("Not a git repository: {}", .0.display())]
    NotARepo(PathBuf),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error text suggests a credential or permission problem
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Error::Git(e) => e.is_auth_failure(),
            other => crate::git::looks_like_auth_failure(&other.to_string()),
        }
    }
}
