//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
///
/// `Auth` and `RateLimited` are fatal for a backup run; nothing here is
/// retried.
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// Rate limit exceeded or access forbidden
    #[error("GitHub rate limit exceeded or access forbidden: {0}")]
    RateLimited(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map an HTTP status from the API onto a dedicated error kind
    pub(crate) fn from_status(status: u16, message: &str) -> Option<Self> {
        match status {
            401 => Some(Error::Auth(message.to_string())),
            403 | 429 => Some(Error::RateLimited(message.to_string())),
            _ => None,
        }
    }

    /// Classify an octocrab error, pulling out 401 and 403 responses
    pub(crate) fn classify(err: octocrab::Error) -> Self {
        let mapped = match &err {
            octocrab::Error::GitHub { source, .. } => {
                Self::from_status(source.status_code.as_u16(), &source.message)
            }
            _ => None,
        };
        mapped.unwrap_or(Error::Api(err))
    }
}
