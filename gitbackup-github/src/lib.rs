//! gitbackup GitHub - repository listing for gitbackup
//!
//! This crate provides GitHub API access for enumerating the repositories an
//! account owns or collaborates on.

mod client;
mod error;
mod repos;

pub use client::GitHubClient;
pub use error::{Error, Result};
pub use repos::descriptor_from;
