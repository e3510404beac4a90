//! Local state probes

use std::io::ErrorKind;
use std::path::Path;

use crate::git::GitRepo;
use crate::Result;

/// Whether anything exists at `path`
///
/// Not-found is `false`; any other filesystem error propagates.
pub fn path_exists(path: &Path) -> Result<bool> {
    match std::fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Whether a clone into `path` would collide with existing content
///
/// True for a non-empty directory or any non-directory entry.
pub fn is_occupied(path: &Path) -> Result<bool> {
    if !path_exists(path)? {
        return Ok(false);
    }
    if !path.is_dir() {
        return Ok(true);
    }
    Ok(std::fs::read_dir(path)?.next().is_some())
}

/// Whether `path` is the top-level directory of a git working copy
///
/// Probe errors count as `false`: a corrupt or unreadable repository is
/// treated exactly like a plain directory.
pub fn is_version_control_root(path: &Path) -> bool {
    GitRepo::is_repository_root(path)
}
