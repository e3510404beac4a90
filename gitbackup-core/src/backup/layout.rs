//! Backup root layout and local target derivation

use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::config::Config;
use crate::{Error, Result};

/// Backup root plus the project root that must never be written to
///
/// Both paths are normalized lexically at construction so target checks do
/// not depend on what currently exists on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupLayout {
    root: PathBuf,
    project_root: PathBuf,
}

impl BackupLayout {
    /// Create a layout; a relative `root` resolves against `project_root`
    pub fn new(root: impl AsRef<Path>, project_root: impl AsRef<Path>) -> Self {
        let project_root = normalize_lexically(project_root.as_ref());
        let root = root.as_ref();
        let root = if root.is_absolute() {
            normalize_lexically(root)
        } else {
            normalize_lexically(&project_root.join(root))
        };

        Self { root, project_root }
    }

    /// Build the layout described by `config` for a run started in `project_root`
    pub fn from_config(config: &Config, project_root: impl AsRef<Path>) -> Self {
        let project_root = project_root.as_ref();
        Self::new(config.backup_root(project_root), project_root)
    }

    /// The backup root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The project root
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Local directory a repository named `name` is mirrored into
    ///
    /// The result is strictly inside the backup root and is neither the
    /// project root nor one of its ancestors; anything else is
    /// [`Error::UnsafePath`].
    pub fn target_for(&self, name: &str) -> Result<PathBuf> {
        let unsafe_path = |path: PathBuf| Error::UnsafePath {
            name: name.to_string(),
            path,
        };

        let relative = Path::new(name);
        if name.trim().is_empty() || relative.has_root() || relative.is_absolute() {
            return Err(unsafe_path(relative.to_path_buf()));
        }

        let target = normalize_lexically(&self.root.join(relative));

        if !target.starts_with(&self.root) || target == self.root {
            return Err(unsafe_path(target));
        }
        if self.project_root.starts_with(&target) {
            return Err(unsafe_path(target));
        }

        debug!(name, target = %target.display(), "Resolved local target");
        Ok(target)
    }

    /// Re-check a derived target against what is actually on disk
    ///
    /// [`BackupLayout::target_for`] only looks at path text. A symlink under
    /// the backup root can still point at the project or anywhere else, so
    /// the target is resolved through the deepest existing ancestor and the
    /// same rules are applied to the resolved paths.
    pub fn verify_on_disk(&self, name: &str, target: &Path) -> Result<()> {
        let resolved = resolve_existing(target);
        let root = resolve_existing(&self.root);
        let project_root = resolve_existing(&self.project_root);

        if !resolved.starts_with(&root) || resolved == root || project_root.starts_with(&resolved) {
            warn!(
                name,
                target = %target.display(),
                resolved = %resolved.display(),
                "Target resolves outside the backup root"
            );
            return Err(Error::UnsafePath {
                name: name.to_string(),
                path: resolved,
            });
        }

        Ok(())
    }

    /// Create the backup root (and parents) if missing
    pub fn ensure_root(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create backup directory {}: {}", self.root.display(), e),
            ))
        })
    }
}

/// Canonicalize the deepest existing ancestor of `path` and re-append the rest
///
/// A dangling symlink counts as missing.
fn resolve_existing(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut missing = Vec::new();

    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return missing
                .iter()
                .rev()
                .fold(canonical, |resolved, part| resolved.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(part)) => {
                missing.push(part);
                existing = parent;
            }
            _ => return normalize_lexically(path),
        }
    }
}

/// Resolve `.` and `..` components without touching the filesystem
///
/// `..` never climbs above the root of an absolute path.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            Component::Normal(part) => normalized.push(part),
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> BackupLayout {
        BackupLayout::new("/work/project/backup", "/work/project")
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(normalize_lexically(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize_lexically(Path::new("/../../etc")), PathBuf::from("/etc"));
        assert_eq!(normalize_lexically(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_relative_root_resolves_against_project() {
        let layout = BackupLayout::new("backup/./mirror/..", "/work/project");
        assert_eq!(layout.root(), Path::new("/work/project/backup"));
        assert_eq!(layout.project_root(), Path::new("/work/project"));
    }

    #[test]
    fn test_plain_name_is_direct_child() {
        let target = layout().target_for("demo-repo").unwrap();
        assert_eq!(target, PathBuf::from("/work/project/backup/demo-repo"));

        let target = layout().target_for("repo.with.dots").unwrap();
        assert_eq!(target, PathBuf::from("/work/project/backup/repo.with.dots"));
    }

    #[test]
    fn test_traversal_names_rejected() {
        for name in ["../../etc", "..", ".", "", "  ", "a/../..", "../backup-sibling", "/etc/passwd"] {
            let result = layout().target_for(name);
            assert!(
                matches!(result, Err(Error::UnsafePath { .. })),
                "{:?} should be rejected, got {:?}",
                name,
                result
            );
        }
    }

    #[test]
    fn test_project_root_and_ancestors_rejected() {
        // Backup root above the project: the project and its parents are off limits
        let layout = BackupLayout::new("/work", "/work/project");
        assert!(matches!(layout.target_for("project"), Err(Error::UnsafePath { .. })));
        assert!(layout.target_for("other").is_ok());

        let layout = BackupLayout::new("/", "/work/project");
        assert!(matches!(layout.target_for("work"), Err(Error::UnsafePath { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_target_checked_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("project");
        let outside = dir.path().join("outside");
        std::fs::create_dir_all(project.join("backup")).unwrap();
        std::fs::create_dir_all(&outside).unwrap();

        let layout = BackupLayout::new("backup", &project);
        let backup = layout.root().to_path_buf();
        std::os::unix::fs::symlink(&project, backup.join("to-project")).unwrap();
        std::os::unix::fs::symlink(&outside, backup.join("to-outside")).unwrap();
        std::fs::create_dir_all(backup.join("plain")).unwrap();
        std::os::unix::fs::symlink(backup.join("plain"), backup.join("to-plain")).unwrap();

        for name in ["to-project", "to-outside", "to-outside/nested"] {
            let target = layout.target_for(name).unwrap();
            assert!(
                matches!(layout.verify_on_disk(name, &target), Err(Error::UnsafePath { .. })),
                "{:?} should be rejected",
                name
            );
        }

        for name in ["plain", "to-plain", "missing", "missing/nested"] {
            let target = layout.target_for(name).unwrap();
            assert!(layout.verify_on_disk(name, &target).is_ok(), "{:?} should be accepted", name);
        }
    }

    #[test]
    fn test_ensure_root_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let layout = BackupLayout::new(dir.path().join("a").join("b"), dir.path());
        layout.ensure_root().unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
        // Idempotent
        layout.ensure_root().unwrap();
    }

    #[test]
    fn test_ensure_root_fails_on_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, "x").unwrap();

        let layout = BackupLayout::new(file.join("backup"), dir.path());
        assert!(matches!(layout.ensure_root(), Err(Error::Io(_))));
    }
}
