//! Local upstream repositories for tests

use std::path::{Path, PathBuf};
use std::process::Command;

/// Run git in `dir` and return trimmed stdout, panicking on failure
pub(crate) fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=gitbackup",
            "-c",
            "user.email=gitbackup@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .env("LC_ALL", "C")
        .output()
        .expect("failed to run git");

    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A bare repository plus the scratch working copy that feeds it
pub(crate) struct Upstream {
    bare: PathBuf,
    work: PathBuf,
    branch: String,
}

impl Upstream {
    /// Create `<root>/remotes/<name>.git` with one commit on `branch`
    pub(crate) fn new(root: &Path, name: &str, branch: &str) -> Self {
        let remotes = root.join("remotes");
        let work = remotes.join(format!("{}-work", name));
        let bare = remotes.join(format!("{}.git", name));
        std::fs::create_dir_all(&work).unwrap();

        git(&work, &["init", "--quiet"]);
        git(&work, &["symbolic-ref", "HEAD", &format!("refs/heads/{}", branch)]);

        let upstream = Self {
            bare,
            work,
            branch: branch.to_string(),
        };
        upstream.write_and_commit("README.md", &format!("# {}\n", name));

        git(
            &remotes,
            &[
                "clone",
                "--bare",
                "--quiet",
                upstream.work.to_str().unwrap(),
                upstream.bare.to_str().unwrap(),
            ],
        );
        git(
            &upstream.work,
            &["remote", "add", "origin", upstream.bare.to_str().unwrap()],
        );

        upstream
    }

    /// Clone URL of the bare repository
    pub(crate) fn url(&self) -> String {
        self.bare.to_string_lossy().into_owned()
    }

    pub(crate) fn bare_path(&self) -> &Path {
        &self.bare
    }

    fn write_and_commit(&self, file: &str, contents: &str) {
        std::fs::write(self.work.join(file), contents).unwrap();
        git(&self.work, &["add", "--all"]);
        git(&self.work, &["commit", "--quiet", "-m", &format!("update {}", file)]);
    }

    /// Commit a file change and push it to the bare repository
    pub(crate) fn commit(&self, file: &str, contents: &str) -> String {
        self.write_and_commit(file, contents);
        git(&self.work, &["push", "--quiet", "origin", &self.branch]);
        self.tip()
    }

    /// Create and push a side branch at the current tip
    pub(crate) fn push_branch(&self, name: &str) {
        git(
            &self.work,
            &["push", "--quiet", "origin", &format!("{}:refs/heads/{}", self.branch, name)],
        );
    }

    /// Delete a branch from the bare repository
    pub(crate) fn delete_branch(&self, name: &str) {
        git(&self.bare, &["branch", "-D", name]);
    }

    /// Current tip of the default branch in the bare repository
    pub(crate) fn tip(&self) -> String {
        git(&self.bare, &["rev-parse", &format!("refs/heads/{}", self.branch)])
    }
}
