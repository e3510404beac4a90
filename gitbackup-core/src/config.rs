//! Configuration management for gitbackup
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (GITBACKUP_*)
//! 3. Config file (~/.config/gitbackup/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Where mirrored repositories are written
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackupSettings {
    /// Backup root; relative paths resolve against the project root
    pub root: PathBuf,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("backup"),
        }
    }
}

/// Repository listing parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubSettings {
    /// Comma-separated affiliations passed to the listing API
    pub affiliation: String,

    /// Visibility filter passed to the listing API
    pub visibility: String,

    /// Page size for listing
    pub per_page: u8,

    /// API base URL, for GitHub Enterprise; `None` uses api.github.com
    pub api_url: Option<String>,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            affiliation: "owner,collaborator".to_string(),
            visibility: "all".to_string(),
            per_page: 100,
            api_url: None,
        }
    }
}

/// Git subprocess settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitSettings {
    /// Path to the git executable
    pub binary: String,

    /// Allow git to prompt on the terminal for credentials
    pub terminal_prompt: bool,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            binary: "git".to_string(),
            terminal_prompt: false,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Backup location
    pub backup: BackupSettings,

    /// GitHub listing settings
    pub github: GitHubSettings,

    /// Git settings
    pub git: GitSettings,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/gitbackup/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gitbackup").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - GITBACKUP_DIR: Backup root directory
    /// - GITBACKUP_GIT_PATH: Path to git executable
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("GITBACKUP_DIR") {
            if !dir.trim().is_empty() {
                self.backup.root = PathBuf::from(dir);
            }
        }

        if let Ok(git_path) = std::env::var("GITBACKUP_GIT_PATH") {
            if !git_path.trim().is_empty() {
                self.git.binary = git_path;
            }
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, backup_dir: Option<PathBuf>, git_path: Option<String>) -> Self {
        if let Some(dir) = backup_dir {
            self.backup.root = dir;
        }

        if let Some(path) = git_path {
            self.git.binary = path;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(backup_dir: Option<PathBuf>, git_path: Option<String>) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(backup_dir, git_path))
    }

    /// Resolve the backup root against `project_root`
    pub fn backup_root(&self, project_root: &Path) -> PathBuf {
        if self.backup.root.is_absolute() {
            self.backup.root.clone()
        } else {
            project_root.join(&self.backup.root)
        }
    }
}
