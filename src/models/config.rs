//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Document locations relative to the storage directory
    #[serde(default)]
    pub paths: PathsConfig,

    /// History ledger settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// Read server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Source-control settings for the release workflow
    #[serde(default)]
    pub release: ReleaseConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        if !path.as_ref().exists() {
            log::debug!("No config at {:?}, using defaults", path.as_ref());
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("paths.records", &self.paths.records),
            ("paths.history", &self.paths.history),
            ("paths.changelog", &self.paths.changelog),
            ("paths.statistics", &self.paths.statistics),
            ("paths.manifest", &self.paths.manifest),
        ];
        for (name, value) in named {
            if value.trim().is_empty() {
                return Err(AppError::config(format!("{name} is empty")));
            }
        }
        if self.history.max_snapshots == 0 {
            return Err(AppError::config("history.max_snapshots must be > 0"));
        }
        if self.server.port == 0 {
            return Err(AppError::config("server.port must be > 0"));
        }
        if self.release.remote.trim().is_empty() || self.release.branch.trim().is_empty() {
            return Err(AppError::config("release.remote and release.branch are required"));
        }
        Ok(())
    }
}

/// Storage keys of every document the tooling reads or writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::records")]
    pub records: String,

    #[serde(default = "defaults::history")]
    pub history: String,

    #[serde(default = "defaults::changelog")]
    pub changelog: String,

    #[serde(default = "defaults::statistics")]
    pub statistics: String,

    #[serde(default = "defaults::manifest")]
    pub manifest: String,

    /// Overrides the embedded record schema
    #[serde(default)]
    pub schema: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            records: defaults::records(),
            history: defaults::history(),
            changelog: defaults::changelog(),
            statistics: defaults::statistics(),
            manifest: defaults::manifest(),
            schema: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Ledger cap; oldest snapshots are dropped beyond it
    #[serde(default = "defaults::max_snapshots")]
    pub max_snapshots: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_snapshots: defaults::max_snapshots(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "defaults::port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: defaults::port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
    #[serde(default = "defaults::remote")]
    pub remote: String,

    #[serde(default = "defaults::branch")]
    pub branch: String,

    /// Revision holding the previously released dataset
    #[serde(default = "defaults::base_ref")]
    pub base_ref: String,

    /// Revision holding the dataset being released
    #[serde(default = "defaults::head_ref")]
    pub head_ref: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            remote: defaults::remote(),
            branch: defaults::branch(),
            base_ref: defaults::base_ref(),
            head_ref: defaults::head_ref(),
        }
    }
}

mod defaults {
    pub fn records() -> String {
        "classificados.json".into()
    }
    pub fn history() -> String {
        "history/changes.json".into()
    }
    pub fn changelog() -> String {
        "CHANGELOG.md".into()
    }
    pub fn statistics() -> String {
        "estatisticas.json".into()
    }
    pub fn manifest() -> String {
        "package.json".into()
    }
    pub fn max_snapshots() -> usize {
        50
    }
    pub fn port() -> u16 {
        8081
    }
    pub fn remote() -> String {
        "origin".into()
    }
    pub fn branch() -> String {
        "main".into()
    }
    pub fn base_ref() -> String {
        "origin/main".into()
    }
    pub fn head_ref() -> String {
        "HEAD".into()
    }
}
