//! Configuration management for CLI tools.
//!
//! Configuration is stored in ~/.voxgate/{app_name}/config.yaml
//!
//! ```yaml
//! threshold: 0.75
//! store:
//!   backend: files        # or redb
//!   path: /var/lib/voxgate # optional
//! ```
//!
//! When `store.path` is unset the store lives under the `data/` directory
//! next to the config file. Relative paths are resolved against the same
//! directory.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use voxgate_enroll::{DEFAULT_THRESHOLD, check_threshold};

use crate::paths::{DATA_DIR, Paths};

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name (not serialized).
    #[serde(skip)]
    pub app_name: String,

    /// Minimum similarity accepted by `identify`.
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Where enrollments are kept.
    #[serde(default)]
    pub store: StoreConfig,

    /// Path to the config file (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

/// Enrollment store settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Enrollment store backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// One file per user in a directory.
    #[default]
    Files,
    /// A single redb database file.
    Redb,
}

impl StoreBackend {
    /// File or directory name used when no path is configured.
    pub fn default_name(self) -> &'static str {
        match self {
            StoreBackend::Files => "embeddings",
            StoreBackend::Redb => "enrollments.redb",
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Files => f.write_str("files"),
            StoreBackend::Redb => f.write_str("redb"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "files" | "file" => Ok(StoreBackend::Files),
            "redb" => Ok(StoreBackend::Redb),
            other => Err(format!("unknown store backend '{other}' (expected files or redb)")),
        }
    }
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: String::new(),
            threshold: DEFAULT_THRESHOLD,
            store: StoreConfig::default(),
            config_path: PathBuf::new(),
        }
    }
}

impl Config {
    /// Gets the default config file path.
    pub fn default_config_path(app_name: &str) -> Option<PathBuf> {
        Paths::new(app_name).ok().map(|p| p.config_file())
    }

    /// Returns the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Returns the config directory path.
    pub fn dir(&self) -> Option<&Path> {
        self.config_path.parent()
    }

    /// Saves the configuration to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Sets the identification threshold.
    pub fn set_threshold(&mut self, threshold: f32) -> anyhow::Result<()> {
        check_threshold(threshold)?;
        self.threshold = threshold;
        self.save()
    }

    /// Sets the store backend and optional location.
    pub fn set_store(
        &mut self,
        backend: StoreBackend,
        path: Option<PathBuf>,
    ) -> anyhow::Result<()> {
        self.store = StoreConfig { backend, path };
        self.save()
    }

    /// Resolves the store location.
    pub fn store_path(&self) -> PathBuf {
        let base = self.dir().unwrap_or(Path::new("."));
        match &self.store.path {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => base.join(p),
            None => base.join(DATA_DIR).join(self.store.backend.default_name()),
        }
    }
}

/// Loads configuration for the specified app.
///
/// Creates the config directory and a default config file on first use.
pub fn load_config(app_name: &str, custom_path: Option<&str>) -> anyhow::Result<Config> {
    let config_path = match custom_path {
        Some(p) => PathBuf::from(p),
        None => Config::default_config_path(app_name)
            .ok_or_else(|| anyhow::anyhow!("cannot determine config path"))?,
    };

    // Ensure config directory exists
    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut cfg: Config = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&content)?
        }
    } else {
        let cfg = Config::default();
        let content = serde_yaml::to_string(&cfg)?;
        std::fs::write(&config_path, content)?;
        cfg
    };

    check_threshold(cfg.threshold)
        .map_err(|e| anyhow::anyhow!("{}: {e}", config_path.display()))?;

    cfg.app_name = app_name.to_string();
    cfg.config_path = config_path;

    Ok(cfg)
}
