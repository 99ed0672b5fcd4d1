pub mod roots;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::library::pool::default_workers;

/// Library configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub playlist_directory: PathBuf,
    /// File listing the directories to scan, one per line
    pub roots_file: PathBuf,
    pub scan_timeout_secs: u64,
    pub worker_threads: usize,
    /// Name given to the playlist built by a full scan
    pub master_playlist_name: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        let base = default_config_dir();
        Self {
            playlist_directory: base.join("playlists"),
            roots_file: base.join("directories.txt"),
            scan_timeout_secs: 60,
            worker_threads: default_workers(),
            master_playlist_name: "All Music".to_string(),
        }
    }
}

impl LibraryConfig {
    /// Deadline for scans and playlist loads, never shorter than a second
    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs.max(1))
    }
}

fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tunejar")
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    config: LibraryConfig,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Load `~/.config/tunejar/config.toml`, or defaults if it does not exist
    pub fn new() -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path()?;
        Self::with_path(config_path)
    }

    /// Load settings from a specific file
    pub fn with_path(config_path: PathBuf) -> Result<Self, ConfigError> {
        let config = Self::load_config(&config_path)?;

        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn get_config(&self) -> &LibraryConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn update_config<F>(&mut self, updater: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut LibraryConfig),
    {
        updater(&mut self.config);
        self.save_config()
    }

    pub fn set_playlist_directory(&mut self, directory: PathBuf) -> Result<(), ConfigError> {
        self.config.playlist_directory = directory;
        self.save_config()
    }

    pub fn set_roots_file(&mut self, path: PathBuf) -> Result<(), ConfigError> {
        self.config.roots_file = path;
        self.save_config()
    }

    pub fn set_scan_timeout(&mut self, timeout: Duration) -> Result<(), ConfigError> {
        self.config.scan_timeout_secs = timeout.as_secs().max(1);
        self.save_config()
    }

    pub fn set_worker_threads(&mut self, workers: usize) -> Result<(), ConfigError> {
        self.config.worker_threads = workers.max(1);
        self.save_config()
    }

    pub fn set_master_playlist_name(&mut self, name: &str) -> Result<(), ConfigError> {
        self.config.master_playlist_name = name.to_string();
        self.save_config()
    }

    pub fn reset_to_defaults(&mut self) -> Result<(), ConfigError> {
        self.config = LibraryConfig::default();
        self.save_config()
    }

    fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::home_dir()
            .ok_or(ConfigError::ConfigDirNotFound)?
            .join(".config")
            .join("tunejar");

        std::fs::create_dir_all(&config_dir)?;

        Ok(config_dir.join("config.toml"))
    }

    fn load_config(path: &Path) -> Result<LibraryConfig, ConfigError> {
        if !path.exists() {
            return Ok(LibraryConfig::default());
        }

        let config_content = std::fs::read_to_string(path)?;
        let config: LibraryConfig = toml::from_str(&config_content)?;

        Ok(config)
    }

    fn save_config(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let config_content = toml::to_string_pretty(&self.config)?;
        std::fs::write(&self.config_path, config_content)?;

        Ok(())
    }
}
