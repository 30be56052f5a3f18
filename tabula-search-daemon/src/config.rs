//! Configuration management for the tabula-search daemon
//!
//! Handles loading, saving, and managing the service configuration.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub service: ServiceSettings,

    /// Path to config file (not serialized)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Path to database file (not serialized)
    #[serde(skip)]
    pub db_path: PathBuf,
}

/// Search request tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Per-request timeout for backend searches, in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Catalog storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Custom database path (optional)
    #[serde(default)]
    pub db_path: Option<String>,
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Custom socket path (optional)
    #[serde(default)]
    pub socket_path: Option<String>,
}

// Default value functions
fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self { db_path: None }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            socket_path: None,
        }
    }
}

impl Config {
    /// Load configuration from disk, creating the default file on first run
    pub fn load() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "tabula-search")
            .context("Could not determine configuration directory")?;

        let config_path = dirs.config_dir().join("config.toml");
        let first_run = !config_path.exists();

        let mut config: Config = if first_run {
            info!("No configuration found, creating defaults at {:?}", config_path);
            Config::default()
        } else {
            let contents = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config: {:?}", config_path))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {:?}", config_path))?
        };

        config.config_path = config_path;
        config.db_path = match &config.catalog.db_path {
            Some(path) => PathBuf::from(path),
            None => dirs.data_dir().join("catalog.db"),
        };

        if first_run {
            config.save()?;
        }

        Ok(config)
    }

    /// Persist the current configuration
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(&self.config_path, contents)
            .with_context(|| format!("Failed to write config: {:?}", self.config_path))?;
        Ok(())
    }

    /// Socket path for the IPC server
    pub fn socket_path(&self) -> PathBuf {
        match &self.service.socket_path {
            Some(path) => PathBuf::from(path),
            None => crate::ipc::default_socket_path(),
        }
    }

    /// Per-request search timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.search.request_timeout_ms)
    }
}
