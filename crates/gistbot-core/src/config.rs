use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{GistbotError, Result};

/// Top-level configuration for the gistbot store.
///
/// Loaded from `~/.gistbot/config.toml` by default. Each section corresponds
/// to one concern; all fields have serde defaults so a partial file parses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GistbotConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl GistbotConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GistbotConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| GistbotError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the SQLite database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.gistbot/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Storage and retention settings.
///
/// The retention threshold and sweep cadence are deliberately optional:
/// there is no sensible built-in number for how long an ephemeral gist
/// should live, so sweeping stays off until an operator sets both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file name, relative to `general.data_dir`.
    pub db_file: String,
    /// Delete ephemeral gists older than this many seconds. `None`
    /// disables sweeping entirely.
    pub retention_secs: Option<u64>,
    /// How often an external scheduler should run the sweep, in seconds.
    /// Advisory only; this crate never spawns the scheduler itself.
    pub sweep_interval_secs: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_file: "gists.db".to_string(),
            retention_secs: None,
            sweep_interval_secs: None,
        }
    }
}
