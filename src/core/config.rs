use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_SYNC_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    pub base_url: String,
    pub interval_secs: u64,
    /// Number of server entries considered per sync
    pub limit: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            base_url: DEFAULT_SYNC_BASE_URL.to_string(),
            interval_secs: 30,
            limit: 10,
        }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ImportConfig {
    /// Skip imported quotes whose text is already stored
    pub dedup: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub import: ImportConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    /// Loads the config from the default location, or the defaults if no
    /// file has been set up there.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "quotesync", "quotesync")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "quotesync", "quotesync")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
