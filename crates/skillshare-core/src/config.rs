//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API base URL and the last email used to log in.
//!
//! Configuration is stored at `~/.config/skillshare/config.json`. The API base
//! URL can be overridden with `SKILLSHARE_API_URL`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::{FileStorage, SessionStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "skillshare";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// API used when neither the environment nor the config names one
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "SKILLSHARE_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for durable client state (token storage, logs)
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Base URL for API requests: environment, then config, then default
    pub fn api_base_url(&self) -> String {
        resolve_api_base_url(std::env::var(API_URL_ENV).ok(), self.api_base_url.as_deref())
    }

    /// Open the session store on `storage.json` in the data directory
    pub fn open_session(&self) -> Result<SessionStore> {
        let storage = FileStorage::new(self.data_dir()?);
        debug!(path = ?storage.path(), "Using file token storage");
        Ok(SessionStore::open(storage))
    }
}

fn resolve_api_base_url(env: Option<String>, configured: Option<&str>) -> String {
    let url = env
        .filter(|v| !v.trim().is_empty())
        .or_else(|| configured.map(str::to_string))
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    url.trim().trim_end_matches('/').to_string()
}
