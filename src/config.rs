//! Client configuration management.
//!
//! Holds the API base URL and the last username used, persisted at
//! `{config_dir}/ruhcart/config.json`. The `RUHCART_API_BASE` environment
//! variable overrides the stored base URL.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/session directory paths
const APP_NAME: &str = "ruhcart";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default API base for local development, matching the backend's dev setup
const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Environment override for the API base URL
const BASE_URL_ENV: &str = "RUHCART_API_BASE";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub base_url: Option<String>,
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Effective API base URL: env override, then config, then the
    /// localhost default.
    pub fn api_base(&self) -> String {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.is_empty() {
                return url;
            }
        }
        self.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the persisted session file.
    pub fn session_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_base_falls_back_to_default() {
        let config = Config::default();
        // Only meaningful when the env override is unset in the test env.
        if std::env::var(BASE_URL_ENV).is_err() {
            assert_eq!(config.api_base(), DEFAULT_BASE_URL);
        }
    }

    #[test]
    fn api_base_prefers_stored_value() {
        if std::env::var(BASE_URL_ENV).is_err() {
            let config = Config {
                base_url: Some("https://shop.example.com/api".to_string()),
                last_username: None,
            };
            assert_eq!(config.api_base(), "https://shop.example.com/api");
        }
    }
}
