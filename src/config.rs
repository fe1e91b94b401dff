//! Configuration Management
//!
//! Handles persistent configuration storage for graphplane. Effective values
//! resolve explicit config first, then environment variables.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable fallbacks.
const API_KEY_ENV: &str = "GRAPHPLANE_API_KEY";
const API_URL_ENV: &str = "GRAPHPLANE_API_URL";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API key for authentication
    #[serde(default)]
    pub api_key: Option<String>,
    /// Override for the API endpoint (self-hosted installs)
    #[serde(default)]
    pub api_url: Option<String>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("graphplane").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Effective API key (config > environment). `None` when neither is set
    /// or the value is empty.
    pub fn effective_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }

    /// Effective API endpoint override (config > environment). `None` means
    /// the default endpoint.
    pub fn effective_api_url(&self) -> Option<String> {
        self.api_url
            .clone()
            .filter(|u| !u.is_empty())
            .or_else(|| std::env::var(API_URL_ENV).ok().filter(|u| !u.is_empty()))
    }
}
