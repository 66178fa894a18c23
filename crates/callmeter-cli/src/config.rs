//! Configuration management for the Callmeter CLI
//!
//! Stores the admin API key and server URL in ~/.config/callmeter/config.toml.
//! `CALLMETER_URL` and `CALLMETER_API_KEY` (environment or `.env`) take
//! precedence over the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const CONFIG_DIR: &str = "callmeter";
const CONFIG_FILE: &str = "config.toml";

pub const URL_ENV: &str = "CALLMETER_URL";
pub const API_KEY_ENV: &str = "CALLMETER_API_KEY";

/// CLI Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join(CONFIG_DIR);
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        Self::parse(&content)
    }

    /// Load the file, then apply environment overrides
    pub fn resolve() -> Result<Self> {
        Ok(Self::load()?.with_overrides(|key| std::env::var(key).ok()))
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse config file")
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory {:?}", dir))?;

        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Set API key
    pub fn set_api_key(&mut self, key: String) {
        self.api_key = Some(key);
    }

    /// Apply non-empty values from `lookup` over the file settings
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(URL_ENV) {
            self.base_url = url;
        }
        if let Some(key) = lookup(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_base_url_uses_default() {
        let config = Config::parse("api_key = \"abc\"").unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_saved_form_parses_back() {
        let config = Config {
            api_key: None,
            base_url: "https://billing.internal".to_string(),
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(!text.contains("api_key"));
        assert_eq!(Config::parse(&text).unwrap(), config);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let config = Config::default().with_overrides(|key| match key {
            URL_ENV => Some("https://api.example.net".to_string()),
            API_KEY_ENV => Some("  ".to_string()),
            _ => None,
        });

        assert_eq!(config.base_url, "https://api.example.net");
        assert_eq!(config.api_key, None);
    }
}
