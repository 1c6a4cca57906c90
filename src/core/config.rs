//! Application configuration management

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Environment variable overriding `api.base_url`
pub const API_URL_ENV: &str = "OPTIEXTRACT_API_URL";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote API settings
    pub api: ApiConfig,
    /// Decorative background settings
    pub background: BackgroundConfig,
}

/// Remote API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base address of the upload service, without a trailing path
    pub base_url: String,
    /// Request timeout in seconds (none = wait indefinitely)
    pub timeout_secs: Option<u64>,
}

/// Silk background settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    pub enabled: bool,
    pub speed: f32,
    pub scale: f32,
    /// Base tint as `#RRGGBB`
    pub color: String,
    pub noise_intensity: f32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: 5.0,
            scale: 1.5,
            color: "#2C2C3E".to_string(),
            noise_intensity: 1.2,
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "optiextract", "OptiExtract")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from disk, writing defaults on first run.
    ///
    /// The `OPTIEXTRACT_API_URL` environment variable is applied on top of
    /// whatever was loaded.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config = Self::from_json(&content)
                .with_context(|| format!("Invalid config: {}", path.display()))?;
            tracing::info!("Loaded config from: {}", path.display());
            config
        } else {
            let config = Self::default();
            if let Err(e) = config.save() {
                tracing::warn!("Could not write default config: {:#}", e);
            }
            config
        };

        config.apply_env_override(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    /// Parse configuration from JSON; missing keys take their defaults
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Replace the API base address when an override is present and non-empty
    pub fn apply_env_override(&mut self, base_url: Option<String>) {
        if let Some(url) = base_url.map(|u| u.trim().to_string()) {
            if !url.is_empty() {
                tracing::info!("Using API base URL from {}: {}", API_URL_ENV, url);
                self.api.base_url = url;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_local_service() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.api.timeout_secs, None);
        assert_eq!(config.background.color, "#2C2C3E");
        assert!(config.background.enabled);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AppConfig::from_json(r#"{ "api": { "timeout_secs": 10 } }"#).unwrap();
        assert_eq!(config.api.timeout_secs, Some(10));
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.background, BackgroundConfig::default());
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(AppConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn test_env_override() {
        let mut config = AppConfig::default();
        config.apply_env_override(Some("  ".to_string()));
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");

        config.apply_env_override(Some("http://files.internal:9000".to_string()));
        assert_eq!(config.api.base_url, "http://files.internal:9000");

        config.apply_env_override(None);
        assert_eq!(config.api.base_url, "http://files.internal:9000");
    }
}
