//! Configuration management for the CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default advisor endpoint when neither flag, env nor config file sets one
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Advisor service URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Default table bucket
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    /// Default catalog table key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_key: Option<String>,
    /// Default interchangeability table key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix_key: Option<String>,
}

impl Config {
    /// Load the user's configuration, or defaults if there is none
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).context("Failed to read config file")?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Overwrite fields that are set in `other`
    pub fn merge(&mut self, other: Config) {
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }
        if other.bucket.is_some() {
            self.bucket = other.bucket;
        }
        if other.catalog_key.is_some() {
            self.catalog_key = other.catalog_key;
        }
        if other.matrix_key.is_some() {
            self.matrix_key = other.matrix_key;
        }
    }

    /// API URL by precedence: explicit flag/env, config file, built-in default
    pub fn resolve_api_url(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("iadv").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            bucket: Some("fleet".to_string()),
            catalog_key: Some("catalog.csv".to_string()),
            ..Default::default()
        };

        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("api_url"));
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut config = Config {
            api_url: Some("http://advisor:8080".to_string()),
            bucket: Some("old".to_string()),
            ..Default::default()
        };
        config.merge(Config {
            bucket: Some("new".to_string()),
            ..Default::default()
        });

        assert_eq!(config.api_url.as_deref(), Some("http://advisor:8080"));
        assert_eq!(config.bucket.as_deref(), Some("new"));
    }

    #[test]
    fn test_resolve_api_url_precedence() {
        let config = Config {
            api_url: Some("http://from-file:8080".to_string()),
            ..Default::default()
        };

        assert_eq!(config.resolve_api_url(Some("http://flag:1")), "http://flag:1");
        assert_eq!(config.resolve_api_url(None), "http://from-file:8080");
        assert_eq!(Config::default().resolve_api_url(None), DEFAULT_API_URL);
    }
}
