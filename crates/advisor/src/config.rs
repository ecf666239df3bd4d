//! Service configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Advisor service configuration, read from `ADVISOR_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisorConfig {
    /// Name reported in structured logs
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Port for the recommendation, health and metrics endpoints
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Directory holding filesystem buckets
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,

    /// Timeout for fetching tables from HTTP buckets
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_service_name() -> String {
    "instance-advisor".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_data_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_fetch_timeout() -> u64 {
    30
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            api_port: default_api_port(),
            data_root: default_data_root(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

impl AdvisorConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix("ADVISOR"))
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(source)
            .build()
            .context("Failed to read advisor configuration")?
            .try_deserialize()
            .context("Invalid advisor configuration")
    }
}
