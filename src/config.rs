// ============================================================================
// File: src/config.rs
// Configuration structures and validation
// ============================================================================

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::history::{HistoryStore, DEFAULT_CAPACITY};

/// Environment variable that overrides `api_base_url`
pub const API_URL_ENV: &str = "ISITTRUE_API_URL";

/// Main configuration structure loaded from config.json
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the analysis API, including the `/api` prefix
    pub api_base_url: String,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Interval between health checks in milliseconds
    pub health_interval_ms: u64,

    /// Temperature used when none is given on the command line (0.0-1.0)
    pub default_temperature: f32,

    /// Local history settings
    pub history: HistorySettings,
}

/// Where and how much history is kept
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum number of entries retained
    pub capacity: usize,

    /// Whether history survives between runs
    pub persist: bool,

    /// History file; defaults to ~/.isittrue/history.json
    pub path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            timeout_ms: 60_000,
            health_interval_ms: 30_000,
            default_temperature: 0.7,
            history: HistorySettings::default(),
        }
    }
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            persist: true,
            path: None,
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let config_content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&config_content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            Config::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_base_url = url;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(anyhow!("API base URL is required"));
        }

        reqwest::Url::parse(&self.api_base_url)
            .map_err(|e| anyhow!("Invalid API base URL '{}': {}", self.api_base_url, e))?;

        if self.timeout_ms == 0 {
            return Err(anyhow!("Timeout must be greater than zero"));
        }

        if self.health_interval_ms == 0 {
            return Err(anyhow!("Health check interval must be greater than zero"));
        }

        if !(0.0..=1.0).contains(&self.default_temperature) {
            return Err(anyhow!("Default temperature must be between 0.0 and 1.0"));
        }

        if self.history.capacity == 0 {
            return Err(anyhow!("History capacity must be at least 1"));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_millis(self.health_interval_ms)
    }

    /// Resolved history file, if history is persisted
    pub fn history_path(&self) -> Option<PathBuf> {
        if !self.history.persist {
            return None;
        }
        self.history
            .path
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(".isittrue").join("history.json")))
    }

    /// Open the history store these settings describe
    pub fn open_history(&self) -> Result<HistoryStore> {
        match self.history_path() {
            Some(path) => HistoryStore::open(path, self.history.capacity),
            None => Ok(HistoryStore::new(self.history.capacity)),
        }
    }
}
