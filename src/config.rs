//! Configuration management for StreamFront
//!
//! Handles config file loading/saving and environment overrides.
//! Config is stored at ~/.config/streamfront/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::RetryPolicy;
use crate::cache::CacheTtl;
use crate::models::Project;

pub const DEFAULT_BASE_URL: &str = "https://api.storefront.tv/v1";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL (paths are appended to it)
    pub base_url: String,
    /// Deployment this build talks for
    pub project: Project,
    /// Platform tag sent with content queries
    pub platform: String,
    /// Default page size for listings
    pub page_size: u32,
    /// Transport timeout in seconds
    pub timeout_secs: u64,
    /// Cache TTL for component data in seconds (0 disables caching)
    pub default_ttl_secs: u64,
    /// Profile token to seed the session with
    pub profile_token: Option<String>,
    /// Consumer (account) token to seed the session with
    pub consumer_token: Option<String>,
    /// Retry policy for transient failures
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            project: Project::Standard,
            platform: "web".to_string(),
            page_size: 20,
            timeout_secs: 30,
            default_ttl_secs: 60,
            profile_token: None,
            consumer_token: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Get config file path (~/.config/streamfront/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("streamfront").join("config.toml"))
    }

    /// Load config from the default location, or defaults if there is none.
    /// Environment overrides are applied either way.
    pub fn load() -> Result<Self> {
        let config = match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.with_env()
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Write config as TOML, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Apply STREAMFRONT_* environment overrides
    pub fn with_env(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (env in production, maps in tests)
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup("STREAMFRONT_BASE_URL") {
            self.base_url = url;
        }
        if let Some(project) = lookup("STREAMFRONT_PROJECT") {
            self.project = project.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        }
        if let Some(platform) = lookup("STREAMFRONT_PLATFORM") {
            self.platform = platform;
        }
        if let Some(token) = lookup("STREAMFRONT_TOKEN") {
            self.profile_token = Some(token);
        }
        if let Some(token) = lookup("STREAMFRONT_CONSUMER_TOKEN") {
            self.consumer_token = Some(token);
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn default_ttl(&self) -> CacheTtl {
        match self.default_ttl_secs {
            0 => CacheTtl::Disabled,
            secs => CacheTtl::Seconds(secs),
        }
    }
}
