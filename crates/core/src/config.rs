// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration stored in `questline.toml` inside the state directory.
//!
//! Every field has a default, so a missing file or a partial file is fine:
//!
//! ```toml
//! api_base_url = "https://api.questline.app/v1"
//!
//! [cache]
//! version = "v3"
//! origin = "https://questline.app"
//!
//! [sync]
//! wake_interval_secs = 900
//! max_attempts = 0
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the config file inside the state directory.
pub const CONFIG_FILE_NAME: &str = "questline.toml";

/// Prefix of every cache namespace; the version follows it.
pub const CACHE_NAMESPACE_PREFIX: &str = "questline-cache-";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL the submit contract posts to.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Response cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Sync coordinator settings.
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Response cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Bumped on every release; a new version evicts older namespaces.
    #[serde(default = "default_cache_version")]
    pub version: String,
    /// Origin relative request URLs are resolved against.
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Path prefixes that always bypass the cache.
    #[serde(default = "default_excluded_prefixes")]
    pub excluded_prefixes: Vec<String>,
    /// App shell paths seeded at install.
    #[serde(default = "default_critical_assets")]
    pub critical_assets: Vec<String>,
    /// Path of the image served when an image cannot be fetched.
    #[serde(default = "default_placeholder_image")]
    pub placeholder_image: String,
}

/// Sync coordinator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// The single background wake tag.
    #[serde(default = "default_wake_tag")]
    pub wake_tag: String,
    /// Period of the background wake. 0 = unsupported.
    #[serde(default = "default_wake_interval_secs")]
    pub wake_interval_secs: u64,
    /// Period of the API reachability probe. 0 = disabled.
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
    /// Per-submission timeout.
    #[serde(default = "default_submit_timeout_secs")]
    pub submit_timeout_secs: u64,
    /// First retry delay after a failure. 0 = retry on every trigger.
    #[serde(default = "default_backoff_initial_ms")]
    pub backoff_initial_ms: u64,
    /// Upper bound of the retry delay.
    #[serde(default = "default_backoff_max_secs")]
    pub backoff_max_secs: u64,
    /// Failures before an operation moves to the dead letter file. 0 = never.
    #[serde(default)]
    pub max_attempts: u32,
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8080/api".to_string()
}

fn default_cache_version() -> String {
    "v1".to_string()
}

fn default_origin() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_excluded_prefixes() -> Vec<String> {
    ["/api/", "/auth/", "/rest/", "/functions/"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_critical_assets() -> Vec<String> {
    ["/", "/index.html", "/manifest.json"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_placeholder_image() -> String {
    "/placeholder.svg".to_string()
}

fn default_wake_tag() -> String {
    "sync-quest-completions".to_string()
}

fn default_wake_interval_secs() -> u64 {
    900
}

fn default_probe_interval_secs() -> u64 {
    15
}

fn default_submit_timeout_secs() -> u64 {
    30
}

fn default_backoff_initial_ms() -> u64 {
    1_000
}

fn default_backoff_max_secs() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: default_api_base_url(),
            cache: CacheConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            version: default_cache_version(),
            origin: default_origin(),
            excluded_prefixes: default_excluded_prefixes(),
            critical_assets: default_critical_assets(),
            placeholder_image: default_placeholder_image(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            wake_tag: default_wake_tag(),
            wake_interval_secs: default_wake_interval_secs(),
            probe_interval_secs: default_probe_interval_secs(),
            submit_timeout_secs: default_submit_timeout_secs(),
            backoff_initial_ms: default_backoff_initial_ms(),
            backoff_max_secs: default_backoff_max_secs(),
            max_attempts: 0,
        }
    }
}

impl Config {
    /// Loads `questline.toml` from the state directory.
    ///
    /// A missing file yields the defaults.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let path = state_dir.join(CONFIG_FILE_NAME);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(e.into()),
        };
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the config to the state directory.
    pub fn save(&self, state_dir: &Path) -> Result<()> {
        fs::create_dir_all(state_dir)?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(state_dir.join(CONFIG_FILE_NAME), content)?;
        Ok(())
    }

    /// Checks the values a parse alone cannot.
    pub fn validate(&self) -> Result<()> {
        let version = &self.cache.version;
        if version.is_empty()
            || !version
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        {
            return Err(Error::Config(format!(
                "cache version '{}' must be non-empty and use only [A-Za-z0-9._-]",
                version
            )));
        }

        for (name, url) in [("api_base_url", &self.api_base_url), ("cache.origin", &self.cache.origin)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "{} '{}' must start with http:// or https://",
                    name, url
                )));
            }
        }

        if let Some(prefix) = self
            .cache
            .excluded_prefixes
            .iter()
            .find(|p| !p.starts_with('/'))
        {
            return Err(Error::Config(format!(
                "excluded prefix '{}' must start with '/'",
                prefix
            )));
        }

        if self.sync.wake_tag.is_empty() {
            return Err(Error::Config("sync.wake_tag must not be empty".to_string()));
        }

        Ok(())
    }

    /// Name of the current cache namespace.
    pub fn namespace(&self) -> String {
        format!("{}{}", CACHE_NAMESPACE_PREFIX, self.cache.version)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
