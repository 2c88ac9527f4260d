//! Engine configuration
//!
//! TOML-backed settings for the descriptor cache: whether the external tier
//! is consulted at all, the entry lifetime, and the key salt that isolates
//! deployments sharing one cache backend.
//!
//! # Example
//!
//! ```ignore
//! use propview_core::config::EngineConfig;
//!
//! let config = EngineConfig::load_from("propview.toml").unwrap_or_default();
//! let engine = propview_core::ViewEngine::from_config(&config);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration system errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write config file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config to TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Descriptor cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Consult the external cache tier for persisted descriptors.
    pub enabled: bool,

    /// Lifetime of an externally cached descriptor, in seconds.
    pub ttl_seconds: u64,

    /// Salt mixed into cache keys; lets deployments share a backend without
    /// reading each other's descriptors.
    pub salt: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: crate::cache::DEFAULT_TTL.as_secs(),
            salt: String::new(),
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Config version for future migration support
    pub version: u32,

    pub cache: CacheSettings,
}

impl EngineConfig {
    /// Load config from file, creating a default file if missing.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::debug!("Loaded engine config from {:?}", path);
            Ok(config)
        } else {
            let default = Self::default();
            default.save_to(path)?;
            tracing::info!("Created default engine config at {:?}", path);
            Ok(default)
        }
    }

    /// Save config to file, creating parent directories if needed.
    pub fn save_to(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!("Saved engine config to {:?}", path);
        Ok(())
    }

    /// Reload config from file, updating self with the current contents.
    pub fn reload_from(&mut self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        *self = toml::from_str(&content)?;
        tracing::debug!("Reloaded engine config from {:?}", path);
        Ok(())
    }
}
