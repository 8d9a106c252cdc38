//! Client configuration.
//!
//! [`ClientConfig`] holds everything needed to construct an
//! [`AssetClient`](crate::client::AssetClient). Every field has a default,
//! and partial overrides merge over those defaults whether they come from
//! builder methods, a JSON object, or the `[client]` section of an INI
//! [`ConfigFile`].

mod file;

pub use file::{config_file_path, ConfigFile, CLIENT_SECTION};

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default address of the asset API.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5200";

/// Default maximum number of cached responses.
pub const DEFAULT_MAX_CACHE_ENTRIES: usize = 2000;

/// Default per-attempt timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default number of retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid INI.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// A JSON override could not be decoded.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A setting has an unusable value.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Configuration for an asset client. Immutable once the client is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base address of the remote API, e.g. `http://localhost:5200`.
    pub base_url: String,

    /// Maximum number of cached responses (must be positive).
    pub max_cache_entries: usize,

    /// Upper bound for each network attempt, in milliseconds.
    pub timeout_ms: u64,

    /// Retries after the initial attempt for network-layer failures.
    pub max_retries: u32,

    /// Log an `info` line per network attempt. Retry warnings are always logged.
    pub tracing: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_cache_entries: DEFAULT_MAX_CACHE_ENTRIES,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            tracing: false,
        }
    }
}

impl ClientConfig {
    /// Create a configuration for the given base address.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Parse a JSON object of overrides; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the base address.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the cache capacity.
    pub fn with_max_cache_entries(mut self, entries: usize) -> Self {
        self.max_cache_entries = entries;
        self
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis().min(u64::MAX as u128) as u64;
        self
    }

    /// Set the retry bound.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Enable or disable per-attempt request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing = enabled;
        self
    }

    /// Per-attempt timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check that the settings can build a working client.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cache_entries == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_cache_entries".to_string(),
                value: "0".to_string(),
                reason: "cache capacity must be positive".to_string(),
            });
        }

        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_ms".to_string(),
                value: "0".to_string(),
                reason: "timeout must be positive".to_string(),
            });
        }

        let url = reqwest::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidValue {
            key: "base_url".to_string(),
            value: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                key: "base_url".to_string(),
                value: self.base_url.clone(),
                reason: "scheme must be http or https".to_string(),
            });
        }

        Ok(())
    }
}
