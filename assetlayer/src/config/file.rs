//! INI configuration file.
//!
//! The file lives at `~/.assetlayer/config.ini` by default:
//!
//! ```ini
//! [client]
//! base_url = http://localhost:5200
//! max_cache_entries = 2000
//! timeout_ms = 10000
//! max_retries = 2
//! tracing = false
//! ```
//!
//! Every key is optional; missing keys keep their defaults. Unknown keys are
//! ignored with a warning.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use tracing::{debug, warn};

use super::{ClientConfig, ConfigError};

/// Section holding client settings.
pub const CLIENT_SECTION: &str = "client";

const KNOWN_KEYS: [&str; 5] = [
    "base_url",
    "max_cache_entries",
    "timeout_ms",
    "max_retries",
    "tracing",
];

/// Default configuration file path, if a home directory is known.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".assetlayer").join("config.ini"))
}

/// Parsed configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub client: ClientConfig,
}

impl ConfigFile {
    /// Load from the default path. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&contents)?;
        debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Parse INI text.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut client = ClientConfig::default();

        let Some(section) = ini.section(Some(CLIENT_SECTION)) else {
            return Ok(Self { client });
        };

        for (key, value) in section.iter() {
            let value = value.trim();
            match key {
                "base_url" => client.base_url = value.to_string(),
                "max_cache_entries" => client.max_cache_entries = parse_value(key, value)?,
                "timeout_ms" => client.timeout_ms = parse_value(key, value)?,
                "max_retries" => client.max_retries = parse_value(key, value)?,
                "tracing" => client.tracing = parse_bool(key, value)?,
                other => warn!(
                    key = other,
                    known = ?KNOWN_KEYS,
                    "Ignoring unknown configuration key"
                ),
            }
        }

        Ok(Self { client })
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: format!("{}.{}", CLIENT_SECTION, key),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: format!("{}.{}", CLIENT_SECTION, key),
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
