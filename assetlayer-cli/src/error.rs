//! CLI error type.

use std::path::PathBuf;

use assetlayer::client::ClientError;
use assetlayer::config::ConfigError;
use assetlayer::logging::LoggingError;
use thiserror::Error;

/// Errors surfaced to the user by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid command-line input or unusable configuration.
    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("failed to initialize logging: {0}")]
    Logging(#[from] LoggingError),

    /// The requested asset could not be fetched.
    #[error("{0}")]
    Unavailable(String),

    #[error("failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code: 1 when the asset is unavailable, 2 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Unavailable(_) => 1,
            _ => 2,
        }
    }
}
