//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use assetlayer::client::{AssetClient, BatchItem};
use assetlayer::config::{ClientConfig, ConfigFile};
use clap::Args;
use tracing::debug;

use crate::error::CliError;

/// Client settings accepted on the command line.
///
/// Every flag is optional; unset flags fall back to the configuration file,
/// then to built-in defaults.
#[derive(Debug, Default, Clone, Args)]
pub struct ClientArgs {
    /// Base address of the asset API
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Per-attempt timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Retries after the first attempt on network failures
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Maximum number of cached responses
    #[arg(long, global = true)]
    pub cache_entries: Option<usize>,

    /// Log every network attempt
    #[arg(long, global = true)]
    pub trace: bool,

    /// Configuration file (defaults to ~/.assetlayer/config.ini)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Resolve client settings from CLI args and config file.
pub fn resolve_config(args: &ClientArgs) -> Result<ClientConfig, CliError> {
    let file = match &args.config {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(apply_overrides(file.client, args))
}

/// CLI takes precedence over the file.
fn apply_overrides(mut config: ClientConfig, args: &ClientArgs) -> ClientConfig {
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if let Some(max_retries) = args.max_retries {
        config.max_retries = max_retries;
    }
    if let Some(entries) = args.cache_entries {
        config.max_cache_entries = entries;
    }
    if args.trace {
        config.tracing = true;
    }
    config
}

/// Build a client from resolved settings.
pub fn create_client(args: &ClientArgs) -> Result<AssetClient, CliError> {
    let config = resolve_config(args)?;
    debug!(base_url = %config.base_url, "Creating asset client");
    Ok(AssetClient::new(config)?)
}

/// Parse a batch item written as `type:id` or `type:id:section`.
pub fn parse_batch_item(s: &str) -> Result<BatchItem, String> {
    let parts: Vec<&str> = s.split(':').collect();
    match parts.as_slice() {
        [asset_type, id] if !asset_type.is_empty() && !id.is_empty() => {
            Ok(BatchItem::entity(*asset_type, *id))
        }
        [asset_type, id, section]
            if !asset_type.is_empty() && !id.is_empty() && !section.is_empty() =>
        {
            Ok(BatchItem::section(*asset_type, *id, *section))
        }
        _ => Err(format!(
            "invalid batch item '{}': expected type:id or type:id:section",
            s
        )),
    }
}
