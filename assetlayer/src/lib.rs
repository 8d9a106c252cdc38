//! AssetLayer - client-side access layer for a key-addressed asset API
//!
//! This library turns many logical reads of game data entities, entity
//! sections and content-addressed blobs into a minimal set of network calls:
//!
//! - [`cache`]: bounded LRU response cache with hit/miss/eviction counters
//! - [`coalesce`]: at most one in-flight fetch per key, shared by all callers
//! - [`transport`]: per-attempt timeout, bounded retry with exponential backoff
//! - [`client`]: the [`AssetClient`] facade composing the three
//! - [`telemetry`]: request counters and diagnostics snapshots
//! - [`config`]: client configuration, INI file and JSON overrides
//! - [`logging`]: `tracing` subscriber setup

pub mod cache;
pub mod client;
pub mod coalesce;
pub mod config;
pub mod logging;
pub mod telemetry;
pub mod transport;

pub use cache::{CacheKey, CacheStats};
pub use client::{AssetClient, BatchItem, BatchResult, ClientError};
pub use config::ClientConfig;
pub use telemetry::ClientDiagnostics;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
