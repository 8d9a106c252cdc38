//! Client telemetry for diagnostics and debug panels.
//!
//! Counters are lock-free atomics updated at well-defined points of each
//! request. A snapshot combines them with the cache statistics and the
//! current in-flight count.
//!
//! # Architecture
//!
//! ```text
//! AssetClient ─────► ClientMetrics ─────► ClientDiagnostics ─────► Views
//!                    (atomic counters)    (point-in-time copy)     (CLI, JSON)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use assetlayer::telemetry::ClientMetrics;
//!
//! let metrics = ClientMetrics::new();
//! metrics.request_issued();
//! metrics.request_coalesced();
//! assert_eq!(metrics.total_requests(), 1);
//! ```

mod metrics;
mod snapshot;

pub use metrics::ClientMetrics;
pub use snapshot::ClientDiagnostics;
