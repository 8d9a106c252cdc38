//! Point-in-time diagnostics for display.

use std::fmt;

use serde::Serialize;

use crate::cache::CacheStats;

/// Snapshot of a client's cache, in-flight and request counters.
///
/// Serializes with the camelCase field names used by debug panels:
///
/// ```json
/// {
///   "cache": { "hits": 1, "misses": 2, "size": 1, "maxSize": 2000, "evictions": 0 },
///   "inFlightRequests": 0,
///   "totalRequests": 2,
///   "totalErrors": 0,
///   "coalescedRequests": 0
/// }
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDiagnostics {
    pub cache: CacheStats,
    /// Keys being fetched right now.
    pub in_flight_requests: usize,
    /// Logical requests handed to the transport (coalescing leaders and
    /// batch calls).
    pub total_requests: u64,
    pub total_errors: u64,
    /// Requests that shared another caller's in-flight fetch.
    pub coalesced_requests: u64,
}

impl fmt::Display for ClientDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cache {}/{} (hits {}, misses {}, evictions {}), in-flight {}, requests {}, errors {}, coalesced {}",
            self.cache.size,
            self.cache.max_size,
            self.cache.hits,
            self.cache.misses,
            self.cache.evictions,
            self.in_flight_requests,
            self.total_requests,
            self.total_errors,
            self.coalesced_requests
        )
    }
}
