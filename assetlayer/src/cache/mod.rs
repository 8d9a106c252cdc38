//! In-memory response cache.
//!
//! - [`CacheKey`]: typed identity of a cache-eligible request
//! - [`RecencyCache`]: fixed-capacity store with LRU eviction
//! - [`CacheStats`]: point-in-time counters for diagnostics

mod key;
mod lru;

pub use key::{CacheKey, KeyParseError, API_PREFIX};
pub use lru::RecencyCache;

use serde::Serialize;

/// Cache counters and occupancy.
///
/// Hits, misses and evictions are cumulative for the lifetime of the cache;
/// clearing the cache only resets `size`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Lookups that found an entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Entries currently stored.
    pub size: usize,
    /// Configured capacity.
    pub max_size: usize,
    /// Entries removed to make room for new ones.
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of lookups that were hits, or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
