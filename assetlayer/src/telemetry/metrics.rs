//! Lock-free request counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative request counters for one client.
///
/// Counters only ever increase; nothing resets them.
#[derive(Debug, Default)]
pub struct ClientMetrics {
    total_requests: AtomicU64,
    total_errors: AtomicU64,
    coalesced_requests: AtomicU64,
}

impl ClientMetrics {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// A logical request was handed to the transport.
    pub fn request_issued(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// A request failed at the network layer or returned a malformed body.
    pub fn error_recorded(&self) {
        self.total_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// A request joined an in-flight fetch instead of issuing its own.
    pub fn request_coalesced(&self) {
        self.coalesced_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    pub fn total_errors(&self) -> u64 {
        self.total_errors.load(Ordering::Relaxed)
    }

    pub fn coalesced_requests(&self) -> u64 {
        self.coalesced_requests.load(Ordering::Relaxed)
    }
}
