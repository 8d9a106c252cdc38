//! Request coalescing for identical in-flight fetches.
//!
//! When several callers ask for the same key while a fetch for it is already
//! running, only the first caller (the leader) performs the fetch. Later
//! callers are coalesced: they subscribe to the leader's outcome and receive a
//! clone of it when the leader completes.
//!
//! ```text
//! register(key) ──► in flight? ──yes──► Coalesced(receiver) ──► await outcome
//!                        │
//!                        no
//!                        ▼
//!                  NewRequest(InFlight) ──► fetch ──► complete(outcome) ──► broadcast
//! ```
//!
//! The lookup and the creation of the in-flight record happen under one lock,
//! so two concurrent callers can never both become leader for the same key.
//! The record is removed when the leader completes or when its [`InFlight`]
//! handle is dropped, whichever comes first; in the latter case waiting
//! callers observe a closed channel.

use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

/// Outcome of registering interest in a key.
pub enum CoalesceResult<'a, K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Another caller is already fetching this key; await its outcome.
    Coalesced(broadcast::Receiver<V>),
    /// This caller is the leader and must fetch the value.
    NewRequest(InFlight<'a, K, V>),
}

/// Tracks in-flight fetches by key.
pub struct RequestCoalescer<K, V> {
    in_flight: Mutex<HashMap<K, broadcast::Sender<V>>>,
}

impl<K, V> Default for RequestCoalescer<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RequestCoalescer<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Creates an empty coalescer.
    pub fn new() -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a request for `key`.
    ///
    /// Returns [`CoalesceResult::NewRequest`] for the first caller, which
    /// must later call [`InFlight::complete`] (or drop the handle), and
    /// [`CoalesceResult::Coalesced`] for every caller arriving while that
    /// fetch is still running.
    pub fn register(&self, key: K) -> CoalesceResult<'_, K, V> {
        let mut in_flight = self.in_flight.lock();

        if let Some(sender) = in_flight.get(&key) {
            return CoalesceResult::Coalesced(sender.subscribe());
        }

        // Only one value is ever sent per record
        let (sender, _) = broadcast::channel(1);
        in_flight.insert(key.clone(), sender);

        CoalesceResult::NewRequest(InFlight {
            coalescer: self,
            key: Some(key),
        })
    }

    /// Number of keys currently being fetched.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Returns `true` if a fetch for `key` is running.
    pub fn is_in_flight(&self, key: &K) -> bool {
        self.in_flight.lock().contains_key(key)
    }

    fn remove(&self, key: &K) -> Option<broadcast::Sender<V>> {
        self.in_flight.lock().remove(key)
    }
}

/// Leader handle for an in-flight fetch.
///
/// Completing the handle broadcasts the outcome to every coalesced caller.
/// Dropping it without completing removes the record and wakes waiters with a
/// closed channel.
#[must_use = "dropping the handle abandons the in-flight request"]
pub struct InFlight<'a, K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    coalescer: &'a RequestCoalescer<K, V>,
    key: Option<K>,
}

impl<K, V> InFlight<'_, K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Removes the in-flight record and hands `value` to all waiters.
    ///
    /// Returns the number of waiters that received the value.
    pub fn complete(mut self, value: V) -> usize {
        let Some(key) = self.key.take() else {
            return 0;
        };
        match self.coalescer.remove(&key) {
            // No receivers is not an error, just nobody to notify
            Some(sender) => sender.send(value).unwrap_or(0),
            None => 0,
        }
    }
}

impl<K, V> Drop for InFlight<'_, K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            debug!("In-flight request abandoned before completion");
            self.coalescer.remove(&key);
        }
    }
}
