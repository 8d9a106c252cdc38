//! Fixed-capacity cache with least-recently-used eviction.
//!
//! Entries live in a slab of nodes threaded onto a doubly linked list ordered
//! by recency (head = least recently used, tail = most recently used). A hash
//! index maps keys to slab slots, so `get`, `set`, `delete` and `contains` are
//! all O(1).
//!
//! The cache itself is not synchronized; owners wrap it in a mutex and never
//! hold the lock across an `.await`.

use std::collections::HashMap;
use std::hash::Hash;

use super::CacheStats;

/// Sentinel slot index meaning "no node".
const NIL: usize = usize::MAX;

struct Node<K, V> {
    key: K,
    value: V,
    prev: usize,
    next: usize,
}

/// Bounded key-value store with LRU eviction and hit/miss/eviction counters.
pub struct RecencyCache<K, V> {
    index: HashMap<K, usize>,
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
    capacity: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K, V> RecencyCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A capacity of zero is raised to one; configuration validation rejects
    /// it before it gets here.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            index: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            capacity,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Look up a key, marking it most recently used on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self.index.get(key).copied() {
            Some(slot) => {
                self.hits += 1;
                self.move_to_tail(slot);
                self.node(slot).map(|node| &node.value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Look up a key without touching recency or counters.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.index
            .get(key)
            .and_then(|&slot| self.node(slot))
            .map(|node| &node.value)
    }

    /// Insert or replace a value, making the key most recently used.
    ///
    /// Inserting a new key into a full cache first evicts the least recently
    /// used entry, whose key is returned. Replacing an existing key never
    /// evicts.
    pub fn set(&mut self, key: K, value: V) -> Option<K> {
        if let Some(&slot) = self.index.get(&key) {
            if let Some(node) = self.slots[slot].as_mut() {
                node.value = value;
            }
            self.move_to_tail(slot);
            return None;
        }

        let evicted = if self.index.len() >= self.capacity {
            self.evict_oldest()
        } else {
            None
        };

        let node = Node {
            key: key.clone(),
            value,
            prev: NIL,
            next: NIL,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.push_tail(slot);
        self.index.insert(key, slot);

        evicted
    }

    /// Returns `true` if the key is present. Does not affect recency.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Remove a key. Returns `true` if it was present.
    pub fn delete(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(slot) => {
                self.release(slot);
                true
            }
            None => false,
        }
    }

    /// Remove every entry. Counters are cumulative and keep their values.
    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(node) = self.node(cursor) {
            keys.push(&node.key);
            cursor = node.next;
        }
        keys
    }

    /// Snapshot of the cache counters and occupancy.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.len(),
            max_size: self.capacity,
            evictions: self.evictions,
        }
    }

    fn node(&self, slot: usize) -> Option<&Node<K, V>> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    fn evict_oldest(&mut self) -> Option<K> {
        let slot = self.head;
        let key = self.node(slot)?.key.clone();
        self.index.remove(&key);
        self.release(slot);
        self.evictions += 1;
        Some(key)
    }

    /// Unlink a slot and return it to the free list.
    fn release(&mut self, slot: usize) {
        self.unlink(slot);
        self.slots[slot] = None;
        self.free.push(slot);
    }

    fn move_to_tail(&mut self, slot: usize) {
        if self.tail == slot {
            return;
        }
        self.unlink(slot);
        self.push_tail(slot);
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = match self.node(slot) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match self.slots.get_mut(prev).and_then(Option::as_mut) {
            Some(prev_node) => prev_node.next = next,
            None => self.head = next,
        }
        match self.slots.get_mut(next).and_then(Option::as_mut) {
            Some(next_node) => next_node.prev = prev,
            None => self.tail = prev,
        }

        if let Some(node) = self.slots[slot].as_mut() {
            node.prev = NIL;
            node.next = NIL;
        }
    }

    fn push_tail(&mut self, slot: usize) {
        let old_tail = self.tail;
        if let Some(node) = self.slots[slot].as_mut() {
            node.prev = old_tail;
            node.next = NIL;
        }
        match self.slots.get_mut(old_tail).and_then(Option::as_mut) {
            Some(tail_node) => tail_node.next = slot,
            None => self.head = slot,
        }
        self.tail = slot;
    }
}
