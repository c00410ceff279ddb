//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with the expiry queue.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, ExpiryQueue, StatsCounters};
use crate::error::{CacheError, Result};
use crate::size::parse_size;

// == Next Expiry ==
/// What the front of the expiry queue says about the next wake-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextExpiry {
    /// Nothing is queued
    Empty,
    /// Entries are queued but none of them expire
    Never,
    /// The soonest expiry among queued entries
    At(Instant),
}

// == Cache Store ==
/// Key/value storage plus the queue that orders entries by expiry.
///
/// The map and queue always hold the same set of entries: every mutating
/// method updates both before returning.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, Arc<CacheEntry<V>>>,
    /// Entries ordered by absolute expiry
    queue: ExpiryQueue<V>,
    /// Performance statistics
    stats: StatsCounters,
    /// Advisory memory budget in bytes
    max_memory: u64,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store recording `max_memory` as its budget.
    pub fn new(max_memory: u64) -> Self {
        Self {
            entries: HashMap::new(),
            queue: ExpiryQueue::new(),
            stats: StatsCounters::new(),
            max_memory,
        }
    }

    // == Set ==
    /// Stores a key-value pair.
    ///
    /// An existing entry is updated in place and repositioned in the queue;
    /// otherwise a new entry is created and queued.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Time to live, `Duration::ZERO` for no expiration
    pub fn set(&mut self, key: String, value: V, ttl: Duration) {
        if let Some(entry) = self.entries.get(&key) {
            entry.update(value, ttl);
            self.queue.fix(entry);
            debug!("Updated key {:?} with ttl {:?}", key, ttl);
        } else {
            let entry = Arc::new(CacheEntry::new(key.clone(), value, ttl));
            self.queue.push(Arc::clone(&entry));
            self.entries.insert(key, entry);
        }
        self.debug_check_consistency();
    }

    // == Get Entry ==
    /// Returns the tracked entry for `key`, expired or not.
    pub fn entry(&self, key: &str) -> Option<&Arc<CacheEntry<V>>> {
        self.entries.get(key)
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether the key was present.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.queue.remove(&entry);
                self.stats.record_deletion();
                self.debug_check_consistency();
                true
            }
            None => false,
        }
    }

    // == Exists ==
    /// Presence check only; an expired but unswept key still exists.
    pub fn exists(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Flush ==
    /// Drops every entry.
    pub fn flush(&mut self) {
        self.entries = HashMap::new();
        self.queue = ExpiryQueue::new();
    }

    // == Time To Live ==
    /// Remaining TTL of a live key that has an expiration.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .and_then(|entry| entry.ttl_remaining())
    }

    // == Next Expiry ==
    /// Inspects the front of the queue without mutating it.
    pub fn next_expiry(&self) -> NextExpiry {
        match self.queue.peek() {
            None => NextExpiry::Empty,
            Some(entry) => match entry.expires_at() {
                Some(expires_at) => NextExpiry::At(expires_at),
                None => NextExpiry::Never,
            },
        }
    }

    // == Evict Expired ==
    /// Removes every expired entry from the front of the queue.
    ///
    /// Stops at the first entry that is permanent or still live; heap order
    /// guarantees nothing behind it expires sooner.
    ///
    /// Returns the number of entries removed.
    pub fn evict_expired(&mut self) -> usize {
        let mut removed = 0;
        while let Some(entry) = self.queue.peek() {
            if entry.expires_at().is_none() || !entry.is_expired() {
                break;
            }
            if let Some(entry) = self.queue.pop() {
                self.entries.remove(entry.key());
                removed += 1;
            }
        }

        self.stats.record_expirations(removed);
        self.debug_check_consistency();
        removed
    }

    // == Max Memory ==
    /// Parses and records a new memory budget.
    ///
    /// The previous budget is kept when `size` is malformed or zero.
    pub fn set_max_memory(&mut self, size: &str) -> Result<u64> {
        let bytes = parse_size(size).and_then(|bytes| {
            if bytes == 0 {
                Err(CacheError::ZeroMaxMemory)
            } else {
                Ok(bytes)
            }
        });

        match bytes {
            Ok(bytes) => {
                debug!("Max memory set to {} bytes", bytes);
                self.max_memory = bytes;
                Ok(bytes)
            }
            Err(err) => {
                warn!("Rejected max memory {:?}: {}", size, err);
                Err(err)
            }
        }
    }

    pub fn max_memory(&self) -> u64 {
        self.max_memory
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len(), self.max_memory)
    }

    // == Length ==
    /// Returns the number of tracked entries, including unswept expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of queued entries; always equal to `len()` between calls.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    fn debug_check_consistency(&self) {
        debug_assert_eq!(
            self.entries.len(),
            self.queue.len(),
            "map and expiry queue disagree on entry count"
        );
    }
}

impl<V: Clone> CacheStore<V> {
    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Entries whose TTL has elapsed are reported as missing even if the
    /// sweep has not removed them yet. Nothing is evicted here.
    pub fn get(&self, key: &str) -> Option<V> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.stats.record_hit();
                Some(entry.value())
            }
            _ => {
                self.stats.record_miss();
                None
            }
        }
    }
}
