//! Cache Entry Module
//!
//! Defines a single cache slot with its value, TTL and absolute expiry.

use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;

use crate::cache::queue::HeapSlot;

/// Longest horizon an expiry is scheduled at; larger TTLs are clamped to it.
pub const MAX_TTL: Duration = Duration::from_secs(86400 * 365 * 30);

// == Cache Entry ==
/// A single cache slot.
///
/// The value and expiry live behind the entry's own lock so they can be
/// refreshed in place while readers hold a shared reference. The heap index
/// is only ever written by [`ExpiryQueue`](super::ExpiryQueue).
#[derive(Debug)]
pub struct CacheEntry<V> {
    key: String,
    state: RwLock<EntryState<V>>,
    heap_slot: HeapSlot,
}

#[derive(Debug)]
struct EntryState<V> {
    value: V,
    /// `Duration::ZERO` means the entry never expires
    ttl: Duration,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` from now.
    ///
    /// # Arguments
    /// * `key` - Key the entry is stored under
    /// * `value` - The value to store
    /// * `ttl` - Time to live, `Duration::ZERO` for no expiration. Anything
    ///   longer than [`MAX_TTL`] expires after `MAX_TTL`.
    pub fn new(key: impl Into<String>, value: V, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            state: RwLock::new(EntryState {
                value,
                ttl,
                expires_at: expiry_from_now(ttl),
            }),
            heap_slot: HeapSlot::unqueued(),
        }
    }

    // == Update ==
    /// Replaces the value and restarts the TTL from now.
    pub fn update(&self, value: V, ttl: Duration) {
        let expires_at = expiry_from_now(ttl);
        let mut state = self.state.write();
        state.value = value;
        state.ttl = ttl;
        state.expires_at = expires_at;
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ttl(&self) -> Duration {
        self.state.read().ttl
    }

    // == Expires At ==
    /// Absolute expiry, or `None` if the entry never expires.
    pub fn expires_at(&self) -> Option<Instant> {
        let state = self.state.read();
        if state.ttl.is_zero() {
            None
        } else {
            Some(state.expires_at)
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Entries without a TTL never expire. Otherwise the entry is expired once
    /// its expiry is strictly in the past.
    pub fn is_expired(&self) -> bool {
        match self.expires_at() {
            Some(expires_at) => expires_at < Instant::now(),
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining TTL, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at()
            .map(|expires_at| expires_at.saturating_duration_since(Instant::now()))
    }

    // == Heap Index ==
    /// Current position in the expiry queue, `None` when not queued.
    pub fn heap_index(&self) -> Option<usize> {
        self.heap_slot.get()
    }

    pub(super) fn heap_slot(&self) -> &HeapSlot {
        &self.heap_slot
    }
}

/// Absolute expiry for a TTL starting now, clamped so the addition cannot overflow.
fn expiry_from_now(ttl: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(ttl.min(MAX_TTL)).unwrap_or(now)
}

impl<V: Clone> CacheEntry<V> {
    /// Returns a copy of the stored value.
    pub fn value(&self) -> V {
        self.state.read().value.clone()
    }
}
