//! Cache Handle Module
//!
//! Thread-safe front end owning the store and its expiration task.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::{CacheStats, CacheStore};
use crate::config::CacheConfig;
use crate::tasks::spawn_expiration_task;

/// State shared between the handle and the expiration task.
pub(crate) struct Shared<V> {
    /// Map and expiry queue, always locked together
    pub(crate) store: RwLock<CacheStore<V>>,
    /// Coalescing "please recheck" signal for the expiration task
    pub(crate) signal: Notify,
}

impl<V> Shared<V> {
    /// Wakes the expiration task. Never blocks; repeated calls before the
    /// task wakes collapse into one.
    pub(crate) fn notify_mutation(&self) {
        self.signal.notify_one();
    }
}

// == Cache ==
/// An in-process key/value cache with automatic TTL expiration.
///
/// A background task sleeps until the soonest expiry and evicts everything
/// that has expired by then. Every mutation re-arms it, so a short TTL set
/// after a long one is still honored on time.
///
/// Must be created inside a tokio runtime. Dropping the cache stops the
/// background task.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use mini_ttl_cache::Cache;
///
/// # #[tokio::main]
/// # async fn main() {
/// let cache: Cache<String> = Cache::new();
///
/// cache.set("session", "abc".to_string(), Duration::from_secs(60)).await;
/// cache.set("config", "static".to_string(), Duration::ZERO).await;
///
/// assert_eq!(cache.get("session").await, Some("abc".to_string()));
/// assert_eq!(cache.count().await, 2);
/// # }
/// ```
pub struct Cache<V> {
    shared: Arc<Shared<V>>,
    expiration: JoinHandle<()>,
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache with the default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache and starts its expiration task.
    pub fn with_config(config: CacheConfig) -> Self {
        let shared = Arc::new(Shared {
            store: RwLock::new(CacheStore::new(config.max_memory)),
            signal: Notify::new(),
        });
        let expiration = spawn_expiration_task(Arc::clone(&shared), &config);

        Self { shared, expiration }
    }

    // == Set ==
    /// Stores a value. `Duration::ZERO` means the entry never expires.
    ///
    /// Setting an existing key replaces its value and restarts its TTL.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.shared.store.write().await.set(key.into(), value, ttl);
        self.shared.notify_mutation();
    }

    // == Get ==
    /// Returns the value for `key` unless it is missing or expired.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.shared.store.read().await.get(key)
    }

    // == Delete ==
    /// Removes `key`. Returns true if it was present.
    pub async fn delete(&self, key: &str) -> bool {
        let deleted = self.shared.store.write().await.delete(key);
        if deleted {
            debug!("Deleted key {:?}", key);
            self.shared.notify_mutation();
        }
        deleted
    }

    // == Exists ==
    /// Presence check; does not look at expiry.
    pub async fn exists(&self, key: &str) -> bool {
        self.shared.store.read().await.exists(key)
    }

    // == Flush ==
    /// Removes every entry. Always returns true.
    pub async fn flush(&self) -> bool {
        self.shared.store.write().await.flush();
        debug!("Cache flushed");
        self.shared.notify_mutation();
        true
    }

    // == Count ==
    /// Number of tracked entries, including expired ones not yet swept.
    pub async fn count(&self) -> usize {
        self.shared.store.read().await.len()
    }

    // == Time To Live ==
    /// Remaining TTL of a live key, `None` if missing, expired or permanent.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        self.shared.store.read().await.ttl_remaining(key)
    }

    // == Max Memory ==
    /// Records a memory budget such as `"100MB"`.
    ///
    /// Returns false and keeps the previous budget if `size` is malformed or
    /// zero. The budget is reported in [`stats`](Self::stats) but does not
    /// trigger eviction.
    pub async fn set_max_memory(&self, size: &str) -> bool {
        self.shared.store.write().await.set_max_memory(size).is_ok()
    }

    pub async fn max_memory(&self) -> u64 {
        self.shared.store.read().await.max_memory()
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        self.shared.store.read().await.stats()
    }
}

impl<V> Default for Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Cache");
        match self.shared.store.try_read() {
            Ok(store) => debug
                .field("entries", &store.len())
                .field("max_memory", &store.max_memory()),
            Err(_) => debug.field("entries", &format_args!("<locked>")),
        };
        debug
            .field("expiration_finished", &self.expiration.is_finished())
            .finish()
    }
}

impl<V> Drop for Cache<V> {
    fn drop(&mut self) {
        self.expiration.abort();
    }
}
