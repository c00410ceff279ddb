//! Integration Tests for the Cache API
//!
//! Exercises the public async interface end to end, with the real clock
//! and the background expiration task running.

use std::sync::Arc;
use std::time::Duration;

use mini_ttl_cache::size::{KB, MB};
use mini_ttl_cache::{parse_size, Cache, CacheConfig, CacheError};
use tokio::time::{sleep, timeout};

const HOUR: Duration = Duration::from_secs(3600);

// == Helper Functions ==

/// Polls until `key` disappears, failing after one second.
async fn wait_for_eviction<V>(cache: &Cache<V>, key: &str)
where
    V: Clone + Send + Sync + 'static,
{
    timeout(Duration::from_secs(1), async {
        while cache.exists(key).await {
            sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("entry was not evicted in time");
}

// == Set / Get ==

#[tokio::test]
async fn test_set_and_get() {
    let cache: Cache<String> = Cache::new();

    cache.set("string", "string value".to_string(), Duration::ZERO).await;

    assert_eq!(cache.get("string").await, Some("string value".to_string()));
    assert_eq!(cache.get("missing").await, None);
}

#[tokio::test]
async fn test_set_any_value_type() {
    let cache: Cache<Vec<String>> = Cache::new();
    let value = vec!["string1".to_string(), "string2".to_string()];

    cache.set("slice", value.clone(), HOUR).await;

    assert_eq!(cache.get("slice").await, Some(value));
}

#[tokio::test]
async fn test_overwrite_keeps_single_entry() {
    let cache: Cache<u32> = Cache::new();

    cache.set("key", 1, HOUR).await;
    cache.set("key", 2, Duration::ZERO).await;

    assert_eq!(cache.get("key").await, Some(2));
    assert_eq!(cache.count().await, 1);
    assert_eq!(cache.ttl("key").await, None);
}

// == Delete / Exists ==

#[tokio::test]
async fn test_delete() {
    let cache: Cache<u32> = Cache::new();

    cache.set("key", 1, HOUR).await;

    assert!(cache.exists("key").await);
    assert!(cache.delete("key").await);
    assert!(!cache.exists("key").await);
    assert!(!cache.delete("key").await);
    assert_eq!(cache.count().await, 0);
}

// == Flush ==

#[tokio::test]
async fn test_flush_is_idempotent() {
    let cache: Cache<u32> = Cache::new();
    for i in 0..10 {
        cache.set(format!("key{}", i), i, HOUR).await;
    }

    assert!(cache.flush().await);
    assert_eq!(cache.count().await, 0);
    assert!(cache.flush().await);
    assert_eq!(cache.count().await, 0);
}

// == Expiration ==

#[tokio::test]
async fn test_short_ttl_expires_in_background() {
    let cache: Cache<String> = Cache::new();

    cache
        .set("a", "v".to_string(), Duration::from_micros(100))
        .await;
    sleep(Duration::from_micros(200)).await;

    // expired entries are hidden from get even before the sweep
    assert_eq!(cache.get("a").await, None);

    wait_for_eviction(&cache, "a").await;
    assert_eq!(cache.count().await, 0);
}

#[tokio::test]
async fn test_expiration_with_millisecond_ttl() {
    let cache: Cache<String> = Cache::new();

    cache.set("key", "value".to_string(), Duration::from_millis(1)).await;
    sleep(Duration::from_millis(2)).await;

    assert_eq!(cache.get("key").await, None);
}

#[tokio::test]
async fn test_short_ttl_behind_long_ttl() {
    let cache: Cache<String> = Cache::new();

    cache.set("long", "v".to_string(), HOUR).await;
    sleep(Duration::from_millis(5)).await;
    cache
        .set("short", "v".to_string(), Duration::from_millis(20))
        .await;

    wait_for_eviction(&cache, "short").await;
    assert!(cache.exists("long").await);
}

#[tokio::test]
async fn test_permanent_entries_never_expire() {
    let cache: Cache<String> = Cache::new();

    cache.set("forever", "v".to_string(), Duration::ZERO).await;
    cache
        .set("brief", "v".to_string(), Duration::from_millis(5))
        .await;

    wait_for_eviction(&cache, "brief").await;
    sleep(Duration::from_millis(20)).await;

    assert_eq!(cache.get("forever").await, Some("v".to_string()));
    assert_eq!(cache.ttl("forever").await, None);
}

#[tokio::test]
async fn test_ttl_reports_remaining_time() {
    let cache: Cache<u32> = Cache::new();

    cache.set("key", 1, Duration::from_secs(10)).await;

    let remaining = cache.ttl("key").await.unwrap();
    assert!(remaining <= Duration::from_secs(10));
    assert!(remaining >= Duration::from_secs(9));
    assert_eq!(cache.ttl("missing").await, None);
}

// == Max Memory ==

#[tokio::test]
async fn test_set_max_memory() {
    let cache: Cache<u32> = Cache::new();
    let initial = cache.max_memory().await;
    assert_eq!(initial, 100 * MB);

    assert!(!cache.set_max_memory("0KB").await);
    assert_eq!(cache.max_memory().await, initial);

    assert!(!cache.set_max_memory("a lot").await);
    assert_eq!(cache.max_memory().await, initial);

    assert!(cache.set_max_memory("2MB").await);
    assert_eq!(cache.max_memory().await, 2 * MB);

    assert!(cache.set_max_memory("512kb").await);
    assert_eq!(cache.stats().await.max_memory_bytes, 512 * KB);
}

#[tokio::test]
async fn test_with_config_records_budget() {
    let config = CacheConfig {
        max_memory: parse_size("1GB").unwrap(),
        ..CacheConfig::default()
    };
    let cache: Cache<u32> = Cache::with_config(config);

    assert_eq!(cache.max_memory().await, 1 << 30);
}

#[test]
fn test_parse_size_errors() {
    assert_eq!(
        parse_size("12 furlongs"),
        Err(CacheError::InvalidSize("12 furlongs".to_string()))
    );
}

// == Stats ==

#[tokio::test]
async fn test_stats_track_operations() {
    let cache: Cache<u32> = Cache::new();

    cache.set("hit", 1, HOUR).await;
    cache.set("gone", 2, HOUR).await;
    cache.get("hit").await;
    cache.get("missing").await;
    cache.delete("gone").await;

    let stats = cache.stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.deletions, 1);
    assert_eq!(stats.total_entries, 1);
    assert_eq!(stats.hit_rate(), 0.5);
}

// == Concurrency ==

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_expiring_writers() {
    let cache: Arc<Cache<usize>> = Arc::new(Cache::new());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                for i in 0..100 {
                    let key = format!("w{}-{}", worker, i);
                    cache.set(key, i, Duration::from_millis(10)).await;
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    timeout(Duration::from_secs(2), async {
        while cache.count().await > 0 {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("expiring entries were not swept");

    assert_eq!(cache.stats().await.expirations, 800);
}
