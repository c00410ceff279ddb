//! Mini TTL Cache demo
//!
//! Fills a cache with a mix of short-lived and permanent entries, then
//! watches the background task expire them.

use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_ttl_cache::{Cache, CacheConfig};

/// Entry point for the demo.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache (starts the expiration task)
/// 4. Store entries with different TTLs
/// 5. Poll until every expiring entry is gone, then print stats as JSON
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mini TTL Cache demo");

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: max_memory={} bytes, idle_recheck={:?}, min_wait={:?}",
        config.max_memory, config.idle_recheck, config.min_wait
    );

    let cache: Cache<String> = Cache::with_config(config);

    if !cache.set_max_memory("0KB").await {
        warn!("Zero budget rejected, keeping {} bytes", cache.max_memory().await);
    }

    cache
        .set("session:1", "alice".to_string(), Duration::from_millis(300))
        .await;
    cache
        .set("session:2", "bob".to_string(), Duration::from_millis(600))
        .await;
    cache
        .set("config:motd", "hello".to_string(), Duration::ZERO)
        .await;
    // Refreshing pushes session:1 behind session:2
    cache
        .set("session:1", "alice".to_string(), Duration::from_millis(900))
        .await;

    info!("Stored {} entries", cache.count().await);

    while cache.count().await > 1 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        info!(
            "Entries: {} (session:1 ttl {:?}, session:2 ttl {:?})",
            cache.count().await,
            cache.ttl("session:1").await,
            cache.ttl("session:2").await
        );
    }

    let stats = serde_json::to_string_pretty(&cache.stats().await)
        .context("failed to serialize cache stats")?;
    println!("{}", stats);

    info!("Demo complete");
    Ok(())
}
