//! Cache Module
//!
//! Provides in-memory caching with heap-scheduled TTL expiration.

mod entry;
mod handle;
mod queue;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use handle::Cache;
pub use queue::ExpiryQueue;
pub use stats::{CacheStats, StatsCounters};
pub use store::{CacheStore, NextExpiry};

pub(crate) use handle::Shared;
