//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::size::{parse_size, MB};

/// Default advisory memory budget
pub const DEFAULT_MAX_MEMORY: u64 = 100 * MB;

/// How long the expiration task sleeps when only permanent entries are queued
pub const DEFAULT_IDLE_RECHECK: Duration = Duration::from_secs(3600);

/// Wait used when the next expiry is already in the past
pub const DEFAULT_MIN_WAIT: Duration = Duration::from_micros(1);

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Advisory memory budget in bytes (recorded, not enforced)
    pub max_memory: u64,
    /// Fallback wake interval when no queued entry has a TTL
    pub idle_recheck: Duration,
    /// Floor for the expiration task's wait
    pub min_wait: Duration,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_MEMORY` - Size literal such as `256MB` (default: 100MB)
    /// - `CACHE_IDLE_RECHECK_SECS` - Idle re-check interval in seconds (default: 3600)
    /// - `CACHE_MIN_WAIT_MICROS` - Minimum wait in microseconds (default: 1)
    pub fn from_env() -> Self {
        Self {
            max_memory: env::var("CACHE_MAX_MEMORY")
                .ok()
                .and_then(|v| parse_size(&v).ok())
                .filter(|bytes| *bytes > 0)
                .unwrap_or(DEFAULT_MAX_MEMORY),
            idle_recheck: env::var("CACHE_IDLE_RECHECK_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_IDLE_RECHECK),
            min_wait: env::var("CACHE_MIN_WAIT_MICROS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|micros| *micros > 0)
                .map(Duration::from_micros)
                .unwrap_or(DEFAULT_MIN_WAIT),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_memory: DEFAULT_MAX_MEMORY,
            idle_recheck: DEFAULT_IDLE_RECHECK,
            min_wait: DEFAULT_MIN_WAIT,
        }
    }
}
