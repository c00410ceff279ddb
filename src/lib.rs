//! Mini TTL Cache - A lightweight in-process key/value cache
//!
//! Entries carry an optional time-to-live and are evicted by a background
//! task the moment they expire, driven by a min-heap of expiry times.

pub mod cache;
pub mod config;
pub mod error;
pub mod size;
mod tasks;

pub use cache::{Cache, CacheStats};
pub use config::CacheConfig;
pub use error::CacheError;
pub use size::parse_size;
