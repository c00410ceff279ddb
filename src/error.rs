//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Cache operations themselves report through booleans and options; these
/// errors describe why a configuration value was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Size literal could not be parsed
    #[error("Invalid size: {0}")]
    InvalidSize(String),

    /// Size literal does not fit in a u64 byte count
    #[error("Size overflows u64: {0}")]
    SizeOverflow(String),

    /// A max memory budget of zero bytes was requested
    #[error("Max memory must be greater than zero")]
    ZeroMaxMemory,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
