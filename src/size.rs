//! Size Parsing Module
//!
//! Parses human-readable byte sizes such as `"100KB"`, `"2 mb"` or `"512"`
//! into a byte count. Units are powers of 1024.

use crate::error::{CacheError, Result};

// == Unit Constants ==
pub const KB: u64 = 1 << 10;
pub const MB: u64 = 1 << 20;
pub const GB: u64 = 1 << 30;
pub const TB: u64 = 1 << 40;

// == Parse Size ==
/// Parses a byte-size literal into a number of bytes.
///
/// The literal is an unsigned integer followed by an optional unit. The unit
/// letter is case-insensitive and may be spelled `K`, `KB` or `KiB` (same for
/// `M`, `G` and `T`). `B`, `byte`, `bytes` or no unit at all mean bytes.
///
/// A value of zero parses successfully; callers decide whether it is usable.
///
/// # Examples
/// ```
/// use mini_ttl_cache::size::{parse_size, KB, MB};
///
/// assert_eq!(parse_size("100KB").unwrap(), 100 * KB);
/// assert_eq!(parse_size("2 mb").unwrap(), 2 * MB);
/// assert_eq!(parse_size("512").unwrap(), 512);
/// assert!(parse_size("lots").is_err());
/// ```
pub fn parse_size(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);

    if digits.is_empty() {
        return Err(CacheError::InvalidSize(input.to_string()));
    }

    let multiplier = unit_multiplier(unit.trim())
        .ok_or_else(|| CacheError::InvalidSize(input.to_string()))?;

    let value: u64 = digits
        .parse()
        .map_err(|_| CacheError::SizeOverflow(input.to_string()))?;

    value
        .checked_mul(multiplier)
        .ok_or_else(|| CacheError::SizeOverflow(input.to_string()))
}

fn unit_multiplier(unit: &str) -> Option<u64> {
    match unit.to_ascii_lowercase().as_str() {
        "" | "b" | "byte" | "bytes" => Some(1),
        "k" | "kb" | "kib" => Some(KB),
        "m" | "mb" | "mib" => Some(MB),
        "g" | "gb" | "gib" => Some(GB),
        "t" | "tb" | "tib" => Some(TB),
        _ => None,
    }
}
