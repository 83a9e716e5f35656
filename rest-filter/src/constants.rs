//! Limits applied while reading and compiling filters.
//!
//! # Environment Variables
//!
//! | Variable               | Default | Description                         |
//! |------------------------|---------|-------------------------------------|
//! | `REST_FILTER_MAX_KEYS` | 64      | Maximum keys compiled per filter    |
//!
//! ```bash
//! # Allow wide search forms
//! REST_FILTER_MAX_KEYS=256
//! ```

use std::sync::OnceLock;

/// Separator between the field spec and each command in a filter key.
pub const COMMAND_SEPARATOR: char = ':';

/// Default maximum number of keys in one filter source.
const DEFAULT_MAX_FILTER_KEYS: usize = 64;

/// Cached max key count from environment.
static MAX_FILTER_KEYS_CACHE: OnceLock<usize> = OnceLock::new();

/// Returns the maximum number of keys a compiler accepts by default.
///
/// Reads `REST_FILTER_MAX_KEYS` on first call and caches it for the lifetime
/// of the process. Falls back to 64 when unset, unparsable or zero.
#[inline]
pub fn max_filter_keys() -> usize {
    *MAX_FILTER_KEYS_CACHE.get_or_init(|| {
        std::env::var("REST_FILTER_MAX_KEYS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(DEFAULT_MAX_FILTER_KEYS)
    })
}

/// Maximum decoded length of a single query-string key or value (64KB).
pub const MAX_URL_DECODED_LEN: usize = 65536;

/// Maximum bracket nesting in a query-string key (`a[0][]` is depth 2).
///
/// Range pairs need two levels; anything deeper has no meaning to a command.
pub const MAX_ARRAY_DEPTH: usize = 4;
