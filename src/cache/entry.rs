//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with expiration support.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// Represents a single cache entry with value and expiration.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Expiration timestamp (Unix nanoseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry that expires `duration` from now.
    ///
    /// A zero duration means the entry never expires. Durations that do not
    /// fit in the timestamp range saturate to the far future.
    pub fn new(value: V, duration: Duration) -> Self {
        let expires_at = if duration.is_zero() {
            None
        } else {
            let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
            Some(current_timestamp_ns().saturating_add(nanos))
        };

        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired only once the current time is strictly past its
    /// expiration timestamp.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ns())
    }

    /// Checks expiration against a caller-supplied timestamp (Unix nanoseconds).
    pub fn is_expired_at(&self, now_ns: u64) -> bool {
        match self.expires_at {
            Some(expires) => now_ns > expires,
            None => false,
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in nanoseconds.
///
/// A clock set before the Unix epoch reads as zero.
fn current_timestamp_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
