//! Configuration Module
//!
//! Handles building cache configuration, optionally from environment variables.

use std::env;

/// Default name attached to log events when none is configured.
pub const DEFAULT_CACHE_NAME: &str = "cachely";

/// Cache configuration parameters.
///
/// Expiration is always chosen per entry; this only controls how the cache
/// identifies itself in logs and whether concurrent misses are coalesced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Name recorded on every log event emitted by the cache
    pub name: String,
    /// Serialize loaders for the same key so only one runs at a time
    pub single_flight: bool,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHELY_NAME` - Cache name used in logs (default: "cachely")
    /// - `CACHELY_SINGLE_FLIGHT` - `true` or `false` (default: false)
    pub fn from_env() -> Self {
        Self {
            name: env::var("CACHELY_NAME")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_CACHE_NAME.to_string()),
            single_flight: env::var("CACHELY_SINGLE_FLIGHT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    /// Sets the name used in log events.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Enables or disables single-flight loading.
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_CACHE_NAME.to_string(),
            single_flight: false,
        }
    }
}
