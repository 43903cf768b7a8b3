//! Cache Module
//!
//! Provides in-memory caching with lazy expiration and read-through loading.

mod any;
mod cacheable;
mod entry;
mod flight;
mod stats;
mod store;


// Re-export public types
pub use any::AnyCache;
pub use cacheable::Cacheable;
pub use stats::CacheStats;
pub use store::Cache;

pub(crate) use entry::CacheEntry;

// == Public Constants ==
/// Duration meaning "this entry never expires"
pub const NO_EXPIRATION: std::time::Duration = std::time::Duration::ZERO;
