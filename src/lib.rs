//! Cachely - A thread-safe in-process cache
//!
//! Stores values under string keys with optional per-entry expiration and
//! loads missing values through caller-supplied loaders.
//!
//! ```
//! use std::time::Duration;
//! use cachely::Cache;
//!
//! let cache: Cache<Vec<String>> = Cache::new();
//! let mut users = Vec::new();
//!
//! cache
//!     .get_or_compute("users", &mut users, Duration::from_secs(60), |dest| {
//!         dest.push("alice".to_string());
//!         Ok::<_, std::io::Error>(())
//!     })
//!     .unwrap();
//!
//! assert_eq!(cache.lookup("users"), Some(vec!["alice".to_string()]));
//! ```

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{AnyCache, Cache, CacheStats, Cacheable, NO_EXPIRATION};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
