//! Heterogeneous Cache Module
//!
//! A cache whose keys may hold values of different types, checked on read.

use std::any::{type_name, Any};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{Cache, CacheStats, Cacheable};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Erased Value ==
/// A stored value with its concrete type hidden.
#[derive(Clone)]
struct ErasedValue {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl ErasedValue {
    fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Clones the value out if it is a `T`.
    fn downcast<T: Any + Clone>(&self, key: &str) -> Result<T> {
        self.value
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| CacheError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
                found: self.type_name,
            })
    }
}

impl std::fmt::Debug for ErasedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErasedValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

// == Any Cache ==
/// Cache that stores values of any type under string keys.
///
/// Each key remembers the type it was stored with. Reading it back as a
/// different type fails with [`CacheError::TypeMismatch`] instead of
/// returning garbage. Expiration, vacancy, statistics and single-flight
/// behave exactly as in [`Cache`].
#[derive(Debug, Default)]
pub struct AnyCache {
    inner: Cache<ErasedValue>,
}

impl AnyCache {
    // == Constructor ==
    /// Creates an empty cache with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache with the given configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            inner: Cache::with_config(config),
        }
    }

    // == Set ==
    /// Stores a value of any type under `key`, replacing any previous entry.
    pub fn set<T>(&self, key: impl Into<String>, value: T, duration: Duration)
    where
        T: Any + Send + Sync,
    {
        self.inner.set(key, ErasedValue::new(value), duration);
    }

    // == Lookup ==
    /// Returns a copy of the `T` stored under `key`.
    ///
    /// Returns `Ok(None)` on a miss and an error if the key holds another type.
    pub fn lookup<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: Any + Clone,
    {
        self.inner
            .lookup(key)
            .map(|erased| erased.downcast(key))
            .transpose()
    }

    // == Get Or Compute ==
    /// Same contract as [`Cache::get_or_compute`], with a type check on hits.
    ///
    /// Loader errors are returned unchanged; a type mismatch is converted
    /// into the caller's error type and leaves `dest` untouched.
    pub fn get_or_compute<T, F, E>(
        &self,
        key: &str,
        dest: &mut T,
        duration: Duration,
        loader: F,
    ) -> std::result::Result<(), E>
    where
        T: Any + Send + Sync + Clone + Cacheable,
        F: FnOnce(&mut T) -> std::result::Result<(), E>,
        E: From<CacheError>,
    {
        self.inner.read_through(
            key,
            dest,
            duration,
            loader,
            |erased, dest| {
                *dest = erased.downcast(key)?;
                Ok(())
            },
            |dest| (!dest.is_vacant()).then(|| ErasedValue::new(dest.clone())),
        )
    }

    // == Flush ==
    /// Discards every entry.
    pub fn flush(&self) {
        self.inner.flush();
    }

    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the cache holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }

    /// Returns the configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        self.inner.config()
    }
}
