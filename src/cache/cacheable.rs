//! Cacheable Values
//!
//! Decides whether a freshly loaded value is worth storing.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

// == Cacheable Trait ==
/// A value that can be stored by `get_or_compute`.
///
/// After a loader succeeds, the populated destination is stored unless
/// [`is_vacant`](Cacheable::is_vacant) returns `true`. Sequence containers
/// report vacancy when empty so an empty answer is retried on the next call
/// instead of being cached. Everything else is stored, zero scalars included.
///
/// Types opt in with an empty impl:
///
/// ```
/// use cachely::Cacheable;
///
/// #[derive(Clone, Default)]
/// struct Profile {
///     name: String,
/// }
///
/// impl Cacheable for Profile {}
/// ```
pub trait Cacheable {
    /// Returns true when the value holds nothing worth caching.
    fn is_vacant(&self) -> bool {
        false
    }
}

// == Sequences ==
impl<T> Cacheable for Vec<T> {
    fn is_vacant(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Cacheable for VecDeque<T> {
    fn is_vacant(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Cacheable for Box<[T]> {
    fn is_vacant(&self) -> bool {
        self.is_empty()
    }
}

// == Always Stored ==
macro_rules! always_cacheable {
    ($($ty:ty),* $(,)?) => {
        $(impl Cacheable for $ty {})*
    };
}

always_cacheable!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    &'static str,
);

impl<T> Cacheable for Option<T> {}
impl<T> Cacheable for Arc<T> {}
impl<K, V, S> Cacheable for HashMap<K, V, S> {}
impl<T, S> Cacheable for HashSet<T, S> {}
impl<K, V> Cacheable for BTreeMap<K, V> {}
impl<T> Cacheable for BTreeSet<T> {}
