//! Single-Flight Gate
//!
//! Lets at most one caller per key run a loader at a time.

use std::collections::HashSet;

use parking_lot::{Condvar, Mutex};

/// Registry of keys whose loaders are currently running.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    keys: Mutex<HashSet<String>>,
    released: Condvar,
}

impl InFlight {
    /// Blocks until no other caller holds `key`, then claims it.
    ///
    /// The claim is released when the returned guard is dropped, including
    /// during unwinding from a panicking loader.
    pub(crate) fn acquire(&self, key: &str) -> FlightGuard<'_> {
        let mut keys = self.keys.lock();
        while keys.contains(key) {
            self.released.wait(&mut keys);
        }
        keys.insert(key.to_owned());

        FlightGuard {
            registry: self,
            key: key.to_owned(),
        }
    }

    #[cfg(test)]
    fn is_claimed(&self, key: &str) -> bool {
        self.keys.lock().contains(key)
    }
}

/// Exclusive claim on one key, released on drop.
#[derive(Debug)]
pub(crate) struct FlightGuard<'a> {
    registry: &'a InFlight,
    key: String,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.registry.keys.lock().remove(&self.key);
        self.registry.released.notify_all();
    }
}
