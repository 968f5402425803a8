//! Bounded recency list of selected keys, most recent first.
//! Capacity 20; re-adding an existing key moves it to the front instead of
//! duplicating it. The caller shows this list when there is no active query.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

/// How many keys the list retains.
pub const RECENT_CAPACITY: usize = 20;

pub struct RecentList {
    inner: Mutex<LruCache<String, ()>>,
}

impl RecentList {
    pub fn new() -> Self {
        Self::with_capacity(RECENT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).expect("recent capacity must be > 0"),
            )),
        }
    }

    /// Record a selection. An existing key moves to the front; overflow
    /// evicts the least recently added key.
    pub fn add(&self, key: &str) {
        self.inner.lock().put(key.to_string(), ());
    }

    /// Independent copy of the list, most recent first. Never hands out a
    /// live reference; a concurrent `add` cannot race a reader.
    pub fn snapshot(&self) -> Vec<String> {
        self.inner.lock().iter().map(|(key, _)| key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for RecentList {
    fn default() -> Self {
        Self::new()
    }
}
