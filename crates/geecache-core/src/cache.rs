//! Thread-safe, lazily allocated wrapper around [`LruCache`].

use std::sync::{Mutex, MutexGuard};

use crate::byteview::ByteView;
use crate::lru::LruCache;

/// Point-in-time view of a [`ConcurrentCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub bytes: usize,
    /// Whether the backing LRU has been allocated yet.
    pub allocated: bool,
}

/// Serializes all access to one [`LruCache`] behind a single mutex.
///
/// `get` reorders the recency list, so reads are structural writes and a
/// reader/writer split would buy nothing. The LRU is only built on the first
/// `add`; a cache that never receives data allocates nothing.
#[derive(Debug)]
pub struct ConcurrentCache {
    cache_bytes: usize,
    lru: Mutex<Option<LruCache<ByteView>>>,
}

impl ConcurrentCache {
    pub fn new(cache_bytes: usize) -> Self {
        Self {
            cache_bytes,
            lru: Mutex::new(None),
        }
    }

    /// Byte budget handed to the LRU when it is built.
    pub fn cache_bytes(&self) -> usize {
        self.cache_bytes
    }

    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut guard = self.lock();
        let lru = guard.as_mut()?;
        lru.get(key).cloned()
    }

    pub fn add(&self, key: &str, value: ByteView) {
        let mut guard = self.lock();
        guard
            .get_or_insert_with(|| LruCache::new(self.cache_bytes))
            .add(key, value);
    }

    pub fn stats(&self) -> CacheStats {
        let guard = self.lock();
        match guard.as_ref() {
            Some(lru) => CacheStats {
                entries: lru.len(),
                bytes: lru.bytes(),
                allocated: true,
            },
            None => CacheStats::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<LruCache<ByteView>>> {
        self.lru
            .lock()
            .expect("cache mutex poisoned: LRU state may be inconsistent")
    }
}
