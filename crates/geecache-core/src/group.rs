//! Cache-aside groups.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::byteview::ByteView;
use crate::cache::ConcurrentCache;
use crate::error::{CacheError, CacheResult};
use crate::loader::Loader;

/// Counters for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupStats {
    /// Calls to `get` with a non-empty key.
    pub gets: u64,
    pub hits: u64,
    /// Loader invocations.
    pub loads: u64,
    pub load_errors: u64,
    pub cache_entries: usize,
    pub cache_bytes: usize,
}

#[derive(Debug, Default)]
struct Counters {
    gets: AtomicU64,
    hits: AtomicU64,
    loads: AtomicU64,
    load_errors: AtomicU64,
}

/// A named cache namespace backed by a loader.
///
/// Created through [`crate::Registry`]. Concurrent misses on the same key
/// each call the loader; there is no in-flight deduplication.
pub struct Group {
    name: String,
    loader: Arc<dyn Loader>,
    main_cache: ConcurrentCache,
    counters: Counters,
}

impl Group {
    pub(crate) fn new(name: String, cache_bytes: usize, loader: Arc<dyn Loader>) -> Self {
        Self {
            name,
            loader,
            main_cache: ConcurrentCache::new(cache_bytes),
            counters: Counters::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte budget of the group's cache.
    pub fn cache_bytes(&self) -> usize {
        self.main_cache.cache_bytes()
    }

    /// Return the value for `key`, loading and caching it on a miss.
    ///
    /// The loader runs without any cache lock held.
    pub fn get(&self, key: &str) -> CacheResult<ByteView> {
        if key.is_empty() {
            return Err(CacheError::InvalidArgument {
                message: "key is required".to_string(),
            });
        }
        self.counters.gets.fetch_add(1, Ordering::Relaxed);

        if let Some(view) = self.main_cache.get(key) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            debug!(group = %self.name, key, "cache hit");
            return Ok(view);
        }

        debug!(group = %self.name, key, "cache miss");
        self.load(key)
    }

    pub fn stats(&self) -> GroupStats {
        let cache = self.main_cache.stats();
        GroupStats {
            gets: self.counters.gets.load(Ordering::Relaxed),
            hits: self.counters.hits.load(Ordering::Relaxed),
            loads: self.counters.loads.load(Ordering::Relaxed),
            load_errors: self.counters.load_errors.load(Ordering::Relaxed),
            cache_entries: cache.entries,
            cache_bytes: cache.bytes,
        }
    }

    fn load(&self, key: &str) -> CacheResult<ByteView> {
        self.counters.loads.fetch_add(1, Ordering::Relaxed);
        let bytes = match self.loader.load(key) {
            Ok(bytes) => bytes,
            Err(source) => {
                self.counters.load_errors.fetch_add(1, Ordering::Relaxed);
                warn!(group = %self.name, key, error = %source, "loader failed");
                return Err(CacheError::Load {
                    key: key.to_string(),
                    source,
                });
            }
        };

        let value = ByteView::new(&bytes);
        self.populate_cache(key, value.clone());
        debug!(group = %self.name, key, bytes = value.len(), "loaded from source");
        Ok(value)
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.add(key, value);
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("main_cache", &self.main_cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_loader(
        calls: Arc<AtomicUsize>,
    ) -> impl Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync {
        move |key: &str| -> anyhow::Result<Vec<u8>> {
            calls.fetch_add(1, Ordering::SeqCst);
            match key {
                "a" => Ok(b"hello".to_vec()),
                _ => anyhow::bail!("not found"),
            }
        }
    }

    fn group_with(calls: &Arc<AtomicUsize>, cache_bytes: usize) -> Group {
        Group::new(
            "scores".to_string(),
            cache_bytes,
            Arc::new(counting_loader(Arc::clone(calls))),
        )
    }

    #[test]
    fn empty_key_is_rejected_without_loading() {
        let calls = Arc::new(AtomicUsize::new(0));
        let group = group_with(&calls, 0);

        let err = group.get("").unwrap_err();
        assert!(matches!(err, CacheError::InvalidArgument { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(group.stats().gets, 0);
    }

    #[test]
    fn miss_loads_once_then_hits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let group = group_with(&calls, 0);

        assert_eq!(group.get("a").unwrap().to_string(), "hello");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(group.get("a").unwrap().to_string(), "hello");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = group.stats();
        assert_eq!((stats.gets, stats.hits, stats.loads), (2, 1, 1));
        assert_eq!(stats.cache_entries, 1);
        assert_eq!(stats.cache_bytes, "a".len() + "hello".len());
    }

    #[test]
    fn loader_error_is_propagated_and_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let group = group_with(&calls, 0);

        let err = group.get("missing").unwrap_err();
        match &err {
            CacheError::Load { key, source } => {
                assert_eq!(key, "missing");
                assert_eq!(source.to_string(), "not found");
            }
            other => panic!("expected load error, got {other:?}"),
        }
        assert_eq!(group.stats().cache_entries, 0);

        // No negative caching: the loader is asked again.
        assert!(group.get("missing").is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(group.stats().load_errors, 2);
    }

    #[test]
    fn loaded_value_is_isolated_from_loader_buffer() {
        let shared = Arc::new(std::sync::Mutex::new(b"v1".to_vec()));
        let source = Arc::clone(&shared);
        let group = Group::new(
            "g".to_string(),
            0,
            Arc::new(move |_key: &str| -> anyhow::Result<Vec<u8>> {
                Ok(source.lock().unwrap().clone())
            }),
        );

        let first = group.get("k").unwrap();
        shared.lock().unwrap()[1] = b'2';
        let mut copy = first.byte_slice();
        copy[0] = b'x';

        assert_eq!(group.get("k").unwrap().to_string(), "v1");
    }

    #[test]
    fn oversized_value_is_returned_but_not_retained() {
        let calls = Arc::new(AtomicUsize::new(0));
        let group = group_with(&calls, 3);

        assert_eq!(group.get("a").unwrap().to_string(), "hello");
        assert_eq!(group.stats().cache_entries, 0);
        assert_eq!(group.get("a").unwrap().to_string(), "hello");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
