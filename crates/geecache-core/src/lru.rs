//! Byte-budgeted LRU structure.
//!
//! Entries live in a dense arena (`Vec`) and are threaded into a doubly linked
//! recency list through `prev`/`next` indices. A `HashMap` maps each key to
//! its arena slot. Removing an entry `swap_remove`s its slot and re-links the
//! entry that moved into the hole, so the arena never has gaps.
//!
//! `LruCache` is not synchronized; see [`crate::cache::ConcurrentCache`].

use std::collections::HashMap;
use std::fmt;

/// Size-reporting capability for cached values.
pub trait Value {
    /// Bytes this value accounts for against the budget.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Value for String {
    fn len(&self) -> usize {
        self.as_bytes().len()
    }
}

impl Value for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }
}

/// Callback fired with each entry removed for capacity.
pub type EvictionCallback<V> = Box<dyn FnMut(String, V) + Send>;

struct Entry<V> {
    key: String,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// LRU cache bounded by `len(key) + value.len()` summed over entries.
pub struct LruCache<V> {
    /// 0 means unbounded.
    max_bytes: usize,
    nbytes: usize,
    slots: Vec<Entry<V>>,
    index: HashMap<String, usize>,
    /// Most recently used.
    head: Option<usize>,
    /// Least recently used.
    tail: Option<usize>,
    on_evicted: Option<EvictionCallback<V>>,
}

impl<V: Value> LruCache<V> {
    /// Create a cache holding at most `max_bytes` (0 = unbounded).
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            nbytes: 0,
            slots: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            on_evicted: None,
        }
    }

    /// Create a cache that reports every capacity-driven removal to `on_evicted`.
    pub fn with_eviction_callback<F>(max_bytes: usize, on_evicted: F) -> Self
    where
        F: FnMut(String, V) + Send + 'static,
    {
        let mut cache = Self::new(max_bytes);
        cache.on_evicted = Some(Box::new(on_evicted));
        cache
    }

    /// Look up a key, marking it most recently used on hit.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        Some(&self.slots[idx].value)
    }

    /// Look up a key without changing its recency.
    pub fn peek(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&idx| &self.slots[idx].value)
    }

    /// Insert or replace a value, then evict until the budget holds.
    ///
    /// An entry larger than the whole budget is inserted and then evicted by
    /// the same pass.
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        if let Some(&idx) = self.index.get(&key) {
            self.move_to_front(idx);
            let entry = &mut self.slots[idx];
            self.nbytes = self.nbytes - entry.value.len() + value.len();
            entry.value = value;
        } else {
            let idx = self.slots.len();
            self.nbytes += key.len() + value.len();
            self.index.insert(key.clone(), idx);
            self.slots.push(Entry {
                key,
                value,
                prev: None,
                next: None,
            });
            self.push_front(idx);
        }

        while self.max_bytes != 0 && self.nbytes > self.max_bytes {
            self.remove_oldest();
        }
    }

    /// Remove the least recently used entry, if any.
    pub fn remove_oldest(&mut self) {
        let Some(idx) = self.tail else {
            return;
        };
        self.detach(idx);
        let entry = self.remove_slot(idx);
        self.index.remove(&entry.key);
        self.nbytes -= entry.key.len() + entry.value.len();

        if let Some(on_evicted) = self.on_evicted.as_mut() {
            on_evicted(entry.key, entry.value);
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Bytes currently accounted (keys plus values).
    pub fn bytes(&self) -> usize {
        self.nbytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        std::iter::successors(self.head, move |&idx| self.slots[idx].next)
            .map(move |idx| self.slots[idx].key.as_str())
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.detach(idx);
        self.push_front(idx);
    }

    fn push_front(&mut self, idx: usize) {
        self.slots[idx].prev = None;
        self.slots[idx].next = self.head;
        match self.head {
            Some(head) => self.slots[head].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
        self.slots[idx].prev = None;
        self.slots[idx].next = None;
    }

    // Caller must have detached `idx` already.
    fn remove_slot(&mut self, idx: usize) -> Entry<V> {
        let entry = self.slots.swap_remove(idx);
        if idx < self.slots.len() {
            let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);
            match prev {
                Some(p) => self.slots[p].next = Some(idx),
                None => self.head = Some(idx),
            }
            match next {
                Some(n) => self.slots[n].prev = Some(idx),
                None => self.tail = Some(idx),
            }
            if let Some(slot) = self.index.get_mut(&self.slots[idx].key) {
                *slot = idx;
            }
        }
        entry
    }
}

impl<V> fmt::Debug for LruCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("max_bytes", &self.max_bytes)
            .field("nbytes", &self.nbytes)
            .field("len", &self.slots.len())
            .field("has_eviction_callback", &self.on_evicted.is_some())
            .finish()
    }
}
