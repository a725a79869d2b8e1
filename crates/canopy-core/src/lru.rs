//! Fixed-capacity cache with LRU (Least Recently Used) eviction.
//!
//! [`LruCache`] keeps at most `capacity` entries. Reading an entry with
//! [`get`](LruCache::get) marks it most recently used; inserting into a full
//! cache evicts the least recently used entry.
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroUsize;
//! use canopy_core::LruCache;
//!
//! let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//!
//! // Touch "a" so "b" becomes the eviction candidate
//! assert_eq!(cache.get(&"a"), Some(&1));
//!
//! let evicted = cache.insert("c", 3);
//! assert_eq!(evicted, Some(("b", 2)));
//! assert!(cache.contains(&"a"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;

use crate::logging::targets;

/// Node in the LRU linked list.
struct LruNode<K> {
    prev: Option<K>,
    next: Option<K>,
}

/// A fixed-capacity key/value cache evicting the least recently used entry.
///
/// The value map and the recency list are kept in lock-step: every key in
/// one is in the other.
///
/// # Thread Safety
///
/// This cache is NOT thread-safe. Owners that share it wrap it in a lock.
pub struct LruCache<K, V> {
    /// Maximum number of entries.
    capacity: NonZeroUsize,
    /// Cached values by key.
    entries: HashMap<K, V>,
    /// LRU tracking: key -> node.
    lru_nodes: HashMap<K, LruNode<K>>,
    /// Head of LRU list (most recently used).
    lru_head: Option<K>,
    /// Tail of LRU list (least recently used).
    lru_tail: Option<K>,
    /// Statistics: number of cache hits.
    hits: u64,
    /// Statistics: number of cache misses.
    misses: u64,
    /// Statistics: number of evictions.
    evictions: u64,
}

impl<K: Clone + Eq + Hash, V> LruCache<K, V> {
    /// Creates an empty cache holding at most `capacity` entries.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            lru_nodes: HashMap::new(),
            lru_head: None,
            lru_tail: None,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Returns the maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    /// Changes the capacity, evicting least recently used entries until the
    /// new capacity is respected.
    pub fn set_capacity(&mut self, capacity: NonZeroUsize) {
        self.capacity = capacity;
        self.evict_to(capacity.get());
    }

    /// Returns the number of entries in the cache.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if the cache is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the cache hit count.
    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Returns the cache miss count.
    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Returns the cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Looks up a value and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.entries.contains_key(key) {
            self.hits += 1;
            self.lru_move_to_front(key.clone());
            self.entries.get(key)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Looks up a value without touching recency or statistics.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Checks if a key is cached (without updating LRU order).
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts a value as the most recently used entry.
    ///
    /// Replacing an existing key never evicts. Otherwise, when the cache is
    /// full, the least recently used entry is evicted and returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = value;
            self.lru_move_to_front(key);
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity.get() {
            self.pop_lru()
        } else {
            None
        };

        self.entries.insert(key.clone(), value);
        self.lru_push_front(key);
        evicted
    }

    /// Returns the value for `key`, inserting the result of `make` on a miss.
    ///
    /// The returned reference always points at the slot stored in the cache,
    /// after any eviction the insertion caused.
    pub fn get_or_insert_with<F>(&mut self, key: K, make: F) -> &V
    where
        F: FnOnce() -> V,
    {
        if self.entries.contains_key(&key) {
            self.hits += 1;
            self.lru_move_to_front(key.clone());
        } else {
            self.misses += 1;
            self.insert(key.clone(), make());
        }
        &self.entries[&key]
    }

    /// Removes an entry, returning its value if it existed.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.entries.remove(key)?;
        self.lru_remove(key);
        Some(value)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let tail = self.lru_tail.clone()?;
        let value = self.remove(&tail)?;
        self.evictions += 1;
        tracing::trace!(target: targets::CACHE, evictions = self.evictions, "evicted least recently used entry");
        Some((tail, value))
    }

    /// Clears all entries from the cache. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru_nodes.clear();
        self.lru_head = None;
        self.lru_tail = None;
    }

    /// Resets cache statistics.
    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            capacity: self.capacity.get(),
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            hit_rate: self.hit_rate(),
        }
    }

    /// Iterates keys from most to least recently used.
    pub fn keys_by_recency(&self) -> RecencyIter<'_, K, V> {
        RecencyIter {
            cache: self,
            cursor: self.lru_head.as_ref(),
        }
    }

    fn evict_to(&mut self, len: usize) {
        while self.entries.len() > len {
            if self.pop_lru().is_none() {
                break;
            }
        }
    }

    // ========================================================================
    // LRU LIST OPERATIONS
    // ========================================================================

    /// Push a key to the front of the LRU list.
    fn lru_push_front(&mut self, key: K) {
        let node = LruNode {
            prev: None,
            next: self.lru_head.clone(),
        };

        if let Some(old_head) = &self.lru_head
            && let Some(old_node) = self.lru_nodes.get_mut(old_head)
        {
            old_node.prev = Some(key.clone());
        }

        if self.lru_tail.is_none() {
            self.lru_tail = Some(key.clone());
        }

        self.lru_head = Some(key.clone());
        self.lru_nodes.insert(key, node);
    }

    /// Move a key to the front of the LRU list.
    fn lru_move_to_front(&mut self, key: K) {
        if self.lru_head.as_ref() == Some(&key) {
            return;
        }
        self.lru_remove(&key);
        self.lru_push_front(key);
    }

    /// Remove a key from the LRU list.
    fn lru_remove(&mut self, key: &K) {
        let Some(node) = self.lru_nodes.remove(key) else {
            return;
        };

        match &node.prev {
            Some(prev_key) => {
                if let Some(prev_node) = self.lru_nodes.get_mut(prev_key) {
                    prev_node.next = node.next.clone();
                }
            }
            None => self.lru_head = node.next.clone(),
        }

        match &node.next {
            Some(next_key) => {
                if let Some(next_node) = self.lru_nodes.get_mut(next_key) {
                    next_node.prev = node.prev.clone();
                }
            }
            None => self.lru_tail = node.prev.clone(),
        }
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.hits + self.misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        };
        f.debug_struct("LruCache")
            .field("entries", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("hit_rate", &format!("{:.1}%", hit_rate * 100.0))
            .finish()
    }
}

/// Iterator over cache keys, most recently used first.
pub struct RecencyIter<'a, K, V> {
    cache: &'a LruCache<K, V>,
    cursor: Option<&'a K>,
}

impl<'a, K: Eq + Hash, V> Iterator for RecencyIter<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cursor?;
        self.cursor = self.cache.lru_nodes.get(key).and_then(|n| n.next.as_ref());
        Some(key)
    }
}

/// Statistics about an [`LruCache`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    /// Number of entries in the cache.
    pub entries: usize,
    /// Maximum number of entries.
    pub capacity: usize,
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries evicted to make room.
    pub evictions: u64,
    /// Cache hit rate (0.0 to 1.0).
    pub hit_rate: f64,
}
