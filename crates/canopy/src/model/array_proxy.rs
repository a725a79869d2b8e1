//! Proxies that materialize and cache child arrays.
//!
//! An [`ArrayProxyModel`] sits on top of one upstream model and answers
//! every child query from a per-parent array of upstream ids. How that
//! array is produced is delegated to a [`ChildArranger`]: the identity
//! ([`Passthrough`]), a sort ([`Sorter`](super::Sorter)) or a filter
//! ([`ItemFilter`](super::ItemFilter)). Arrays are kept in a bounded
//! [`LruCache`] keyed by parent, subject to [`ArrayProxyConfig`]. Parents
//! are keyed by item, so every column of a parent shares one entry.
//!
//! Because [`ItemModel::all_children`] is the building block of every
//! derived navigation operation, sibling lookups, descendant walks and
//! rank queries on a proxy are all served from the cached arrays.
//!
//! # Invalidation
//!
//! The proxy cannot observe upstream edits. After a structural change the
//! owner calls [`ItemModel::invalidate`] or
//! [`ItemModel::invalidate_children`] on the outermost proxy; both clear
//! this layer, including its memo of visible counts, and forward down the
//! chain.

use std::num::NonZeroUsize;
use std::sync::Arc;

use canopy_core::logging::targets;
use canopy_core::{CacheStats, ItemId, LruCache, ModelError, ModelId, ModelResult};
use parking_lot::{Mutex, RwLock};

use super::data::ItemData;
use super::rank::{VisibleCounts, push_with_ancestors};
use super::sort::SortFilter;
use super::traits::{ItemFlags, ItemModel};

/// Default maximum number of cached parents.
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Default smallest child count worth caching.
pub const DEFAULT_MIN_CHILDREN_FOR_CACHING: usize = 5;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(DEFAULT_CACHE_CAPACITY) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// Caching policy of an [`ArrayProxyModel`].
///
/// # Example
///
/// ```
/// use canopy::model::ArrayProxyConfig;
///
/// let config = ArrayProxyConfig::new()
///     .with_capacity(256)
///     .with_min_children_for_caching(0)
///     .with_max_children_for_caching(Some(50_000));
///
/// assert!(config.validate().is_ok());
/// assert!(config.should_cache(0));
/// assert!(!config.should_cache(50_001));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArrayProxyConfig {
    /// Maximum number of cached parents.
    pub capacity: usize,
    /// Arrays shorter than this are never cached.
    pub min_children_for_caching: usize,
    /// Arrays longer than this are never cached; `None` means unbounded.
    pub max_children_for_caching: Option<usize>,
}

impl Default for ArrayProxyConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            min_children_for_caching: DEFAULT_MIN_CHILDREN_FOR_CACHING,
            max_children_for_caching: None,
        }
    }
}

impl ArrayProxyConfig {
    /// Creates the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of cached parents.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the smallest child count worth caching.
    #[must_use]
    pub fn with_min_children_for_caching(mut self, min: usize) -> Self {
        self.min_children_for_caching = min;
        self
    }

    /// Sets the largest child count that is cached.
    #[must_use]
    pub fn with_max_children_for_caching(mut self, max: Option<usize>) -> Self {
        self.max_children_for_caching = max;
        self
    }

    /// Checks the policy and returns the cache capacity.
    pub fn validate(&self) -> ModelResult<NonZeroUsize> {
        if let Some(max) = self.max_children_for_caching
            && max < self.min_children_for_caching
        {
            return Err(ModelError::InvalidCachingBounds {
                min: self.min_children_for_caching,
                max,
            });
        }
        NonZeroUsize::new(self.capacity).ok_or(ModelError::InvalidCapacity)
    }

    /// Returns `true` if an array of `len` children may be cached.
    #[inline]
    pub fn should_cache(&self, len: usize) -> bool {
        len >= self.min_children_for_caching
            && self.max_children_for_caching.is_none_or(|max| len <= max)
    }
}

/// Produces the child array an [`ArrayProxyModel`] serves for a parent.
///
/// The sort hooks default to forwarding to the source, so a proxy that
/// does not reorder anything stays transparent to sorting further up the
/// chain.
pub trait ChildArranger<S: ItemModel + ?Sized>: Send + Sync {
    /// Returns the children of `parent`, as ids of `source`.
    fn arrange_children(&self, source: &S, parent: &ItemId) -> Vec<ItemId>;

    /// Reports whether [`sort`](Self::sort) can honor `filters`.
    fn can_sort(&self, source: &S, filters: &[SortFilter]) -> bool {
        source.can_sort(filters)
    }

    /// Sorts `items` (children of `parent`) in place.
    fn sort(&self, source: &S, parent: &ItemId, items: &mut [ItemId], filters: &[SortFilter]) -> bool {
        source.sort(parent, items, filters)
    }
}

/// Arranger that keeps upstream order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl<S: ItemModel + ?Sized> ChildArranger<S> for Passthrough {
    fn arrange_children(&self, source: &S, parent: &ItemId) -> Vec<ItemId> {
        source.all_children(parent).to_vec()
    }
}

/// A proxy that serves child arrays produced by an arranger `A` from an
/// LRU cache.
///
/// Item identity is never rewritten: every id handed out is an id of the
/// source, and [`model_id`](ItemModel::model_id) is the source's.
pub struct ArrayProxyModel<S: ?Sized, A> {
    source: RwLock<Arc<S>>,
    arranger: RwLock<A>,
    config: RwLock<ArrayProxyConfig>,
    cache: Mutex<LruCache<ItemId, Arc<[ItemId]>>>,
    visible_counts: VisibleCounts,
}

/// A proxy that only caches; children keep upstream order.
pub type CachingProxyModel<S> = ArrayProxyModel<S, Passthrough>;

impl<S, A> ArrayProxyModel<S, A>
where
    S: ItemModel + ?Sized,
    A: ChildArranger<S>,
{
    /// Creates a proxy over `source` with the default caching policy.
    pub fn new(source: Arc<S>, arranger: A) -> Self {
        Self {
            source: RwLock::new(source),
            arranger: RwLock::new(arranger),
            config: RwLock::new(ArrayProxyConfig::default()),
            cache: Mutex::new(LruCache::new(DEFAULT_CAPACITY)),
            visible_counts: VisibleCounts::new(DEFAULT_CAPACITY),
        }
    }

    /// Creates a proxy over `source` with a default-constructed arranger.
    pub fn from_source(source: Arc<S>) -> Self
    where
        A: Default,
    {
        Self::new(source, A::default())
    }

    /// Replaces the caching policy.
    pub fn with_config(self, config: ArrayProxyConfig) -> ModelResult<Self> {
        self.set_config(config)?;
        Ok(self)
    }

    /// Returns the caching policy.
    pub fn config(&self) -> ArrayProxyConfig {
        self.config.read().clone()
    }

    /// Replaces the caching policy.
    ///
    /// Shrinking the capacity evicts least recently used entries. Changing
    /// the size thresholds clears the cache. The capacity also bounds the
    /// memo of visible counts.
    pub fn set_config(&self, config: ArrayProxyConfig) -> ModelResult<()> {
        let capacity = config.validate()?;
        let mut current = self.config.write();
        let thresholds_changed = current.min_children_for_caching != config.min_children_for_caching
            || current.max_children_for_caching != config.max_children_for_caching;
        *current = config;
        drop(current);

        let mut cache = self.cache.lock();
        cache.set_capacity(capacity);
        if thresholds_changed {
            cache.clear();
        }
        drop(cache);
        self.visible_counts.set_capacity(capacity);
        Ok(())
    }

    /// Returns the upstream model.
    pub fn source(&self) -> Arc<S> {
        self.source.read().clone()
    }

    /// Attaches a different upstream model and clears the cache.
    pub fn set_source(&self, source: Arc<S>) {
        *self.source.write() = source;
        self.clear_cache();
    }

    /// Runs `f` with the arranger.
    pub fn with_arranger<R>(&self, f: impl FnOnce(&A) -> R) -> R {
        f(&self.arranger.read())
    }

    /// Mutates the arranger and clears the cache.
    pub fn update_arranger<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        let result = f(&mut self.arranger.write());
        self.clear_cache();
        result
    }

    /// Drops every cached array and memoized count of this layer only.
    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock();
        tracing::debug!(target: targets::CACHE, entries = cache.len(), "clearing child array cache");
        cache.clear();
        drop(cache);
        self.visible_counts.clear();
    }

    /// Returns `true` if the children of `parent` are currently cached.
    pub fn is_cached(&self, parent: &ItemId) -> bool {
        self.cache.lock().contains(&parent.with_column(0))
    }

    /// Returns the cached parents, most recently used first.
    pub fn cached_parents(&self) -> Vec<ItemId> {
        self.cache.lock().keys_by_recency().copied().collect()
    }

    /// Returns cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }

    /// Resets the hit and miss counters.
    pub fn reset_cache_stats(&self) {
        self.cache.lock().reset_stats();
    }

    fn children(&self, parent: &ItemId) -> Arc<[ItemId]> {
        if !parent.is_parent_candidate() {
            return Arc::from(Vec::new());
        }

        let key = parent.with_column(0);
        let hit = self.cache.lock().get(&key).cloned();
        if let Some(children) = hit {
            tracing::trace!(target: targets::CACHE, ?parent, "child array cache hit");
            return children;
        }

        // The cache lock is released while upstream runs
        let source = self.source();
        let children: Arc<[ItemId]> = self
            .arranger
            .read()
            .arrange_children(&source, &key)
            .into();
        tracing::trace!(target: targets::CACHE, ?parent, len = children.len(), "child array cache miss");

        if self.config.read().should_cache(children.len()) {
            self.cache.lock().insert(key, Arc::clone(&children));
        }
        children
    }
}

impl<S, A> ItemModel for ArrayProxyModel<S, A>
where
    S: ItemModel + ?Sized,
    A: ChildArranger<S>,
{
    fn model_id(&self) -> ModelId {
        self.source().model_id()
    }

    fn child_count(&self, parent: &ItemId) -> usize {
        self.children(parent).len()
    }

    fn child(&self, parent: &ItemId, index: usize) -> ItemId {
        self.children(parent)
            .get(index)
            .copied()
            .unwrap_or_else(ItemId::invalid)
    }

    fn parent(&self, item: &ItemId) -> ItemId {
        self.source().parent(item)
    }

    fn column_count(&self) -> usize {
        self.source().column_count()
    }

    fn data(&self, item: &ItemId, field: usize) -> ItemData {
        self.source().data(item, field)
    }

    fn set_data(&self, item: &ItemId, field: usize, value: ItemData) -> bool {
        self.source().set_data(item, field, value)
    }

    fn flags(&self, item: &ItemId) -> ItemFlags {
        self.source().flags(item)
    }

    fn has_children(&self, item: &ItemId) -> bool {
        !self.children(item).is_empty()
    }

    fn all_children(&self, parent: &ItemId) -> Arc<[ItemId]> {
        self.children(parent)
    }

    fn compare(&self, a: &ItemId, b: &ItemId, field: usize) -> std::cmp::Ordering {
        self.source().compare(a, b, field)
    }

    fn can_sort(&self, filters: &[SortFilter]) -> bool {
        let source = self.source();
        self.arranger.read().can_sort(&source, filters)
    }

    fn sort(&self, parent: &ItemId, items: &mut [ItemId], filters: &[SortFilter]) -> bool {
        let source = self.source();
        self.arranger.read().sort(&source, parent, items, filters)
    }

    fn invalidate(&self) {
        self.clear_cache();
        self.source().invalidate();
    }

    fn invalidate_children(&self, parent: &ItemId) {
        self.cache.lock().remove(&parent.with_column(0));
        let mut stale = Vec::new();
        push_with_ancestors(self, parent, &mut stale);
        self.visible_counts.forget(&stale);
        self.source().invalidate_children(parent);
    }

    fn visible_counts(&self) -> Option<&VisibleCounts> {
        Some(&self.visible_counts)
    }
}

impl<S: ?Sized, A> std::fmt::Debug for ArrayProxyModel<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayProxyModel")
            .field("config", &*self.config.read())
            .field("cache", &self.cache.lock().stats())
            .finish_non_exhaustive()
    }
}
