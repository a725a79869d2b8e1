//! Sort criteria and the two child-sorting algorithms.
//!
//! A sort is described by an ordered sequence of [`SortFilter`]s. The first
//! filter decides unless its field compares equal, in which case the next one
//! is consulted, and so on. Items equal on every active filter keep their
//! original relative order: the original position is an explicit final
//! tie-break rather than a property of the underlying sort routine.
//!
//! Two algorithms trade model queries against memory:
//!
//! | Algorithm | Model queries | Extra memory |
//! |-----------|---------------|--------------|
//! | [`SortAlgorithm::Fast`] | one `data` call per item and field | `items × fields` values |
//! | [`SortAlgorithm::MemoryEfficient`] | one `compare` call per comparison | one position tag per item |

use std::cmp::Ordering;

use canopy_core::logging::targets;
use canopy_core::{ItemId, PerfSpan};
use smallvec::SmallVec;

use super::data::{ItemData, compare_item_data};
use super::traits::ItemModel;

/// Direction of one sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortOrder {
    /// Smallest values first.
    #[default]
    Ascending,
    /// Largest values first.
    Descending,
    /// Inert; the filter does not take part in sorting.
    None,
}

impl SortOrder {
    /// Applies this direction to an ascending comparison result.
    #[inline]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
            SortOrder::None => Ordering::Equal,
        }
    }
}

/// One sort key: a field and a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortFilter {
    /// Field (column) the key reads.
    pub field: usize,
    /// Direction of the key.
    pub order: SortOrder,
}

impl SortFilter {
    /// Creates a sort key.
    pub const fn new(field: usize, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Ascending key on `field`.
    pub const fn ascending(field: usize) -> Self {
        Self::new(field, SortOrder::Ascending)
    }

    /// Descending key on `field`.
    pub const fn descending(field: usize) -> Self {
        Self::new(field, SortOrder::Descending)
    }

    /// Returns `false` for inert (`SortOrder::None`) keys.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.order != SortOrder::None
    }
}

/// Strategy used when a model cannot sort natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortAlgorithm {
    /// Extract every sort value once, then compare extracted values.
    #[default]
    Fast,
    /// Call back into the model for every comparison.
    MemoryEfficient,
}

/// Active keys of a filter sequence, in priority order.
pub(crate) type ActiveFilters = SmallVec<[SortFilter; 4]>;

/// Returns the active keys of `filters`, in priority order.
pub(crate) fn active_filters(filters: &[SortFilter]) -> ActiveFilters {
    filters.iter().copied().filter(SortFilter::is_active).collect()
}

/// Returns `true` if no key of `filters` would reorder anything.
pub fn is_noop(filters: &[SortFilter]) -> bool {
    !filters.iter().any(SortFilter::is_active)
}

/// Sorts `items` by values produced by `value_of(item, field)`.
///
/// Each value is requested exactly once per item and active field.
pub fn sort_by_values<F>(items: &mut [ItemId], filters: &[SortFilter], mut value_of: F)
where
    F: FnMut(&ItemId, usize) -> ItemData,
{
    let active = active_filters(filters);
    if active.is_empty() || items.len() < 2 {
        return;
    }

    let key_count = active.len();
    let mut values = Vec::with_capacity(items.len() * key_count);
    for item in items.iter() {
        for filter in &active {
            values.push(value_of(item, filter.field));
        }
    }

    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_unstable_by(|&a, &b| {
        for (key, filter) in active.iter().enumerate() {
            let ordering = filter.order.apply(compare_item_data(
                &values[a * key_count + key],
                &values[b * key_count + key],
            ));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        a.cmp(&b)
    });

    let sorted: Vec<ItemId> = order.iter().map(|&position| items[position]).collect();
    items.copy_from_slice(&sorted);
}

/// Sorts `items` with extracted values (see [`SortAlgorithm::Fast`]).
pub fn fast_sort<M>(model: &M, items: &mut [ItemId], filters: &[SortFilter])
where
    M: ItemModel + ?Sized,
{
    let _span = PerfSpan::new("fast_sort");
    tracing::debug!(target: targets::SORT, len = items.len(), keys = filters.len(), "fast sort");
    sort_by_values(items, filters, |item, field| model.data(item, field));
}

/// Sorts `items` through [`ItemModel::compare`] (see
/// [`SortAlgorithm::MemoryEfficient`]).
pub fn memory_efficient_sort<M>(model: &M, items: &mut [ItemId], filters: &[SortFilter])
where
    M: ItemModel + ?Sized,
{
    let active = active_filters(filters);
    if active.is_empty() || items.len() < 2 {
        return;
    }

    let _span = PerfSpan::new("memory_efficient_sort");
    tracing::debug!(target: targets::SORT, len = items.len(), keys = active.len(), "memory-efficient sort");

    let mut tagged: Vec<(usize, ItemId)> = items.iter().copied().enumerate().collect();
    tagged.sort_unstable_by(|(pos_a, a), (pos_b, b)| {
        for filter in &active {
            let ordering = filter.order.apply(model.compare(a, b, filter.field));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        pos_a.cmp(pos_b)
    });

    for (slot, (_, item)) in items.iter_mut().zip(tagged) {
        *slot = item;
    }
}

/// Sorts `items` with the given algorithm.
pub fn sort_items<M>(model: &M, items: &mut [ItemId], filters: &[SortFilter], algorithm: SortAlgorithm)
where
    M: ItemModel + ?Sized,
{
    match algorithm {
        SortAlgorithm::Fast => fast_sort(model, items, filters),
        SortAlgorithm::MemoryEfficient => memory_efficient_sort(model, items, filters),
    }
}
