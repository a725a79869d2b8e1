//! Core traits for hierarchical models.
//!
//! This module defines [`ItemModel`], the contract every model implements,
//! whether it stores data itself or wraps another model as a proxy.

use std::cmp::Ordering;
use std::sync::Arc;

use canopy_core::{ItemId, ModelId};

use super::data::{ItemData, compare_item_data};
use super::rank::VisibleCounts;
use super::sort::SortFilter;

/// What a view may do with an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFlags {
    /// Item can be selected.
    pub selectable: bool,
    /// Item can be edited.
    pub editable: bool,
    /// Item is enabled.
    pub enabled: bool,
    /// Item never has children, so a view can skip the expander.
    pub never_has_children: bool,
}

impl ItemFlags {
    /// Selectable and enabled.
    pub fn new() -> Self {
        Self {
            selectable: true,
            enabled: true,
            ..Default::default()
        }
    }

    /// Flags reported for ids the model does not recognise.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Selectable, enabled and editable.
    pub fn editable() -> Self {
        Self {
            editable: true,
            ..Self::new()
        }
    }

    /// Sets the never-has-children flag.
    pub fn with_never_has_children(mut self, leaf: bool) -> Self {
        self.never_has_children = leaf;
        self
    }
}

/// The core trait for hierarchical models.
///
/// `ItemModel` exposes a tree one level at a time: how many children a
/// parent has, the child at a position, and the parent of an item. The
/// top of the hierarchy is [`ItemId::root()`]; it is never returned as a
/// child.
///
/// # Implementation Requirements
///
/// At minimum, you must implement:
/// - [`model_id`](ItemModel::model_id) - Identity stamped on produced ids
/// - [`child_count`](ItemModel::child_count) - Number of children under a parent
/// - [`child`](ItemModel::child) - The child at a position
/// - [`parent`](ItemModel::parent) - The parent of an item
/// - [`column_count`](ItemModel::column_count) - Number of fields per item
/// - [`data`](ItemModel::data) - The value of one field
///
/// Everything else has a default built on those. In particular
/// [`all_children`](ItemModel::all_children) materializes a parent's
/// children one call at a time; proxies override it to serve cached arrays,
/// and every derived navigation operation goes through it.
///
/// # Failure Semantics
///
/// Methods never panic on bad input. An invalid, foreign or stale id yields
/// [`ItemId::invalid()`], a zero count, `None` or `false`.
///
/// # Example
///
/// ```
/// use canopy::model::{ItemData, ItemModel};
/// use canopy_core::{ItemId, ModelId, NativeId};
///
/// struct Numbers {
///     id: ModelId,
///     values: Vec<i64>,
/// }
///
/// impl ItemModel for Numbers {
///     fn model_id(&self) -> ModelId {
///         self.id
///     }
///
///     fn child_count(&self, parent: &ItemId) -> usize {
///         if parent.is_root() { self.values.len() } else { 0 }
///     }
///
///     fn child(&self, parent: &ItemId, index: usize) -> ItemId {
///         if parent.is_root() && index < self.values.len() {
///             ItemId::new(NativeId::Pointer(index), index, 0, self.id)
///         } else {
///             ItemId::invalid()
///         }
///     }
///
///     fn parent(&self, item: &ItemId) -> ItemId {
///         if item.belongs_to(self.id) { ItemId::root() } else { ItemId::invalid() }
///     }
///
///     fn column_count(&self) -> usize {
///         1
///     }
///
///     fn data(&self, item: &ItemId, _field: usize) -> ItemData {
///         match item.native() {
///             Some(NativeId::Pointer(i)) if item.belongs_to(self.id) => {
///                 self.values.get(i).copied().map(ItemData::from).unwrap_or_default()
///             }
///             _ => ItemData::None,
///         }
///     }
/// }
///
/// let model = Numbers { id: ModelId::next(), values: vec![3, 1, 2] };
/// let second = model.child(&ItemId::root(), 1);
/// assert_eq!(model.data(&second, 0).as_int(), Some(1));
/// assert_eq!(model.child_index(&second), Some(1));
/// ```
pub trait ItemModel: Send + Sync {
    /// Returns the identity this model stamps on the ids it produces.
    ///
    /// Proxies return their source's identity because they hand out the
    /// source's ids unchanged.
    fn model_id(&self) -> ModelId;

    /// Returns the number of children under `parent`.
    ///
    /// Pass [`ItemId::root()`] for top-level items.
    fn child_count(&self, parent: &ItemId) -> usize;

    /// Returns the child at `index` under `parent`, or an invalid id when
    /// the position is out of range.
    fn child(&self, parent: &ItemId, index: usize) -> ItemId;

    /// Returns the parent of `item`.
    ///
    /// Top-level items return [`ItemId::root()`]; invalid or foreign ids
    /// return [`ItemId::invalid()`].
    fn parent(&self, item: &ItemId) -> ItemId;

    /// Returns the number of fields (columns) each item exposes.
    fn column_count(&self) -> usize;

    /// Returns the value of `field` for `item`.
    fn data(&self, item: &ItemId, field: usize) -> ItemData;

    // -------------------------------------------------------------------------
    // Optional methods with default implementations
    // -------------------------------------------------------------------------

    /// Sets the value of `field` for `item`.
    ///
    /// Returns `true` if the data was stored. The default is read-only.
    fn set_data(&self, _item: &ItemId, _field: usize, _value: ItemData) -> bool {
        false
    }

    /// Returns the flags for `item`.
    fn flags(&self, _item: &ItemId) -> ItemFlags {
        ItemFlags::new()
    }

    /// Returns `true` if `item` has any children.
    fn has_children(&self, item: &ItemId) -> bool {
        self.child_count(item) > 0
    }

    /// Returns every child of `parent`, in model order.
    ///
    /// The default asks for the children one at a time.
    fn all_children(&self, parent: &ItemId) -> Arc<[ItemId]> {
        if !parent.is_parent_candidate() {
            return Arc::from(Vec::new());
        }
        let count = self.child_count(parent);
        (0..count)
            .map(|index| self.child(parent, index))
            .filter(ItemId::is_valid)
            .collect()
    }

    /// Returns the position of `item` among its parent's children.
    fn child_index(&self, item: &ItemId) -> Option<usize> {
        if !item.is_valid() {
            return None;
        }
        let parent = self.parent(item);
        if !parent.is_parent_candidate() {
            return None;
        }
        let key = item.with_column(0);
        self.all_children(&parent).iter().position(|child| *child == key)
    }

    /// Returns `true` if `item` is currently part of this model's hierarchy.
    fn contains(&self, item: &ItemId) -> bool {
        self.child_index(item).is_some()
    }

    /// Compares two items on one field, ascending.
    fn compare(&self, a: &ItemId, b: &ItemId, field: usize) -> Ordering {
        compare_item_data(&self.data(a, field), &self.data(b, field))
    }

    /// Returns `true` if [`sort`](ItemModel::sort) can honor `filters`.
    ///
    /// Models with an optimized sort path return `true` for the criteria
    /// they support. The default supports nothing.
    fn can_sort(&self, _filters: &[SortFilter]) -> bool {
        false
    }

    /// Sorts `items` (children of `parent`) in place according to `filters`.
    ///
    /// Returns `false`, leaving `items` untouched, when the criteria cannot
    /// be honored.
    fn sort(&self, _parent: &ItemId, _items: &mut [ItemId], _filters: &[SortFilter]) -> bool {
        false
    }

    /// Drops every piece of derived state (cached child arrays).
    ///
    /// Call after structural edits the model cannot detect. Proxies clear
    /// their own caches and forward the call upstream.
    fn invalidate(&self) {}

    /// Drops derived state for the children of `parent` only.
    fn invalidate_children(&self, _parent: &ItemId) {}

    /// Returns the memo rank queries use for visible sub-tree sizes.
    ///
    /// The default has none, so every count walks the visible sub-tree.
    fn visible_counts(&self) -> Option<&VisibleCounts> {
        None
    }
}

impl<M: ItemModel + ?Sized> ItemModel for Arc<M> {
    fn model_id(&self) -> ModelId {
        (**self).model_id()
    }

    fn child_count(&self, parent: &ItemId) -> usize {
        (**self).child_count(parent)
    }

    fn child(&self, parent: &ItemId, index: usize) -> ItemId {
        (**self).child(parent, index)
    }

    fn parent(&self, item: &ItemId) -> ItemId {
        (**self).parent(item)
    }

    fn column_count(&self) -> usize {
        (**self).column_count()
    }

    fn data(&self, item: &ItemId, field: usize) -> ItemData {
        (**self).data(item, field)
    }

    fn set_data(&self, item: &ItemId, field: usize, value: ItemData) -> bool {
        (**self).set_data(item, field, value)
    }

    fn flags(&self, item: &ItemId) -> ItemFlags {
        (**self).flags(item)
    }

    fn has_children(&self, item: &ItemId) -> bool {
        (**self).has_children(item)
    }

    fn all_children(&self, parent: &ItemId) -> Arc<[ItemId]> {
        (**self).all_children(parent)
    }

    fn child_index(&self, item: &ItemId) -> Option<usize> {
        (**self).child_index(item)
    }

    fn contains(&self, item: &ItemId) -> bool {
        (**self).contains(item)
    }

    fn compare(&self, a: &ItemId, b: &ItemId, field: usize) -> Ordering {
        (**self).compare(a, b, field)
    }

    fn can_sort(&self, filters: &[SortFilter]) -> bool {
        (**self).can_sort(filters)
    }

    fn sort(&self, parent: &ItemId, items: &mut [ItemId], filters: &[SortFilter]) -> bool {
        (**self).sort(parent, items, filters)
    }

    fn invalidate(&self) {
        (**self).invalidate();
    }

    fn invalidate_children(&self, parent: &ItemId) {
        (**self).invalidate_children(parent);
    }

    fn visible_counts(&self) -> Option<&VisibleCounts> {
        (**self).visible_counts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_flags() {
        let flags = ItemFlags::new();
        assert!(flags.selectable);
        assert!(flags.enabled);
        assert!(!flags.editable);
        assert!(!ItemFlags::disabled().selectable);

        let editable = ItemFlags::editable();
        assert!(editable.editable);
        assert!(editable.selectable);

        let leaf = ItemFlags::new().with_never_has_children(true);
        assert!(leaf.never_has_children);
        assert!(!ItemFlags::disabled().enabled);
    }
}
