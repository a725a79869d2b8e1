//! Filtering proxy model.

use std::sync::Arc;

use canopy_core::ItemId;
use canopy_core::logging::targets;

use super::array_proxy::{ArrayProxyModel, ChildArranger};
use super::traits::ItemModel;

/// Type alias for a filter predicate.
///
/// The predicate receives the source model and a candidate item; returning
/// `false` hides the item together with its whole sub-tree.
pub type FilterFn<S> = Arc<dyn Fn(&S, &ItemId) -> bool + Send + Sync>;

/// Arranger that keeps only the children accepted by a predicate.
///
/// Without a predicate every child is accepted.
pub struct ItemFilter<S: ?Sized> {
    predicate: Option<FilterFn<S>>,
}

impl<S: ?Sized> ItemFilter<S> {
    /// Creates a filter from a predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&S, &ItemId) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Some(Arc::new(predicate)),
        }
    }

    /// Returns `true` if a predicate is installed.
    pub fn is_active(&self) -> bool {
        self.predicate.is_some()
    }
}

impl<S: ?Sized> Default for ItemFilter<S> {
    fn default() -> Self {
        Self { predicate: None }
    }
}

impl<S: ?Sized> Clone for ItemFilter<S> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
        }
    }
}

impl<S: ?Sized> std::fmt::Debug for ItemFilter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemFilter")
            .field("active", &self.is_active())
            .finish()
    }
}

impl<S: ItemModel + ?Sized> ChildArranger<S> for ItemFilter<S> {
    fn arrange_children(&self, source: &S, parent: &ItemId) -> Vec<ItemId> {
        let children = source.all_children(parent);
        match &self.predicate {
            None => children.to_vec(),
            Some(accept) => children
                .iter()
                .copied()
                .filter(|child| accept(source, child))
                .collect(),
        }
    }
}

/// A proxy that hides items rejected by a predicate.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use canopy::model::{FilterProxyModel, ItemModel, TreeModel};
/// use canopy_core::ItemId;
///
/// let tree = Arc::new(TreeModel::<String>::new());
/// tree.add_root("keep".into());
/// tree.add_root("drop".into());
///
/// let filtered = FilterProxyModel::from_source(tree);
/// filtered.set_filter(|model: &TreeModel<String>, item: &ItemId| {
///     model.data(item, 0).as_string() != Some("drop")
/// });
/// assert_eq!(filtered.child_count(&ItemId::root()), 1);
/// ```
pub type FilterProxyModel<S> = ArrayProxyModel<S, ItemFilter<S>>;

impl<S: ItemModel + ?Sized> ArrayProxyModel<S, ItemFilter<S>> {
    /// Installs a predicate and clears the cache.
    pub fn set_filter<F>(&self, predicate: F)
    where
        F: Fn(&S, &ItemId) -> bool + Send + Sync + 'static,
    {
        tracing::debug!(target: targets::MODEL, "filter predicate changed");
        self.update_arranger(|filter| *filter = ItemFilter::new(predicate));
    }

    /// Removes the predicate, showing every item again.
    pub fn clear_filter(&self) {
        self.update_arranger(|filter| filter.predicate = None);
    }

    /// Returns `true` if a predicate is installed.
    pub fn has_filter(&self) -> bool {
        self.with_arranger(ItemFilter::is_active)
    }
}
