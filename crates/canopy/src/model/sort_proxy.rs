//! Sorting proxy model.
//!
//! [`SortProxyModel`] presents the children of every parent in the order
//! defined by a sequence of [`SortFilter`]s. Upstream models that can sort
//! natively are asked first; otherwise the configured [`SortAlgorithm`]
//! sorts through the generic model interface. Sorted arrays are cached by
//! the underlying [`ArrayProxyModel`].

use canopy_core::logging::targets;
use canopy_core::{ItemId, ModelError, ModelResult};

use super::array_proxy::{ArrayProxyModel, ChildArranger};
use super::sort::{SortAlgorithm, SortFilter, SortOrder, active_filters, is_noop, sort_items};
use super::traits::ItemModel;

/// Arranger that sorts children by a sequence of sort filters.
#[derive(Debug, Clone, Default)]
pub struct Sorter {
    filters: Vec<SortFilter>,
    algorithm: SortAlgorithm,
}

impl Sorter {
    /// Creates a sorter for `filters` using the fast algorithm.
    pub fn new(filters: Vec<SortFilter>) -> Self {
        Self {
            filters,
            algorithm: SortAlgorithm::default(),
        }
    }

    /// Sets the fallback algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: SortAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Returns the sort filters, in priority order.
    pub fn filters(&self) -> &[SortFilter] {
        &self.filters
    }

    /// Returns the fallback algorithm.
    pub fn algorithm(&self) -> SortAlgorithm {
        self.algorithm
    }

    /// Sorts `items`, preferring the source's native sort.
    fn sort_with<S>(&self, source: &S, parent: &ItemId, items: &mut [ItemId], filters: &[SortFilter])
    where
        S: ItemModel + ?Sized,
    {
        if source.can_sort(filters) && source.sort(parent, items, filters) {
            tracing::trace!(target: targets::SORT, ?parent, "native sort");
            return;
        }
        sort_items(source, items, filters, self.algorithm);
    }
}

/// Returns the first active filter whose field is out of range.
fn unsupported_field(filters: &[SortFilter], columns: usize) -> Option<usize> {
    filters
        .iter()
        .filter(|filter| filter.is_active())
        .map(|filter| filter.field)
        .find(|&field| field >= columns)
}

impl<S: ItemModel + ?Sized> ChildArranger<S> for Sorter {
    fn arrange_children(&self, source: &S, parent: &ItemId) -> Vec<ItemId> {
        let mut children = source.all_children(parent).to_vec();
        if is_noop(&self.filters) || children.len() < 2 {
            return children;
        }
        let active = active_filters(&self.filters);
        self.sort_with(source, parent, &mut children, &active);
        children
    }

    fn can_sort(&self, source: &S, filters: &[SortFilter]) -> bool {
        unsupported_field(filters, source.column_count()).is_none()
    }

    fn sort(&self, source: &S, parent: &ItemId, items: &mut [ItemId], filters: &[SortFilter]) -> bool {
        if !ChildArranger::<S>::can_sort(self, source, filters) {
            return false;
        }
        self.sort_with(source, parent, items, filters);
        true
    }
}

/// A proxy that sorts the children of every parent.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use canopy::model::{ItemModel, ListModel, SortFilter, SortProxyModel};
/// use canopy_core::ItemId;
///
/// let list = Arc::new(ListModel::new(
///     ["pear", "apple", "fig"].map(String::from).to_vec(),
/// ));
/// let sorted = SortProxyModel::from_source(list.clone());
/// assert!(sorted.set_sort_filters(vec![SortFilter::ascending(0)]));
///
/// let first = sorted.child(&ItemId::root(), 0);
/// assert_eq!(sorted.data(&first, 0).as_string(), Some("apple"));
///
/// // Field 3 does not exist; the previous criteria stay active
/// assert!(!sorted.set_sort_filters(vec![SortFilter::ascending(3)]));
/// assert_eq!(sorted.sort_filters(), vec![SortFilter::ascending(0)]);
/// ```
pub type SortProxyModel<S> = ArrayProxyModel<S, Sorter>;

impl<S: ItemModel + ?Sized> ArrayProxyModel<S, Sorter> {
    /// Returns the active criteria, in priority order.
    pub fn sort_filters(&self) -> Vec<SortFilter> {
        self.with_arranger(|sorter| sorter.filters.clone())
    }

    /// Replaces the sort criteria.
    ///
    /// Fails with [`ModelError::UnsupportedSortField`] if an active filter
    /// names a field the source does not have; the previous criteria then
    /// stay in effect. On success the cache is cleared.
    pub fn try_set_sort_filters(&self, filters: Vec<SortFilter>) -> ModelResult<()> {
        let columns = self.source().column_count();
        if let Some(field) = unsupported_field(&filters, columns) {
            tracing::warn!(target: targets::SORT, field, columns, "rejected sort criteria");
            return Err(ModelError::UnsupportedSortField { field, columns });
        }
        tracing::debug!(target: targets::SORT, keys = filters.len(), "sort criteria changed");
        self.update_arranger(|sorter| sorter.filters = filters);
        Ok(())
    }

    /// Replaces the sort criteria; returns `false` if they were rejected.
    pub fn set_sort_filters(&self, filters: Vec<SortFilter>) -> bool {
        self.try_set_sort_filters(filters).is_ok()
    }

    /// Sorts by a single field.
    pub fn sort_by_field(&self, field: usize, order: SortOrder) -> bool {
        self.set_sort_filters(vec![SortFilter::new(field, order)])
    }

    /// Removes every criterion, restoring upstream order.
    pub fn clear_sort(&self) {
        self.update_arranger(|sorter| sorter.filters.clear());
    }

    /// Returns the fallback algorithm.
    pub fn sort_algorithm(&self) -> SortAlgorithm {
        self.with_arranger(Sorter::algorithm)
    }

    /// Changes the fallback algorithm and clears the cache.
    pub fn set_sort_algorithm(&self, algorithm: SortAlgorithm) {
        self.update_arranger(|sorter| sorter.algorithm = algorithm);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::{ItemData, TreeModel};

    // field 0 / field 1: a/2, b/2, c/1
    fn two_column_tree() -> (Arc<TreeModel<Vec<ItemData>>>, Vec<ItemId>) {
        let model = Arc::new(TreeModel::with_columns(2));
        let items = [("b", 2), ("a", 2), ("c", 1)]
            .into_iter()
            .map(|(name, rank)| model.add_root(vec![ItemData::from(name), ItemData::from(rank)]))
            .collect();
        (model, items)
    }

    #[test]
    fn test_multi_key_both_algorithms() {
        for algorithm in [SortAlgorithm::Fast, SortAlgorithm::MemoryEfficient] {
            let (model, items) = two_column_tree();
            let proxy = SortProxyModel::new(
                model,
                Sorter::new(vec![SortFilter::descending(1), SortFilter::ascending(0)])
                    .with_algorithm(algorithm),
            );
            let sorted = proxy.all_children(&ItemId::root());
            assert_eq!(sorted.to_vec(), vec![items[1], items[0], items[2]], "{algorithm:?}");
        }
    }

    #[test]
    fn test_noop_filters_keep_upstream_order() {
        let (model, items) = two_column_tree();
        let proxy = SortProxyModel::new(
            model,
            Sorter::new(vec![SortFilter::new(0, SortOrder::None)]),
        );
        assert_eq!(proxy.all_children(&ItemId::root()).to_vec(), items);
    }

    #[test]
    fn test_rejected_criteria_keep_previous() {
        let (model, _) = two_column_tree();
        let proxy = SortProxyModel::from_source(model);
        proxy.set_sort_filters(vec![SortFilter::ascending(0)]);

        assert_eq!(
            proxy.try_set_sort_filters(vec![SortFilter::ascending(1), SortFilter::descending(2)]),
            Err(ModelError::UnsupportedSortField { field: 2, columns: 2 })
        );
        assert_eq!(proxy.sort_filters(), vec![SortFilter::ascending(0)]);

        // Inert filters are not validated
        assert!(proxy.set_sort_filters(vec![SortFilter::new(9, SortOrder::None)]));
    }

    #[test]
    fn test_new_criteria_clear_cache() {
        let model = Arc::new(TreeModel::<String>::new());
        for name in ["e", "d", "c", "b", "a"] {
            model.add_root(name.into());
        }
        let proxy = SortProxyModel::from_source(model);
        proxy.sort_by_field(0, SortOrder::Ascending);
        let root = ItemId::root();

        assert_eq!(proxy.data(&proxy.child(&root, 0), 0).as_string(), Some("a"));
        assert!(proxy.is_cached(&root));

        proxy.sort_by_field(0, SortOrder::Descending);
        assert!(!proxy.is_cached(&root));
        assert_eq!(proxy.data(&proxy.child(&root, 0), 0).as_string(), Some("e"));

        proxy.clear_sort();
        assert_eq!(proxy.data(&proxy.child(&root, 0), 0).as_string(), Some("e"));
        assert_eq!(proxy.data(&proxy.child(&root, 4), 0).as_string(), Some("a"));
    }

    #[test]
    fn test_proxy_reports_sort_capability() {
        let (model, _) = two_column_tree();
        let proxy = SortProxyModel::from_source(model);
        assert!(proxy.can_sort(&[SortFilter::ascending(1)]));
        assert!(!proxy.can_sort(&[SortFilter::ascending(2)]));

        let mut items = proxy.source().all_children(&ItemId::root()).to_vec();
        assert!(proxy.sort(&ItemId::root(), &mut items, &[SortFilter::ascending(0)]));
        let names: Vec<_> = items
            .iter()
            .filter_map(|item| proxy.data(item, 0).into_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
