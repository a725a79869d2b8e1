//! View state for flat models, keyed by row.

use canopy_core::ItemId;
use canopy_core::logging::targets;

use super::data::CheckState;
use super::state::{BulkSelection, ExpansionLog, StateModel, StateTable, VisibilityStamp};
use super::traits::ItemModel;

/// State for flat models.
///
/// Entries are keyed by row, so the owner must report row insertions and
/// removals through [`on_rows_inserted`](Self::on_rows_inserted) and
/// [`on_rows_removed`](Self::on_rows_removed) to keep state attached to the
/// right items. Lists have no hierarchy: items are never expanded, and a
/// `recursive` mutation only differs from a plain one when applied to the
/// root, where it reaches every row.
#[derive(Debug, Clone, Default)]
pub struct ListStateModel {
    table: StateTable<usize>,
    // Never records: list items are never expanded.
    expansion: ExpansionLog,
}

impl ListStateModel {
    /// Creates an empty state model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of rows with non-default state.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if every row is in default state and no bulk
    /// selection is active.
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0 && self.table.bulk() == BulkSelection::Default
    }

    /// Returns `true` if `row` is selected.
    pub fn is_row_selected(&self, row: usize) -> bool {
        self.table.is_selected(&row)
    }

    /// Selects or deselects `row`.
    pub fn select_row(&mut self, row: usize, selected: bool) {
        self.table.set_selected(row, selected);
    }

    /// Shifts state for rows at or after `first` down by `count`.
    pub fn on_rows_inserted(&mut self, first: usize, count: usize) {
        if count == 0 {
            return;
        }
        tracing::trace!(target: targets::STATE, first, count, "rows inserted");
        self.table
            .remap(|row| Some(if row >= first { row + count } else { row }));
    }

    /// Drops state for `count` rows starting at `first` and shifts later
    /// rows up.
    pub fn on_rows_removed(&mut self, first: usize, count: usize) {
        if count == 0 {
            return;
        }
        tracing::trace!(target: targets::STATE, first, count, "rows removed");
        let end = first.saturating_add(count);
        self.table.remap(|row| {
            if row < first {
                Some(row)
            } else if row < end {
                None
            } else {
                Some(row - count)
            }
        });
    }

    fn for_each_target(
        model: &dyn ItemModel,
        item: &ItemId,
        recursive: bool,
        mut apply: impl FnMut(usize),
    ) {
        if item.is_valid() {
            apply(item.row());
        } else if recursive && item.is_root() {
            (0..model.child_count(item)).for_each(apply);
        }
    }

    fn row_of(item: &ItemId) -> Option<usize> {
        item.is_valid().then(|| item.row())
    }
}

impl StateModel for ListStateModel {
    fn is_selected(&self, item: &ItemId) -> bool {
        Self::row_of(item).is_some_and(|row| self.table.is_selected(&row))
    }

    fn is_enabled(&self, item: &ItemId) -> bool {
        Self::row_of(item).is_none_or(|row| self.table.is_enabled(&row))
    }

    fn is_expanded(&self, _item: &ItemId) -> bool {
        false
    }

    fn has_focus(&self, item: &ItemId) -> bool {
        Self::row_of(item).is_some_and(|row| self.table.has_focus(&row))
    }

    fn check_state(&self, item: &ItemId) -> CheckState {
        Self::row_of(item)
            .map(|row| self.table.check_state(&row))
            .unwrap_or_default()
    }

    fn select(&mut self, model: &dyn ItemModel, item: &ItemId, selected: bool, recursive: bool) {
        let table = &mut self.table;
        Self::for_each_target(model, item, recursive, |row| table.set_selected(row, selected));
    }

    fn expand(&mut self, _model: &dyn ItemModel, _item: &ItemId, _expanded: bool, _recursive: bool) {}

    fn enable(&mut self, model: &dyn ItemModel, item: &ItemId, enabled: bool, recursive: bool) {
        let table = &mut self.table;
        Self::for_each_target(model, item, recursive, |row| table.set_enabled(row, enabled));
    }

    fn set_check(&mut self, model: &dyn ItemModel, item: &ItemId, state: CheckState, recursive: bool) {
        let table = &mut self.table;
        Self::for_each_target(model, item, recursive, |row| table.set_check(row, state));
    }

    fn set_focus(&mut self, model: &dyn ItemModel, item: &ItemId, focused: bool, recursive: bool) {
        let table = &mut self.table;
        Self::for_each_target(model, item, recursive, |row| table.set_focus(row, focused));
    }

    fn select_all(&mut self) {
        self.table.set_bulk(BulkSelection::AllOn);
    }

    fn deselect_all(&mut self) {
        self.table.set_bulk(BulkSelection::AllOff);
    }

    fn bulk_selection(&self) -> BulkSelection {
        self.table.bulk()
    }

    fn delete_item(&mut self, item: &ItemId) {
        if let Some(row) = Self::row_of(item) {
            self.table.remove(&row);
        }
    }

    fn on_data_model_changed(&mut self, model: &dyn ItemModel) {
        let rows = model.child_count(&ItemId::root());
        self.table.retain(|row| *row < rows);
        self.expansion.reset();
    }

    fn clear(&mut self) {
        self.table.clear();
        self.expansion.reset();
    }

    fn visibility_stamp(&self) -> Option<VisibilityStamp> {
        Some(self.expansion.stamp())
    }

    fn expansion_changes_since(&self, since: &VisibilityStamp) -> Option<Vec<ItemId>> {
        self.expansion.changes_since(since)
    }
}

static_assertions::assert_impl_all!(ListStateModel: Send, Sync);
