//! Per-item view state: selection, expansion, enablement, checks and focus.
//!
//! State lives apart from the data model so that the same data can back
//! several views. Storage is sparse: an item with default state has no
//! entry, and an entry is dropped as soon as every field returns to its
//! default.
//!
//! # Bulk selection
//!
//! [`StateModel::select_all`] and [`StateModel::deselect_all`] run in
//! constant time. They record a [`BulkSelection`] flag and advance an
//! epoch counter; any per-item selection recorded before the bulk
//! operation is stale from then on. A query resolves as:
//!
//! 1. a per-item override recorded in the current epoch,
//! 2. otherwise the bulk flag,
//! 3. otherwise not selected.
//!
//! Stale overrides are not counted as state. They are swept out once they
//! make up half of the table, so repeated bulk operations stay amortized
//! constant time.
//!
//! # Expansion history
//!
//! Rank queries on a proxy memoize visible sub-tree sizes. A state model
//! that reports a [`VisibilityStamp`] and the items whose expansion changed
//! since an earlier stamp lets that memo drop only the affected ancestor
//! chains instead of starting over.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use canopy_core::ItemId;
use canopy_core::logging::targets;

use super::data::CheckState;
use super::navigation::TreeNavigation;
use super::traits::ItemModel;

/// The most recent bulk selection operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BulkSelection {
    /// No bulk operation; items are unselected unless selected explicitly.
    #[default]
    Default,
    /// Everything was selected.
    AllOn,
    /// Everything was deselected.
    AllOff,
}

impl BulkSelection {
    /// The selection an item has without a current override.
    #[inline]
    pub fn is_selected(self) -> bool {
        matches!(self, BulkSelection::AllOn)
    }
}

/// Identifies one revision of a state model's expansion state.
///
/// Two equal stamps mean the same items are expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisibilityStamp {
    owner: u64,
    revision: u64,
}

/// Number of expansion changes a state model remembers.
const EXPANSION_HISTORY: usize = 256;

static EXPANSION_OWNER_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Bounded log of the items whose expansion changed.
#[derive(Debug)]
pub(crate) struct ExpansionLog {
    owner: u64,
    revision: u64,
    /// Every change with a revision above `floor` is still in `changes`.
    floor: u64,
    changes: VecDeque<(u64, ItemId)>,
}

impl Default for ExpansionLog {
    fn default() -> Self {
        Self {
            owner: EXPANSION_OWNER_COUNTER.fetch_add(1, Ordering::Relaxed),
            revision: 0,
            floor: 0,
            changes: VecDeque::new(),
        }
    }
}

impl Clone for ExpansionLog {
    /// A clone evolves independently, so it gets its own owner.
    fn clone(&self) -> Self {
        Self {
            revision: self.revision,
            floor: self.revision,
            ..Self::default()
        }
    }
}

impl ExpansionLog {
    pub(crate) fn stamp(&self) -> VisibilityStamp {
        VisibilityStamp {
            owner: self.owner,
            revision: self.revision,
        }
    }

    pub(crate) fn record(&mut self, item: ItemId) {
        self.revision += 1;
        self.changes.push_back((self.revision, item));
        if self.changes.len() > EXPANSION_HISTORY
            && let Some((revision, _)) = self.changes.pop_front()
        {
            self.floor = revision;
        }
    }

    /// Forgets the history; older stamps can no longer be brought up to date.
    pub(crate) fn reset(&mut self) {
        self.revision += 1;
        self.floor = self.revision;
        self.changes.clear();
    }

    pub(crate) fn changes_since(&self, since: &VisibilityStamp) -> Option<Vec<ItemId>> {
        if since.owner != self.owner || since.revision < self.floor || since.revision > self.revision {
            return None;
        }
        Some(
            self.changes
                .iter()
                .filter(|(revision, _)| *revision > since.revision)
                .map(|(_, item)| *item)
                .collect(),
        )
    }
}

/// View state kept per item.
///
/// Mutators take the data model so that `recursive` operations can walk
/// the sub-tree below `item`; for flat models `recursive` only makes a
/// difference when applied to the root.
pub trait StateModel {
    /// Returns `true` if `item` is selected.
    fn is_selected(&self, item: &ItemId) -> bool;

    /// Returns `true` unless `item` was disabled.
    fn is_enabled(&self, item: &ItemId) -> bool;

    /// Returns `true` if `item` is expanded.
    fn is_expanded(&self, item: &ItemId) -> bool;

    /// Returns `true` if `item` carries the focus flag.
    fn has_focus(&self, item: &ItemId) -> bool;

    /// Returns the check state of `item`.
    fn check_state(&self, item: &ItemId) -> CheckState;

    /// Selects or deselects `item`, and its sub-tree when `recursive`.
    fn select(&mut self, model: &dyn ItemModel, item: &ItemId, selected: bool, recursive: bool);

    /// Expands or collapses `item`, and its sub-tree when `recursive`.
    fn expand(&mut self, model: &dyn ItemModel, item: &ItemId, expanded: bool, recursive: bool);

    /// Enables or disables `item`, and its sub-tree when `recursive`.
    fn enable(&mut self, model: &dyn ItemModel, item: &ItemId, enabled: bool, recursive: bool);

    /// Sets the check state of `item`, and its sub-tree when `recursive`.
    fn set_check(&mut self, model: &dyn ItemModel, item: &ItemId, state: CheckState, recursive: bool);

    /// Sets or clears the focus flag of `item`, and its sub-tree when `recursive`.
    fn set_focus(&mut self, model: &dyn ItemModel, item: &ItemId, focused: bool, recursive: bool);

    /// Selects every item in constant time.
    fn select_all(&mut self);

    /// Deselects every item in constant time.
    fn deselect_all(&mut self);

    /// Returns the most recent bulk selection operation.
    fn bulk_selection(&self) -> BulkSelection;

    /// Forgets all state recorded for `item`.
    fn delete_item(&mut self, item: &ItemId);

    /// Drops state for items `model` no longer contains.
    fn on_data_model_changed(&mut self, model: &dyn ItemModel);

    /// Resets every item to default state.
    fn clear(&mut self);

    /// Toggles expansion of `item`; returns the new state.
    fn toggle_expanded(&mut self, model: &dyn ItemModel, item: &ItemId) -> bool {
        let expanded = !self.is_expanded(item);
        self.expand(model, item, expanded, false);
        expanded
    }

    /// Returns a stamp that changes whenever expansion state changes.
    ///
    /// `None` disables memoization of visible counts for this state model.
    fn visibility_stamp(&self) -> Option<VisibilityStamp> {
        None
    }

    /// Returns the items whose expansion changed after `since`, or `None`
    /// if that history is no longer available.
    fn expansion_changes_since(&self, _since: &VisibilityStamp) -> Option<Vec<ItemId>> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SelectionOverride {
    selected: bool,
    epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct ItemState {
    selection: Option<SelectionOverride>,
    disabled: bool,
    expanded: bool,
    focused: bool,
    check: CheckState,
}

impl ItemState {
    /// Returns `true` if a field other than the selection is set.
    fn is_live(&self) -> bool {
        self.disabled || self.expanded || self.focused || self.check != CheckState::Unchecked
    }
}

/// What keeps an entry in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    /// A field other than the selection is set.
    Live,
    /// Only a current selection override.
    SelectionOnly,
    /// Only an override from an earlier epoch; the item is in default state.
    Stale,
}

/// Sparse state storage shared by the tree and list state models.
#[derive(Debug, Clone)]
pub(crate) struct StateTable<K> {
    entries: HashMap<K, ItemState>,
    bulk: BulkSelection,
    epoch: u64,
    selection_only: usize,
    stale: usize,
}

impl<K> Default for StateTable<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            bulk: BulkSelection::Default,
            epoch: 0,
            selection_only: 0,
            stale: 0,
        }
    }
}

impl<K: Copy + Eq + Hash> StateTable<K> {
    /// Number of items with non-default state.
    pub(crate) fn len(&self) -> usize {
        self.entries.len() - self.stale
    }

    /// Number of stored entries, stale ones included.
    #[cfg(test)]
    pub(crate) fn stored(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn bulk(&self) -> BulkSelection {
        self.bulk
    }

    fn current_override(&self, state: &ItemState) -> Option<bool> {
        state
            .selection
            .filter(|selection| selection.epoch == self.epoch)
            .map(|selection| selection.selected)
    }

    pub(crate) fn is_selected(&self, key: &K) -> bool {
        self.entries
            .get(key)
            .and_then(|state| self.current_override(state))
            .unwrap_or_else(|| self.bulk.is_selected())
    }

    pub(crate) fn is_enabled(&self, key: &K) -> bool {
        self.entries.get(key).is_none_or(|state| !state.disabled)
    }

    pub(crate) fn is_expanded(&self, key: &K) -> bool {
        self.entries.get(key).is_some_and(|state| state.expanded)
    }

    pub(crate) fn has_focus(&self, key: &K) -> bool {
        self.entries.get(key).is_some_and(|state| state.focused)
    }

    pub(crate) fn check_state(&self, key: &K) -> CheckState {
        self.entries
            .get(key)
            .map(|state| state.check)
            .unwrap_or_default()
    }

    fn is_default(&self, state: &ItemState) -> bool {
        let selection_is_default = self
            .current_override(state)
            .is_none_or(|selected| selected == self.bulk.is_selected());
        selection_is_default
            && !state.disabled
            && !state.expanded
            && !state.focused
            && state.check == CheckState::Unchecked
    }

    fn kind(&self, state: &ItemState) -> EntryKind {
        if state.is_live() {
            EntryKind::Live
        } else if self.current_override(state).is_some() {
            EntryKind::SelectionOnly
        } else {
            EntryKind::Stale
        }
    }

    fn track(&mut self, state: &ItemState) {
        match self.kind(state) {
            EntryKind::Live => {}
            EntryKind::SelectionOnly => self.selection_only += 1,
            EntryKind::Stale => self.stale += 1,
        }
    }

    fn untrack(&mut self, state: &ItemState) {
        match self.kind(state) {
            EntryKind::Live => {}
            EntryKind::SelectionOnly => self.selection_only -= 1,
            EntryKind::Stale => self.stale -= 1,
        }
    }

    fn recount(&mut self) {
        self.selection_only = 0;
        self.stale = 0;
        let entries = std::mem::take(&mut self.entries);
        for state in entries.values() {
            self.track(state);
        }
        self.entries = entries;
    }

    fn update(&mut self, key: K, apply: impl FnOnce(&mut ItemState)) {
        let mut state = match self.entries.get(&key).copied() {
            Some(state) => {
                self.untrack(&state);
                state
            }
            None => ItemState::default(),
        };
        if state.selection.is_some_and(|selection| selection.epoch != self.epoch) {
            state.selection = None;
        }
        apply(&mut state);
        if self.is_default(&state) {
            self.entries.remove(&key);
        } else {
            self.track(&state);
            self.entries.insert(key, state);
        }
    }

    pub(crate) fn set_selected(&mut self, key: K, selected: bool) {
        let epoch = self.epoch;
        self.update(key, |state| {
            state.selection = Some(SelectionOverride { selected, epoch });
        });
    }

    pub(crate) fn set_expanded(&mut self, key: K, expanded: bool) {
        self.update(key, |state| state.expanded = expanded);
    }

    pub(crate) fn set_enabled(&mut self, key: K, enabled: bool) {
        self.update(key, |state| state.disabled = !enabled);
    }

    pub(crate) fn set_check(&mut self, key: K, check: CheckState) {
        self.update(key, |state| state.check = check);
    }

    pub(crate) fn set_focus(&mut self, key: K, focused: bool) {
        self.update(key, |state| state.focused = focused);
    }

    pub(crate) fn set_bulk(&mut self, bulk: BulkSelection) {
        self.bulk = bulk;
        self.epoch += 1;
        // Every current override is now from an earlier epoch
        self.stale += self.selection_only;
        self.selection_only = 0;
        tracing::trace!(target: targets::STATE, ?bulk, epoch = self.epoch, stale = self.stale, "bulk selection");

        if self.stale > 0 && self.stale * 2 >= self.entries.len() {
            self.sweep_stale();
        }
    }

    /// Drops every override; none is current right after a bulk operation.
    fn sweep_stale(&mut self) {
        let before = self.entries.len();
        self.entries.retain(|_, state| {
            state.selection = None;
            state.is_live()
        });
        self.stale = 0;
        tracing::debug!(
            target: targets::STATE,
            before,
            after = self.entries.len(),
            "swept stale selection overrides"
        );
    }

    pub(crate) fn remove(&mut self, key: &K) {
        if let Some(state) = self.entries.remove(key) {
            self.untrack(&state);
        }
    }

    /// Keeps entries for which `keep` returns `true`, then drops entries
    /// that have returned to default state.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        let before = self.entries.len();
        let mut entries = std::mem::take(&mut self.entries);
        entries.retain(|key, state| keep(key) && !self.is_default(state));
        self.entries = entries;
        self.recount();
        tracing::debug!(
            target: targets::STATE,
            before,
            after = self.entries.len(),
            "pruned item state"
        );
    }

    /// Rebuilds the table with every key passed through `remap`; keys
    /// mapped to `None` are dropped.
    pub(crate) fn remap(&mut self, mut remap: impl FnMut(K) -> Option<K>) {
        self.entries = std::mem::take(&mut self.entries)
            .into_iter()
            .filter_map(|(key, state)| remap(key).map(|key| (key, state)))
            .collect();
        self.recount();
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.bulk = BulkSelection::Default;
        self.epoch += 1;
        self.selection_only = 0;
        self.stale = 0;
    }
}

/// State for hierarchical models, keyed by item identity.
///
/// # Example
///
/// ```
/// use canopy::model::{StateModel, TreeModel, TreeStateModel};
///
/// let model = TreeModel::<String>::new();
/// let a = model.add_root("a".into());
/// let b = model.add_root("b".into());
///
/// let mut state = TreeStateModel::new();
/// state.select_all();
/// state.select(&model, &b, false, false);
/// assert!(state.is_selected(&a));
/// assert!(!state.is_selected(&b));
///
/// state.deselect_all();
/// assert!(!state.is_selected(&a));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TreeStateModel {
    table: StateTable<ItemId>,
    expansion: ExpansionLog,
}

impl TreeStateModel {
    /// Creates an empty state model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of items with non-default state.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if every item is in default state and no bulk
    /// selection is active.
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0 && self.table.bulk() == BulkSelection::Default
    }

    fn for_each_target(
        model: &dyn ItemModel,
        item: &ItemId,
        recursive: bool,
        mut apply: impl FnMut(ItemId),
    ) {
        if item.is_valid() {
            apply(item.with_column(0));
        }
        if recursive && item.is_parent_candidate() {
            model.descendants(item).for_each(apply);
        }
    }
}

impl StateModel for TreeStateModel {
    fn is_selected(&self, item: &ItemId) -> bool {
        self.table.is_selected(&item.with_column(0))
    }

    fn is_enabled(&self, item: &ItemId) -> bool {
        self.table.is_enabled(&item.with_column(0))
    }

    fn is_expanded(&self, item: &ItemId) -> bool {
        self.table.is_expanded(&item.with_column(0))
    }

    fn has_focus(&self, item: &ItemId) -> bool {
        self.table.has_focus(&item.with_column(0))
    }

    fn check_state(&self, item: &ItemId) -> CheckState {
        self.table.check_state(&item.with_column(0))
    }

    fn select(&mut self, model: &dyn ItemModel, item: &ItemId, selected: bool, recursive: bool) {
        let table = &mut self.table;
        Self::for_each_target(model, item, recursive, |key| table.set_selected(key, selected));
    }

    fn expand(&mut self, model: &dyn ItemModel, item: &ItemId, expanded: bool, recursive: bool) {
        let Self { table, expansion } = self;
        Self::for_each_target(model, item, recursive, |key| {
            if table.is_expanded(&key) != expanded {
                table.set_expanded(key, expanded);
                expansion.record(key);
            }
        });
    }

    fn enable(&mut self, model: &dyn ItemModel, item: &ItemId, enabled: bool, recursive: bool) {
        let table = &mut self.table;
        Self::for_each_target(model, item, recursive, |key| table.set_enabled(key, enabled));
    }

    fn set_check(&mut self, model: &dyn ItemModel, item: &ItemId, state: CheckState, recursive: bool) {
        let table = &mut self.table;
        Self::for_each_target(model, item, recursive, |key| table.set_check(key, state));
    }

    fn set_focus(&mut self, model: &dyn ItemModel, item: &ItemId, focused: bool, recursive: bool) {
        let table = &mut self.table;
        Self::for_each_target(model, item, recursive, |key| table.set_focus(key, focused));
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
        let key = item.with_column(0);
        if self.table.is_expanded(&key) {
            self.expansion.record(key);
        }
        self.table.remove(&key);
    }

    fn on_data_model_changed(&mut self, model: &dyn ItemModel) {
        self.table.retain(|item| model.contains(item));
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

static_assertions::assert_impl_all!(TreeStateModel: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeModel;

    fn sample() -> (TreeModel<String>, [ItemId; 4]) {
        let model = TreeModel::new();
        let a = model.add_root("a".into());
        let a0 = model.add_child(&a, "a0".into());
        let a1 = model.add_child(&a, "a1".into());
        let b = model.add_root("b".into());
        (model, [a, a0, a1, b])
    }

    #[test]
    fn test_defaults() {
        let (_, [a, ..]) = sample();
        let state = TreeStateModel::new();
        assert!(!state.is_selected(&a));
        assert!(state.is_enabled(&a));
        assert!(!state.is_expanded(&a));
        assert!(!state.has_focus(&a));
        assert_eq!(state.check_state(&a), CheckState::Unchecked);
        assert!(state.is_empty());
    }

    #[test]
    fn test_override_then_bulk_then_override() {
        let (model, [a, a0, _, b]) = sample();
        let mut state = TreeStateModel::new();

        state.select(&model, &a, true, false);
        assert!(state.is_selected(&a));

        state.deselect_all();
        assert!(!state.is_selected(&a));

        state.select_all();
        assert!(state.is_selected(&a));
        assert!(state.is_selected(&b));

        state.select(&model, &a0, false, false);
        assert!(!state.is_selected(&a0));
        assert!(state.is_selected(&a));

        state.deselect_all();
        assert!(!state.is_selected(&a0));
        assert_eq!(state.bulk_selection(), BulkSelection::AllOff);
    }

    #[test]
    fn test_recursive_select() {
        let (model, [a, a0, a1, b]) = sample();
        let mut state = TreeStateModel::new();
        state.select(&model, &a, true, true);
        assert!(state.is_selected(&a));
        assert!(state.is_selected(&a0));
        assert!(state.is_selected(&a1));
        assert!(!state.is_selected(&b));
    }

    #[test]
    fn test_entries_pruned_at_default() {
        let (model, [a, ..]) = sample();
        let mut state = TreeStateModel::new();

        state.expand(&model, &a, true, false);
        state.set_check(&model, &a, CheckState::Checked, false);
        assert_eq!(state.len(), 1);

        state.expand(&model, &a, false, false);
        assert_eq!(state.len(), 1);
        state.set_check(&model, &a, CheckState::Unchecked, false);
        assert_eq!(state.len(), 0);
    }

    #[test]
    fn test_state_is_per_item_not_per_cell() {
        let (model, [a, ..]) = sample();
        let mut state = TreeStateModel::new();
        state.set_focus(&model, &a.with_column(3), true, false);
        assert!(state.has_focus(&a));
        state.enable(&model, &a, false, false);
        assert!(!state.is_enabled(&a.with_column(1)));
    }

    #[test]
    fn test_on_data_model_changed_prunes_removed_items() {
        let (model, [a, a0, _, b]) = sample();
        let mut state = TreeStateModel::new();
        state.expand(&model, &a, true, false);
        state.select(&model, &a0, true, false);
        state.set_focus(&model, &b, true, false);

        model.remove(&a);
        state.on_data_model_changed(&model);

        assert_eq!(state.len(), 1);
        assert!(state.has_focus(&b));
        assert!(!state.is_expanded(&a));
    }

    #[test]
    fn test_toggle_and_clear() {
        let (model, [a, ..]) = sample();
        let mut state = TreeStateModel::new();
        assert!(state.toggle_expanded(&model, &a));
        assert!(!state.toggle_expanded(&model, &a));

        state.select_all();
        state.clear();
        assert!(!state.is_selected(&a));
        assert_eq!(state.bulk_selection(), BulkSelection::Default);
        state.delete_item(&a);
        assert!(state.is_empty());
    }

    #[test]
    fn test_stale_overrides_do_not_count() {
        let model = TreeModel::<String>::new();
        let items: Vec<ItemId> = (0..1000).map(|i| model.add_root(format!("{i}"))).collect();
        let mut state = TreeStateModel::new();
        for item in &items {
            state.select(&model, item, true, false);
        }
        assert_eq!(state.len(), 1000);

        state.deselect_all();
        state.select_all();
        state.deselect_all();
        assert_eq!(state.len(), 0);
        assert_eq!(state.table.stored(), 0);
        assert!(items.iter().all(|item| !state.is_selected(item)));
    }

    #[test]
    fn test_stale_overrides_below_sweep_threshold() {
        let model = TreeModel::<String>::new();
        let items: Vec<ItemId> = (0..10).map(|i| model.add_root(format!("{i}"))).collect();
        let mut state = TreeStateModel::new();
        for item in &items[..8] {
            state.expand(&model, item, true, false);
        }
        state.select(&model, &items[8], true, false);
        state.select(&model, &items[0], true, false);

        state.select_all();
        // One stale entry out of nine is kept but not counted
        assert_eq!(state.len(), 8);
        assert_eq!(state.table.stored(), 9);

        // Re-selecting against the bulk value stores nothing new
        state.select(&model, &items[8], true, false);
        assert_eq!(state.len(), 8);
        state.select(&model, &items[9], false, false);
        assert_eq!(state.len(), 9);
        assert!(state.is_selected(&items[8]));
        assert!(!state.is_selected(&items[9]));

        // Collapsing drops the stale override along with the entry
        state.expand(&model, &items[0], false, false);
        assert_eq!(state.len(), 8);
        assert!(state.is_selected(&items[0]));
    }

    #[test]
    fn test_visibility_stamp_tracks_expansion_only() {
        let (model, [a, a0, _, b]) = sample();
        let mut state = TreeStateModel::new();
        let start = state.visibility_stamp().unwrap();

        state.select(&model, &a, true, false);
        state.set_check(&model, &b, CheckState::Checked, false);
        assert_eq!(state.visibility_stamp(), Some(start));

        // Expanding an already expanded item is not a change
        state.expand(&model, &a, true, false);
        state.expand(&model, &a, true, false);
        state.expand(&model, &a0, true, false);
        let after = state.visibility_stamp().unwrap();
        assert_ne!(after, start);
        assert_eq!(state.expansion_changes_since(&start), Some(vec![a, a0]));
        assert_eq!(state.expansion_changes_since(&after), Some(vec![]));

        state.delete_item(&a0);
        assert_eq!(state.expansion_changes_since(&after), Some(vec![a0]));

        state.on_data_model_changed(&model);
        assert_eq!(state.expansion_changes_since(&after), None);
    }

    #[test]
    fn test_expansion_history_is_bounded() {
        let model = TreeModel::<String>::new();
        let item = model.add_root("a".into());
        let mut state = TreeStateModel::new();
        let start = state.visibility_stamp().unwrap();
        for _ in 0..EXPANSION_HISTORY {
            state.toggle_expanded(&model, &item);
        }
        assert_eq!(state.expansion_changes_since(&start).map(|c| c.len()), Some(EXPANSION_HISTORY));

        state.toggle_expanded(&model, &item);
        assert_eq!(state.expansion_changes_since(&start), None);

        // A clone does not share history with the original
        let copy = state.clone();
        let stamp = state.visibility_stamp().unwrap();
        assert_eq!(copy.expansion_changes_since(&stamp), None);
        assert_ne!(copy.visibility_stamp(), Some(stamp));
    }
}
