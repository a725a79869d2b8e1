//! Mapping between items and their rank in the flattened visible tree.
//!
//! A virtualized view shows only the items whose ancestors are all
//! expanded, laid out in pre-order. The rank of an item is its position in
//! that sequence; rank 0 is the first top-level item. These operations
//! never materialize the flattened sequence: they skip whole collapsed or
//! counted subtrees using [`RankNavigation::visible_descendant_count`].
//!
//! Expansion state comes from a [`StateModel`]; the root is always treated
//! as expanded.
//!
//! # Memoized counts
//!
//! A model that exposes [`VisibleCounts`] through
//! [`ItemModel::visible_counts`] (every [`ArrayProxyModel`]) remembers the
//! visible size of each expanded sub-tree it has counted. Paired with a
//! state model that reports a [`VisibilityStamp`], rank queries then cost
//! one child array per level instead of a walk over every visible item.
//! An expansion change drops the counts of the changed item and its
//! ancestors; [`ItemModel::invalidate`] and
//! [`ItemModel::invalidate_children`] drop the counts a structural edit
//! affects. Without a memo every count walks the visible sub-tree.
//!
//! [`ArrayProxyModel`]: super::ArrayProxyModel

use std::num::NonZeroUsize;
use std::sync::Arc;

use canopy_core::logging::targets;
use canopy_core::{ItemId, LruCache};
use parking_lot::Mutex;

use super::navigation::TreeNavigation;
use super::state::{StateModel, VisibilityStamp};
use super::traits::ItemModel;

/// Memo of visible sub-tree sizes, valid for one [`VisibilityStamp`].
///
/// Entries map an item to the number of visible items below it when it is
/// expanded.
pub struct VisibleCounts {
    inner: Mutex<CountsInner>,
}

struct CountsInner {
    stamp: Option<VisibilityStamp>,
    counts: LruCache<ItemId, usize>,
}

impl VisibleCounts {
    /// Creates an empty memo holding at most `capacity` counts.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(CountsInner {
                stamp: None,
                counts: LruCache::new(capacity),
            }),
        }
    }

    /// Returns the number of memoized counts.
    pub fn len(&self) -> usize {
        self.inner.lock().counts.len()
    }

    /// Returns `true` if nothing is memoized.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every count.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.counts.clear();
        inner.stamp = None;
    }

    pub(crate) fn set_capacity(&self, capacity: NonZeroUsize) {
        self.inner.lock().counts.set_capacity(capacity);
    }

    /// Drops the counts of `items`.
    pub(crate) fn forget(&self, items: &[ItemId]) {
        let mut inner = self.inner.lock();
        for item in items {
            inner.counts.remove(item);
        }
    }

    fn stamp(&self) -> Option<VisibilityStamp> {
        self.inner.lock().stamp
    }

    /// Moves the memo from stamp `from` to `to`, dropping `stale` counts,
    /// or everything when the difference is unknown.
    fn advance(&self, from: Option<VisibilityStamp>, to: VisibilityStamp, stale: Option<Vec<ItemId>>) {
        let mut inner = self.inner.lock();
        match stale {
            Some(stale) if inner.stamp == from => {
                tracing::trace!(target: targets::CACHE, dropped = stale.len(), "visible counts advanced");
                for item in &stale {
                    inner.counts.remove(item);
                }
            }
            _ => {
                tracing::trace!(target: targets::CACHE, entries = inner.counts.len(), "visible counts reset");
                inner.counts.clear();
            }
        }
        inner.stamp = Some(to);
    }

    fn get(&self, item: &ItemId, stamp: VisibilityStamp) -> Option<usize> {
        let mut inner = self.inner.lock();
        if inner.stamp != Some(stamp) {
            return None;
        }
        inner.counts.get(item).copied()
    }

    fn insert(&self, item: ItemId, count: usize, stamp: VisibilityStamp) {
        let mut inner = self.inner.lock();
        if inner.stamp == Some(stamp) {
            inner.counts.insert(item, count);
        }
    }
}

impl std::fmt::Debug for VisibleCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("VisibleCounts")
            .field("stamp", &inner.stamp)
            .field("entries", &inner.counts.len())
            .finish()
    }
}

/// Appends `item` and every ancestor up to the root.
pub(crate) fn push_with_ancestors<M>(model: &M, item: &ItemId, out: &mut Vec<ItemId>)
where
    M: ItemModel + ?Sized,
{
    let mut current = item.with_column(0);
    loop {
        out.push(current);
        if current.is_root() {
            return;
        }
        current = model.parent(&current);
        if !current.is_parent_candidate() {
            return;
        }
    }
}

/// One level of an in-progress sub-tree count.
struct CountFrame {
    item: ItemId,
    children: Arc<[ItemId]>,
    next: usize,
    total: usize,
}

impl CountFrame {
    fn new(item: ItemId, children: Arc<[ItemId]>) -> Self {
        let total = children.len();
        Self {
            item,
            children,
            next: 0,
            total,
        }
    }
}

/// Counts visible sub-trees for one query, through the model's memo when
/// both sides support it.
struct VisibleCounter<'a, M: ?Sized, S: ?Sized> {
    model: &'a M,
    state: &'a S,
    memo: Option<(&'a VisibleCounts, VisibilityStamp)>,
}

impl<'a, M, S> VisibleCounter<'a, M, S>
where
    M: ItemModel + ?Sized,
    S: StateModel + ?Sized,
{
    fn new(model: &'a M, state: &'a S) -> Self {
        let memo = match (model.visible_counts(), state.visibility_stamp()) {
            (Some(counts), Some(stamp)) => {
                Self::sync(model, state, counts, stamp);
                Some((counts, stamp))
            }
            _ => None,
        };
        Self { model, state, memo }
    }

    /// Brings `counts` up to `stamp`. Upstream calls happen without the
    /// memo lock.
    fn sync(model: &M, state: &S, counts: &VisibleCounts, stamp: VisibilityStamp) {
        let seen = counts.stamp();
        if seen == Some(stamp) {
            return;
        }
        let stale = seen
            .and_then(|seen| state.expansion_changes_since(&seen))
            .map(|changed| {
                let mut stale = Vec::new();
                for item in &changed {
                    push_with_ancestors(model, item, &mut stale);
                }
                stale
            });
        counts.advance(seen, stamp, stale);
    }

    fn recall(&self, item: &ItemId) -> Option<usize> {
        let (counts, stamp) = self.memo?;
        counts.get(item, stamp)
    }

    fn remember(&self, item: ItemId, count: usize) {
        if let Some((counts, stamp)) = self.memo {
            counts.insert(item, count, stamp);
        }
    }

    /// Visible items below `item`; zero unless it is the root or expanded.
    fn subtree(&self, item: &ItemId) -> usize {
        if !item.is_root() && !self.state.is_expanded(item) {
            return 0;
        }
        self.expanded_subtree(item.with_column(0))
    }

    /// Post-order walk that stops at memoized sub-trees and memoizes every
    /// sub-tree it finishes.
    fn expanded_subtree(&self, item: ItemId) -> usize {
        if let Some(count) = self.recall(&item) {
            return count;
        }
        let mut stack = vec![CountFrame::new(item, self.model.all_children(&item))];
        let mut count = 0;
        while let Some(frame) = stack.last_mut() {
            match frame.children.get(frame.next).copied() {
                Some(child) => {
                    frame.next += 1;
                    if !self.state.is_expanded(&child) {
                        continue;
                    }
                    match self.recall(&child) {
                        Some(below) => frame.total += below,
                        None => {
                            let children = self.model.all_children(&child);
                            stack.push(CountFrame::new(child, children));
                        }
                    }
                }
                None => {
                    let (finished, total) = (frame.item, frame.total);
                    stack.pop();
                    self.remember(finished, total);
                    match stack.last_mut() {
                        Some(parent) => parent.total += total,
                        None => count = total,
                    }
                }
            }
        }
        count
    }
}

/// Rank-based navigation available on every model.
///
/// All methods assume the items passed in are visible under `state`.
///
/// # Example
///
/// ```
/// use canopy::model::{RankNavigation, StateModel, TreeModel, TreeStateModel};
///
/// let model = TreeModel::<String>::new();
/// let a = model.add_root("a".into());
/// let a0 = model.add_child(&a, "a0".into());
/// let b = model.add_root("b".into());
///
/// let mut state = TreeStateModel::new();
/// assert_eq!(model.find_item(1, &state), b);
///
/// state.expand(&model, &a, true, false);
/// assert_eq!(model.find_item(1, &state), a0);
/// assert_eq!(model.item_rank(&b, &state), Some(2));
/// ```
pub trait RankNavigation: ItemModel {
    /// Returns the number of visible items below `item`.
    ///
    /// A collapsed item has no visible descendants. Children of expanded
    /// children count recursively.
    fn visible_descendant_count<S>(&self, item: &ItemId, state: &S) -> usize
    where
        S: StateModel + ?Sized,
    {
        if !item.is_parent_candidate() {
            return 0;
        }
        VisibleCounter::new(self, state).subtree(item)
    }

    /// Returns the total number of visible items.
    fn visible_count<S>(&self, state: &S) -> usize
    where
        S: StateModel + ?Sized,
    {
        self.visible_descendant_count(&ItemId::root(), state)
    }

    /// Returns the item at `rank`, or an invalid id if `rank` is past the end.
    fn find_item<S>(&self, rank: usize, state: &S) -> ItemId
    where
        S: StateModel + ?Sized,
    {
        let counter = VisibleCounter::new(self, state);
        let mut parent = ItemId::root();
        let mut remaining = rank;
        'levels: loop {
            for child in self.all_children(&parent).iter() {
                if remaining == 0 {
                    return *child;
                }
                let subtree = counter.subtree(child);
                if remaining <= subtree {
                    parent = *child;
                    remaining -= 1;
                    continue 'levels;
                }
                remaining -= subtree + 1;
            }
            return ItemId::invalid();
        }
    }

    /// Returns the rank of `item`, or `None` if it is not visible.
    fn item_rank<S>(&self, item: &ItemId, state: &S) -> Option<usize>
    where
        S: StateModel + ?Sized,
    {
        if !item.is_valid() {
            return None;
        }

        let counter = VisibleCounter::new(self, state);
        let mut rank = 0;
        let mut current = item.with_column(0);
        loop {
            let parent = self.parent(&current);
            if parent.is_valid() {
                if !state.is_expanded(&parent) {
                    return None;
                }
                rank += 1;
            } else if !parent.is_root() {
                return None;
            }

            let siblings = self.all_children(&parent);
            let position = siblings.iter().position(|sibling| *sibling == current)?;
            rank += siblings[..position]
                .iter()
                .map(|sibling| 1 + counter.subtree(sibling))
                .sum::<usize>();

            if parent.is_root() {
                return Some(rank);
            }
            current = parent;
        }
    }

    /// Returns the item at `rank`, starting the search at a known item.
    ///
    /// `start` must be visible and have rank `start_rank`. The walk moves
    /// forward or backward from there, which is cheaper than
    /// [`find_item`](Self::find_item) when the target is nearby. An invalid
    /// `start` falls back to a search from the root.
    fn find_item_from<S>(&self, rank: usize, start: &ItemId, start_rank: usize, state: &S) -> ItemId
    where
        S: StateModel + ?Sized,
    {
        if !start.is_valid() {
            return self.find_item(rank, state);
        }
        let counter = VisibleCounter::new(self, state);
        if rank >= start_rank {
            step_forward(&counter, start, rank - start_rank)
        } else {
            step_backward(&counter, start, start_rank - rank)
        }
    }

    /// Returns the item `n` ranks after `item`, or an invalid id.
    fn next_item<S>(&self, item: &ItemId, n: usize, state: &S) -> ItemId
    where
        S: StateModel + ?Sized,
    {
        if !item.is_valid() {
            return ItemId::invalid();
        }
        step_forward(&VisibleCounter::new(self, state), item, n)
    }

    /// Returns the item `n` ranks before `item`, or an invalid id.
    fn prev_item<S>(&self, item: &ItemId, n: usize, state: &S) -> ItemId
    where
        S: StateModel + ?Sized,
    {
        if !item.is_valid() {
            return ItemId::invalid();
        }
        step_backward(&VisibleCounter::new(self, state), item, n)
    }
}

impl<M: ItemModel + ?Sized> RankNavigation for M {}

fn step_forward<M, S>(counter: &VisibleCounter<'_, M, S>, start: &ItemId, n: usize) -> ItemId
where
    M: ItemModel + ?Sized,
    S: StateModel + ?Sized,
{
    let model = counter.model;
    let mut current = *start;
    let mut remaining = n;
    loop {
        if remaining == 0 {
            return current;
        }

        let subtree = counter.subtree(&current);
        if remaining <= subtree {
            current = model.first_child(&current);
            remaining -= 1;
            continue;
        }
        remaining -= subtree;

        // Skip past the subtree, climbing until a next sibling exists
        loop {
            let next = model.next_sibling(&current);
            if next.is_valid() {
                current = next;
                remaining -= 1;
                break;
            }
            current = model.parent(&current);
            if !current.is_valid() {
                return ItemId::invalid();
            }
        }
    }
}

fn step_backward<M, S>(counter: &VisibleCounter<'_, M, S>, start: &ItemId, n: usize) -> ItemId
where
    M: ItemModel + ?Sized,
    S: StateModel + ?Sized,
{
    let model = counter.model;
    let mut current = *start;
    let mut remaining = n;
    while remaining > 0 {
        let previous = model.previous_sibling(&current);
        if !previous.is_valid() {
            current = model.parent(&current);
            if !current.is_valid() {
                return ItemId::invalid();
            }
            remaining -= 1;
            continue;
        }

        let subtree = counter.subtree(&previous);
        if remaining > subtree {
            current = previous;
            remaining -= subtree + 1;
        } else {
            // Target lies inside the previous sibling's subtree
            return step_forward(counter, &previous, subtree + 1 - remaining);
        }
    }
    current
}
