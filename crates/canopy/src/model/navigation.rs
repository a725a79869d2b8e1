//! Sibling and descendant navigation for any [`ItemModel`].
//!
//! Every operation here is derived from [`ItemModel::parent`] and
//! [`ItemModel::all_children`], so a proxy that caches child arrays makes
//! navigation cheap without any extra work.

use std::sync::Arc;

use canopy_core::ItemId;

use super::traits::ItemModel;

/// Navigation helpers available on every model.
///
/// # Example
///
/// ```
/// use canopy::model::{TreeModel, TreeNavigation};
///
/// let model = TreeModel::<String>::new();
/// let a = model.add_root("a".into());
/// let b = model.add_root("b".into());
/// let b0 = model.add_child(&b, "b0".into());
///
/// assert_eq!(model.next_sibling(&a), b);
/// assert!(model.is_last_child(&b));
/// assert_eq!(model.descendants(&b).collect::<Vec<_>>(), vec![b0]);
/// ```
pub trait TreeNavigation: ItemModel {
    /// Returns `true` if `item` is the final child of its parent.
    ///
    /// Invalid or unknown items are never the last child.
    fn is_last_child(&self, item: &ItemId) -> bool {
        if !item.is_valid() {
            return false;
        }
        let siblings = self.all_children(&self.parent(item));
        siblings.last() == Some(&item.with_column(0))
    }

    /// Returns the sibling after `item`, or an invalid id.
    fn next_sibling(&self, item: &ItemId) -> ItemId {
        sibling_at(self, item, 1)
    }

    /// Returns the sibling before `item`, or an invalid id.
    fn previous_sibling(&self, item: &ItemId) -> ItemId {
        sibling_at(self, item, -1)
    }

    /// Returns the first child of `parent`, or an invalid id.
    fn first_child(&self, parent: &ItemId) -> ItemId {
        self.all_children(parent)
            .first()
            .copied()
            .unwrap_or_else(ItemId::invalid)
    }

    /// Returns the last child of `parent`, or an invalid id.
    fn last_child(&self, parent: &ItemId) -> ItemId {
        self.all_children(parent)
            .last()
            .copied()
            .unwrap_or_else(ItemId::invalid)
    }

    /// Returns the first descendant of `item` in pre-order.
    ///
    /// That is always the first child; the invalid id is returned when
    /// `item` has none.
    fn first_descendant(&self, item: &ItemId) -> ItemId {
        self.first_child(item)
    }

    /// Returns the last descendant of `item` in pre-order.
    ///
    /// Follows last children down to a leaf. Returns the invalid id when
    /// `item` has no children.
    fn last_descendant(&self, item: &ItemId) -> ItemId {
        let mut current = ItemId::invalid();
        let mut children = self.all_children(item);
        while let Some(last) = children.last().copied() {
            current = last;
            children = self.all_children(&current);
        }
        current
    }

    /// Iterates over every descendant of `item` in pre-order.
    ///
    /// `item` itself is not yielded. Traversal uses an explicit stack, so
    /// depth is bounded only by memory.
    fn descendants(&self, item: &ItemId) -> Descendants<'_, Self> {
        Descendants::new(self, item)
    }

    /// Returns the number of levels between the root and `item`.
    ///
    /// Top-level items have depth 0. Returns `None` for ids not reachable
    /// from the root.
    fn depth_of(&self, item: &ItemId) -> Option<usize> {
        if !item.is_valid() {
            return None;
        }
        let mut depth = 0;
        let mut current = self.parent(item);
        while !current.is_root() {
            if !current.is_valid() {
                return None;
            }
            depth += 1;
            current = self.parent(&current);
        }
        Some(depth)
    }
}

impl<M: ItemModel + ?Sized> TreeNavigation for M {}

fn sibling_at<M>(model: &M, item: &ItemId, offset: isize) -> ItemId
where
    M: ItemModel + ?Sized,
{
    if !item.is_valid() {
        return ItemId::invalid();
    }
    let siblings = model.all_children(&model.parent(item));
    let key = item.with_column(0);
    siblings
        .iter()
        .position(|sibling| *sibling == key)
        .and_then(|position| position.checked_add_signed(offset))
        .and_then(|position| siblings.get(position).copied())
        .unwrap_or_else(ItemId::invalid)
}

/// Pre-order iterator over the descendants of an item.
///
/// Created by [`TreeNavigation::descendants`].
pub struct Descendants<'a, M: ?Sized> {
    model: &'a M,
    stack: Vec<(Arc<[ItemId]>, usize)>,
}

impl<'a, M: ItemModel + ?Sized> Descendants<'a, M> {
    fn new(model: &'a M, item: &ItemId) -> Self {
        let children = model.all_children(item);
        let stack = if children.is_empty() {
            Vec::new()
        } else {
            vec![(children, 0)]
        };
        Self { model, stack }
    }
}

impl<M: ItemModel + ?Sized> Iterator for Descendants<'_, M> {
    type Item = ItemId;

    fn next(&mut self) -> Option<ItemId> {
        loop {
            let (children, position) = self.stack.last_mut()?;
            let Some(item) = children.get(*position).copied() else {
                self.stack.pop();
                continue;
            };
            *position += 1;

            let grandchildren = self.model.all_children(&item);
            if !grandchildren.is_empty() {
                self.stack.push((grandchildren, 0));
            }
            return Some(item);
        }
    }
}

impl<M: ?Sized> std::fmt::Debug for Descendants<'_, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descendants")
            .field("depth", &self.stack.len())
            .finish()
    }
}
