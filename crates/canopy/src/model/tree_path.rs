//! Persistent addresses for tree items.
//!
//! A [`TreePath`] records the child index at every level from the root down
//! to an item. Unlike an [`ItemId`], which a model may stop recognizing
//! after a structural edit, a path can always be re-resolved: it either
//! lands on whatever item now occupies that position or yields the invalid
//! sentinel.
//!
//! Paths up to [`INLINE_LEVELS`] deep are stored inline; deeper paths spill
//! to the heap transparently.

use std::fmt;

use canopy_core::{ItemId, ModelError, ModelResult};
use smallvec::SmallVec;

use super::state::StateModel;
use super::traits::ItemModel;

/// Number of levels stored without a heap allocation.
pub const INLINE_LEVELS: usize = 10;

/// A root-to-item sequence of child indices.
///
/// The empty path addresses the root.
///
/// # Example
///
/// ```
/// use canopy::model::{ItemModel, TreeModel, TreePath};
/// use canopy_core::ItemId;
///
/// let model = TreeModel::<String>::new();
/// let docs = model.add_root("Documents".to_string());
/// model.add_root("Music".to_string());
/// let report = model.add_child(&docs, "report.txt".to_string());
///
/// let path = TreePath::from_item(&model, &report).unwrap();
/// assert_eq!(path.indices(), &[0, 0]);
/// assert_eq!(path.resolve(&model), report);
/// assert_eq!(path.to_string(), "0/0");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreePath {
    indices: SmallVec<[usize; INLINE_LEVELS]>,
}

impl TreePath {
    /// Creates the empty path (the root).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a path from root-to-leaf child indices.
    pub fn from_indices<I: IntoIterator<Item = usize>>(indices: I) -> Self {
        Self {
            indices: indices.into_iter().collect(),
        }
    }

    /// Builds the path of `item` by walking its ancestors.
    ///
    /// Returns `None` if `item` is invalid or is not reachable from the
    /// root of `model`. The root sentinel builds the empty path.
    pub fn from_item<M>(model: &M, item: &ItemId) -> Option<Self>
    where
        M: ItemModel + ?Sized,
    {
        let mut indices: SmallVec<[usize; INLINE_LEVELS]> = SmallVec::new();
        let mut current = *item;
        while !current.is_root() {
            let index = model.child_index(&current)?;
            indices.push(index);
            current = model.parent(&current);
            if !current.is_parent_candidate() {
                return None;
            }
        }
        indices.reverse();
        Some(Self { indices })
    }

    /// Returns the number of levels below the root.
    #[inline]
    pub fn depth(&self) -> usize {
        self.indices.len()
    }

    /// Returns the number of stored levels; always equal to [`depth`](Self::depth).
    #[inline]
    pub fn level_count(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` for the empty path.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the stored child indices, root first.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Returns the child index stored for `level` (0 is the top level).
    #[inline]
    pub fn index_at_level(&self, level: usize) -> Option<usize> {
        self.indices.get(level).copied()
    }

    /// Returns `true` once the path has outgrown its inline buffer.
    #[inline]
    pub fn is_spilled(&self) -> bool {
        self.indices.spilled()
    }

    /// Appends a level.
    pub fn push(&mut self, index: usize) {
        self.indices.push(index);
    }

    /// Removes and returns the deepest level.
    pub fn pop(&mut self) -> Option<usize> {
        self.indices.pop()
    }

    /// Returns the path of the parent, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, ancestors) = self.indices.split_last()?;
        Some(Self::from_indices(ancestors.iter().copied()))
    }

    /// Returns `true` if `self` is a strict prefix of `other`.
    pub fn is_ancestor_of(&self, other: &TreePath) -> bool {
        self.depth() < other.depth() && other.indices.starts_with(&self.indices)
    }

    /// Resolves the path against `model`.
    ///
    /// Returns the invalid sentinel if an index is out of range at any
    /// level.
    pub fn resolve<M>(&self, model: &M) -> ItemId
    where
        M: ItemModel + ?Sized,
    {
        self.try_resolve(model).unwrap_or_else(|_| ItemId::invalid())
    }

    /// Resolves the path, reporting where it stopped matching.
    pub fn try_resolve<M>(&self, model: &M) -> ModelResult<ItemId>
    where
        M: ItemModel + ?Sized,
    {
        self.resolve_prefix(model, self.indices.len())
    }

    /// Resolves only the first `level + 1` indices.
    ///
    /// Returns the invalid sentinel when `level` is beyond the path or the
    /// prefix no longer matches the hierarchy.
    pub fn item_at_level<M>(&self, model: &M, level: usize) -> ItemId
    where
        M: ItemModel + ?Sized,
    {
        if level >= self.indices.len() {
            return ItemId::invalid();
        }
        self.resolve_prefix(model, level + 1)
            .unwrap_or_else(|_| ItemId::invalid())
    }

    /// Resolves the path, requiring every ancestor to be expanded in `state`.
    ///
    /// Returns the invalid sentinel for items a view would not show.
    pub fn resolve_visible<M, S>(&self, model: &M, state: &S) -> ItemId
    where
        M: ItemModel + ?Sized,
        S: StateModel + ?Sized,
    {
        let mut current = ItemId::root();
        for &index in &self.indices {
            if current.is_valid() && !state.is_expanded(&current) {
                return ItemId::invalid();
            }
            current = model.child(&current, index);
            if !current.is_valid() {
                return ItemId::invalid();
            }
        }
        current
    }

    fn resolve_prefix<M>(&self, model: &M, levels: usize) -> ModelResult<ItemId>
    where
        M: ItemModel + ?Sized,
    {
        let mut current = ItemId::root();
        for (level, &index) in self.indices.iter().take(levels).enumerate() {
            let count = model.child_count(&current);
            let child = if index < count {
                model.child(&current, index)
            } else {
                ItemId::invalid()
            };
            if !child.is_valid() {
                return Err(ModelError::PathMismatch {
                    level,
                    index,
                    count,
                });
            }
            current = child;
        }
        Ok(current)
    }
}

impl fmt::Debug for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreePath({self})")
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.indices.is_empty() {
            return write!(f, "(root)");
        }
        for (level, index) in self.indices.iter().enumerate() {
            if level > 0 {
                write!(f, "/")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

impl FromIterator<usize> for TreePath {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::from_indices(iter)
    }
}
