//! Hierarchical tree model implementation.
//!
//! `TreeModel` stores nodes in a slot-map arena. Item ids carry the node's
//! versioned arena key, so an id for a removed node is recognized as stale
//! even if its slot is reused.

use std::sync::Arc;

use canopy_core::logging::targets;
use canopy_core::{ItemId, ModelId, NativeId};
use parking_lot::RwLock;
use slotmap::{Key, KeyData, SlotMap, new_key_type};

use super::data::ItemData;
use super::traits::{ItemFlags, ItemModel};

new_key_type! {
    /// Arena key of a tree node.
    pub struct NodeKey;
}

/// Trait for tree node data that provides its own field values.
///
/// Implement this trait for types that should be directly usable as tree nodes.
pub trait TreeNodeData: Send + Sync {
    /// Returns the value of `field`.
    fn field(&self, field: usize) -> ItemData;

    /// Stores `value` into `field`. Returns `false` if the field is read-only.
    fn set_field(&mut self, _field: usize, _value: ItemData) -> bool {
        false
    }

    /// Returns the flags for this node.
    fn flags(&self) -> ItemFlags {
        ItemFlags::new()
    }
}

impl TreeNodeData for String {
    fn field(&self, field: usize) -> ItemData {
        match field {
            0 => ItemData::from(self.as_str()),
            _ => ItemData::None,
        }
    }

    fn set_field(&mut self, field: usize, value: ItemData) -> bool {
        match (field, value) {
            (0, ItemData::String(text)) => {
                *self = text;
                true
            }
            _ => false,
        }
    }

    fn flags(&self) -> ItemFlags {
        ItemFlags::editable()
    }
}

/// One value per field; handy for multi-column trees.
impl TreeNodeData for Vec<ItemData> {
    fn field(&self, field: usize) -> ItemData {
        self.get(field).cloned().unwrap_or_default()
    }

    fn set_field(&mut self, field: usize, value: ItemData) -> bool {
        match self.get_mut(field) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn flags(&self) -> ItemFlags {
        ItemFlags::editable()
    }
}

/// A node in the tree structure.
struct TreeNode<T> {
    data: T,
    children: Vec<NodeKey>,
    parent: Option<NodeKey>,
}

/// Internal storage for tree nodes.
struct TreeStorage<T> {
    nodes: SlotMap<NodeKey, TreeNode<T>>,
    root_children: Vec<NodeKey>,
}

impl<T> TreeStorage<T> {
    fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root_children: Vec::new(),
        }
    }

    fn insert(&mut self, parent: Option<NodeKey>, index: Option<usize>, data: T) -> Option<(NodeKey, usize)> {
        if let Some(parent) = parent
            && !self.nodes.contains_key(parent)
        {
            return None;
        }
        let key = self.nodes.insert(TreeNode {
            data,
            children: Vec::new(),
            parent,
        });
        let siblings = match parent {
            Some(parent) => &mut self.nodes[parent].children,
            None => &mut self.root_children,
        };
        let row = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(row, key);
        Some((key, row))
    }

    fn remove_node(&mut self, key: NodeKey) -> Option<T> {
        let parent = self.nodes.get(key)?.parent;
        let siblings = match parent {
            Some(parent) => self.nodes.get_mut(parent).map(|node| &mut node.children),
            None => Some(&mut self.root_children),
        };
        if let Some(siblings) = siblings {
            siblings.retain(|&child| child != key);
        }

        let node = self.nodes.remove(key)?;
        let mut pending = node.children;
        while let Some(child) = pending.pop() {
            if let Some(removed) = self.nodes.remove(child) {
                pending.extend(removed.children);
            }
        }
        Some(node.data)
    }

    fn children_of(&self, parent: Option<NodeKey>) -> &[NodeKey] {
        match parent {
            None => &self.root_children,
            Some(key) => self
                .nodes
                .get(key)
                .map(|node| node.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    fn row_of(&self, key: NodeKey) -> Option<usize> {
        let parent = self.nodes.get(key)?.parent;
        self.children_of(parent).iter().position(|&child| child == key)
    }
}

/// A hierarchical tree model for parent-child data.
///
/// Mutators take `&self`; storage sits behind a read-write lock so the model
/// can be shared with proxies through an `Arc`. After structural edits,
/// call [`ItemModel::invalidate`] (or
/// [`invalidate_children`](ItemModel::invalidate_children)) on any proxy
/// stacked on top.
///
/// # Example
///
/// ```
/// use canopy::model::{ItemData, ItemModel, TreeModel, TreeNodeData};
///
/// struct FileNode {
///     name: String,
///     size: i64,
/// }
///
/// impl TreeNodeData for FileNode {
///     fn field(&self, field: usize) -> ItemData {
///         match field {
///             0 => ItemData::from(self.name.as_str()),
///             1 => ItemData::from(self.size),
///             _ => ItemData::None,
///         }
///     }
/// }
///
/// let model = TreeModel::<FileNode>::with_columns(2);
/// let docs = model.add_root(FileNode { name: "Documents".into(), size: 0 });
/// let file = model.add_child(&docs, FileNode { name: "file.txt".into(), size: 120 });
///
/// assert_eq!(model.parent(&file), docs);
/// assert_eq!(model.data(&file, 1).as_int(), Some(120));
/// ```
pub struct TreeModel<T> {
    id: ModelId,
    storage: RwLock<TreeStorage<T>>,
    column_count: usize,
}

impl<T: TreeNodeData> TreeModel<T> {
    /// Creates a new empty single-column tree model.
    pub fn new() -> Self {
        Self::with_columns(1)
    }

    /// Creates a new empty tree model with `columns` fields per item.
    pub fn with_columns(columns: usize) -> Self {
        Self {
            id: ModelId::next(),
            storage: RwLock::new(TreeStorage::new()),
            column_count: columns,
        }
    }

    /// Sets the number of columns.
    pub fn set_column_count(&mut self, count: usize) {
        self.column_count = count;
    }

    /// Adds a top-level node and returns its id.
    pub fn add_root(&self, data: T) -> ItemId {
        self.insert(&ItemId::root(), None, data)
    }

    /// Appends a child under `parent` and returns its id.
    ///
    /// Returns an invalid id if `parent` is not a node of this model.
    pub fn add_child(&self, parent: &ItemId, data: T) -> ItemId {
        self.insert(parent, None, data)
    }

    /// Inserts a child under `parent` at `index` (clamped to the child
    /// count) and returns its id.
    pub fn insert_child(&self, parent: &ItemId, index: usize, data: T) -> ItemId {
        self.insert(parent, Some(index), data)
    }

    fn insert(&self, parent: &ItemId, index: Option<usize>, data: T) -> ItemId {
        let parent_key = if parent.is_root() {
            None
        } else {
            match self.key_of(parent) {
                Some(key) => Some(key),
                None => return ItemId::invalid(),
            }
        };
        match self.storage.write().insert(parent_key, index, data) {
            Some((key, row)) => self.make_id(key, row),
            None => {
                tracing::warn!(target: targets::MODEL, ?parent, "insert under unknown parent");
                ItemId::invalid()
            }
        }
    }

    /// Removes a node and all its descendants.
    ///
    /// Returns the removed node's data, or `None` if the node doesn't exist.
    pub fn remove(&self, item: &ItemId) -> Option<T> {
        let key = self.key_of(item)?;
        self.storage.write().remove_node(key)
    }

    /// Clears all nodes from the tree.
    pub fn clear(&self) {
        let mut storage = self.storage.write();
        storage.nodes.clear();
        storage.root_children.clear();
    }

    /// Returns the number of top-level nodes.
    pub fn root_count(&self) -> usize {
        self.storage.read().root_children.len()
    }

    /// Returns the total number of nodes.
    pub fn len(&self) -> usize {
        self.storage.read().nodes.len()
    }

    /// Returns `true` if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.storage.read().nodes.is_empty()
    }

    /// Provides read access to a node's data.
    pub fn with_node<F, R>(&self, item: &ItemId, f: F) -> Option<R>
    where
        F: FnOnce(&T) -> R,
    {
        let key = self.key_of(item)?;
        let storage = self.storage.read();
        storage.nodes.get(key).map(|node| f(&node.data))
    }

    /// Provides mutable access to a node's data.
    pub fn modify_node<F, R>(&self, item: &ItemId, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let key = self.key_of(item)?;
        let mut storage = self.storage.write();
        storage.nodes.get_mut(key).map(|node| f(&mut node.data))
    }

    fn make_id(&self, key: NodeKey, row: usize) -> ItemId {
        ItemId::new(NativeId::U64(key.data().as_ffi()), row, 0, self.id)
    }

    /// Gets the arena key from an item id.
    fn key_of(&self, item: &ItemId) -> Option<NodeKey> {
        if !item.is_valid() {
            return None;
        }
        if !item.belongs_to(self.id) {
            tracing::warn!(target: targets::MODEL, ?item, "id from another model");
            return None;
        }
        match item.native()? {
            NativeId::U64(raw) => Some(NodeKey::from(KeyData::from_ffi(raw))),
            _ => None,
        }
    }

    fn parent_key(&self, parent: &ItemId) -> Option<Option<NodeKey>> {
        if parent.is_root() {
            Some(None)
        } else {
            self.key_of(parent).map(Some)
        }
    }
}

impl<T: TreeNodeData> Default for TreeModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TreeNodeData> ItemModel for TreeModel<T> {
    fn model_id(&self) -> ModelId {
        self.id
    }

    fn child_count(&self, parent: &ItemId) -> usize {
        let Some(parent) = self.parent_key(parent) else {
            return 0;
        };
        self.storage.read().children_of(parent).len()
    }

    fn child(&self, parent: &ItemId, index: usize) -> ItemId {
        let Some(parent) = self.parent_key(parent) else {
            return ItemId::invalid();
        };
        let storage = self.storage.read();
        match storage.children_of(parent).get(index) {
            Some(&key) => self.make_id(key, index),
            None => ItemId::invalid(),
        }
    }

    fn parent(&self, item: &ItemId) -> ItemId {
        let Some(key) = self.key_of(item) else {
            return ItemId::invalid();
        };
        let storage = self.storage.read();
        match storage.nodes.get(key) {
            None => ItemId::invalid(),
            Some(node) => match node.parent {
                None => ItemId::root(),
                Some(parent) => storage
                    .row_of(parent)
                    .map(|row| self.make_id(parent, row))
                    .unwrap_or_else(ItemId::invalid),
            },
        }
    }

    fn column_count(&self) -> usize {
        self.column_count
    }

    fn data(&self, item: &ItemId, field: usize) -> ItemData {
        if field >= self.column_count {
            return ItemData::None;
        }
        self.with_node(item, |data| data.field(field))
            .unwrap_or_default()
    }

    fn set_data(&self, item: &ItemId, field: usize, value: ItemData) -> bool {
        if field >= self.column_count {
            return false;
        }
        self.modify_node(item, |data| data.set_field(field, value))
            .unwrap_or(false)
    }

    fn flags(&self, item: &ItemId) -> ItemFlags {
        self.with_node(item, |data| data.flags())
            .unwrap_or_else(ItemFlags::disabled)
    }

    fn has_children(&self, item: &ItemId) -> bool {
        self.child_count(item) > 0
    }

    fn all_children(&self, parent: &ItemId) -> Arc<[ItemId]> {
        let Some(parent) = self.parent_key(parent) else {
            return Arc::from(Vec::new());
        };
        let storage = self.storage.read();
        storage
            .children_of(parent)
            .iter()
            .enumerate()
            .map(|(row, &key)| self.make_id(key, row))
            .collect()
    }

    fn child_index(&self, item: &ItemId) -> Option<usize> {
        let key = self.key_of(item)?;
        self.storage.read().row_of(key)
    }

    fn contains(&self, item: &ItemId) -> bool {
        self.key_of(item)
            .is_some_and(|key| self.storage.read().nodes.contains_key(key))
    }
}

static_assertions::assert_impl_all!(TreeModel<String>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    struct FileNode {
        name: String,
        size: i64,
    }

    impl TreeNodeData for FileNode {
        fn field(&self, field: usize) -> ItemData {
            match field {
                0 => ItemData::from(self.name.as_str()),
                1 => ItemData::from(self.size),
                _ => ItemData::None,
            }
        }
    }

    fn file(name: &str, size: i64) -> FileNode {
        FileNode {
            name: name.into(),
            size,
        }
    }

    #[test]
    fn test_tree_model_basic() {
        let model = TreeModel::<FileNode>::with_columns(2);
        let docs = model.add_root(file("Documents", 0));

        assert_eq!(model.root_count(), 1);
        assert_eq!(model.child_count(&ItemId::root()), 1);
        assert_eq!(model.child(&ItemId::root(), 0), docs);
        assert_eq!(model.data(&docs, 0).as_string(), Some("Documents"));
        assert_eq!(model.data(&docs, 1).as_int(), Some(0));
        assert!(model.data(&docs, 2).is_none());
    }

    #[test]
    fn test_tree_model_hierarchy() {
        let model = TreeModel::<FileNode>::with_columns(2);
        let root = model.add_root(file("Root", 0));
        let child1 = model.add_child(&root, file("Child1", 0));
        let child2 = model.add_child(&root, file("Child2", 10));
        let grandchild = model.add_child(&child1, file("Grandchild", 5));

        assert_eq!(model.child_count(&root), 2);
        assert_eq!(model.child(&root, 1), child2);
        assert_eq!(model.parent(&grandchild), child1);
        assert_eq!(model.parent(&child1), root);
        assert_eq!(model.parent(&root), ItemId::root());
        assert_eq!(model.child_index(&child2), Some(1));
        assert!(model.has_children(&child1));
        assert!(!model.has_children(&child2));
        assert_eq!(model.all_children(&root).to_vec(), vec![child1, child2]);
    }

    #[test]
    fn test_insert_child_at_position() {
        let model = TreeModel::<String>::new();
        let a = model.add_root("a".into());
        let c = model.add_root("c".into());
        let b = model.insert_child(&ItemId::root(), 1, "b".into());
        let z = model.insert_child(&ItemId::root(), 99, "z".into());

        assert_eq!(model.all_children(&ItemId::root()).to_vec(), vec![a, b, c, z]);
    }

    #[test]
    fn test_tree_model_remove() {
        let model = TreeModel::<String>::new();
        let root = model.add_root("Root".into());
        let child = model.add_child(&root, "Child".into());
        let grandchild = model.add_child(&child, "Grandchild".into());

        assert_eq!(model.remove(&child).as_deref(), Some("Child"));
        assert_eq!(model.child_count(&root), 0);
        assert_eq!(model.len(), 1);
        assert!(!model.contains(&grandchild));
        assert!(!model.parent(&grandchild).is_valid());
        assert!(model.remove(&child).is_none());
    }

    #[test]
    fn test_stale_id_after_slot_reuse() {
        let model = TreeModel::<String>::new();
        let old = model.add_root("old".into());
        model.remove(&old);
        let new = model.add_root("new".into());

        assert_ne!(old, new);
        assert!(!model.contains(&old));
        assert!(model.data(&old, 0).is_none());
        assert_eq!(model.data(&new, 0).as_string(), Some("new"));
    }

    #[test]
    fn test_foreign_ids_rejected() {
        let model = TreeModel::<String>::new();
        let other = TreeModel::<String>::new();
        let foreign = other.add_root("x".into());
        model.add_root("y".into());

        assert_eq!(model.child_count(&foreign), 0);
        assert!(!model.contains(&foreign));
        assert!(!model.add_child(&foreign, "z".into()).is_valid());
    }

    #[test]
    fn test_set_data_and_modify() {
        let model = TreeModel::<String>::new();
        let item = model.add_root("before".into());

        assert!(model.set_data(&item, 0, ItemData::from("after")));
        assert!(!model.set_data(&item, 0, ItemData::from(3)));
        assert_eq!(model.with_node(&item, String::clone).as_deref(), Some("after"));

        model.modify_node(&item, |name| name.push('!'));
        assert_eq!(model.data(&item, 0).as_string(), Some("after!"));
        assert!(model.flags(&item).editable);
        assert!(!model.flags(&ItemId::invalid()).enabled);
    }

    #[test]
    fn test_tree_model_clear() {
        let model = TreeModel::<String>::new();
        model.add_root("Root1".into());
        model.add_root("Root2".into());
        assert_eq!(model.root_count(), 2);

        model.clear();
        assert!(model.is_empty());
        assert_eq!(model.root_count(), 0);
    }

    #[test]
    fn test_multi_column_rows() {
        let model = TreeModel::<Vec<ItemData>>::with_columns(2);
        let item = model.add_root(vec![ItemData::from("x"), ItemData::from(7)]);
        assert_eq!(model.data(&item, 1).as_int(), Some(7));
        assert!(model.set_data(&item, 1, ItemData::from(8)));
        assert_eq!(model.data(&item, 1).as_int(), Some(8));
    }
}
