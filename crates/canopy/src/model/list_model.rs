//! Generic list model implementation.
//!
//! `ListModel<T>` exposes a flat vector as top-level items of the root. It
//! supports both trait-based and closure-based approaches for data
//! extraction, and sorts natively because its values are directly
//! indexable.

use std::sync::Arc;

use canopy_core::logging::targets;
use canopy_core::{ItemId, ModelId, NativeId, PerfSpan};
use parking_lot::RwLock;

use super::data::ItemData;
use super::sort::{SortFilter, sort_by_values};
use super::traits::{ItemFlags, ItemModel};

/// Trait for items that can provide their own field values.
///
/// # Example
///
/// ```
/// use canopy::model::{ItemData, ListItem};
///
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// impl ListItem for Person {
///     fn field(&self, field: usize) -> ItemData {
///         match field {
///             0 => ItemData::from(self.name.as_str()),
///             1 => ItemData::from(self.age),
///             _ => ItemData::None,
///         }
///     }
/// }
/// ```
pub trait ListItem: Send + Sync {
    /// Returns the value of `field`.
    fn field(&self, field: usize) -> ItemData;

    /// Stores `value` into `field`. Returns `false` if the field is read-only.
    fn set_field(&mut self, _field: usize, _value: ItemData) -> bool {
        false
    }

    /// Returns the flags for this item.
    fn flags(&self) -> ItemFlags {
        ItemFlags::new().with_never_has_children(true)
    }
}

impl ListItem for String {
    fn field(&self, field: usize) -> ItemData {
        match field {
            0 => ItemData::from(self.as_str()),
            _ => ItemData::None,
        }
    }
}

/// Type alias for a data extractor function.
pub type DataExtractor<T> = Arc<dyn Fn(&T, usize) -> ItemData + Send + Sync>;

/// Type alias for a data setter function.
pub type DataSetter<T> = Arc<dyn Fn(&mut T, usize, ItemData) -> bool + Send + Sync>;

/// Type alias for a flags extractor function.
pub type FlagsExtractor<T> = Arc<dyn Fn(&T) -> ItemFlags + Send + Sync>;

/// A generic list model.
///
/// Item ids are positional: the id of row `n` always addresses whatever item
/// currently sits at row `n`.
///
/// # Example (Trait-based)
///
/// ```
/// use canopy::model::{ItemModel, ListModel};
/// use canopy_core::ItemId;
///
/// let model = ListModel::new(vec!["pear".to_string(), "apple".to_string()]);
/// assert_eq!(model.child_count(&ItemId::root()), 2);
/// assert_eq!(model.data(&model.item_id(1), 0).as_string(), Some("apple"));
/// ```
///
/// # Example (Closure-based)
///
/// ```
/// use canopy::model::{ItemData, ItemModel, ListModel};
///
/// struct Person {
///     name: String,
///     email: String,
/// }
///
/// let model = ListModel::with_extractor(
///     vec![
///         Person { name: "Alice".into(), email: "alice@example.com".into() },
///         Person { name: "Bob".into(), email: "bob@example.com".into() },
///     ],
///     |person, field| match field {
///         0 => ItemData::from(person.name.as_str()),
///         1 => ItemData::from(person.email.as_str()),
///         _ => ItemData::None,
///     },
/// )
/// .with_columns(2);
///
/// assert_eq!(model.data(&model.item_id(1), 1).as_string(), Some("bob@example.com"));
/// ```
pub struct ListModel<T> {
    id: ModelId,
    items: RwLock<Vec<T>>,
    column_count: usize,
    extractor: DataExtractor<T>,
    setter: Option<DataSetter<T>>,
    flags_extractor: FlagsExtractor<T>,
}

impl<T: ListItem + 'static> ListModel<T> {
    /// Creates a single-column list model from items implementing [`ListItem`].
    pub fn new(items: Vec<T>) -> Self {
        let mut model = Self::with_extractor(items, |item: &T, field| item.field(field));
        model.setter = Some(Arc::new(|item: &mut T, field: usize, value: ItemData| {
            item.set_field(field, value)
        }));
        model.flags_extractor = Arc::new(|item: &T| item.flags());
        model
    }
}

impl<T: Send + Sync + 'static> ListModel<T> {
    /// Creates a single-column list model with a data extractor.
    ///
    /// The extractor is called to get the value of each item and field.
    pub fn with_extractor<F>(items: Vec<T>, extractor: F) -> Self
    where
        F: Fn(&T, usize) -> ItemData + Send + Sync + 'static,
    {
        Self {
            id: ModelId::next(),
            items: RwLock::new(items),
            column_count: 1,
            extractor: Arc::new(extractor),
            setter: None,
            flags_extractor: Arc::new(|_: &T| ItemFlags::new().with_never_has_children(true)),
        }
    }

    /// Sets the number of fields per item.
    #[must_use]
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.column_count = columns;
        self
    }

    /// Makes the model editable through `setter`.
    #[must_use]
    pub fn with_setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&mut T, usize, ItemData) -> bool + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(setter));
        self
    }

    /// Computes item flags with `flags`.
    #[must_use]
    pub fn with_flags<F>(mut self, flags: F) -> Self
    where
        F: Fn(&T) -> ItemFlags + Send + Sync + 'static,
    {
        self.flags_extractor = Arc::new(flags);
        self
    }
}

impl<T> ListModel<T> {
    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Returns the id of `row`, or an invalid id if it is out of range.
    pub fn item_id(&self, row: usize) -> ItemId {
        if row < self.len() {
            self.make_id(row)
        } else {
            ItemId::invalid()
        }
    }

    /// Returns the row addressed by `item`.
    pub fn row_of(&self, item: &ItemId) -> Option<usize> {
        if !item.belongs_to(self.id) {
            return None;
        }
        match item.native()? {
            NativeId::Pointer(row) if row < self.len() => Some(row),
            _ => None,
        }
    }

    /// Appends an item and returns its id.
    pub fn push(&self, item: T) -> ItemId {
        let mut items = self.items.write();
        items.push(item);
        self.make_id(items.len() - 1)
    }

    /// Inserts an item at `row` (clamped to the length) and returns its id.
    pub fn insert(&self, row: usize, item: T) -> ItemId {
        let mut items = self.items.write();
        let row = row.min(items.len());
        items.insert(row, item);
        self.make_id(row)
    }

    /// Removes the item at `row`.
    pub fn remove(&self, row: usize) -> Option<T> {
        let mut items = self.items.write();
        (row < items.len()).then(|| items.remove(row))
    }

    /// Replaces every item.
    pub fn set_items(&self, items: Vec<T>) {
        *self.items.write() = items;
    }

    /// Removes every item.
    pub fn clear(&self) {
        self.items.write().clear();
    }

    /// Provides read access to the item at `row`.
    pub fn with_item<F, R>(&self, row: usize, f: F) -> Option<R>
    where
        F: FnOnce(&T) -> R,
    {
        self.items.read().get(row).map(f)
    }

    /// Provides mutable access to the item at `row`.
    pub fn modify_item<F, R>(&self, row: usize, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        self.items.write().get_mut(row).map(f)
    }

    fn make_id(&self, row: usize) -> ItemId {
        ItemId::new(NativeId::Pointer(row), row, 0, self.id)
    }

    fn sorts_on(&self, filters: &[SortFilter]) -> bool {
        filters
            .iter()
            .filter(|filter| filter.is_active())
            .all(|filter| filter.field < self.column_count)
    }
}

impl<T: Send + Sync> ItemModel for ListModel<T> {
    fn model_id(&self) -> ModelId {
        self.id
    }

    fn child_count(&self, parent: &ItemId) -> usize {
        if parent.is_root() { self.len() } else { 0 }
    }

    fn child(&self, parent: &ItemId, index: usize) -> ItemId {
        if parent.is_root() {
            self.item_id(index)
        } else {
            ItemId::invalid()
        }
    }

    fn parent(&self, item: &ItemId) -> ItemId {
        match self.row_of(item) {
            Some(_) => ItemId::root(),
            None => ItemId::invalid(),
        }
    }

    fn column_count(&self) -> usize {
        self.column_count
    }

    fn data(&self, item: &ItemId, field: usize) -> ItemData {
        if field >= self.column_count {
            return ItemData::None;
        }
        let Some(row) = self.row_of(item) else {
            return ItemData::None;
        };
        self.items
            .read()
            .get(row)
            .map(|value| (self.extractor)(value, field))
            .unwrap_or_default()
    }

    fn set_data(&self, item: &ItemId, field: usize, value: ItemData) -> bool {
        let Some(setter) = &self.setter else {
            return false;
        };
        if field >= self.column_count {
            return false;
        }
        self.row_of(item)
            .and_then(|row| self.modify_item(row, |target| setter(target, field, value)))
            .unwrap_or(false)
    }

    fn flags(&self, item: &ItemId) -> ItemFlags {
        self.row_of(item)
            .and_then(|row| self.with_item(row, |value| (self.flags_extractor)(value)))
            .unwrap_or_else(ItemFlags::disabled)
    }

    fn has_children(&self, item: &ItemId) -> bool {
        item.is_root() && !self.is_empty()
    }

    fn all_children(&self, parent: &ItemId) -> Arc<[ItemId]> {
        if !parent.is_root() {
            return Arc::from(Vec::new());
        }
        (0..self.len()).map(|row| self.make_id(row)).collect()
    }

    fn child_index(&self, item: &ItemId) -> Option<usize> {
        self.row_of(item)
    }

    fn can_sort(&self, filters: &[SortFilter]) -> bool {
        self.sorts_on(filters)
    }

    fn sort(&self, parent: &ItemId, items: &mut [ItemId], filters: &[SortFilter]) -> bool {
        if !parent.is_root() || !self.sorts_on(filters) {
            return false;
        }
        let _span = PerfSpan::new("list_native_sort");
        tracing::debug!(target: targets::SORT, len = items.len(), "native list sort");

        let values = self.items.read();
        sort_by_values(items, filters, |item, field| {
            item.native()
                .and_then(|native| match native {
                    NativeId::Pointer(row) => values.get(row),
                    _ => None,
                })
                .map(|value| (self.extractor)(value, field))
                .unwrap_or_default()
        });
        true
    }
}

static_assertions::assert_impl_all!(ListModel<String>: Send, Sync);
