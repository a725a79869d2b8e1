//! Opaque, model-relative item identities.
//!
//! An [`ItemId`] is the way every model in Canopy addresses one of its items.
//! It carries:
//! - A [`NativeId`] that only the owning model knows how to interpret
//! - The row and column the item had when the id was produced
//! - The [`ModelId`] of the model that produced it
//!
//! Two distinguished sentinels exist: [`ItemId::invalid()`] ("no item") and
//! [`ItemId::root()`] (the top of every hierarchy, never enumerated as a child).
//!
//! # Identity
//!
//! Equality and hashing consider the native id, the column and the owning
//! model. The row is a positional hint and may go stale after structural
//! edits, so it does not participate in identity.
//!
//! # Example
//!
//! ```
//! use canopy_core::{ItemId, ModelId, NativeId};
//!
//! let model = ModelId::next();
//! let item = ItemId::new(NativeId::U64(7), 0, 0, model);
//!
//! assert!(item.is_valid());
//! assert!(item.belongs_to(model));
//! assert!(ItemId::root().is_root());
//! assert!(!ItemId::invalid().is_valid());
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for generating unique model ids. Zero is reserved for "no model".
static MODEL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identifies the model that produced an [`ItemId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u64);

impl ModelId {
    /// The id carried by the sentinels; never handed out by [`ModelId::next`].
    pub const NONE: Self = Self(0);

    /// Allocates a fresh, process-unique model id.
    pub fn next() -> Self {
        Self(MODEL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value.
    #[inline]
    pub fn as_raw(self) -> u64 {
        self.0
    }

    /// Returns `true` unless this is [`ModelId::NONE`].
    #[inline]
    pub fn is_some(self) -> bool {
        self.0 != 0
    }
}

/// A model-defined discriminator for an item.
///
/// Models choose whichever variant fits their storage: an arena slot, an
/// array offset, or an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeId {
    /// An address-sized value (for example an index into a node arena).
    Pointer(usize),
    /// A 32-bit identifier.
    U32(u32),
    /// A 64-bit identifier.
    U64(u64),
}

impl NativeId {
    /// Returns the value widened to `u64`.
    pub fn as_u64(self) -> u64 {
        match self {
            NativeId::Pointer(p) => p as u64,
            NativeId::U32(n) => u64::from(n),
            NativeId::U64(n) => n,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Invalid,
    Root,
    Item(NativeId),
}

/// An opaque reference to an item of one specific model.
///
/// `ItemId`s are cheap to copy and are produced on demand by model methods.
/// They are not required to survive structural mutation of the model; use a
/// tree path for a durable address.
#[derive(Clone, Copy)]
pub struct ItemId {
    slot: Slot,
    row: usize,
    column: usize,
    model: ModelId,
}

impl Default for ItemId {
    fn default() -> Self {
        Self::invalid()
    }
}

impl ItemId {
    /// Creates an item id owned by `model`.
    #[inline]
    pub const fn new(native: NativeId, row: usize, column: usize, model: ModelId) -> Self {
        Self {
            slot: Slot::Item(native),
            row,
            column,
            model,
        }
    }

    /// The "no item" sentinel.
    #[inline]
    pub const fn invalid() -> Self {
        Self {
            slot: Slot::Invalid,
            row: 0,
            column: 0,
            model: ModelId::NONE,
        }
    }

    /// The sentinel standing for the top of every hierarchy.
    #[inline]
    pub const fn root() -> Self {
        Self {
            slot: Slot::Root,
            row: 0,
            column: 0,
            model: ModelId::NONE,
        }
    }

    /// Returns `true` for real items (neither invalid nor root).
    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self.slot, Slot::Item(_))
    }

    /// Returns `true` for the root sentinel.
    #[inline]
    pub fn is_root(&self) -> bool {
        matches!(self.slot, Slot::Root)
    }

    /// Returns `true` if this id can act as a parent: the root or a real item.
    #[inline]
    pub fn is_parent_candidate(&self) -> bool {
        !matches!(self.slot, Slot::Invalid)
    }

    /// Returns the native id, or `None` for the sentinels.
    #[inline]
    pub fn native(&self) -> Option<NativeId> {
        match self.slot {
            Slot::Item(native) => Some(native),
            _ => None,
        }
    }

    /// Returns the row the item had when this id was produced.
    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Returns the column of this id.
    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Returns the owning model, or [`ModelId::NONE`] for the sentinels.
    #[inline]
    pub fn model(&self) -> ModelId {
        self.model
    }

    /// Returns `true` if this is a real item produced by `model`.
    #[inline]
    pub fn belongs_to(&self, model: ModelId) -> bool {
        self.is_valid() && self.model == model
    }

    /// Returns a copy of this id addressing another column of the same item.
    #[must_use]
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = column;
        self
    }

    /// Returns a copy of this id with an updated row hint.
    #[must_use]
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = row;
        self
    }
}

impl PartialEq for ItemId {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot && self.column == other.column && self.model == other.model
    }
}

impl Eq for ItemId {}

impl Hash for ItemId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slot.hash(state);
        self.column.hash(state);
        self.model.hash(state);
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot {
            Slot::Invalid => write!(f, "ItemId(invalid)"),
            Slot::Root => write!(f, "ItemId(root)"),
            Slot::Item(native) => f
                .debug_struct("ItemId")
                .field("native", &native)
                .field("row", &self.row)
                .field("column", &self.column)
                .field("model", &self.model.0)
                .finish(),
        }
    }
}

static_assertions::assert_impl_all!(ItemId: Send, Sync, Copy);
