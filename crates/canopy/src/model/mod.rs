//! Hierarchical models, proxy chains and view state.
//!
//! This module provides the types a virtualized tree or list view is built
//! on. A view never holds the flattened list of visible rows; it asks the
//! model for children one level at a time, converts between item ids and
//! visible ranks on demand, and keeps per-item view state in a separate
//! [`StateModel`].
//!
//! # Core Types
//!
//! - [`ItemModel`]: The trait every model implements
//! - [`ItemId`](canopy_core::ItemId): Model-relative item identity
//! - [`TreePath`]: Durable root-to-item address that survives edits
//! - [`ItemData`]: Type-erased container for a field value
//! - [`TreeNavigation`] / [`RankNavigation`]: Derived navigation on any model
//!
//! # Model Implementations
//!
//! - [`TreeModel`]: Arena-backed hierarchy with parent-child relationships
//! - [`ListModel`]: Flat list with native sorting
//! - [`CachingProxyModel`]: Caches child arrays of its source
//! - [`SortProxyModel`]: Sorts the children of every parent
//! - [`FilterProxyModel`]: Hides items rejected by a predicate
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use canopy::model::{
//!     FilterProxyModel, ItemModel, RankNavigation, SortFilter, SortProxyModel, StateModel,
//!     TreeModel, TreeStateModel,
//! };
//! use canopy_core::ItemId;
//!
//! let tree = Arc::new(TreeModel::<String>::new());
//! let music = tree.add_root("Music".into());
//! tree.add_root("Documents".into());
//! tree.add_child(&music, "b.flac".into());
//! tree.add_child(&music, "a.flac".into());
//!
//! let filtered = Arc::new(FilterProxyModel::from_source(tree.clone()));
//! let sorted = SortProxyModel::from_source(filtered);
//! sorted.set_sort_filters(vec![SortFilter::ascending(0)]);
//!
//! let mut state = TreeStateModel::new();
//! state.expand(&sorted, &music, true, false);
//!
//! // Documents, Music, a.flac, b.flac
//! assert_eq!(sorted.visible_count(&state), 4);
//! let third = sorted.find_item(2, &state);
//! assert_eq!(sorted.data(&third, 0).as_string(), Some("a.flac"));
//! assert_eq!(sorted.item_rank(&music, &state), Some(1));
//! ```
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  TreeModel  │<────│ FilterProxy │<────│  SortProxy  │<────│    View     │
//! │ (ItemModel) │     │ (LRU cache) │     │ (LRU cache) │     │             │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                                   │
//!                                          ┌─────────────┐          │
//!                                          │ StateModel  │<─────────┘
//!                                          └─────────────┘
//! ```
//!
//! Proxies hand out the ids of the model at the bottom of the chain, so
//! state recorded against an id stays valid whichever layer is queried.
//! Notification is pull-based: after a structural edit the owner calls
//! [`ItemModel::invalidate`] on the outermost proxy and
//! [`StateModel::on_data_model_changed`] on the state model.

mod array_proxy;
mod data;
mod filter_proxy;
mod list_model;
mod list_state;
mod navigation;
mod rank;
pub mod sort;
mod sort_proxy;
mod state;
mod traits;
mod tree_model;
mod tree_path;

pub use array_proxy::{
    ArrayProxyConfig, ArrayProxyModel, CachingProxyModel, ChildArranger,
    DEFAULT_CACHE_CAPACITY, DEFAULT_MIN_CHILDREN_FOR_CACHING, Passthrough,
};
pub use data::{CheckState, ItemData, compare_item_data};
pub use filter_proxy::{FilterFn, FilterProxyModel, ItemFilter};
pub use list_model::{DataExtractor, DataSetter, FlagsExtractor, ListItem, ListModel};
pub use list_state::ListStateModel;
pub use navigation::{Descendants, TreeNavigation};
pub use rank::{RankNavigation, VisibleCounts};
pub use sort::{SortAlgorithm, SortFilter, SortOrder};
pub use sort_proxy::{SortProxyModel, Sorter};
pub use state::{BulkSelection, StateModel, TreeStateModel, VisibilityStamp};
pub use traits::{ItemFlags, ItemModel};
pub use tree_model::{NodeKey, TreeModel, TreeNodeData};
pub use tree_path::{INLINE_LEVELS, TreePath};
