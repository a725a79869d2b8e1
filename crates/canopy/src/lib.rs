//! Canopy - virtualized hierarchical data models.
//!
//! This is the main crate; it re-exports everything from `canopy-core` and
//! adds the [`model`] layer: the [`ItemModel`](model::ItemModel) contract,
//! reference tree and list models, caching, sorting and filtering proxies,
//! rank navigation for virtualized views and per-item view state.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use canopy::prelude::*;
//!
//! let list = Arc::new(ListModel::new(
//!     ["delta", "alpha", "charlie", "bravo"].map(String::from).to_vec(),
//! ));
//! let sorted = SortProxyModel::from_source(list);
//! sorted.set_sort_filters(vec![SortFilter::ascending(0)]);
//!
//! let state = ListStateModel::new();
//! let second = sorted.find_item(1, &state);
//! assert_eq!(sorted.data(&second, 0).as_string(), Some("bravo"));
//! ```

pub use canopy_core::*;

pub mod model;
pub mod prelude;
