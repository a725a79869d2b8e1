//! Prelude module for Canopy.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```
//! use canopy::prelude::*;
//! ```
//!
//! This provides access to:
//! - Item identity (`ItemId`, `TreePath`)
//! - The model contract and its extension traits (`ItemModel`,
//!   `TreeNavigation`, `RankNavigation`)
//! - Reference models and proxies (`TreeModel`, `ListModel`,
//!   `SortProxyModel`, `FilterProxyModel`, `CachingProxyModel`)
//! - View state (`StateModel`, `TreeStateModel`, `ListStateModel`)

// ============================================================================
// Identity
// ============================================================================

pub use crate::{ItemId, ModelError, ModelResult};
pub use crate::model::TreePath;

// ============================================================================
// Model Contract
// ============================================================================

pub use crate::model::{ItemData, ItemFlags, ItemModel, RankNavigation, TreeNavigation};

// ============================================================================
// Models and Proxies
// ============================================================================

pub use crate::model::{ListItem, ListModel, TreeModel, TreeNodeData};
pub use crate::model::{
    ArrayProxyConfig, CachingProxyModel, FilterProxyModel, SortAlgorithm, SortFilter,
    SortOrder, SortProxyModel,
};

// ============================================================================
// View State
// ============================================================================

pub use crate::model::{CheckState, ListStateModel, StateModel, TreeStateModel};
