//! Core primitives for Canopy.
//!
//! This crate provides the building blocks the model layer is made of:
//!
//! - **Item identities**: [`ItemId`], [`NativeId`] and [`ModelId`], the opaque
//!   model-relative addresses every model hands out
//! - **LRU cache**: [`LruCache`], the fixed-capacity cache behind cached child
//!   arrays
//! - **Errors**: [`ModelError`] for configuration and diagnostic seams
//! - **Logging**: tracing targets and [`PerfSpan`]
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroUsize;
//! use canopy_core::{ItemId, LruCache, ModelId, NativeId};
//!
//! let model = ModelId::next();
//! let parent = ItemId::new(NativeId::U32(1), 0, 0, model);
//!
//! let mut cache: LruCache<ItemId, Vec<ItemId>> = LruCache::new(NonZeroUsize::new(16).unwrap());
//! cache.insert(parent, Vec::new());
//! assert!(cache.contains(&parent));
//! ```

mod error;
mod item_id;
pub mod logging;
pub mod lru;

pub use error::{ModelError, ModelResult};
pub use item_id::{ItemId, ModelId, NativeId};
pub use logging::PerfSpan;
pub use lru::{CacheStats, LruCache};
