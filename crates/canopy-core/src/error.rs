//! Error types for Canopy.
//!
//! Traversal never fails loudly: hot paths answer with sentinels (an invalid
//! [`ItemId`](crate::ItemId), a zero count, `false`). [`ModelError`] only
//! appears at configuration and diagnostic seams, where a caller asked for
//! an explanation.

use thiserror::Error;

/// Errors reported by model configuration and diagnostic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A cache was configured with room for zero entries.
    #[error("cache capacity must be at least 1")]
    InvalidCapacity,

    /// The caching thresholds exclude every possible array.
    #[error("invalid caching bounds: minimum {min} exceeds maximum {max}")]
    InvalidCachingBounds {
        /// Smallest child count that is cached.
        min: usize,
        /// Largest child count that is cached.
        max: usize,
    },

    /// A tree path no longer matches the hierarchy it is resolved against.
    #[error("tree path mismatch at level {level}: index {index} out of range for {count} children")]
    PathMismatch {
        /// Level at which resolution failed.
        level: usize,
        /// Stored child index at that level.
        index: usize,
        /// Number of children actually present.
        count: usize,
    },

    /// A sort criterion names a field the model does not have.
    #[error("cannot sort on field {field}: model has {columns} columns")]
    UnsupportedSortField {
        /// Requested field.
        field: usize,
        /// Number of fields the model exposes.
        columns: usize,
    },
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
