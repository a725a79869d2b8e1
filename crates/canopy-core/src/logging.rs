//! Logging facilities for Canopy.
//!
//! Canopy uses the `tracing` crate for instrumentation. Nothing is printed
//! unless the application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("canopy::cache=trace,canopy::sort=debug")
//!     .init();
//! ```
//!
//! Cache hits, misses and evictions are logged at `trace`, sort passes and
//! cache invalidations at `debug`, and misuse (item ids handed to the wrong
//! model, rejected sort criteria) at `warn`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Performance spans.
    pub const PERF: &str = "canopy::perf";
    /// Child-array cache target.
    pub const CACHE: &str = "canopy::cache";
    /// Sorting target.
    pub const SORT: &str = "canopy::sort";
    /// State model target.
    pub const STATE: &str = "canopy::state";
    /// Model traversal target.
    pub const MODEL: &str = "canopy::model";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations such as sorting
/// a large child array.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
