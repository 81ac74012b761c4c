//! Error types for dependency graph operations.

use thiserror::Error;

/// Result type for dependency graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or mutating a [`crate::Graph`].
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A dependency edge referenced a task id that does not exist.
    #[error("task {from} depends on unknown task {to}")]
    UnknownTaskDependency {
        /// The task declaring the dependency.
        from: i64,
        /// The missing task id.
        to: i64,
    },

    /// A category dependency referenced a category id that does not exist.
    #[error("task {from} depends on unknown category {to}")]
    UnknownCategoryDependency {
        /// The task declaring the dependency.
        from: i64,
        /// The missing category id.
        to: i64,
    },

    /// `validate()` found a broken bidirectional invariant after a mutation.
    #[error("graph invariant violated: {message}")]
    InvariantViolation {
        /// Human-readable description of which invariant failed.
        message: String,
    },
}
