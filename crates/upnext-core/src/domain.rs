//! Persisted-state record shapes a [`crate::store::Store`] hands back.

use chrono::{DateTime, Utc};

/// Live status of a task or one-off todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// Not started.
    Incomplete,
    /// Currently being worked.
    InProgress,
    /// Finished this cycle.
    Complete,
    /// Explicitly skipped this cycle.
    Skipped,
}

impl TaskStatus {
    /// Whether this status counts as "blocking" — i.e. not yet done.
    #[must_use]
    pub const fn is_blocking(self) -> bool {
        matches!(self, Self::Incomplete | Self::InProgress)
    }
}

/// A recurring task.
#[derive(Debug, Clone, PartialEq)]
pub struct Todo {
    /// Stable id.
    pub id: i64,
    /// Title, unique within its category.
    pub title: String,
    /// Owning category id.
    pub category_id: i64,
    /// Current status.
    pub status: TaskStatus,
    /// Configured reset interval (cycles between completions).
    pub reset_interval: u32,
    /// Number of times this task has been reset (completed and recurred).
    pub reset_count: u32,
    /// Display ordering within the category.
    pub position: u32,
    /// When the task last entered `InProgress`, if it is currently there.
    pub in_progress_start: Option<DateTime<Utc>>,
    /// Accumulated seconds spent `InProgress` across past cycles.
    pub cumulative_in_progress_seconds: u64,
}

/// A category grouping related todos.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// Stable id.
    pub id: i64,
    /// Name, unique across categories.
    pub name: String,
    /// Optional human-readable description.
    pub description: Option<String>,
}

/// An externally-triggered event used for event-relative time windows.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Stable id.
    pub id: i64,
    /// Name, unique across events.
    pub name: String,
    /// Most recent trigger time, if it has ever fired.
    pub timestamp: Option<DateTime<Utc>>,
}

/// A one-off, non-recurring todo.
#[derive(Debug, Clone, PartialEq)]
pub struct OneOffTodo {
    /// Stable id.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Current status.
    pub status: TaskStatus,
}
