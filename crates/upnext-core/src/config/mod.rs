//! Configuration types for upnext, parsed from a TOML document.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;
use upnext_graph::TimeDependency;

/// A `[warning]` block: a threshold that triggers a webhook notification.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WarningValueConfig {
    /// How many reset cycles may pass before this threshold fires.
    pub threshold: u32,
    /// Message sent to the webhook when the threshold is crossed.
    pub message: String,
}

/// Daily and weekly warning thresholds.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct WarningDataConfig {
    /// Daily threshold, if configured.
    #[serde(default)]
    pub daily: Option<WarningValueConfig>,
    /// Weekly threshold, if configured.
    #[serde(default)]
    pub weekly: Option<WarningValueConfig>,
}

/// The top-level `[warning]` block.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct WarningConfig {
    /// Thresholds this warning block covers.
    #[serde(default)]
    pub data: WarningDataConfig,
    /// Webhook URL warnings are POSTed to.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// A time-of-day window in raw `{start, end}` seconds, as read from TOML.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
pub struct TimeWindowConfig {
    /// Start offset in seconds.
    #[serde(default)]
    pub start: Option<i64>,
    /// End offset in seconds.
    #[serde(default)]
    pub end: Option<i64>,
}

impl From<TimeWindowConfig> for TimeDependency {
    fn from(value: TimeWindowConfig) -> Self {
        Self {
            start: value.start,
            end: value.end,
        }
    }
}

/// One task's full configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct TodoConfig {
    /// Task title, must be unique within its category.
    pub title: String,
    /// Optional human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Titles of other todos (any category) this one depends on.
    #[serde(default)]
    pub depends_on_todos: Vec<String>,
    /// Names of categories this todo depends on as a whole.
    #[serde(default)]
    pub depends_on_categories: Vec<String>,
    /// Whether this todo waits for every one-off todo to be complete.
    #[serde(default)]
    pub depends_on_all_oneoffs: bool,
    /// Absolute time-of-day window this todo is eligible within.
    #[serde(default)]
    pub depends_on_time: Option<TimeWindowConfig>,
    /// Event-relative windows, keyed by event name.
    #[serde(default)]
    pub depends_on_events: HashMap<String, TimeWindowConfig>,
    /// How many reset cycles between completions. Must be at least 1.
    #[serde(default = "default_reset_interval")]
    pub reset_interval: i64,
}

const fn default_reset_interval() -> i64 {
    1
}

/// A category and its member todos.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct CategoryConfig {
    /// Category name, must be unique.
    pub name: String,
    /// Optional human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Todos declared under this category.
    #[serde(default)]
    pub todos: Vec<TodoConfig>,
}

/// A one-off todo declared in configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct OneOffTodoConfig {
    /// Title, unique among one-off todos.
    pub title: String,
}

/// The `[oneoff_deps]` block: what the whole one-off chain depends on.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct OneOffDepsConfig {
    /// Todos the one-off chain depends on.
    #[serde(default)]
    pub depends_on_todos: Vec<String>,
    /// Categories the one-off chain depends on.
    #[serde(default)]
    pub depends_on_categories: Vec<String>,
}

/// The root configuration document.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    /// Webhook URL notified when a reset cycle completes.
    #[serde(default)]
    pub notification_webhook_url: Option<String>,
    /// Categories and their todos.
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
    /// One-off todos, outside the recurring category structure.
    #[serde(default)]
    pub oneoff_todos: Vec<OneOffTodoConfig>,
    /// What the one-off chain as a whole depends on.
    #[serde(default)]
    pub oneoff_deps: OneOffDepsConfig,
    /// Warning thresholds and webhook.
    #[serde(default)]
    pub warning: Option<WarningConfig>,
}

/// Errors raised while loading or validating [`AppConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document could not be read from disk.
    #[error("failed to read config file {path}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document was not valid TOML, or didn't match [`AppConfig`]'s shape.
    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    /// A todo declared `reset_interval < 1`.
    #[error("todo '{todo}' has reset_interval {value}, must be >= 1")]
    InvalidResetInterval {
        /// The offending todo's title.
        todo: String,
        /// The configured value.
        value: i64,
    },
}

/// Parses and validates an [`AppConfig`] from a TOML string.
///
/// Validation performed here is limited to what is knowable without a store:
/// `reset_interval >= 1`. Name resolution against persisted categories/todos
/// happens later, in `DependencyManager::load`.
pub fn parse_config(source: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(source)?;
    for category in &config.categories {
        for todo in &category.todos {
            if todo.reset_interval < 1 {
                return Err(ConfigError::InvalidResetInterval {
                    todo: todo.title.clone(),
                    value: todo.reset_interval,
                });
            }
        }
    }
    Ok(config)
}

/// Reads and parses an [`AppConfig`] from a file path.
pub fn load_config(path: &std::path::Path) -> Result<AppConfig, ConfigError> {
    let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&source)
}
