//! Configuration loading, persisted-state contracts and the dependency
//! manager orchestrating them for upnext.
//!
//! [`config`] parses and validates the TOML configuration document.
//! [`store`] defines the [`store::Store`] trait standing in for the
//! embedded relational persistence layer, with an in-memory reference
//! implementation. [`notifier`] defines the outbound-webhook seam.
//! [`manager::DependencyManager`] ties them to `upnext-graph`'s `Graph`,
//! building it from configuration + store and answering readiness,
//! projection and timeslot queries.

pub mod config;
pub mod domain;
pub mod error;
pub mod manager;
pub mod notifier;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use domain::{Category, Event, OneOffTodo, TaskStatus, Todo};
pub use error::DmError;
pub use manager::{DependencyManager, GraphScope};
pub use notifier::{LoggingNotifier, NoopNotifier, Notifier};
pub use store::{InMemoryStore, Store};
