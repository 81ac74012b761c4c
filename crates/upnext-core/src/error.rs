//! Error types for the dependency manager and its ambient collaborators.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while loading or querying a [`crate::manager::DependencyManager`].
#[derive(Debug, Error, Diagnostic)]
pub enum DmError {
    /// Configuration failed to parse or validate.
    #[error("configuration error")]
    #[diagnostic(code(upnext::config))]
    Config(#[from] ConfigError),

    /// The assembled dependency edges contain a cycle; the loader refuses
    /// to hand a cyclic graph to the dependency engine.
    #[error("dependency configuration contains a cycle: {message}")]
    #[diagnostic(code(upnext::cycle))]
    CycleInConfig {
        /// Description of the cycle, naming the tasks involved.
        message: String,
    },

    /// A mutation left the graph in an invalid state. Indicates a bug in
    /// the dependency engine, not bad input.
    #[error("graph invariant violated")]
    #[diagnostic(code(upnext::invariant_violation))]
    Graph(#[from] upnext_graph::Error),
}
