//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::tracing::{LogLevel, TracingFormat};

/// Dependency-aware recurring task engine.
#[derive(Parser, Debug)]
#[command(name = "upnext")]
#[command(about = "Tracks recurring tasks and tells you what's ready to work on")]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Logging verbosity.
    #[arg(short = 'l', long, global = true, default_value = "warn", value_enum)]
    pub level: LogLevel,

    /// Log output format.
    #[arg(long, global = true, default_value = "pretty", value_enum)]
    pub format: TracingFormat,

    /// Path to the TOML configuration file.
    #[arg(short = 'c', long, global = true, default_value = "upnext.toml")]
    pub config: PathBuf,
}

/// Top-level subcommands, mirroring the external interfaces in
/// `SPEC_FULL.md` §6.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load configuration and build the dependency graph.
    Load,
    /// Print the currently recommended todos.
    Recommended,
    /// Print the dependency graph as nodes and edges.
    Graph {
        /// Whether to render the full graph or project completed tasks out.
        #[arg(long, value_enum, default_value = "full")]
        scope: GraphScopeArg,
    },
    /// Print the current timeslot for every time-constrained todo.
    Timeslots,
    /// Mark an event as having fired now.
    TriggerEvent {
        /// Event name, as declared in configuration.
        name: String,
    },
    /// Re-run the load path against the current configuration.
    Reload,
}

/// CLI-facing mirror of [`upnext_core::GraphScope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum GraphScopeArg {
    /// The full canonical graph.
    Full,
    /// The graph with complete/skipped tasks projected out.
    Scoped,
}

impl From<GraphScopeArg> for upnext_core::GraphScope {
    fn from(value: GraphScopeArg) -> Self {
        match value {
            GraphScopeArg::Full => Self::Full,
            GraphScopeArg::Scoped => Self::Scoped,
        }
    }
}

/// Parses `Cli` from `std::env::args`.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
