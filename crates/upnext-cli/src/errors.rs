//! CLI-facing error types with `miette` diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Errors surfaced by `upnext` subcommands.
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    /// Loading or reloading the dependency manager failed.
    #[error("failed to load configuration")]
    #[diagnostic(code(upnext::cli::load_failed))]
    Load(#[from] upnext_core::DmError),

    /// An I/O operation (reading the config file) failed.
    #[error("failed to read {path}")]
    #[diagnostic(code(upnext::cli::io_error), help("check the path and file permissions"))]
    Io {
        /// Path that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serializing a query result for display failed.
    #[error("failed to serialize output")]
    #[diagnostic(code(upnext::cli::serialize_failed))]
    Serialize(#[from] serde_json::Error),
}

/// Convenience result type for CLI command handlers.
pub type CliResult<T> = Result<T, CliError>;
