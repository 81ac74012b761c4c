//! Structured logging setup for the `upnext` CLI.

use clap::ValueEnum;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Verbosity level, settable via `--level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Trace-level detail, including per-mutation graph events.
    Trace,
    /// Debug-level detail.
    Debug,
    /// Informational messages.
    Info,
    /// Warnings only (default).
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Output format, settable via `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TracingFormat {
    /// Human-readable, colorized.
    Pretty,
    /// Human-readable, single line per event.
    Compact,
    /// Newline-delimited JSON, for machine consumption.
    Json,
}

/// Initializes the global `tracing` subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_tracing(level: LogLevel, format: TracingFormat) -> miette::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        TracingFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
        TracingFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
        TracingFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };

    result.map_err(|e| miette::miette!("failed to initialize tracing: {e}"))
}
