//! Host-side failures: configuration and script I/O.

use std::io;
use std::path::PathBuf;

use scpi_core::ConfigError;
use thiserror::Error;

/// Failure while preparing or replaying a byte script.
#[derive(Debug, Error)]
pub enum HostError {
    /// Parser configuration was rejected.
    #[error("invalid parser configuration: {0}")]
    Config(#[from] ConfigError),
    /// Script file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Script path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Debug report could not be rendered as JSON.
    #[error("failed to render report: {0}")]
    Render(#[from] serde_json::Error),
    /// Terminator name is not one of `cr`, `lf` or `crlf`.
    #[error("unknown terminator: {0} (expected cr, lf or crlf)")]
    UnknownTerminator(String),
}
