//! Demo SCPI instrument and byte-script runner built on `scpi-core`.

/// Host-side error type.
pub mod error;
/// Demo command table, handlers and script replay.
pub mod instrument;
/// In-memory byte port and scripted clock.
pub mod port;

#[cfg(test)]
use tempfile as _;
