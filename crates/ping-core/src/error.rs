//! Typed error definitions for the ping dashboard.
//!
//! The aggregation engine itself never fails; these variants cover the
//! collaborators around it (config loading, log reading, query validation).
//! All variants implement `std::error::Error` via `thiserror`, so they
//! integrate with `anyhow::Result` at the application edges.

use thiserror::Error;

/// Domain-specific errors for the ping dashboard.
#[derive(Debug, Error)]
pub enum PingError {
    /// Configuration parsing or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// Ping log file could not be read.
    #[error("log error: {0}")]
    Log(String),

    /// A log query whose time range is inverted.
    #[error("invalid query: start {start} is older than end {end}")]
    InvalidQuery { start: i64, end: i64 },
}
