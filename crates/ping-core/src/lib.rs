//! # ping-core
//!
//! Core crate for the ping dashboard, providing:
//!
//! - **Types** (`types`): ping samples and hourly buckets
//! - **Lookahead** (`lookahead`): peekable single-pass cursor with composable views
//! - **Aggregation** (`aggregate`): hourly bucketing (streaming and gap-filling) and point statistics
//! - **Log source** (`log_source`): reader for the daily ping log files
//! - **Configuration** (`config`): JSON config deserialization
//! - **Error types** (`error`): domain-specific `PingError` via thiserror
//! - **Time utilities** (`time_util`): hour alignment and wall-clock time
//! - **Logging** (`logging`): tracing-based structured logging

pub mod aggregate;
pub mod config;
pub mod error;
pub mod log_source;
pub mod logging;
pub mod lookahead;
pub mod time_util;
pub mod types;

// Re-export types at crate root for convenience.
pub use types::*;
