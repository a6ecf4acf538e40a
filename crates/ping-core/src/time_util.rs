//! Time helpers for hour-aligned windows.
//!
//! All timestamps in this crate are **milliseconds since Unix epoch** (UTC).
//! Hours are aligned on the UTC grid, so an hour-floor is plain integer
//! arithmetic.

use std::time::{SystemTime, UNIX_EPOCH};

/// One hour in milliseconds.
pub const HOUR_MS: i64 = 60 * 60 * 1_000;

/// Milliseconds per second, for converting second-resolution log timestamps.
pub const SECOND_MS: i64 = 1_000;

/// Top of the hour at or before `time_ms`.
///
/// Uses euclidean remainder so pre-epoch timestamps still floor downwards.
#[inline]
pub fn hour_floor(time_ms: i64) -> i64 {
    time_ms - time_ms.rem_euclid(HOUR_MS)
}

/// Current time as **milliseconds** since Unix epoch.
#[inline]
pub fn now_ms() -> i64 {
    let d = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    d.as_millis() as i64
}
