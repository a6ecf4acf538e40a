//! A single latency measurement.
//!
//! # Timestamp convention
//!
//! `time_ms` is the send time of the ping in **milliseconds since Unix
//! epoch**. Sample sequences handed to the aggregator are ordered newest
//! first; nothing in this crate checks that ordering.

use serde::{Deserialize, Serialize};

/// Latencies at or above this value (ms) mark a lost ping rather than a
/// real round-trip time.
pub const LOSS_THRESHOLD_MS: f64 = 1000.0;

/// One ping: capture time and round-trip latency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(rename = "time")]
    pub time_ms: i64,
    #[serde(rename = "latency")]
    pub latency_ms: f64,
}

impl Sample {
    pub fn new(time_ms: i64, latency_ms: f64) -> Self {
        Self { time_ms, latency_ms }
    }

    /// Whether this sample is a lost ping.
    #[inline]
    pub fn is_lost(&self) -> bool {
        is_lost(self.latency_ms)
    }
}

/// Whether a raw latency value is the loss sentinel.
#[inline]
pub fn is_lost(latency_ms: f64) -> bool {
    latency_ms >= LOSS_THRESHOLD_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_threshold_is_inclusive() {
        assert!(!Sample::new(0, 999.9).is_lost());
        assert!(Sample::new(0, 1000.0).is_lost());
        assert!(Sample::new(0, 5000.0).is_lost());
    }

    #[test]
    fn serializes_with_short_names() {
        let json = serde_json::to_string(&Sample::new(1_626_457_680_000, 11.5)).unwrap();
        assert_eq!(json, r#"{"time":1626457680000,"latency":11.5}"#);
    }
}
