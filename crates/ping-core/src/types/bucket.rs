//! Hour-aligned statistical aggregate of samples.

use serde::{Deserialize, Serialize};

/// Statistics for one window of samples.
///
/// - `min` / `max` / `avg` cover non-lost samples only and are `0` when the
///   window has none.
/// - `avg` and `lost_ratio` are rounded to 3 decimal digits.
/// - `count` includes lost samples; `lost_ratio` is `0` when `count == 0`.
///
/// For hourly buckets `time_ms` is the closing boundary of the hour, i.e. the
/// bucket covers `[time_ms - HOUR_MS, time_ms)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    #[serde(rename = "time")]
    pub time_ms: i64,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub lost_ratio: f64,
    pub count: u64,
}

impl Bucket {
    /// A gap bucket: no samples were observed for this window.
    pub fn empty(time_ms: i64) -> Self {
        Self { time_ms, ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "t={} n={} min={:.1}ms max={:.1}ms avg={:.3}ms lost={:.1}%",
            self.time_ms,
            self.count,
            self.min,
            self.max,
            self.avg,
            self.lost_ratio * 100.0,
        )
    }
}
