//! Hour-windowed latency aggregation.
//!
//! Turns a newest-first sequence of [`Sample`]s into one [`Bucket`] per hour.
//! Three entry points share the same fold ([`BucketAccumulator`]):
//!
//! 1. [`HourlyBuckets`]: lazy. Walks backwards one hour at a time over a
//!    single [`Lookahead`] cursor and stops once the cursor is exhausted.
//! 2. [`hourly_buckets_filled`]: eager. Groups a slice by hour and emits an
//!    explicit empty bucket for every hour in range that has no samples.
//! 3. [`point_stats`]: one bucket over an arbitrary collection of latency
//!    values, e.g. "the last 60 pings".
//!
//! Lost pings (latency ≥ [`LOSS_THRESHOLD_MS`](crate::types::LOSS_THRESHOLD_MS))
//! count towards `count` and `lost_ratio` but never towards min/max/avg.
//! Every numeric edge case degrades to `0`; nothing here fails.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::lookahead::{Lookahead, TakeWhile, lookahead};
use crate::time_util::{HOUR_MS, hour_floor};
use crate::types::{Bucket, Sample, is_lost};

/// What happens to the sample that closes an hour window in [`HourlyBuckets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    /// The closing sample stays in the cursor and opens the next window.
    #[default]
    Retain,
    /// The closing sample is consumed and dropped. Kept for parity with
    /// dashboards that were built on a consuming take-while.
    Discard,
}

// ---------------------------------------------------------------------------
// BucketAccumulator
// ---------------------------------------------------------------------------

/// Running min/max/sum/loss counters for one window.
#[derive(Debug, Clone)]
pub struct BucketAccumulator {
    count: u64,
    lost: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl BucketAccumulator {
    pub fn new() -> Self {
        Self { count: 0, lost: 0, sum: 0.0, min: f64::INFINITY, max: f64::NEG_INFINITY }
    }

    /// Record one latency value in milliseconds.
    #[inline]
    pub fn record(&mut self, latency_ms: f64) {
        self.count += 1;
        if is_lost(latency_ms) {
            self.lost += 1;
        } else {
            self.sum += latency_ms;
            self.min = self.min.min(latency_ms);
            self.max = self.max.max(latency_ms);
        }
    }

    /// Number of recorded values, lost ones included.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Freeze the counters into a bucket stamped with `time_ms`.
    pub fn finish(&self, time_ms: i64) -> Bucket {
        let valid = self.count - self.lost;
        let (min, max, avg) = if valid == 0 {
            (0.0, 0.0, 0.0)
        } else {
            (self.min, self.max, round3(self.sum / valid as f64))
        };
        let lost_ratio = if self.count == 0 {
            0.0
        } else {
            round3(self.lost as f64 / self.count as f64)
        };
        Bucket { time_ms, min, max, avg, lost_ratio, count: self.count }
    }
}

impl Default for BucketAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<f64> for BucketAccumulator {
    fn extend<T: IntoIterator<Item = f64>>(&mut self, iter: T) {
        for latency_ms in iter {
            self.record(latency_ms);
        }
    }
}

#[inline]
fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

fn fold_samples(time_ms: i64, samples: impl Iterator<Item = Sample>) -> Bucket {
    let mut acc = BucketAccumulator::new();
    acc.extend(samples.map(|s| s.latency_ms));
    acc.finish(time_ms)
}

/// Combined statistic over a plain collection of latencies.
///
/// `count` is the size of the collection. Used for summaries that are not
/// hour-aligned, like the most recent pings.
pub fn point_stats<L>(time_ms: i64, latencies: L) -> Bucket
where
    L: IntoIterator<Item = f64>,
{
    let mut acc = BucketAccumulator::new();
    acc.extend(latencies);
    acc.finish(time_ms)
}

// ---------------------------------------------------------------------------
// Streaming form
// ---------------------------------------------------------------------------

/// Lazy sequence of hourly buckets, newest first.
///
/// The first window is the hour containing the first sample. Each call to
/// `next` drains the samples of the current window from the cursor, then
/// moves the window back one hour. Iteration ends when the cursor is
/// exhausted, so with [`Boundary::Retain`] hours without samples between the
/// newest and the oldest sample come out as empty buckets.
///
/// Not restartable: aggregating the same data again needs a fresh cursor.
pub struct HourlyBuckets<I: Iterator<Item = Sample>> {
    cursor: Lookahead<I>,
    /// Inclusive start of the next window; `None` before the first call.
    window_start: Option<i64>,
    boundary: Boundary,
}

impl<I: Iterator<Item = Sample>> HourlyBuckets<I> {
    pub fn new(cursor: Lookahead<I>) -> Self {
        Self { cursor, window_start: None, boundary: Boundary::default() }
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Give the cursor back, positioned after the last drained window.
    pub fn into_cursor(self) -> Lookahead<I> {
        self.cursor
    }
}

impl<I: Iterator<Item = Sample>> Iterator for HourlyBuckets<I> {
    type Item = Bucket;

    fn next(&mut self) -> Option<Bucket> {
        let start = match self.window_start {
            Some(start) => start,
            None => hour_floor(self.cursor.peek()?.time_ms),
        };
        if self.cursor.is_exhausted() {
            return None;
        }

        let in_window = move |s: &Sample| s.time_ms >= start;
        let end = start + HOUR_MS;
        let bucket = match self.boundary {
            Boundary::Retain => fold_samples(end, self.cursor.take_view(in_window)),
            Boundary::Discard => fold_samples(end, self.cursor.take_view_discarding(in_window)),
        };
        self.window_start = Some(start - HOUR_MS);

        trace!("hour bucket {bucket}");
        Some(bucket)
    }
}

/// Lazily aggregate an already collected, newest-first sample sequence.
pub fn hourly_buckets<S>(samples: S) -> HourlyBuckets<S::IntoIter>
where
    S: IntoIterator<Item = Sample>,
{
    HourlyBuckets::new(lookahead(samples))
}

// ---------------------------------------------------------------------------
// Eager, gap-filling form
// ---------------------------------------------------------------------------

/// One bucket per hour from the newest sample's hour down to the oldest's.
///
/// Consecutive samples sharing an hour-floor form a group. An expected-hour
/// cursor steps back one hour per emitted bucket; a group at (or newer than)
/// the expected hour is folded into it, otherwise the hour is a gap and gets
/// an empty bucket. The sum of `count` equals `samples.len()`.
pub fn hourly_buckets_filled(samples: &[Sample]) -> Vec<Bucket> {
    let mut groups = lookahead(
        samples
            .chunk_by(|a, b| hour_floor(a.time_ms) == hour_floor(b.time_ms))
            .map(|chunk| (hour_floor(chunk[0].time_ms), chunk)),
    );
    let Some(&(newest, _)) = groups.peek() else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut gaps = 0usize;
    let mut expected = newest;
    while let Some(&(hour, chunk)) = groups.peek() {
        if hour >= expected {
            out.push(fold_samples(expected + HOUR_MS, chunk.iter().copied()));
            groups.advance();
        } else {
            out.push(Bucket::empty(expected + HOUR_MS));
            gaps += 1;
        }
        expected -= HOUR_MS;
    }

    debug!("aggregated {} sample(s) into {} hour bucket(s), {gaps} gap(s)", samples.len(), out.len());
    out
}

// ---------------------------------------------------------------------------
// Range selection
// ---------------------------------------------------------------------------

/// Restrict a newest-first cursor to samples in `(oldest_ms, newest_ms]`.
///
/// Samples newer than `newest_ms` are dropped from the cursor immediately;
/// the returned view yields samples until the first one at or before
/// `oldest_ms`, which stays in the cursor.
pub fn select_range<I>(
    cursor: &mut Lookahead<I>,
    newest_ms: i64,
    oldest_ms: i64,
) -> Lookahead<TakeWhile<'_, I, impl FnMut(&Sample) -> bool>>
where
    I: Iterator<Item = Sample>,
{
    while cursor.advance_if(|s| s.time_ms > newest_ms).is_some() {}
    cursor.take_view(move |s: &Sample| s.time_ms > oldest_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    const T1: i64 = 1_536_062_893_000;
    const HOUR_T1: i64 = 1_536_062_400_000;

    fn bucket(time_ms: i64, min: f64, max: f64, avg: f64, lost_ratio: f64, count: u64) -> Bucket {
        Bucket { time_ms, min, max, avg, lost_ratio, count }
    }

    #[test]
    fn streaming_one_hour_apart() {
        let log = [Sample::new(T1, 10.0), Sample::new(T1 - HOUR_MS, 20.0)];
        let history: Vec<_> = hourly_buckets(log).collect();
        assert_eq!(
            history,
            vec![
                bucket(1_536_066_000_000, 10.0, 10.0, 10.0, 0.0, 1),
                bucket(1_536_062_400_000, 20.0, 20.0, 20.0, 0.0, 1),
            ]
        );
    }

    #[test]
    fn streaming_fills_interior_gap() {
        let log = [Sample::new(T1, 10.0), Sample::new(1_536_055_693_000, 20.0)];
        let history: Vec<_> = hourly_buckets(log).collect();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1], Bucket::empty(1_536_062_400_000));
        assert_eq!(history[2], bucket(1_536_058_800_000, 20.0, 20.0, 20.0, 0.0, 1));
    }

    #[test]
    fn streaming_discard_drops_window_closer() {
        let log = [Sample::new(T1, 10.0), Sample::new(T1 - HOUR_MS, 20.0)];
        let history: Vec<_> = hourly_buckets(log).with_boundary(Boundary::Discard).collect();
        assert_eq!(history, vec![bucket(1_536_066_000_000, 10.0, 10.0, 10.0, 0.0, 1)]);
    }

    #[test]
    fn streaming_empty_source() {
        assert_eq!(hourly_buckets(Vec::<Sample>::new()).count(), 0);
    }

    #[test]
    fn streaming_sample_on_the_hour_opens_its_own_window() {
        let log = [Sample::new(HOUR_T1, 5.0), Sample::new(HOUR_T1 - 1, 7.0)];
        let history: Vec<_> = hourly_buckets(log).collect();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].time_ms, HOUR_T1 + HOUR_MS);
        assert_eq!(history[0].count, 1);
        assert_eq!(history[1].time_ms, HOUR_T1);
        assert_eq!(history[1].min, 7.0);
    }

    #[test]
    fn streaming_hands_back_cursor() {
        let log = [Sample::new(T1, 1.0), Sample::new(T1 - HOUR_MS, 2.0)];
        let mut buckets = hourly_buckets(log);
        buckets.next();
        let mut rest = buckets.into_cursor();
        assert_eq!(rest.advance(), Some(Sample::new(T1 - HOUR_MS, 2.0)));
    }

    #[test]
    fn eager_fills_gaps() {
        let log = [Sample::new(T1, 10.0), Sample::new(1_536_055_693_000, 20.0)];
        assert_eq!(
            hourly_buckets_filled(&log),
            vec![
                bucket(1_536_066_000_000, 10.0, 10.0, 10.0, 0.0, 1),
                Bucket::empty(1_536_062_400_000),
                bucket(1_536_058_800_000, 20.0, 20.0, 20.0, 0.0, 1),
            ]
        );
    }

    #[test]
    fn eager_matches_streaming_on_dense_input() {
        let log: Vec<_> = (0..180).map(|m| Sample::new(T1 - m * 60_000, 10.0 + m as f64)).collect();
        let eager = hourly_buckets_filled(&log);
        let lazy: Vec<_> = hourly_buckets(log.iter().copied()).collect();
        assert_eq!(eager, lazy);
    }

    #[test]
    fn eager_counts_add_up() {
        let mut log = Vec::new();
        for (i, gap) in [0, 1, 2, 7, 8, 30].iter().enumerate() {
            for j in 0..=i as i64 {
                log.push(Sample::new(T1 - gap * HOUR_MS - j * 1_000, if j == 1 { 1000.0 } else { 12.5 }));
            }
        }
        let buckets = hourly_buckets_filled(&log);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<u64>(), log.len() as u64);
        assert_eq!(buckets.len(), 31);
        for b in &buckets {
            assert!((0.0..=1.0).contains(&b.lost_ratio));
            if b.count == 0 {
                assert_eq!(b.lost_ratio, 0.0);
            } else {
                assert!(b.min <= b.avg && b.avg <= b.max);
            }
        }
    }

    #[test]
    fn eager_is_idempotent() {
        let log: Vec<_> = (0..50).map(|m| Sample::new(T1 - m * 7 * 60_000, (m % 9) as f64 * 3.3)).collect();
        assert_eq!(hourly_buckets_filled(&log), hourly_buckets_filled(&log));
    }

    #[test]
    fn eager_empty_input() {
        assert!(hourly_buckets_filled(&[]).is_empty());
    }

    #[test]
    fn lost_samples_excluded_from_latency_stats() {
        let b = point_stats(0, [12.0, 1000.0, 18.0, 2500.0]);
        assert_eq!(b.count, 4);
        assert_eq!(b.min, 12.0);
        assert_eq!(b.max, 18.0);
        assert_eq!(b.avg, 15.0);
        assert_eq!(b.lost_ratio, 0.5);
    }

    #[test]
    fn all_lost_degrades_to_zero() {
        let b = point_stats(0, [1000.0, 1000.0, 3000.0]);
        assert_eq!((b.min, b.max, b.avg), (0.0, 0.0, 0.0));
        assert_eq!(b.lost_ratio, 1.0);
        assert_eq!(b.count, 3);
    }

    #[test]
    fn empty_collection_is_empty_bucket() {
        assert_eq!(point_stats(42, []), Bucket::empty(42));
    }

    #[test]
    fn rounds_to_three_decimals() {
        let b = point_stats(0, [1.0, 1.0, 2.0]);
        assert_eq!(b.avg, 1.333);
        let b = point_stats(0, [1.0, 1.0, 1000.0]);
        assert_eq!(b.lost_ratio, 0.333);
    }

    #[test]
    fn accumulator_counts_everything() {
        let mut acc = BucketAccumulator::new();
        acc.record(4.0);
        acc.record(1200.0);
        assert_eq!(acc.count(), 2);
        assert_eq!(acc.finish(7).time_ms, 7);
    }

    #[test]
    fn select_range_is_half_open() {
        let log: Vec<_> = (0..10).map(|i| Sample::new(100 - i * 10, i as f64)).collect();
        let mut cursor = lookahead(log);
        let picked: Vec<_> = select_range(&mut cursor, 80, 40).map(|s| s.time_ms).collect();
        assert_eq!(picked, vec![80, 70, 60, 50]);
        assert_eq!(cursor.peek().map(|s| s.time_ms), Some(40));
    }

    #[test]
    fn select_range_feeds_aggregation() {
        let log = [
            Sample::new(T1 + 2 * HOUR_MS, 99.0),
            Sample::new(T1, 10.0),
            Sample::new(T1 - 60_000, 30.0),
            Sample::new(T1 - 3 * HOUR_MS, 99.0),
        ];
        let mut cursor = lookahead(log);
        let day = select_range(&mut cursor, T1, T1 - 2 * HOUR_MS);
        let history: Vec<_> = HourlyBuckets::new(day).collect();
        assert_eq!(history, vec![bucket(HOUR_T1 + HOUR_MS, 10.0, 30.0, 20.0, 0.0, 2)]);
    }
}
