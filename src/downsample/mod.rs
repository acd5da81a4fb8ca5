// Downsampling: arbitrary [from, to) -> bounded, evenly spaced, gap-filled bucket series.
//
// Order of work: clamp `from` to the earliest stored batch, pick the bucket width from the
// clamped span, reduce hop rows per (bucket, hub), then walk the bucket grid emitting either
// the reduced bucket or an empty placeholder.

pub mod stats;

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, instrument};

use crate::error::{LagError, LagResult};
use crate::models::{Bucket, HubAggregate};
use crate::source::{HopRow, MeasurementSource};
use crate::time::{MS_PER_MINUTE, from_millis};
use stats::{finite_or_zero, mean, percentile_cont};

pub const DEFAULT_MAX_BUCKETS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketWidth {
    /// Finest whole-minute width keeping the series within `max_buckets`.
    Auto { max_buckets: u32 },
    /// Caller-chosen width; budget checks happen at the boundary.
    Fixed { minutes: u32 },
}

/// Reduced contents of one non-empty bucket, keyed by bucket start in [`aggregate_rows`].
#[derive(Debug, Clone, PartialEq)]
pub struct BucketAggregate {
    pub test_count: u64,
    pub packet_size: f64,
    pub results: Vec<HubAggregate>,
}

/// max(1, ceil(duration_minutes / max_buckets)), in exact integer arithmetic.
pub fn auto_bucket_minutes(duration_ms: i64, max_buckets: u32) -> u32 {
    let per_bucket_ms = MS_PER_MINUTE * max_buckets.max(1) as i64;
    let minutes = (duration_ms.max(0) + per_bucket_ms - 1) / per_bucket_ms;
    u32::try_from(minutes.max(1)).unwrap_or(u32::MAX)
}

/// Requested start moved forward to the earliest stored batch, never backward.
pub fn clamp_start(from_ts: i64, earliest: Option<i64>) -> i64 {
    match earliest {
        Some(e) if e > from_ts => e,
        _ => from_ts,
    }
}

fn floor_to(ts: i64, step: i64) -> i64 {
    ts.div_euclid(step) * step
}

fn ceil_to(ts: i64, step: i64) -> i64 {
    -(-ts).div_euclid(step) * step
}

/// Downsampled series for [from_ts, to_ts). Empty when the clamped range is empty.
#[instrument(skip(source), fields(operation = "downsample"))]
pub async fn downsample<S>(
    source: &S,
    from_ts: i64,
    to_ts: i64,
    width: BucketWidth,
) -> LagResult<Vec<Bucket>>
where
    S: MeasurementSource + Sync,
{
    let earliest = source
        .earliest_created_at()
        .await
        .map_err(LagError::StorageUnavailable)?;
    let from_ts = clamp_start(from_ts, earliest);
    if to_ts - from_ts <= 0 {
        return Ok(vec![]);
    }

    let bucket_minutes = match width {
        BucketWidth::Auto { max_buckets } => auto_bucket_minutes(to_ts - from_ts, max_buckets),
        BucketWidth::Fixed { minutes } => minutes.max(1),
    };
    let bucket_ms = bucket_minutes as i64 * MS_PER_MINUTE;

    let rows = source
        .hop_rows_in_range(from_ts, to_ts)
        .await
        .map_err(LagError::StorageUnavailable)?;
    let aggregated = aggregate_rows(&rows, bucket_ms);
    let buckets = fill_gaps(aggregated, from_ts, to_ts, bucket_ms);
    debug!(
        bucket_minutes,
        rows = rows.len(),
        buckets = buckets.len(),
        "downsampled range"
    );
    Ok(buckets)
}

#[derive(Default)]
struct BucketAcc<'a> {
    // First-seen (test_count, packet_size) per batch: a batch counts once however many hubs it has.
    batches: HashMap<&'a str, (u32, u32)>,
    hubs: BTreeMap<u32, HubAcc>,
}

struct HubAcc {
    sent: u64,
    lost: u64,
    averages: Vec<f64>,
    stddev_sum: f64,
    best: f64,
    worst: f64,
}

impl HubAcc {
    fn new() -> Self {
        Self {
            sent: 0,
            lost: 0,
            averages: Vec::new(),
            stddev_sum: 0.0,
            best: f64::INFINITY,
            worst: f64::NEG_INFINITY,
        }
    }

    fn push(&mut self, row: &HopRow) {
        self.sent += row.sent as u64;
        self.lost += row.lost as u64;
        self.averages.push(finite_or_zero(row.average_ms));
        self.stddev_sum += finite_or_zero(row.standard_deviation_ms);
        self.best = self.best.min(finite_or_zero(row.best_ms));
        self.worst = self.worst.max(finite_or_zero(row.worst_ms));
    }

    fn finish(self, hub_index: u32) -> HubAggregate {
        let n = self.averages.len().max(1) as f64;
        HubAggregate {
            hub_index,
            sent: self.sent,
            lost: self.lost,
            average_ms: finite_or_zero(mean(&self.averages)),
            best_ms: finite_or_zero(self.best),
            worst_ms: finite_or_zero(self.worst),
            standard_deviation_ms: finite_or_zero(self.stddev_sum / n),
            p95_ms: finite_or_zero(percentile_cont(&self.averages, 0.95)),
            p99_ms: finite_or_zero(percentile_cont(&self.averages, 0.99)),
        }
    }
}

/// Groups rows by (floor(created_at / bucket_ms) * bucket_ms, hub_index) and reduces each group.
pub fn aggregate_rows(rows: &[HopRow], bucket_ms: i64) -> BTreeMap<i64, BucketAggregate> {
    if bucket_ms <= 0 {
        return BTreeMap::new();
    }
    let mut by_bucket: BTreeMap<i64, BucketAcc<'_>> = BTreeMap::new();
    for row in rows {
        let acc = by_bucket
            .entry(floor_to(row.created_at, bucket_ms))
            .or_default();
        acc.batches
            .entry(row.batch_id.as_str())
            .or_insert((row.test_count, row.packet_size));
        acc.hubs
            .entry(row.hub_index)
            .or_insert_with(HubAcc::new)
            .push(row);
    }

    by_bucket
        .into_iter()
        .map(|(start, acc)| {
            let test_count: u64 = acc.batches.values().map(|(t, _)| *t as u64).sum();
            let packet_sizes: Vec<f64> = acc.batches.values().map(|(_, p)| *p as f64).collect();
            let packet_size = finite_or_zero(mean(&packet_sizes));
            let results = acc
                .hubs
                .into_iter()
                .map(|(hub_index, hub)| hub.finish(hub_index))
                .collect();
            (
                start,
                BucketAggregate {
                    test_count,
                    packet_size,
                    results,
                },
            )
        })
        .collect()
}

/// Walks floor(from)..ceil(to) in `bucket_ms` steps; missing buckets become placeholders.
/// Each bucket_end is capped at `to_ts`.
pub fn fill_gaps(
    mut aggregated: BTreeMap<i64, BucketAggregate>,
    from_ts: i64,
    to_ts: i64,
    bucket_ms: i64,
) -> Vec<Bucket> {
    if bucket_ms <= 0 || to_ts <= from_ts {
        return vec![];
    }
    let first = floor_to(from_ts, bucket_ms);
    // Coverage is [from, to): rows at exactly an aligned `to` start a bucket past `last`.
    let last = ceil_to(to_ts, bucket_ms);
    let mut out = Vec::with_capacity(((last - first) / bucket_ms) as usize);

    let mut start = first;
    while start < last {
        let end = (start + bucket_ms).min(to_ts);
        let bucket = match aggregated.remove(&start) {
            Some(agg) => Bucket {
                bucket_start: from_millis(start),
                bucket_end: from_millis(end),
                test_count: agg.test_count,
                packet_size: agg.packet_size,
                results: agg.results,
            },
            None => Bucket::empty(from_millis(start), from_millis(end)),
        };
        out.push(bucket);
        start += bucket_ms;
    }
    out
}
