// Uptime estimate: fixed-width buckets classified good/bad against a latency threshold.
// Only buckets holding data are counted; no placeholders here.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::error::{LagError, LagResult};
use crate::models::UptimeReport;
use crate::source::{HopRow, MeasurementSource};
use crate::time::from_millis;

pub const DEFAULT_UPTIME_BUCKET_SECONDS: u32 = 900;
/// Loss ratio above which a bucket is unusable regardless of latency.
pub const BAD_LOSS_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketHealth {
    pub bucket_start: i64,
    /// Max worst_ms over every hop in the bucket.
    pub max_latency_ms: f64,
    pub sent: u64,
    pub lost: u64,
}

impl BucketHealth {
    pub fn is_bad(&self, threshold_ms: f64) -> bool {
        self.max_latency_ms > threshold_ms
            || (self.sent > 0 && (self.lost as f64 / self.sent as f64) > BAD_LOSS_RATIO)
    }
}

/// One entry per bucket that has at least one row, ascending by start.
pub fn bucket_health(rows: &[HopRow], bucket_seconds: u32) -> Vec<BucketHealth> {
    let bucket_ms = bucket_seconds.max(1) as i64 * 1000;
    let mut by_bucket: BTreeMap<i64, BucketHealth> = BTreeMap::new();
    for row in rows {
        let start = row.created_at.div_euclid(bucket_ms) * bucket_ms;
        let worst = if row.worst_ms.is_finite() {
            row.worst_ms
        } else {
            0.0
        };
        let b = by_bucket.entry(start).or_insert(BucketHealth {
            bucket_start: start,
            max_latency_ms: worst,
            sent: 0,
            lost: 0,
        });
        b.max_latency_ms = b.max_latency_ms.max(worst);
        b.sent += row.sent as u64;
        b.lost += row.lost as u64;
    }
    by_bucket.into_values().collect()
}

/// (uptime %, unusable %); both 0 when there are no buckets.
pub fn summarize(buckets: &[BucketHealth], threshold_ms: f64) -> (f64, f64) {
    let total = buckets.len();
    if total == 0 {
        return (0.0, 0.0);
    }
    let bad = buckets.iter().filter(|b| b.is_bad(threshold_ms)).count();
    let total = total as f64;
    let bad = bad as f64;
    ((total - bad) / total * 100.0, bad / total * 100.0)
}

#[instrument(skip(source), fields(operation = "estimate_uptime"))]
pub async fn estimate_uptime<S>(
    source: &S,
    from_ts: i64,
    to_ts: i64,
    threshold_ms: f64,
    bucket_seconds: u32,
) -> LagResult<UptimeReport>
where
    S: MeasurementSource + Sync,
{
    let rows = if to_ts > from_ts {
        source
            .hop_rows_in_range(from_ts, to_ts)
            .await
            .map_err(LagError::StorageUnavailable)?
    } else {
        Vec::new()
    };
    let buckets = bucket_health(&rows, bucket_seconds);
    let (uptime_percentage, unusable_percentage) = summarize(&buckets, threshold_ms);
    debug!(buckets = buckets.len(), uptime_percentage, "uptime estimated");
    Ok(UptimeReport {
        started_at: from_millis(from_ts),
        ended_at: from_millis(to_ts),
        uptime_percentage,
        unusable_percentage,
    })
}
