// Downsampled bucket: query-time aggregate over [bucket_start, bucket_end). Never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub bucket_start: DateTime<Utc>,
    /// Exclusive; never past the requested `to`.
    pub bucket_end: DateTime<Utc>,
    /// Sum of test_count over the distinct batches in the bucket.
    pub test_count: u64,
    /// Mean packet_size over the distinct batches.
    pub packet_size: f64,
    pub results: Vec<HubAggregate>,
}

impl Bucket {
    /// Placeholder for a bucket with no data.
    pub fn empty(bucket_start: DateTime<Utc>, bucket_end: DateTime<Utc>) -> Self {
        Self {
            bucket_start,
            bucket_end,
            test_count: 0,
            packet_size: 0.0,
            results: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Per-hub statistics rolled up over every batch in a bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubAggregate {
    pub hub_index: u32,
    pub sent: u64,
    pub lost: u64,
    pub average_ms: f64,
    pub best_ms: f64,
    pub worst_ms: f64,
    pub standard_deviation_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}
