// Read seam between the aggregation engines and the store.
// LagRepo implements it against SQLite; tests implement it in memory.

use std::future::Future;

/// One hop result joined with the batch-level fields it was measured under.
#[derive(Debug, Clone, PartialEq)]
pub struct HopRow {
    pub batch_id: String,
    /// Batch created_at, Unix ms.
    pub created_at: i64,
    pub test_count: u32,
    pub packet_size: u32,
    pub hub_index: u32,
    pub sent: u32,
    pub lost: u32,
    pub average_ms: f64,
    pub best_ms: f64,
    pub worst_ms: f64,
    pub standard_deviation_ms: f64,
}

pub trait MeasurementSource {
    /// Smallest batch created_at in the store, or None when empty.
    fn earliest_created_at(&self) -> impl Future<Output = anyhow::Result<Option<i64>>> + Send;

    /// Hop rows of every batch with created_at in [from_ts, to_ts], ascending by
    /// (created_at, hub_index).
    fn hop_rows_in_range(
        &self,
        from_ts: i64,
        to_ts: i64,
    ) -> impl Future<Output = anyhow::Result<Vec<HopRow>>> + Send;
}
