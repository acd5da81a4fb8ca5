// Shared test helpers
#![allow(dead_code)]

use lagserver::lag_repo::LagRepo;
use lagserver::models::{NewBatch, NewHopResult};
use lagserver::source::{HopRow, MeasurementSource};
use tempfile::TempDir;

/// RFC 3339 -> Unix ms.
pub fn ts(s: &str) -> i64 {
    chrono::DateTime::parse_from_rfc3339(s)
        .unwrap()
        .timestamp_millis()
}

pub fn hop(hub_index: u32, host: &str, sent: u32, lost: u32, average_ms: f64) -> NewHopResult {
    NewHopResult {
        hub_index,
        host: host.into(),
        sent,
        lost,
        average_ms,
        best_ms: average_ms,
        worst_ms: average_ms,
        standard_deviation_ms: 0.0,
    }
}

pub fn batch(
    created_at_ms: i64,
    test_count: u32,
    packet_size: u32,
    hops: Vec<NewHopResult>,
) -> NewBatch {
    NewBatch {
        created_at: lagserver::time::from_millis(created_at_ms),
        source_name: "probe-1".into(),
        destination_name: "1.1.1.1".into(),
        test_count,
        packet_size,
        hops,
    }
}

/// Fresh store in a temp dir, retention off. Keep the TempDir alive for the test's duration.
pub async fn temp_repo() -> (TempDir, LagRepo) {
    temp_repo_with_retention(None).await
}

pub async fn temp_repo_with_retention(retention_days: Option<u32>) -> (TempDir, LagRepo) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lag.db");
    let repo = LagRepo::connect(path.to_str().unwrap(), 2, retention_days)
        .await
        .unwrap();
    repo.init().await.unwrap();
    (dir, repo)
}

pub fn row(batch_id: &str, created_at: i64, hub_index: u32, average_ms: f64) -> HopRow {
    HopRow {
        batch_id: batch_id.into(),
        created_at,
        test_count: 10,
        packet_size: 64,
        hub_index,
        sent: 10,
        lost: 0,
        average_ms,
        best_ms: average_ms,
        worst_ms: average_ms,
        standard_deviation_ms: 0.0,
    }
}

/// In-memory source: filters `rows` by range; `earliest` defaults to the smallest created_at.
#[derive(Default)]
pub struct FakeSource {
    pub rows: Vec<HopRow>,
    pub earliest: Option<i64>,
    pub fail: bool,
}

impl FakeSource {
    pub fn new(rows: Vec<HopRow>) -> Self {
        let earliest = rows.iter().map(|r| r.created_at).min();
        Self {
            rows,
            earliest,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

impl MeasurementSource for FakeSource {
    async fn earliest_created_at(&self) -> anyhow::Result<Option<i64>> {
        anyhow::ensure!(!self.fail, "connection refused");
        Ok(self.earliest)
    }

    async fn hop_rows_in_range(&self, from_ts: i64, to_ts: i64) -> anyhow::Result<Vec<HopRow>> {
        anyhow::ensure!(!self.fail, "connection refused");
        let mut rows: Vec<HopRow> = self
            .rows
            .iter()
            .filter(|r| r.created_at >= from_ts && r.created_at <= to_ts)
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.created_at, r.hub_index));
        Ok(rows)
    }
}
