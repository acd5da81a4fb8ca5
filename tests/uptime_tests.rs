// Uptime estimator: bucket classification and percentages

mod common;

use common::{FakeSource, row, ts};
use lagserver::error::LagError;
use lagserver::time::from_millis;
use lagserver::uptime::{BucketHealth, bucket_health, estimate_uptime, summarize};

fn health(max_latency_ms: f64, sent: u64, lost: u64) -> BucketHealth {
    BucketHealth {
        bucket_start: 0,
        max_latency_ms,
        sent,
        lost,
    }
}

#[test]
fn latency_above_threshold_is_bad() {
    assert!(health(150.0, 10, 0).is_bad(100.0));
    assert!(!health(100.0, 10, 0).is_bad(100.0));
}

#[test]
fn loss_above_eighty_percent_is_bad() {
    assert!(health(1.0, 10, 9).is_bad(100.0));
    assert!(!health(1.0, 10, 8).is_bad(100.0));
    // No packets sent: loss cannot be judged.
    assert!(!health(1.0, 0, 0).is_bad(100.0));
}

#[test]
fn rows_group_into_fixed_buckets_using_max_worst_and_summed_counts() {
    let base = ts("2025-01-01T00:00:00Z");
    let mut a = row("a", base + 60_000, 0, 10.0);
    a.worst_ms = 30.0;
    a.lost = 2;
    let mut b = row("a", base + 60_000, 1, 10.0);
    b.worst_ms = 90.0;
    let c = row("b", base + 20 * 60_000, 0, 10.0);

    let buckets = bucket_health(&[a, b, c], 900);

    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0].bucket_start, base);
    assert_eq!(buckets[0].max_latency_ms, 90.0);
    assert_eq!(buckets[0].sent, 20);
    assert_eq!(buckets[0].lost, 2);
    assert_eq!(buckets[1].bucket_start, base + 900_000);
}

#[test]
fn summarize_reports_good_and_bad_shares() {
    let buckets = [
        health(10.0, 10, 0),
        health(10.0, 10, 0),
        health(500.0, 10, 0),
        health(10.0, 10, 1),
    ];
    assert_eq!(summarize(&buckets, 100.0), (75.0, 25.0));
    assert_eq!(summarize(&[], 100.0), (0.0, 0.0));
}

#[tokio::test]
async fn empty_buckets_are_not_counted() {
    let base = ts("2025-01-01T00:00:00Z");
    let mut slow = row("b", base + 10 * 900_000, 0, 10.0);
    slow.worst_ms = 400.0;
    let source = FakeSource::new(vec![row("a", base, 0, 10.0), slow]);
    let to = base + 24 * 3_600_000;

    let report = estimate_uptime(&source, base, to, 100.0, 900).await.unwrap();

    assert_eq!(report.uptime_percentage, 50.0);
    assert_eq!(report.unusable_percentage, 50.0);
    assert_eq!(report.started_at, from_millis(base));
    assert_eq!(report.ended_at, from_millis(to));
}

#[tokio::test]
async fn empty_range_reports_zero_without_querying() {
    let t = ts("2025-01-01T00:00:00Z");
    let report = estimate_uptime(&FakeSource::failing(), t, t, 100.0, 900)
        .await
        .unwrap();
    assert_eq!(report.uptime_percentage, 0.0);
    assert_eq!(report.unusable_percentage, 0.0);
}

#[tokio::test]
async fn storage_failure_surfaces_as_storage_unavailable() {
    let err = estimate_uptime(
        &FakeSource::failing(),
        ts("2025-01-01T00:00:00Z"),
        ts("2025-01-02T00:00:00Z"),
        100.0,
        900,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LagError::StorageUnavailable(_)));
}
