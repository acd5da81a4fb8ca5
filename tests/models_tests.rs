// Wire models: mtr report parsing, host hashing, JSON field names

use chrono::{TimeZone, Utc};
use lagserver::models::*;

const MTR_REPORT: &str = r#"{
  "report": {
    "mtr": {
      "src": "probe-1",
      "dst": "one.one.one.one",
      "tos": 0,
      "tests": 10,
      "psize": "64",
      "bitpattern": "0x00"
    },
    "hubs": [
      {"count": 1, "host": "_gateway", "Loss%": 0.0, "Snt": 10, "Last": 0.4, "Avg": 0.5, "Best": 0.3, "Wrst": 0.9, "StDev": 0.1},
      {"count": 2, "host": "???", "Loss%": 100.0, "Snt": 10, "Last": 0.0, "Avg": 0.0, "Best": 0.0, "Wrst": 0.0, "StDev": 0.0},
      {"count": 3, "host": "one.one.one.one", "Loss%": 33.3, "Snt": 10, "Last": 12.1, "Avg": 12.4, "Best": 11.8, "Wrst": 14.0, "StDev": 0.6}
    ]
  }
}"#;

#[test]
fn mtr_report_converts_to_new_batch() {
    let dto: MtrReportDto = serde_json::from_str(MTR_REPORT).unwrap();
    let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 5, 0).unwrap();
    let batch = dto.into_new_batch(created_at);

    assert_eq!(batch.created_at, created_at);
    assert_eq!(batch.source_name, "probe-1");
    assert_eq!(batch.destination_name, "one.one.one.one");
    assert_eq!(batch.test_count, 10);
    assert_eq!(batch.packet_size, 64);
    assert_eq!(batch.hops.len(), 3);

    let indexes: Vec<u32> = batch.hops.iter().map(|h| h.hub_index).collect();
    assert_eq!(indexes, vec![0, 1, 2]);
    assert_eq!(batch.hops[0].lost, 0);
    assert_eq!(batch.hops[1].lost, 10);
    // round(33.3% of 10)
    assert_eq!(batch.hops[2].lost, 3);
    assert_eq!(batch.hops[2].worst_ms, 14.0);
    assert_eq!(batch.hops[2].standard_deviation_ms, 0.6);
}

#[test]
fn report_without_hubs_is_an_empty_batch() {
    let dto: MtrReportDto = serde_json::from_str(
        r#"{"report": {"mtr": {"src": "a", "dst": "b", "tests": "5", "psize": 64}}}"#,
    )
    .unwrap();
    let batch = dto.into_new_batch(Utc::now());
    assert_eq!(batch.test_count, 5);
    assert!(batch.hops.is_empty());
}

#[test]
fn malformed_counts_are_rejected() {
    let bad = MTR_REPORT.replace(r#""tests": 10"#, r#""tests": "ten""#);
    assert!(serde_json::from_str::<MtrReportDto>(&bad).is_err());

    let negative = MTR_REPORT.replace(r#""tests": 10"#, r#""tests": -1"#);
    assert!(serde_json::from_str::<MtrReportDto>(&negative).is_err());
}

#[test]
fn lost_count_stays_within_sent() {
    let hub = |loss_percent: f64| MtrHub {
        host: "h".into(),
        loss_percent,
        sent: 10,
        avg: 0.0,
        best: 0.0,
        worst: 0.0,
        stdev: 0.0,
    };
    assert_eq!(hub(150.0).lost_count(), 10);
    assert_eq!(hub(-5.0).lost_count(), 0);
    assert_eq!(hub(f64::NAN).lost_count(), 0);
    assert_eq!(hub(25.0).lost_count(), 3);
}

#[test]
fn host_hash_is_lowercase_sha256_hex() {
    assert_eq!(
        hash_host("abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn lag_result_dto_hides_host() {
    let batch = Batch {
        id: "b1".into(),
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        source_name: "probe-1".into(),
        destination_name: "abc".into(),
        test_count: 10,
        packet_size: 64,
        results: vec![HopResult {
            hub_index: 0,
            host: "abc".into(),
            sent: 10,
            lost: 1,
            average_ms: 5.0,
            best_ms: 4.0,
            worst_ms: 6.0,
            standard_deviation_ms: 0.5,
        }],
    };
    let json = serde_json::to_value(LagResultDto::from(&batch)).unwrap();

    assert_eq!(json["batchId"], "b1");
    assert_eq!(json["testCount"], 10);
    let hub = &json["results"][0];
    assert!(hub.get("host").is_none());
    assert_eq!(hub["hostHash"], hash_host("abc"));
    assert_eq!(hub["standardDeviationMs"], 0.5);
}

#[test]
fn destination_hop_is_highest_hub_index() {
    let hop = |hub_index: u32| HopResult {
        hub_index,
        host: format!("h{hub_index}"),
        sent: 1,
        lost: 0,
        average_ms: 0.0,
        best_ms: 0.0,
        worst_ms: 0.0,
        standard_deviation_ms: 0.0,
    };
    let mut batch = Batch {
        id: "b".into(),
        created_at: Utc::now(),
        source_name: String::new(),
        destination_name: String::new(),
        test_count: 1,
        packet_size: 64,
        results: vec![hop(0), hop(2), hop(1)],
    };
    assert_eq!(batch.destination_hop().map(|h| h.hub_index), Some(2));
    batch.results.clear();
    assert!(batch.destination_hop().is_none());
}

#[test]
fn bucket_and_uptime_use_wire_field_names() {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let bucket = serde_json::to_value(Bucket::empty(start, start)).unwrap();
    for key in ["bucketStart", "bucketEnd", "testCount", "packetSize", "results"] {
        assert!(bucket.get(key).is_some(), "missing {key}");
    }

    let report = serde_json::to_value(UptimeReport {
        started_at: start,
        ended_at: start,
        uptime_percentage: 90.0,
        unusable_percentage: 10.0,
    })
    .unwrap();
    assert_eq!(report["uptimePercentage"], 90.0);
    assert_eq!(report["unusuablePercentage"], 10.0);
    assert!(report.get("startedAt").is_some());
}
