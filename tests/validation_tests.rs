// Query parameter checks

use lagserver::error::LagError;
use lagserver::time::{MS_PER_HOUR, parse_instant};
use lagserver::validation::{
    parse_bound, validate_bucket_budget, validate_date_range, validate_raw_range,
    validate_threshold,
};

#[test]
fn missing_and_unparsable_bounds_are_invalid_range() {
    let err = parse_bound("from", None).unwrap_err();
    assert!(matches!(err, LagError::InvalidRange(_)));
    assert_eq!(err.to_string(), "Missing from parameter");

    let err = parse_bound("to", Some("yesterday")).unwrap_err();
    assert!(matches!(err, LagError::InvalidRange(_)));
    assert!(err.to_string().contains("Invalid to date"));

    assert!(parse_bound("from", Some("  ")).is_err());
}

#[test]
fn accepts_rfc3339_and_naive_utc_forms() {
    let expected = parse_instant("2025-01-01T00:00:00Z").unwrap();
    assert_eq!(parse_instant("2025-01-01T01:00:00+01:00"), Some(expected));
    assert_eq!(parse_instant("2025-01-01T00:00:00.000"), Some(expected));
    assert_eq!(parse_instant("2025-01-01T00:00"), Some(expected));
    assert_eq!(parse_instant("2025-01-01"), Some(expected));
    assert_eq!(parse_instant("01/01/2025"), None);
}

#[test]
fn date_range_requires_from_before_to() {
    let (from, to) =
        validate_date_range(Some("2025-01-01T00:00:00Z"), Some("2025-01-01T01:00:00Z")).unwrap();
    assert!(from < to);

    let same = validate_date_range(Some("2025-01-01T00:00:00Z"), Some("2025-01-01T00:00:00Z"));
    assert!(matches!(same, Err(LagError::InvalidRange(_))));

    let reversed =
        validate_date_range(Some("2025-01-02T00:00:00Z"), Some("2025-01-01T00:00:00Z"));
    assert!(matches!(reversed, Err(LagError::InvalidRange(_))));
}

#[test]
fn raw_range_over_ceiling_points_to_downsample() {
    let err = validate_raw_range(0, 25 * MS_PER_HOUR, 24).unwrap_err();
    assert!(matches!(
        err,
        LagError::RangeTooLarge {
            limit_hours: 24,
            ..
        }
    ));
    assert_eq!(
        err.to_string(),
        "Requested range of 25.00h exceeds raw limit of 24h. Use /lag/downsample instead."
    );

    // The ceiling itself is allowed.
    assert!(validate_raw_range(0, 24 * MS_PER_HOUR, 24).is_ok());
}

#[test]
fn bucket_budget_rejects_too_many_buckets() {
    let day = 24 * MS_PER_HOUR;
    let err = validate_bucket_budget(0, day, 10, 50).unwrap_err();
    assert!(matches!(
        err,
        LagError::InvalidParameter {
            name: "bucketMinutes",
            ..
        }
    ));
    assert!(err.to_string().contains("144 buckets"));

    assert!(validate_bucket_budget(0, day, 30, 50).is_ok());
    // Partial trailing bucket counts.
    assert!(validate_bucket_budget(0, 50 * 60_000 + 1, 1, 50).is_err());
    assert!(validate_bucket_budget(0, day, 0, 50).is_err());
}

#[test]
fn threshold_must_be_non_negative_and_finite() {
    assert_eq!(validate_threshold(100.0).unwrap(), 100.0);
    assert_eq!(validate_threshold(0.0).unwrap(), 0.0);
    assert!(validate_threshold(-1.0).is_err());
    assert!(validate_threshold(f64::NAN).is_err());
    assert!(validate_threshold(f64::INFINITY).is_err());
}
