// Boundary checks for query parameters. Called explicitly by the HTTP handlers before any
// storage access.

use chrono::{DateTime, Utc};

use crate::error::{LagError, LagResult};
use crate::time::{MS_PER_HOUR, MS_PER_MINUTE, parse_instant};

/// Parses a query timestamp; missing or unparsable values are `InvalidRange`.
pub fn parse_bound(name: &str, value: Option<&str>) -> LagResult<DateTime<Utc>> {
    let Some(raw) = value.filter(|s| !s.trim().is_empty()) else {
        return Err(LagError::invalid_range(format!("Missing {name} parameter")));
    };
    parse_instant(raw)
        .ok_or_else(|| LagError::invalid_range(format!("Invalid {name} date: {raw:?}")))
}

/// Both bounds present, parsable, and from < to.
pub fn validate_date_range(
    from: Option<&str>,
    to: Option<&str>,
) -> LagResult<(DateTime<Utc>, DateTime<Utc>)> {
    let from = parse_bound("from", from)?;
    let to = parse_bound("to", to)?;
    if to <= from {
        return Err(LagError::invalid_range(
            "from and to must be valid ISO dates and from must be earlier than to",
        ));
    }
    Ok((from, to))
}

/// Raw range span must not exceed `max_hours`.
pub fn validate_raw_range(from_ms: i64, to_ms: i64, max_hours: u32) -> LagResult<()> {
    let span_ms = to_ms - from_ms;
    if span_ms > (max_hours as i64) * MS_PER_HOUR {
        return Err(LagError::RangeTooLarge {
            hours: span_ms as f64 / MS_PER_HOUR as f64,
            limit_hours: max_hours,
        });
    }
    Ok(())
}

/// ceil((to - from) / bucket) must stay within `max_buckets`.
pub fn validate_bucket_budget(
    from_ms: i64,
    to_ms: i64,
    bucket_minutes: u32,
    max_buckets: u32,
) -> LagResult<()> {
    if bucket_minutes == 0 {
        return Err(LagError::InvalidParameter {
            name: "bucketMinutes",
            reason: "must be > 0".into(),
        });
    }
    let range_ms = (to_ms - from_ms).max(0);
    let bucket_ms = bucket_minutes as i64 * MS_PER_MINUTE;
    let bucket_count = (range_ms + bucket_ms - 1) / bucket_ms;
    if bucket_count > max_buckets as i64 {
        return Err(LagError::InvalidParameter {
            name: "bucketMinutes",
            reason: format!(
                "{bucket_count} buckets derived from from/to exceeds {max_buckets}; increase bucketMinutes"
            ),
        });
    }
    Ok(())
}

/// Latency threshold for uptime: finite and non-negative.
pub fn validate_threshold(threshold_ms: f64) -> LagResult<f64> {
    if !threshold_ms.is_finite() || threshold_ms < 0.0 {
        return Err(LagError::InvalidParameter {
            name: "threshold",
            reason: format!("must be a non-negative number of ms, got {threshold_ms}"),
        });
    }
    Ok(threshold_ms)
}
