// GET /lag, /lag/downsample, /lag/uptime, /lag/size

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use serde::Deserialize;

use super::AppState;
use crate::downsample::{self, BucketWidth};
use crate::error::{LagError, LagResult};
use crate::models::{Bucket, LagResultDto, UptimeReport};
use crate::source::MeasurementSource;
use crate::time::to_millis;
use crate::uptime;
use crate::validation::{
    parse_bound, validate_bucket_budget, validate_date_range, validate_raw_range,
    validate_threshold,
};

#[derive(Debug, Deserialize)]
pub(super) struct RangeQuery {
    from: Option<String>,
    to: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DownsampleQuery {
    from: Option<String>,
    to: Option<String>,
    bucket_minutes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UptimeQuery {
    from: Option<String>,
    to: Option<String>,
    threshold: Option<String>,
}

fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.trim().is_empty())
}

/// GET /lag: full-fidelity batches in [from, to]; span capped by lag.max_raw_range_hours.
pub(super) async fn raw_range_handler(
    State(state): State<AppState>,
    Query(q): Query<RangeQuery>,
) -> LagResult<Json<Vec<LagResultDto>>> {
    let (from, to) = validate_date_range(q.from.as_deref(), q.to.as_deref())?;
    let (from_ts, to_ts) = (to_millis(from), to_millis(to));
    validate_raw_range(from_ts, to_ts, state.config.lag.max_raw_range_hours)?;

    let batches = state
        .repo
        .find_batches_in_range(from_ts, to_ts)
        .await
        .map_err(LagError::StorageUnavailable)?;
    Ok(Json(batches.iter().map(LagResultDto::from).collect()))
}

/// GET /lag/downsample: gap-filled bucket series; from >= to yields [].
pub(super) async fn downsample_handler(
    State(state): State<AppState>,
    Query(q): Query<DownsampleQuery>,
) -> LagResult<Json<Vec<Bucket>>> {
    let from_ts = to_millis(parse_bound("from", q.from.as_deref())?);
    let to_ts = to_millis(parse_bound("to", q.to.as_deref())?);
    let max_buckets = state.config.lag.max_buckets;

    let width = match present(&q.bucket_minutes) {
        None => BucketWidth::Auto { max_buckets },
        Some(raw) => {
            let minutes: u32 = raw.trim().parse().map_err(|_| LagError::InvalidParameter {
                name: "bucketMinutes",
                reason: format!("expected a positive integer, got {raw:?}"),
            })?;
            validate_bucket_budget(from_ts, to_ts, minutes, max_buckets)?;
            BucketWidth::Fixed { minutes }
        }
    };

    let buckets = downsample::downsample(state.repo.as_ref(), from_ts, to_ts, width).await?;
    Ok(Json(buckets))
}

/// GET /lag/uptime: from defaults to the earliest batch, to to now, threshold to config.
pub(super) async fn uptime_handler(
    State(state): State<AppState>,
    Query(q): Query<UptimeQuery>,
) -> LagResult<Json<UptimeReport>> {
    let threshold_ms = match present(&q.threshold) {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| LagError::InvalidParameter {
                name: "threshold",
                reason: format!("expected a number of ms, got {raw:?}"),
            })?,
        None => state.config.lag.default_uptime_threshold_ms,
    };
    let threshold_ms = validate_threshold(threshold_ms)?;

    let to_ts = match present(&q.to) {
        Some(raw) => to_millis(parse_bound("to", Some(raw))?),
        None => to_millis(Utc::now()),
    };
    let from_ts = match present(&q.from) {
        Some(raw) => {
            let from_ts = to_millis(parse_bound("from", Some(raw))?);
            if to_ts <= from_ts {
                return Err(LagError::invalid_range("from must be earlier than to"));
            }
            from_ts
        }
        None => state
            .repo
            .earliest_created_at()
            .await
            .map_err(LagError::StorageUnavailable)?
            .map_or(to_ts, |earliest| earliest.min(to_ts)),
    };

    let report = uptime::estimate_uptime(
        state.repo.as_ref(),
        from_ts,
        to_ts,
        threshold_ms,
        state.config.lag.uptime_bucket_seconds,
    )
    .await?;
    Ok(Json(report))
}

/// GET /lag/size: database size in bytes.
pub(super) async fn size_handler(
    State(state): State<AppState>,
) -> LagResult<Json<serde_json::Value>> {
    let bytes = state
        .repo
        .storage_size_bytes()
        .await
        .map_err(LagError::StorageUnavailable)?;
    Ok(Json(serde_json::json!({ "bytes": bytes })))
}
