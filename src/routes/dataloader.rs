// PUT /dataloader/mtr-result: ingest one `mtr -j` report (batch + hops, all or nothing).

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use chrono::Utc;

use super::AppState;
use crate::error::{LagError, LagResult};
use crate::models::MtrReportDto;

pub(super) const API_SECRET_HEADER: &str = "x-api-secret";

/// Header must match the configured secret; no configured secret refuses everything.
fn authorize(headers: &HeaderMap, secret: Option<&str>) -> LagResult<()> {
    let Some(expected) = secret.filter(|s| !s.is_empty()) else {
        return Err(LagError::Forbidden);
    };
    match headers.get(API_SECRET_HEADER).and_then(|v| v.to_str().ok()) {
        Some(given) if given == expected => Ok(()),
        _ => Err(LagError::Forbidden),
    }
}

pub(super) async fn put_mtr_result_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> LagResult<Json<serde_json::Value>> {
    authorize(&headers, state.config.dataloader.api_secret.as_deref())?;

    let dto: MtrReportDto =
        serde_json::from_slice(&body).map_err(|e| LagError::InvalidParameter {
            name: "body",
            reason: e.to_string(),
        })?;
    let batch = dto.into_new_batch(Utc::now());
    let hops = batch.hops.len();
    let batch_id = state
        .repo
        .insert_batch_with_hops(&batch)
        .await
        .map_err(LagError::StorageUnavailable)?;
    tracing::info!(
        batch_id = %batch_id,
        hops,
        destination = %batch.destination_name,
        "inserted mtr batch"
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "batchId": batch_id,
    })))
}
