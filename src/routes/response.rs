// LagError -> HTTP status + JSON body

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::LagError;

impl IntoResponse for LagError {
    fn into_response(self) -> Response {
        match self {
            LagError::StorageUnavailable(ref e) => {
                tracing::error!("storage query failed: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "Internal Server Error" })),
                )
                    .into_response()
            }
            LagError::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({ "message": "Forbidden" })),
            )
                .into_response(),
            other => {
                tracing::debug!(error = %other, "rejected request");
                (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "error": other.to_string(),
                        "statusCode": StatusCode::BAD_REQUEST.as_u16(),
                    })),
                )
                    .into_response()
            }
        }
    }
}
