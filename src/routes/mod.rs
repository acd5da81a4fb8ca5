// HTTP routes

mod dataloader;
mod http;
mod lag;
mod response;

use axum::{
    Router,
    routing::{get, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::lag_repo::LagRepo;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) repo: Arc<LagRepo>,
    pub(crate) config: AppConfig,
}

pub fn app(repo: Arc<LagRepo>, config: AppConfig) -> Router {
    let state = AppState { repo, config };
    Router::new()
        .route("/health", get(http::health_handler)) // GET /health
        .route("/version", get(http::version_handler)) // GET /version
        .route("/lag", get(lag::raw_range_handler)) // GET /lag?from&to
        .route("/lag/downsample", get(lag::downsample_handler)) // GET /lag/downsample?from&to[&bucketMinutes]
        .route("/lag/uptime", get(lag::uptime_handler)) // GET /lag/uptime?[from][&to][&threshold]
        .route("/lag/size", get(lag::size_handler)) // GET /lag/size
        .route(
            "/dataloader/mtr-result",
            put(dataloader::put_mtr_result_handler),
        ) // PUT /dataloader/mtr-result
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
