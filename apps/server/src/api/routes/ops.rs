//! Operational endpoints: liveness, service info and Prometheus scrape

use crate::api::handlers::{health, metrics};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn ops_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::metrics_handler))
}
