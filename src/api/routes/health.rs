//! Liveness check.

use axum::{Json, Router, routing::get};

use crate::api::{AppState, HealthResponse};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Healthy".to_string(),
    })
}
