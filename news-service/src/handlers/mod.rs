//! HTTP handlers. Each one extracts its inputs, calls a use case and maps the
//! outcome to a response; errors render through `AppError`.

pub mod feedback;
pub mod news;
pub mod notification;
pub mod subscription;

use crate::services::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "news-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Ready once the database answers.
pub async fn readiness_check(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state.db.health_check().await?;
    Ok((StatusCode::OK, Json(json!({ "status": "ready" }))))
}

pub async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
