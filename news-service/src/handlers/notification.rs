use crate::middleware::{JsonBody, RequireSecret};
use crate::models::FirebaseTokenData;
use crate::services::PushReport;
use crate::startup::AppState;
use crate::usecases;
use axum::{extract::State, http::StatusCode, Json};
use service_core::error::AppError;

pub async fn list_tokens(
    _secret: RequireSecret,
    State(state): State<AppState>,
) -> Result<Json<Vec<FirebaseTokenData>>, AppError> {
    let tokens = usecases::get_token_data(state.db.as_ref()).await?;
    Ok(Json(tokens))
}

pub async fn register_token(
    State(state): State<AppState>,
    JsonBody(data): JsonBody<FirebaseTokenData>,
) -> Result<StatusCode, AppError> {
    usecases::add_token(data, state.db.as_ref()).await?;
    Ok(StatusCode::OK)
}

/// Broadcast the JSON string body to every token, linking to the configured
/// notification URL.
pub async fn send_notification(
    _secret: RequireSecret,
    State(state): State<AppState>,
    JsonBody(text): JsonBody<String>,
) -> Result<Json<PushReport>, AppError> {
    let site = &state.config.site;
    let report = usecases::send_notifications(
        &text,
        &site.notification_url,
        state.db.as_ref(),
        state.notifications(),
        state.email(),
        site,
    )
    .await?;
    Ok(Json(report))
}
