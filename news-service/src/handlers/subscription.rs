use crate::middleware::{FormParams, RequireSecret};
use crate::startup::AppState;
use crate::usecases;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use service_core::error::AppError;

pub async fn subscribe(
    State(state): State<AppState>,
    params: FormParams,
) -> Result<StatusCode, AppError> {
    let email = params.require("email")?;
    usecases::add_subscription(email, state.db.as_ref(), state.email(), &state.config.site)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    params: FormParams,
) -> Result<StatusCode, AppError> {
    let key = params.require("key")?;
    usecases::remove_subscription(key, state.db.as_ref()).await?;
    Ok(StatusCode::OK)
}

pub async fn send_mailing(
    _secret: RequireSecret,
    State(state): State<AppState>,
    params: FormParams,
) -> Result<Json<Value>, AppError> {
    let title = params.require("title")?;
    let message = params.require("message")?;
    let recipients = usecases::send_mailing(
        title,
        message,
        state.email(),
        state.db.as_ref(),
        &state.config.site,
    )
    .await?;
    Ok(Json(json!({ "recipients": recipients })))
}
