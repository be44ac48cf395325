use crate::middleware::{JsonBody, RequireSecret};
use crate::models::{Feedback, FeedbackData};
use crate::startup::AppState;
use crate::usecases;
use axum::{extract::State, http::StatusCode, Json};
use service_core::error::AppError;

pub async fn list_feedback(
    _secret: RequireSecret,
    State(state): State<AppState>,
) -> Result<Json<FeedbackData>, AppError> {
    let feedback = usecases::get_all_feedback(state.db.as_ref()).await?;
    Ok(Json(FeedbackData { feedback }))
}

pub async fn post_feedback(
    State(state): State<AppState>,
    JsonBody(feedback): JsonBody<Feedback>,
) -> Result<StatusCode, AppError> {
    usecases::add_feedback(feedback, state.email(), state.db.as_ref(), &state.config.site).await?;
    Ok(StatusCode::OK)
}
