use crate::middleware::{JsonBody, RequireSecret};
use crate::models::{News, NewsData};
use crate::startup::AppState;
use crate::usecases;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

pub async fn list_news(State(state): State<AppState>) -> Result<Json<NewsData>, AppError> {
    let news = usecases::get_all_news(state.db.as_ref()).await?;
    Ok(Json(NewsData { news }))
}

pub async fn get_news(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<News>, AppError> {
    let news = usecases::get_news(id, state.db.as_ref()).await?;
    Ok(Json(news))
}

pub async fn put_news(
    _secret: RequireSecret,
    State(state): State<AppState>,
    JsonBody(news): JsonBody<News>,
) -> Result<StatusCode, AppError> {
    usecases::add_or_update_news(
        news,
        state.db.as_ref(),
        state.notifications(),
        state.email(),
        &state.config.site,
    )
    .await?;
    Ok(StatusCode::OK)
}
