//! Persistence for news, feedback, push tokens and email subscriptions.
//!
//! Two backends implement [`DatabaseRepository`]: PostgreSQL when a
//! connection string is configured, an embedded SQLite file otherwise.
//! [`connect`] is the only place that chooses between them.

mod postgres;
mod queries;
mod sqlite;

pub use postgres::PostgresDatabase;
pub use sqlite::SqliteDatabase;

use crate::config::DatabaseConfig;
use crate::models::{
    format_date, parse_date, Feedback, FirebaseTokenData, FirebaseTokenType, News, Subscription,
};
use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use rand::Rng;
use secrecy::ExposeSecret;
use service_core::error::AppError;
use sqlx::FromRow;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Storage contract shared by both backends.
///
/// Concurrency is bounded by the backend's connection pool: at most
/// `pool_size` operations touch the database at once, the rest wait for a
/// free connection.
#[async_trait]
pub trait DatabaseRepository: Send + Sync {
    /// Create the four tables if they do not exist yet.
    async fn initialize_schema(&self) -> Result<(), AppError>;

    async fn health_check(&self) -> Result<(), AppError>;

    /// All news, highest id first.
    async fn get_news(&self) -> Result<Vec<News>, AppError>;

    /// Fails with `NotFound` when no row has this id.
    async fn get_news_by_id(&self, id: i64) -> Result<News, AppError>;

    /// Insert ignoring `news.id`; returns the id storage assigned.
    async fn add_news(&self, news: &News) -> Result<i64, AppError>;

    /// Overwrite every field of the row with `id`. Fails with `NotFound`
    /// unless exactly one row matches, leaving storage untouched.
    async fn update_news(&self, id: i64, news: &News) -> Result<(), AppError>;

    /// Distinct feedback rows.
    async fn get_feedback(&self) -> Result<Vec<Feedback>, AppError>;

    async fn add_feedback(&self, feedback: &Feedback) -> Result<(), AppError>;

    async fn get_all_tokens(&self) -> Result<Vec<FirebaseTokenData>, AppError>;

    async fn add_token(&self, token: &str, token_type: FirebaseTokenType) -> Result<(), AppError>;

    async fn get_email_subscriptions(&self) -> Result<Vec<Subscription>, AppError>;

    /// Persist a subscription with a fresh random key and the current time.
    async fn add_email_subscription(&self, email: &str) -> Result<Subscription, AppError>;

    /// Delete subscriptions with this key. Zero matches is not an error.
    async fn remove_email_subscription(&self, key: &str) -> Result<u64, AppError>;
}

/// Open the configured backend and make sure its schema exists.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn DatabaseRepository>, AppError> {
    let pool_size = config.pool_size.max(1);

    let db: Arc<dyn DatabaseRepository> = match &config.url {
        Some(url) => Arc::new(PostgresDatabase::connect(url.expose_secret(), pool_size).await?),
        None => Arc::new(SqliteDatabase::open(&config.path, pool_size).await?),
    };

    db.initialize_schema().await.map_err(|e| {
        tracing::error!("Failed to initialize database schema: {}", e);
        e
    })?;

    Ok(db)
}

/// Build the record for a new subscription. The key is a random 64-bit
/// integer; collisions are not checked.
pub(crate) fn new_subscription(email: &str) -> Subscription {
    let key: i64 = rand::thread_rng().gen();
    Subscription {
        email: email.to_string(),
        key: key.to_string(),
        creation_time: Utc::now().naive_utc().trunc_subsecs(0),
    }
}

/// Run one repository operation, recording its latency (successful or not)
/// in `db_query_duration_seconds`.
pub(crate) async fn timed<T, F>(operation: &'static str, query: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    let started = Instant::now();
    let result = query.await;
    metrics::histogram!("db_query_duration_seconds", "operation" => operation)
        .record(started.elapsed().as_secs_f64());
    result
}

pub(crate) fn news_not_found(id: i64) -> AppError {
    AppError::NotFound(anyhow::anyhow!("News Id {} not found", id))
}

#[derive(Debug, FromRow)]
pub(crate) struct NewsRow {
    id: i64,
    title: String,
    subtitle: String,
    image_url: String,
    url: String,
    occurrence: String,
}

impl TryFrom<NewsRow> for News {
    type Error = AppError;

    fn try_from(row: NewsRow) -> Result<Self, Self::Error> {
        let occurrence = parse_date(&row.occurrence).map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!(
                "Invalid occurrence '{}' for news {}: {}",
                row.occurrence,
                row.id,
                e
            ))
        })?;

        Ok(News {
            id: Some(row.id),
            title: row.title,
            subtitle: row.subtitle,
            image_url: row.image_url,
            url: row.url,
            occurrence,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct FeedbackRow {
    news_id: i32,
    rating: i32,
    comment_text: String,
    suggestions_text: String,
}

impl From<FeedbackRow> for Feedback {
    fn from(row: FeedbackRow) -> Self {
        Feedback {
            news_id: row.news_id,
            rating: row.rating,
            comment: row.comment_text,
            suggestions: row.suggestions_text,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct TokenRow {
    token: String,
    token_type: String,
}

impl TryFrom<TokenRow> for FirebaseTokenData {
    type Error = AppError;

    fn try_from(row: TokenRow) -> Result<Self, Self::Error> {
        Ok(FirebaseTokenData {
            token_type: row.token_type.parse().map_err(AppError::DatabaseError)?,
            token: row.token,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SubscriptionRow {
    email: String,
    key: String,
    creation_time: String,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = AppError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let creation_time = parse_date(&row.creation_time).map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!(
                "Invalid creation time '{}': {}",
                row.creation_time,
                e
            ))
        })?;

        Ok(Subscription {
            email: row.email,
            key: row.key,
            creation_time,
        })
    }
}

/// Column values for an insert/update of `news`.
pub(crate) fn news_columns(news: &News) -> (&str, &str, &str, &str, String) {
    (
        &news.title,
        &news.subtitle,
        &news.image_url,
        &news.url,
        format_date(&news.occurrence),
    )
}

#[cfg(test)]
pub(crate) use sqlite::tests::{sample_news, temp_database};
