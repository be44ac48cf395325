use super::{
    new_subscription, news_columns, news_not_found, queries, timed, DatabaseRepository,
    FeedbackRow, NewsRow, SubscriptionRow, TokenRow,
};
use crate::models::{format_date, Feedback, FirebaseTokenData, FirebaseTokenType, News, Subscription};
use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::time::Duration;
use tracing::{info, instrument};

const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS news (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        subtitle TEXT NOT NULL,
        image_url TEXT NOT NULL,
        url TEXT NOT NULL,
        occurrence TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS feedback (
        news_id INTEGER NOT NULL,
        rating INTEGER NOT NULL,
        comment_text TEXT NOT NULL,
        suggestions_text TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tokens (
        token TEXT NOT NULL,
        type TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS subscriptions (
        email TEXT NOT NULL,
        "key" TEXT NOT NULL,
        creation_time TEXT NOT NULL
    )
    "#,
];

/// Embedded development database backed by a single SQLite file.
#[derive(Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    #[instrument(fields(service = "news-service"))]
    pub async fn open(path: &str, pool_size: u32) -> Result<Self, AppError> {
        info!(path = %path, pool_size = pool_size, "Opening SQLite database");

        // SQLite has a single writer; wait for the lock instead of failing with SQLITE_BUSY.
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to open {}: {}", path, e)))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabaseRepository for SqliteDatabase {
    #[instrument(skip(self))]
    async fn initialize_schema(&self) -> Result<(), AppError> {
        timed("initialize_schema", async {
            let mut tx = self.pool.begin().await?;
            for statement in SCHEMA {
                sqlx::query(statement).execute(&mut *tx).await?;
            }
            tx.commit().await?;
            Ok(())
        })
        .await?;

        info!("SQLite schema ready");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        timed("health_check", async {
            sqlx::query(queries::PING)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn get_news(&self) -> Result<Vec<News>, AppError> {
        timed("get_news", async {
            let rows = sqlx::query_as::<_, NewsRow>(queries::SELECT_NEWS)
                .fetch_all(&self.pool)
                .await?;
            rows.into_iter().map(News::try_from).collect()
        })
        .await
    }

    #[instrument(skip(self))]
    async fn get_news_by_id(&self, id: i64) -> Result<News, AppError> {
        timed("get_news_by_id", async {
            let row = sqlx::query_as::<_, NewsRow>(queries::SELECT_NEWS_BY_ID)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| news_not_found(id))?;
            News::try_from(row)
        })
        .await
    }

    #[instrument(skip(self, news), fields(title = %news.title))]
    async fn add_news(&self, news: &News) -> Result<i64, AppError> {
        let id = timed("add_news", async {
            let (title, subtitle, image_url, url, occurrence) = news_columns(news);
            let id: i64 = sqlx::query_scalar(queries::INSERT_NEWS)
                .bind(title)
                .bind(subtitle)
                .bind(image_url)
                .bind(url)
                .bind(occurrence)
                .fetch_one(&self.pool)
                .await?;
            Ok(id)
        })
        .await?;

        info!(news_id = id, "News added");
        Ok(id)
    }

    #[instrument(skip(self, news))]
    async fn update_news(&self, id: i64, news: &News) -> Result<(), AppError> {
        timed("update_news", async {
            let mut tx = self.pool.begin().await?;

            let count: i64 = sqlx::query_scalar(queries::COUNT_NEWS_BY_ID)
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
            if count != 1 {
                return Err(news_not_found(id));
            }

            let (title, subtitle, image_url, url, occurrence) = news_columns(news);
            sqlx::query(queries::UPDATE_NEWS)
                .bind(title)
                .bind(subtitle)
                .bind(image_url)
                .bind(url)
                .bind(occurrence)
                .bind(id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok(())
        })
        .await?;

        info!(news_id = id, "News updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_feedback(&self) -> Result<Vec<Feedback>, AppError> {
        timed("get_feedback", async {
            let rows = sqlx::query_as::<_, FeedbackRow>(queries::SELECT_FEEDBACK)
                .fetch_all(&self.pool)
                .await?;
            Ok(rows.into_iter().map(Feedback::from).collect())
        })
        .await
    }

    #[instrument(skip(self, feedback), fields(news_id = feedback.news_id))]
    async fn add_feedback(&self, feedback: &Feedback) -> Result<(), AppError> {
        timed("add_feedback", async {
            sqlx::query(queries::INSERT_FEEDBACK)
                .bind(feedback.news_id)
                .bind(feedback.rating)
                .bind(&feedback.comment)
                .bind(&feedback.suggestions)
                .execute(&self.pool)
                .await?;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn get_all_tokens(&self) -> Result<Vec<FirebaseTokenData>, AppError> {
        timed("get_all_tokens", async {
            let rows = sqlx::query_as::<_, TokenRow>(queries::SELECT_TOKENS)
                .fetch_all(&self.pool)
                .await?;
            rows.into_iter().map(FirebaseTokenData::try_from).collect()
        })
        .await
    }

    #[instrument(skip(self, token))]
    async fn add_token(&self, token: &str, token_type: FirebaseTokenType) -> Result<(), AppError> {
        timed("add_token", async {
            sqlx::query(queries::INSERT_TOKEN)
                .bind(token)
                .bind(token_type.as_str())
                .execute(&self.pool)
                .await?;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn get_email_subscriptions(&self) -> Result<Vec<Subscription>, AppError> {
        timed("get_email_subscriptions", async {
            let rows = sqlx::query_as::<_, SubscriptionRow>(queries::SELECT_SUBSCRIPTIONS)
                .fetch_all(&self.pool)
                .await?;
            rows.into_iter().map(Subscription::try_from).collect()
        })
        .await
    }

    #[instrument(skip(self, email))]
    async fn add_email_subscription(&self, email: &str) -> Result<Subscription, AppError> {
        timed("add_email_subscription", async {
            let subscription = new_subscription(email);
            sqlx::query(queries::INSERT_SUBSCRIPTION)
                .bind(&subscription.email)
                .bind(&subscription.key)
                .bind(format_date(&subscription.creation_time))
                .execute(&self.pool)
                .await?;
            Ok(subscription)
        })
        .await
    }

    #[instrument(skip(self, key))]
    async fn remove_email_subscription(&self, key: &str) -> Result<u64, AppError> {
        let removed = timed("remove_email_subscription", async {
            let result = sqlx::query(queries::DELETE_SUBSCRIPTION)
                .bind(key)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected())
        })
        .await?;

        info!(removed = removed, "Email subscription removed");
        Ok(removed)
    }
}
