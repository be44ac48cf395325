use super::notify_admin;
use crate::config::SiteConfig;
use crate::models::News;
use crate::services::{DatabaseRepository, EmailRepository, NotificationRepository};
use service_core::error::AppError;
use tracing::instrument;

pub async fn get_all_news(db: &dyn DatabaseRepository) -> Result<Vec<News>, AppError> {
    db.get_news().await
}

pub async fn get_news(id: i64, db: &dyn DatabaseRepository) -> Result<News, AppError> {
    db.get_news_by_id(id).await
}

/// A payload with an `id` updates that row; without one it is inserted.
///
/// Newly inserted news is pushed to every registered token (when push is
/// configured) and announced to the administrator (when email is). Updates
/// have no side effects.
#[instrument(skip_all, fields(news_id = ?news.id, title = %news.title))]
pub async fn add_or_update_news(
    news: News,
    db: &dyn DatabaseRepository,
    notifications: Option<&dyn NotificationRepository>,
    email: Option<&dyn EmailRepository>,
    site: &SiteConfig,
) -> Result<(), AppError> {
    if let Some(id) = news.id {
        return db.update_news(id, &news).await;
    }

    let id = db.add_news(&news).await?;

    if let Some(notifications) = notifications {
        let tokens = db.get_all_tokens().await?;
        if !tokens.is_empty() {
            notifications
                .send_push(&news.title, &news.url, &tokens)
                .await?;
        }
    }

    notify_admin(
        email,
        site,
        &format!("News published: {}", news.title),
        &format!("News {} was published.\n\n{}\n{}\n{}", id, news.title, news.subtitle, news.url),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FirebaseTokenType;
    use crate::services::database::{sample_news, temp_database};
    use crate::services::{MockEmailRepository, MockNotificationRepository};
    use crate::usecases::test_support::site;

    #[tokio::test]
    async fn news_without_id_is_inserted_and_announced() {
        let db = temp_database().await;
        db.add_token("tok", FirebaseTokenType::Web).await.expect("token");
        let push = MockNotificationRepository::new();
        let email = MockEmailRepository::new();

        add_or_update_news(
            sample_news("Fresh"),
            &db,
            Some(&push),
            Some(&email),
            &site(Some("admin@example.com")),
        )
        .await
        .expect("insert");

        let stored = get_all_news(&db).await.expect("list");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "Fresh");

        let pushes = push.sent();
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].text, "Fresh");
        assert_eq!(pushes[0].url, "https://example.com/article");

        let emails = email.sent();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].recipients, vec!["admin@example.com".to_string()]);
    }

    #[tokio::test]
    async fn news_with_id_updates_without_side_effects() {
        let db = temp_database().await;
        let id = db.add_news(&sample_news("Old")).await.expect("insert");
        let push = MockNotificationRepository::new();

        let mut news = sample_news("New");
        news.id = Some(id);
        add_or_update_news(news, &db, Some(&push), None, &site(None))
            .await
            .expect("update");

        assert_eq!(get_news(id, &db).await.expect("get").title, "New");
        assert!(push.sent().is_empty());
    }

    #[tokio::test]
    async fn update_with_unknown_id_is_not_found() {
        let db = temp_database().await;
        let mut news = sample_news("Ghost");
        news.id = Some(99);

        let err = add_or_update_news(news, &db, None, None, &site(None))
            .await
            .expect_err("no row 99");
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(get_all_news(&db).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn insert_works_without_outbound_repositories() {
        let db = temp_database().await;
        add_or_update_news(sample_news("Quiet"), &db, None, None, &site(Some("a@b.com")))
            .await
            .expect("insert");
        assert_eq!(get_all_news(&db).await.expect("list").len(), 1);
    }
}
