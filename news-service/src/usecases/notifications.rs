use super::{notify_admin, require};
use crate::config::SiteConfig;
use crate::models::FirebaseTokenData;
use crate::services::{DatabaseRepository, EmailRepository, NotificationRepository, PushReport};
use service_core::error::AppError;
use tracing::instrument;

pub async fn get_token_data(
    db: &dyn DatabaseRepository,
) -> Result<Vec<FirebaseTokenData>, AppError> {
    db.get_all_tokens().await
}

pub async fn add_token(data: FirebaseTokenData, db: &dyn DatabaseRepository) -> Result<(), AppError> {
    db.add_token(&data.token, data.token_type).await
}

/// Push `text` to every registered token. Fails with `MissingElement` before
/// touching storage when push is not configured. The delivery report is also
/// mailed to the administrator when possible.
#[instrument(skip_all, fields(url = %url))]
pub async fn send_notifications(
    text: &str,
    url: &str,
    db: &dyn DatabaseRepository,
    notifications: Option<&dyn NotificationRepository>,
    email: Option<&dyn EmailRepository>,
    site: &SiteConfig,
) -> Result<PushReport, AppError> {
    let notifications = require(notifications, "NotificationRepository")?;

    let tokens = db.get_all_tokens().await?;
    let report = notifications.send_push(text, url, &tokens).await?;

    tracing::info!(
        sent = report.sent,
        failed = report.failed,
        "Push broadcast finished"
    );

    notify_admin(
        email,
        site,
        "Push notifications sent",
        &format!(
            "Message: {}\nLink: {}\n\nDelivered: {}\nRejected: {}",
            text, url, report.sent, report.failed
        ),
    )
    .await?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FirebaseTokenType;
    use crate::services::database::temp_database;
    use crate::services::{MockEmailRepository, MockNotificationRepository};
    use crate::usecases::test_support::site;

    #[tokio::test]
    async fn broadcast_reaches_every_token() {
        let db = temp_database().await;
        for (token, ty) in [("a", FirebaseTokenType::Web), ("b", FirebaseTokenType::Android)] {
            add_token(
                FirebaseTokenData {
                    token: token.to_string(),
                    token_type: ty,
                },
                &db,
            )
            .await
            .expect("register");
        }
        let push = MockNotificationRepository::new();
        let email = MockEmailRepository::new();

        let report = send_notifications(
            "Hello",
            "https://news.example.com/",
            &db,
            Some(&push),
            Some(&email),
            &site(Some("admin@example.com")),
        )
        .await
        .expect("send");

        assert_eq!(report, PushReport { sent: 2, failed: 0 });
        let sent = push.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].tokens.len(), 2);
        assert_eq!(sent[0].url, "https://news.example.com/");
        assert_eq!(email.sent().len(), 1);
    }

    #[tokio::test]
    async fn missing_push_repository_fails_fast() {
        let db = temp_database().await;

        let err = send_notifications("Hello", "u", &db, None, None, &site(None))
            .await
            .expect_err("no push repository");
        assert!(matches!(err, AppError::MissingElement(name) if name == "NotificationRepository"));
    }
}
