use super::require;
use crate::config::SiteConfig;
use crate::models::Subscription;
use crate::services::{DatabaseRepository, EmailRepository};
use service_core::error::AppError;
use tracing::instrument;
use validator::Validate;

#[derive(Validate)]
struct Subscriber {
    #[validate(email(message = "Invalid email address"))]
    email: String,
}

fn unsubscribe_link(site: &SiteConfig, key: &str) -> String {
    format!("{}/unsubscribe?key={}", site.base_url.trim_end_matches('/'), key)
}

/// Subscribe `email` and send it a confirmation carrying the unsubscribe link.
///
/// Requires a configured email repository; without one nothing is written.
#[instrument(skip_all)]
pub async fn add_subscription(
    email: &str,
    db: &dyn DatabaseRepository,
    email_repository: Option<&dyn EmailRepository>,
    site: &SiteConfig,
) -> Result<Subscription, AppError> {
    let email_repository = require(email_repository, "EmailRepository")?;

    let subscriber = Subscriber {
        email: email.trim().to_string(),
    };
    subscriber.validate().map_err(|_| {
        AppError::BadRequest(format!("Invalid email address: {}", subscriber.email))
    })?;

    let subscription = db.add_email_subscription(&subscriber.email).await?;

    email_repository
        .send(
            "Subscription confirmed",
            &format!(
                "You are now subscribed to our news.\n\nTo unsubscribe, visit {}",
                unsubscribe_link(site, &subscription.key)
            ),
            std::slice::from_ref(&subscription.email),
        )
        .await?;

    tracing::info!("Email subscription added");
    Ok(subscription)
}

pub async fn remove_subscription(key: &str, db: &dyn DatabaseRepository) -> Result<(), AppError> {
    db.remove_email_subscription(key).await?;
    Ok(())
}

/// Send `message` to every subscriber, one email each with a personal
/// unsubscribe link. Returns the number of recipients.
#[instrument(skip_all, fields(title = %title))]
pub async fn send_mailing(
    title: &str,
    message: &str,
    email_repository: Option<&dyn EmailRepository>,
    db: &dyn DatabaseRepository,
    site: &SiteConfig,
) -> Result<usize, AppError> {
    let email_repository = require(email_repository, "EmailRepository")?;

    let subscriptions = db.get_email_subscriptions().await?;
    for subscription in &subscriptions {
        let body = format!(
            "{}\n\n--\nTo unsubscribe, visit {}",
            message,
            unsubscribe_link(site, &subscription.key)
        );
        email_repository
            .send(title, &body, std::slice::from_ref(&subscription.email))
            .await?;
    }

    tracing::info!(recipients = subscriptions.len(), "Mailing sent");
    Ok(subscriptions.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::database::temp_database;
    use crate::services::MockEmailRepository;
    use crate::usecases::test_support::site;

    #[tokio::test]
    async fn subscription_sends_confirmation_with_key() {
        let db = temp_database().await;
        let email = MockEmailRepository::new();

        let subscription = add_subscription("reader@example.com", &db, Some(&email), &site(None))
            .await
            .expect("subscribe");

        let sent = email.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipients, vec!["reader@example.com".to_string()]);
        assert!(sent[0]
            .body
            .contains(&format!("https://news.example.com/unsubscribe?key={}", subscription.key)));
    }

    #[tokio::test]
    async fn missing_email_repository_writes_nothing() {
        let db = temp_database().await;

        let err = add_subscription("reader@example.com", &db, None, &site(None))
            .await
            .expect_err("no mailer");
        assert!(matches!(err, AppError::MissingElement(_)));
        assert!(db.get_email_subscriptions().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn invalid_address_is_rejected_before_write() {
        let db = temp_database().await;
        let email = MockEmailRepository::new();

        let err = add_subscription("not-an-address", &db, Some(&email), &site(None))
            .await
            .expect_err("invalid");
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(db.get_email_subscriptions().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn remove_then_list_no_longer_contains_key() {
        let db = temp_database().await;
        let email = MockEmailRepository::new();
        let subscription = add_subscription("reader@example.com", &db, Some(&email), &site(None))
            .await
            .expect("subscribe");

        remove_subscription(&subscription.key, &db).await.expect("remove");
        remove_subscription(&subscription.key, &db).await.expect("second remove is a no-op");

        let remaining = db.get_email_subscriptions().await.expect("list");
        assert!(remaining.iter().all(|s| s.key != subscription.key));
    }

    #[tokio::test]
    async fn mailing_goes_to_each_subscriber_separately() {
        let db = temp_database().await;
        let a = db.add_email_subscription("a@example.com").await.expect("a");
        let b = db.add_email_subscription("b@example.com").await.expect("b");
        let email = MockEmailRepository::new();

        let count = send_mailing("Weekly", "Hello readers", Some(&email), &db, &site(None))
            .await
            .expect("mailing");

        assert_eq!(count, 2);
        let sent = email.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|m| m.subject == "Weekly" && m.body.starts_with("Hello readers")));
        assert!(sent.iter().any(|m| m.body.contains(&a.key) && m.recipients == vec![a.email.clone()]));
        assert!(sent.iter().any(|m| m.body.contains(&b.key) && m.recipients == vec![b.email.clone()]));
    }
}
