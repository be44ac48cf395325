use super::notify_admin;
use crate::config::SiteConfig;
use crate::models::Feedback;
use crate::services::{DatabaseRepository, EmailRepository};
use service_core::error::AppError;
use tracing::instrument;

pub async fn get_all_feedback(db: &dyn DatabaseRepository) -> Result<Vec<Feedback>, AppError> {
    db.get_feedback().await
}

/// Store the feedback, then forward it to the administrator when possible.
#[instrument(skip_all, fields(news_id = feedback.news_id, rating = feedback.rating))]
pub async fn add_feedback(
    feedback: Feedback,
    email: Option<&dyn EmailRepository>,
    db: &dyn DatabaseRepository,
    site: &SiteConfig,
) -> Result<(), AppError> {
    db.add_feedback(&feedback).await?;

    notify_admin(
        email,
        site,
        &format!("New feedback for news {}", feedback.news_id),
        &format!(
            "Rating: {}\n\nComment:\n{}\n\nSuggestions:\n{}",
            feedback.rating, feedback.comment, feedback.suggestions
        ),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::database::temp_database;
    use crate::services::MockEmailRepository;
    use crate::usecases::test_support::site;

    fn feedback() -> Feedback {
        Feedback {
            news_id: 3,
            rating: 4,
            comment: "Nice".to_string(),
            suggestions: "Shorter".to_string(),
        }
    }

    #[tokio::test]
    async fn feedback_is_stored_and_forwarded() {
        let db = temp_database().await;
        let email = MockEmailRepository::new();

        add_feedback(feedback(), Some(&email), &db, &site(Some("admin@example.com")))
            .await
            .expect("add");

        assert_eq!(get_all_feedback(&db).await.expect("list"), vec![feedback()]);
        let sent = email.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("Shorter"));
    }

    #[tokio::test]
    async fn no_admin_address_means_no_email() {
        let db = temp_database().await;
        let email = MockEmailRepository::new();

        add_feedback(feedback(), Some(&email), &db, &site(None))
            .await
            .expect("add");

        assert!(email.sent().is_empty());
    }

    #[tokio::test]
    async fn failed_forward_surfaces_as_error() {
        let db = temp_database().await;
        let email = MockEmailRepository::failing();

        let err = add_feedback(feedback(), Some(&email), &db, &site(Some("admin@example.com")))
            .await
            .expect_err("mailer fails");
        assert!(matches!(err, AppError::BadGateway(_)));
    }
}
