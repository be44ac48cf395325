//! Business operations. Each function composes repository calls and holds
//! no state of its own; collaborators are passed in explicitly, optional ones
//! as `Option` so every caller has to decide what absence means.

pub mod feedback;
pub mod news;
pub mod notifications;
pub mod subscriptions;

pub use feedback::{add_feedback, get_all_feedback};
pub use news::{add_or_update_news, get_all_news, get_news};
pub use notifications::{add_token, get_token_data, send_notifications};
pub use subscriptions::{add_subscription, remove_subscription, send_mailing};

use crate::config::SiteConfig;
use crate::services::EmailRepository;
use service_core::error::AppError;

/// Email the site administrator, if both an address and a mailer exist.
async fn notify_admin(
    email: Option<&dyn EmailRepository>,
    site: &SiteConfig,
    subject: &str,
    body: &str,
) -> Result<(), AppError> {
    if let (Some(email), Some(admin)) = (email, site.admin_email.as_ref()) {
        email.send(subject, body, std::slice::from_ref(admin)).await?;
    }
    Ok(())
}

fn require<'a, T: ?Sized>(collaborator: Option<&'a T>, name: &str) -> Result<&'a T, AppError> {
    collaborator.ok_or_else(|| AppError::MissingElement(name.to_string()))
}
