use super::{EmailRepository, ProviderError};
use crate::config::SmtpConfig;
use crate::services::metrics::record_outbound;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::ExposeSecret;
use std::sync::Mutex;

pub struct SmtpEmailRepository {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
    production: bool,
}

impl SmtpEmailRepository {
    pub fn new(config: &SmtpConfig, production: bool) -> Result<Self, ProviderError> {
        let creds = Credentials::new(
            config.user.clone(),
            config.password.expose_secret().clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| {
                ProviderError::Configuration(format!("Failed to create SMTP relay: {}", e))
            })?
            .port(config.port)
            .credentials(creds)
            .build();

        let from = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .map_err(|e| ProviderError::Configuration(format!("Invalid from address: {}", e)))?;

        Ok(Self {
            from,
            transport,
            production,
        })
    }

    fn build_message(&self, subject: &str, body: &str, to: &str) -> Result<Message, ProviderError> {
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| ProviderError::InvalidRecipient(format!("{}: {}", to, e)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| ProviderError::SendFailed(format!("Failed to build message: {}", e)))
    }
}

#[async_trait]
impl EmailRepository for SmtpEmailRepository {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), ProviderError> {
        for recipient in recipients {
            let message = self.build_message(subject, body, recipient)?;

            if !self.production {
                tracing::debug!(to = %recipient, subject = %subject, body = %body, "SMTP request");
            }

            let response = self.transport.send(message).await.map_err(|e| {
                record_outbound("email", "failed", 1);
                ProviderError::SendFailed(format!("Failed to send email to {}: {}", recipient, e))
            })?;

            if !self.production {
                tracing::debug!(code = %response.code(), "SMTP response");
            }
            record_outbound("email", "sent", 1);
        }

        tracing::info!(
            subject = %subject,
            recipients = recipients.len(),
            "Email sent successfully"
        );

        Ok(())
    }
}

/// One message handed to [`MockEmailRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
}

/// Email repository that records messages instead of delivering them.
#[derive(Default)]
pub struct MockEmailRepository {
    fail: bool,
    sent: Mutex<Vec<SentEmail>>,
}

impl MockEmailRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository whose every send fails, for exercising error paths.
    pub fn failing() -> Self {
        Self {
            fail: true,
            sent: Mutex::default(),
        }
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EmailRepository for MockEmailRepository {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), ProviderError> {
        if self.fail {
            return Err(ProviderError::SendFailed(
                "Mock email repository configured to fail".to_string(),
            ));
        }

        tracing::info!(
            subject = %subject,
            recipients = recipients.len(),
            "[MOCK] Email would be sent"
        );

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentEmail {
                subject: subject.to_string(),
                body: body.to_string(),
                recipients: recipients.to_vec(),
            });
        }

        Ok(())
    }
}
