//! Outbound collaborators: email delivery and push notifications.
//!
//! Both are optional. When a provider is not configured the application holds
//! `None` in its place and the routes that need it answer `MissingElement`.

pub mod email;
pub mod push;

use crate::models::FirebaseTokenData;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::time::Duration;
use thiserror::Error;

pub use email::{MockEmailRepository, SentEmail, SmtpEmailRepository};
pub use push::{FcmNotificationRepository, MockNotificationRepository, SentPush};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Send error: {0}")]
    SendFailed(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Authentication error: {0}")]
    Authentication(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Configuration(msg) => AppError::ConfigError(anyhow::anyhow!(msg)),
            other => AppError::BadGateway(other.to_string()),
        }
    }
}

/// Outcome of a push broadcast. Tokens the provider rejects individually are
/// counted, not fatal; a transport or authentication failure aborts the send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushReport {
    pub sent: usize,
    pub failed: usize,
}

#[async_trait]
pub trait EmailRepository: Send + Sync {
    /// Deliver one plain-text message to each recipient separately.
    async fn send(&self, subject: &str, body: &str, recipients: &[String])
        -> Result<(), ProviderError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Push `text` to every token, linking to `url`.
    async fn send_push(
        &self,
        text: &str,
        url: &str,
        tokens: &[FirebaseTokenData],
    ) -> Result<PushReport, ProviderError>;
}

/// HTTP client for outbound providers. Outside production the connection
/// traffic is logged verbosely at TRACE level.
pub fn outbound_client(production: bool) -> Result<Client, ProviderError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(60))
        .timeout(Duration::from_secs(60))
        .connection_verbose(!production)
        .build()
        .map_err(|e| ProviderError::Configuration(format!("Failed to build HTTP client: {}", e)))
}
