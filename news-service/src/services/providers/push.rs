use super::{outbound_client, NotificationRepository, ProviderError, PushReport};
use crate::config::FcmConfig;
use crate::models::{FirebaseTokenData, FirebaseTokenType};
use crate::services::metrics::record_outbound;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

const FCM_API_URL: &str = "https://fcm.googleapis.com/v1/projects";

/// Push notifications through the Firebase Cloud Messaging HTTP v1 API.
pub struct FcmNotificationRepository {
    project_id: String,
    access_token: Secret<String>,
    api_url: String,
    client: Client,
    production: bool,
}

#[derive(Debug, Serialize)]
struct FcmRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    token: &'a str,
    notification: FcmNotification<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<HashMap<&'static str, &'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    android: Option<FcmAndroidConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    webpush: Option<FcmWebpushConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct FcmAndroidConfig {
    priority: &'static str,
}

#[derive(Debug, Serialize)]
struct FcmWebpushConfig<'a> {
    fcm_options: FcmWebpushOptions<'a>,
}

#[derive(Debug, Serialize)]
struct FcmWebpushOptions<'a> {
    link: &'a str,
}

#[derive(Debug, Deserialize)]
struct FcmResponse {
    name: Option<String>,
}

impl FcmNotificationRepository {
    pub fn new(config: &FcmConfig, production: bool) -> Result<Self, ProviderError> {
        if config.project_id.is_empty() {
            return Err(ProviderError::Configuration(
                "FCM project_id is not configured".to_string(),
            ));
        }

        Ok(Self {
            project_id: config.project_id.clone(),
            access_token: config.access_token.clone(),
            api_url: FCM_API_URL.to_string(),
            client: outbound_client(production)?,
            production,
        })
    }

    /// Point at a different API root (e.g. an emulator).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn message<'a>(text: &'a str, url: &'a str, token: &'a FirebaseTokenData) -> FcmRequest<'a> {
        let (android, webpush) = match token.token_type {
            FirebaseTokenType::Android => (Some(FcmAndroidConfig { priority: "high" }), None),
            FirebaseTokenType::Web => (
                None,
                Some(FcmWebpushConfig {
                    fcm_options: FcmWebpushOptions { link: url },
                }),
            ),
        };

        FcmRequest {
            message: FcmMessage {
                token: &token.token,
                notification: FcmNotification { body: text },
                data: Some(HashMap::from([("url", url)])),
                android,
                webpush,
            },
        }
    }
}

#[async_trait]
impl NotificationRepository for FcmNotificationRepository {
    async fn send_push(
        &self,
        text: &str,
        url: &str,
        tokens: &[FirebaseTokenData],
    ) -> Result<PushReport, ProviderError> {
        let endpoint = format!("{}/{}/messages:send", self.api_url, self.project_id);
        let mut report = PushReport::default();

        for token in tokens {
            let request = Self::message(text, url, token);

            if !self.production {
                tracing::debug!(
                    endpoint = %endpoint,
                    body = %serde_json::to_string(&request).unwrap_or_default(),
                    "FCM request"
                );
            }

            let response = self
                .client
                .post(&endpoint)
                .bearer_auth(self.access_token.expose_secret())
                .json(&request)
                .send()
                .await
                .map_err(|e| {
                    ProviderError::Connection(format!("Failed to connect to FCM: {}", e))
                })?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(ProviderError::Authentication(format!(
                    "FCM rejected credentials with status {}",
                    status
                )));
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(
                    token_type = %token.token_type,
                    status = %status,
                    body = %body,
                    "FCM rejected push token"
                );
                report.failed += 1;
                continue;
            }

            let fcm_response: FcmResponse = response.json().await.map_err(|e| {
                ProviderError::SendFailed(format!("Failed to parse FCM response: {}", e))
            })?;

            if !self.production {
                tracing::debug!(message_name = ?fcm_response.name, "FCM response");
            }
            report.sent += 1;
        }

        record_outbound("push", "sent", report.sent);
        record_outbound("push", "failed", report.failed);

        tracing::info!(
            sent = report.sent,
            failed = report.failed,
            "Push notifications sent via FCM"
        );

        Ok(report)
    }
}

/// One broadcast handed to [`MockNotificationRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPush {
    pub text: String,
    pub url: String,
    pub tokens: Vec<FirebaseTokenData>,
}

/// Push repository that records broadcasts instead of delivering them.
#[derive(Default)]
pub struct MockNotificationRepository {
    sent: Mutex<Vec<SentPush>>,
}

impl MockNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentPush> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NotificationRepository for MockNotificationRepository {
    async fn send_push(
        &self,
        text: &str,
        url: &str,
        tokens: &[FirebaseTokenData],
    ) -> Result<PushReport, ProviderError> {
        tracing::info!(
            tokens = tokens.len(),
            url = %url,
            "[MOCK] Push notification would be sent"
        );

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentPush {
                text: text.to_string(),
                url: url.to_string(),
                tokens: tokens.to_vec(),
            });
        }

        Ok(PushReport {
            sent: tokens.len(),
            failed: 0,
        })
    }
}
