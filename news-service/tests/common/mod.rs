#![allow(dead_code)]

use news_service::config::{DatabaseConfig, NewsConfig, SiteConfig};
use news_service::services::{
    DatabaseRepository, EmailRepository, MockEmailRepository, MockNotificationRepository,
    NotificationRepository,
};
use news_service::startup::Application;
use secrecy::Secret;
use service_core::config::Config;
use std::path::PathBuf;
use std::sync::Arc;

pub const TEST_SECRET: &str = "test-secret-hash";
pub const ADMIN_EMAIL: &str = "admin@example.com";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: Arc<dyn DatabaseRepository>,
    pub email: Option<Arc<MockEmailRepository>>,
    pub push: Option<Arc<MockNotificationRepository>>,
    db_path: PathBuf,
    client: reqwest::Client,
}

impl TestApp {
    /// Spawn with recording email and push repositories.
    pub async fn spawn() -> Self {
        Self::spawn_with(true, true).await
    }

    /// Spawn with only the chosen outbound repositories configured.
    pub async fn spawn_with(email: bool, push: bool) -> Self {
        let db_path = std::env::temp_dir().join(format!("news-test-{}.db", uuid::Uuid::new_v4()));

        let config = NewsConfig {
            common: Config {
                port: 0,
                log_level: "debug".to_string(),
            },
            production: false,
            secret_hash: Secret::new(TEST_SECRET.to_string()),
            otlp_endpoint: None,
            database: DatabaseConfig {
                url: None,
                path: db_path.to_string_lossy().into_owned(),
                pool_size: 2,
            },
            site: SiteConfig {
                notification_url: "https://news.example.com/".to_string(),
                base_url: "https://news.example.com".to_string(),
                admin_email: Some(ADMIN_EMAIL.to_string()),
            },
            smtp: None,
            fcm: None,
        };

        let email = email.then(|| Arc::new(MockEmailRepository::new()));
        let push = push.then(|| Arc::new(MockNotificationRepository::new()));

        let app = Application::build_with(
            config,
            email.clone().map(|e| e as Arc<dyn EmailRepository>),
            push.clone().map(|p| p as Arc<dyn NotificationRepository>),
        )
        .await
        .expect("Failed to build test application");

        let port = app.http_port();
        let address = format!("http://127.0.0.1:{}", port);
        let db = app.state().db;

        tokio::spawn(async move {
            app.run_until_stopped(std::future::pending()).await.ok();
        });

        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client.get(format!("{}/health", address)).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            email,
            push,
            db_path,
            client,
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn sent_emails(&self) -> Vec<news_service::services::SentEmail> {
        self.email.as_ref().map(|e| e.sent()).unwrap_or_default()
    }

    pub fn sent_pushes(&self) -> Vec<news_service::services::SentPush> {
        self.push.as_ref().map(|p| p.sent()).unwrap_or_default()
    }

    pub async fn put_news(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .put(self.url("/news"))
            .header("Secret-hash", TEST_SECRET)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn cleanup(&self) {
        let _ = std::fs::remove_file(&self.db_path);
    }
}

pub fn news_json(title: &str) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "subtitle": "Subtitle",
        "imageUrl": "https://example.com/image.png",
        "url": "https://example.com/article",
        "occurrence": "2018-03-01T14:05:00"
    })
}
