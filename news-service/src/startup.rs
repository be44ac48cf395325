//! Application startup and lifecycle management.

use crate::config::NewsConfig;
use crate::handlers;
use crate::services::{
    connect, DatabaseRepository, EmailRepository, FcmNotificationRepository,
    NotificationRepository, SmtpEmailRepository,
};
use axum::middleware::from_fn;
use axum::{
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    make_request_span, metrics_middleware, request_id_middleware, security_headers_middleware,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state. Optional collaborators are `None` when their
/// provider is not configured.
#[derive(Clone)]
pub struct AppState {
    pub config: NewsConfig,
    pub db: Arc<dyn DatabaseRepository>,
    pub email: Option<Arc<dyn EmailRepository>>,
    pub notifications: Option<Arc<dyn NotificationRepository>>,
}

impl AppState {
    pub fn email(&self) -> Option<&dyn EmailRepository> {
        self.email.as_deref()
    }

    pub fn notifications(&self) -> Option<&dyn NotificationRepository> {
        self.notifications.as_deref()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route(
            "/news",
            get(handlers::news::list_news).put(handlers::news::put_news),
        )
        .route("/news/:id", get(handlers::news::get_news))
        .route(
            "/feedback",
            get(handlers::feedback::list_feedback).post(handlers::feedback::post_feedback),
        )
        .route(
            "/notification/register",
            get(handlers::notification::list_tokens)
                .post(handlers::notification::register_token),
        )
        .route(
            "/notification/send",
            post(handlers::notification::send_notification),
        )
        .route(
            "/subscription",
            post(handlers::subscription::subscribe).delete(handlers::subscription::unsubscribe),
        )
        .route(
            "/sendMailing",
            post(handlers::subscription::send_mailing),
        )
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application, creating outbound repositories from `config`.
    pub async fn build(config: NewsConfig) -> Result<Self, AppError> {
        let email = match &config.smtp {
            Some(smtp) => {
                let repository = SmtpEmailRepository::new(smtp, config.production)?;
                tracing::info!(host = %smtp.host, "SMTP email repository initialized");
                Some(Arc::new(repository) as Arc<dyn EmailRepository>)
            }
            None => {
                tracing::warn!("SMTP not configured - subscription and mailing routes disabled");
                None
            }
        };

        let notifications = match &config.fcm {
            Some(fcm) => {
                let repository = FcmNotificationRepository::new(fcm, config.production)?;
                tracing::info!(project_id = %fcm.project_id, "FCM push repository initialized");
                Some(Arc::new(repository) as Arc<dyn NotificationRepository>)
            }
            None => {
                tracing::warn!("FCM not configured - push notifications disabled");
                None
            }
        };

        Self::build_with(config, email, notifications).await
    }

    /// Build the application around the given outbound repositories.
    pub async fn build_with(
        config: NewsConfig,
        email: Option<Arc<dyn EmailRepository>>,
        notifications: Option<Arc<dyn NotificationRepository>>,
    ) -> Result<Self, AppError> {
        let db = connect(&config.database).await.map_err(|e| {
            tracing::error!("Failed to open database: {}", e);
            e
        })?;

        // Port 0 binds a random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("News service: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            state: AppState {
                config,
                db,
                email,
                notifications,
            },
        })
    }

    pub fn http_port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Serve until `shutdown` resolves.
    pub async fn run_until_stopped(
        self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        axum::serve(self.listener, router(self.state))
            .with_graceful_shutdown(shutdown)
            .await
    }
}
