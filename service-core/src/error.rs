use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Request-level failures.
///
/// Every variant is raised where the problem is detected and rendered exactly
/// once, at the HTTP boundary, as a status code plus a plain-text message.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required form parameter was absent from the request.
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// An optional collaborator (email, push) is not configured.
    #[error("Missing element: {0}")]
    MissingElement(String),

    #[error("Secret invalid")]
    SecretInvalid,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    /// An outbound provider (SMTP, FCM) rejected or failed the send.
    #[error("Bad Gateway: {0}")]
    BadGateway(String),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingParameter(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::SecretInvalid => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MissingElement(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseError(_) | AppError::InternalError(_) | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound(anyhow::anyhow!("Row not found")),
            other => AppError::DatabaseError(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            AppError::DatabaseError(err) => {
                tracing::error!(error = %err, "Database error");
                "Database error".to_string()
            }
            AppError::InternalError(err) => {
                tracing::error!(error = ?err, "Unhandled request failure");
                "Internal server error".to_string()
            }
            AppError::ConfigError(err) => {
                tracing::error!(error = %err, "Configuration error");
                "Configuration error".to_string()
            }
            AppError::BadGateway(msg) => {
                tracing::warn!(error = %msg, "Outbound send failed");
                format!("Bad Gateway: {}", msg)
            }
            AppError::BadRequest(msg) => msg,
            other => other.to_string(),
        };

        (status, message).into_response()
    }
}
