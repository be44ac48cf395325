//! Shared-secret gate for privileged routes.
//!
//! Handlers take [`RequireSecret`] as their first argument. Extraction runs
//! before the body is read, so a rejected request never reaches a use case.

use crate::startup::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::utils::secrets_match;

pub const SECRET_HEADER: &str = "Secret-hash";

/// Proof that the request carried the configured `Secret-hash` header.
#[derive(Debug, Clone, Copy)]
pub struct RequireSecret;

#[async_trait]
impl FromRequestParts<AppState> for RequireSecret {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(SECRET_HEADER)
            .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
            .unwrap_or_default();

        if secrets_match(presented, state.config.secret_hash.expose_secret()) {
            Ok(RequireSecret)
        } else {
            tracing::warn!(
                path = %parts.uri.path(),
                header_present = parts.headers.contains_key(SECRET_HEADER),
                "Rejected request with invalid secret"
            );
            Err(AppError::SecretInvalid)
        }
    }
}
