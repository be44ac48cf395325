use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use std::collections::HashMap;

/// JSON body whose rejection names the expected type, e.g.
/// `Invalid body. Should be News as JSON.`
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected request body");
                Err(AppError::BadRequest(format!(
                    "Invalid body. Should be {} as JSON.",
                    short_type_name::<T>()
                )))
            }
        }
    }
}

/// Form parameters taken from the query string and an urlencoded body.
/// Body values win when a name appears in both.
#[derive(Debug, Clone, Default)]
pub struct FormParams(HashMap<String, String>);

impl FormParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// The named parameter, or `MissingParameter` naming it.
    pub fn require(&self, name: &str) -> Result<&str, AppError> {
        self.get(name)
            .ok_or_else(|| AppError::MissingParameter(name.to_string()))
    }

    fn merge(&mut self, encoded: &[u8]) -> Result<(), AppError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(encoded)
            .map_err(|e| AppError::BadRequest(format!("Invalid form data: {}", e)))?;
        self.0.extend(pairs);
        Ok(())
    }
}

#[async_trait]
impl<S> FromRequest<S> for FormParams
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = req.uri().query().unwrap_or_default().to_string();
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let mut params = FormParams::default();
        params.merge(query.as_bytes())?;
        params.merge(&body)?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::News;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;

    fn request(uri: &str, body: &'static str) -> Request {
        Request::builder()
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("request")
    }

    #[tokio::test]
    async fn form_params_merge_query_and_body() {
        let params = FormParams::from_request(request("/subscription?key=1&title=q", "title=b"), &())
            .await
            .expect("parses");

        assert_eq!(params.get("key"), Some("1"));
        assert_eq!(params.get("title"), Some("b"));
    }

    #[tokio::test]
    async fn missing_parameter_is_named() {
        let params = FormParams::from_request(request("/sendMailing", "title=x"), &())
            .await
            .expect("parses");

        let err = params.require("message").expect_err("absent");
        assert!(matches!(err, AppError::MissingParameter(name) if name == "message"));
    }

    #[tokio::test]
    async fn invalid_json_names_expected_type() {
        let req = Request::builder()
            .uri("/news")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{\"title\": 3"))
            .expect("request");

        let err = JsonBody::<News>::from_request(req, &())
            .await
            .expect_err("malformed");
        assert_eq!(err.to_string(), "Bad request: Invalid body. Should be News as JSON.");
    }
}
