//! REST client for the academy backend.
//!
//! Every call is a single request: no retries, no batching, no caching.
//! A bearer token is attached when the caller has one, and 401 responses
//! are observed (logged and counted) before being handed back as
//! [`ApiError::Unauthorized`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::Settings;
use crate::monitoring;

/// Shown whenever the backend rejects the session token
pub const UNAUTHORIZED_MESSAGE: &str = "No autorizado (401). Inicia sesión nuevamente.";

/// Errors returned by backend calls
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// 401 from the backend; the session is no longer valid
    #[error("unauthorized: {}", .message.as_deref().unwrap_or("no message"))]
    Unauthorized { message: Option<String> },

    /// Any other non-2xx status, with the backend's message when it sent one
    #[error("backend returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },

    /// Connection refused, timeout, DNS failure...
    #[error("request failed: {0}")]
    Transport(String),

    /// 2xx response whose body did not match the expected shape
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(_) | ApiError::Decode(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Message carried in the backend's error payload, if any
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message } | ApiError::Status { message, .. } => {
                message.as_deref()
            }
            ApiError::Transport(_) | ApiError::Decode(_) => None,
        }
    }

    /// Best-effort user-facing message: 401 asks for a new login, anything
    /// else prefers the backend's own message over `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        if self.is_unauthorized() {
            return UNAUTHORIZED_MESSAGE.to_string();
        }
        self.backend_message()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

/// Thin wrapper over a shared `reqwest::Client` bound to the backend base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(ApiClient {
            http,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        })
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Self::new(
            &settings.api_url,
            Duration::from_millis(settings.api_timeout_ms),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path, token).query(query);
        let response = self.dispatch(Method::GET, path, request).await?;
        decode(response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B, token: Option<&str>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path, token).json(body);
        let response = self.dispatch(Method::POST, path, request).await?;
        decode(response).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B, token: Option<&str>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PUT, path, token).json(body);
        let response = self.dispatch(Method::PUT, path, request).await?;
        decode(response).await
    }

    /// DELETE ignores the response body; backends answer with 204 or an echo
    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, path, token);
        self.dispatch(Method::DELETE, path, request).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, url);

        if let Some(token) = token.filter(|t| !t.is_empty()) {
            request = request.bearer_auth(token);
        }

        request
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<Response, ApiError> {
        let start = Instant::now();
        let result = request.send().await;

        monitoring::BACKEND_LATENCY
            .with_label_values(&[method.as_str()])
            .observe(start.elapsed().as_secs_f64());

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                monitoring::BACKEND_REQUESTS
                    .with_label_values(&[method.as_str(), "transport_error"])
                    .inc();
                error!("{} {} failed: {}", method, path, e);
                return Err(ApiError::Transport(e.to_string()));
            }
        };

        let status = response.status();
        if status.is_success() {
            monitoring::BACKEND_REQUESTS
                .with_label_values(&[method.as_str(), "success"])
                .inc();
            debug!("{} {} -> {}", method, path, status);
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_message(&body);

        if status == StatusCode::UNAUTHORIZED {
            monitoring::UNAUTHORIZED_RESPONSES.inc();
            monitoring::BACKEND_REQUESTS
                .with_label_values(&[method.as_str(), "unauthorized"])
                .inc();
            warn!("{} {} -> 401, session token rejected", method, path);
            return Err(ApiError::Unauthorized { message });
        }

        monitoring::BACKEND_REQUESTS
            .with_label_values(&[method.as_str(), "error"])
            .inc();
        error!(
            "{} {} -> {}: {}",
            method,
            path,
            status,
            message.as_deref().unwrap_or("<no message>")
        );

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Pull `message` (or `error`) out of a JSON error body
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find_map(|v| v.as_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::helpers::spawn_backend;
    use serde_json::{json, Value};

    #[test]
    fn test_display_for_logs() {
        let err = ApiError::Status {
            status: 404,
            message: Some("no existe".to_string()),
        };
        assert_eq!(err.to_string(), "backend returned 404: no existe");
        assert_eq!(
            ApiError::Unauthorized { message: None }.to_string(),
            "unauthorized: no message"
        );
        assert_eq!(
            ApiError::Decode("missing field `id`".to_string()).to_string(),
            "invalid response body: missing field `id`"
        );

        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn test_user_message_prefers_backend_payload() {
        let err = ApiError::Status {
            status: 409,
            message: Some("El código ya existe".to_string()),
        };
        assert_eq!(err.user_message("No se pudo guardar."), "El código ya existe");

        let err = ApiError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message("No se pudo guardar."), "No se pudo guardar.");

        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.user_message("No se pudo guardar."), "No se pudo guardar.");
    }

    #[test]
    fn test_unauthorized_has_its_own_message() {
        let err = ApiError::Unauthorized {
            message: Some("jwt expired".to_string()),
        };
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.user_message("fallback"), UNAUTHORIZED_MESSAGE);
    }

    #[test]
    fn test_extract_message() {
        assert_eq!(
            extract_message(r#"{"message":"no existe"}"#),
            Some("no existe".to_string())
        );
        assert_eq!(
            extract_message(r#"{"error":"token inválido"}"#),
            Some("token inválido".to_string())
        );
        assert_eq!(extract_message("<html>502</html>"), None);
        assert_eq!(extract_message(""), None);
    }

    #[tokio::test]
    async fn test_bearer_token_is_attached() {
        let backend = spawn_backend().await;
        let client = ApiClient::new(&backend.base_url, Duration::from_secs(5)).unwrap();

        let _: Value = client.get("/cursos", &[], Some("abc123")).await.unwrap();
        let _: Value = client.get("/cursos", &[], None).await.unwrap();

        let requests = backend.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer abc123"));
        assert_eq!(requests[1].authorization, None);
    }

    #[tokio::test]
    async fn test_401_becomes_unauthorized() {
        let backend = spawn_backend().await;
        backend.fail_next(401, "token expirado");
        let client = ApiClient::new(&backend.base_url, Duration::from_secs(5)).unwrap();

        let err = client
            .get::<Value>("/cursos", &[], Some("old"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ApiError::Unauthorized {
                message: Some("token expirado".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_error_status_keeps_backend_message() {
        let backend = spawn_backend().await;
        let client = ApiClient::new(&backend.base_url, Duration::from_secs(5)).unwrap();

        let err = client.delete("/cursos/7", None).await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.backend_message(), Some("No encontrado"));
    }

    #[tokio::test]
    async fn test_post_round_trips_json() {
        let backend = spawn_backend().await;
        let client = ApiClient::new(&backend.base_url, Duration::from_secs(5)).unwrap();

        let created: Value = client
            .post("/api/docente", &json!({"especialidad": "Colorimetría"}), None)
            .await
            .unwrap();

        assert_eq!(created["especialidad"], "Colorimetría");
        assert!(created["id"].as_i64().is_some());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();

        let err = client.get::<Value>("/cursos", &[], None).await.unwrap_err();

        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.status(), None);
    }
}
