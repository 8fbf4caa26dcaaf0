//! Error handling module for the DataRepo client.
//!
//! Provides the centralized error type plus the mapping from backend HTTP
//! responses into it. Everything above the transport layer deals in
//! [`ApiError`]; raw status codes and response bodies never escape.

use reqwest::StatusCode;

/// Error codes as constants to avoid stringly-typed errors.
#[allow(dead_code)]
pub mod codes {
    pub const AUTHENTICATION_FAILED: &str = "AUTHENTICATION_FAILED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const TRANSPORT_FAILURE: &str = "TRANSPORT_FAILURE";
}

/// Client-facing error type.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Credentials rejected or no valid session for a protected call
    AuthenticationFailed(String),
    /// Resource absent, or hidden from this principal
    NotFound(String),
    /// Input rejected, locally or by the backend
    Validation {
        /// Offending form field, when the failure can be pinned to one.
        field: Option<String>,
        message: String,
    },
    /// Authenticated but not allowed to perform the operation
    PermissionDenied(String),
    /// Network failure, timeout, or a response outside the backend contract
    Transport(String),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::AuthenticationFailed(_) => codes::AUTHENTICATION_FAILED,
            ApiError::NotFound(_) => codes::NOT_FOUND,
            ApiError::Validation { .. } => codes::VALIDATION_FAILED,
            ApiError::PermissionDenied(_) => codes::PERMISSION_DENIED,
            ApiError::Transport(_) => codes::TRANSPORT_FAILURE,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            ApiError::AuthenticationFailed(msg) => msg.clone(),
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::Validation {
                field: Some(field),
                message,
            } => format!("{field}: {message}"),
            ApiError::Validation {
                field: None,
                message,
            } => message.clone(),
            ApiError::PermissionDenied(msg) => msg.clone(),
            ApiError::Transport(msg) => msg.clone(),
        }
    }

    /// Whether retrying the same call later could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    /// Map a non-success backend response into an [`ApiError`], consuming
    /// the body.
    pub(crate) async fn from_response(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Self::from_status(status, &body)
    }

    /// Map a status code and raw body into an [`ApiError`].
    ///
    /// Understands the backend's two error body shapes: `{"detail": "..."}`
    /// and the per-field map `{"field": ["msg", ...]}`.
    pub(crate) fn from_status(status: StatusCode, body: &str) -> ApiError {
        let (field, message) = parse_error_body(body);
        match status {
            StatusCode::BAD_REQUEST => ApiError::Validation {
                field,
                message: message.unwrap_or_else(|| "invalid request".to_string()),
            },
            StatusCode::UNAUTHORIZED => ApiError::AuthenticationFailed(
                message.unwrap_or_else(|| "authentication required".to_string()),
            ),
            StatusCode::FORBIDDEN => {
                let message =
                    message.unwrap_or_else(|| "permission denied".to_string());
                // Some backend builds report a missing session as 403 rather
                // than 401. Normalize so callers see one authentication kind.
                if message.to_lowercase().contains("credentials were not provided") {
                    ApiError::AuthenticationFailed(message)
                } else {
                    ApiError::PermissionDenied(message)
                }
            }
            StatusCode::NOT_FOUND => {
                ApiError::NotFound(message.unwrap_or_else(|| "not found".to_string()))
            }
            other => {
                tracing::warn!("Unexpected backend response: {} {:?}", other, message);
                match message {
                    Some(msg) => ApiError::Transport(format!("server returned {other}: {msg}")),
                    None => ApiError::Transport(format!("server returned {other}")),
                }
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        tracing::warn!("HTTP transport error: {:?}", err);
        let detail = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "could not reach the server".to_string()
        } else {
            format!("request failed: {err}")
        };
        ApiError::Transport(detail)
    }
}

/// Extract `(field, message)` from an error body, tolerating anything the
/// backend might send. Non-JSON bodies yield `(None, None)`.
fn parse_error_body(body: &str) -> (Option<String>, Option<String>) {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return (None, None);
    };
    let Some(object) = value.as_object() else {
        return (None, None);
    };
    if let Some(detail) = object.get("detail").and_then(|v| v.as_str()) {
        return (None, Some(detail.to_string()));
    }
    if let Some(message) = object.get("message").and_then(|v| v.as_str()) {
        return (None, Some(message.to_string()));
    }
    // Per-field validation map; take the first reported field.
    for (field, messages) in object {
        if let Some(first) = messages
            .as_array()
            .and_then(|msgs| msgs.first())
            .and_then(|m| m.as_str())
        {
            return (Some(field.clone()), Some(first.to_string()));
        }
    }
    (None, None)
}
