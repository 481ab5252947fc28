/// Error type shared across the bridge's request path.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Upstream error: status={status}, message={message}")]
    Upstream { status: u16, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
}

impl BridgeError {
    fn http_status(&self) -> http::StatusCode {
        match self {
            BridgeError::Config(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
            BridgeError::InvalidRequest(_) => http::StatusCode::BAD_REQUEST,
            BridgeError::Upstream { status, .. } => http::StatusCode::from_u16(*status)
                .unwrap_or(http::StatusCode::BAD_GATEWAY),
            BridgeError::Transport(_) => http::StatusCode::BAD_GATEWAY,
        }
    }

    fn gemini_status(&self) -> &'static str {
        match self {
            BridgeError::Config(_) => "INTERNAL",
            BridgeError::InvalidRequest(_) => "INVALID_ARGUMENT",
            BridgeError::Upstream { status, .. } => gemini_status_for_upstream(*status),
            BridgeError::Transport(_) => "UNAVAILABLE",
        }
    }
}

/// Map an upstream HTTP status code to the Gemini error status string.
fn gemini_status_for_upstream(status: u16) -> &'static str {
    match status {
        400 => "INVALID_ARGUMENT",
        401 => "UNAUTHENTICATED",
        403 => "PERMISSION_DENIED",
        404 => "NOT_FOUND",
        429 => "RESOURCE_EXHAUSTED",
        _ => "INTERNAL",
    }
}

/// Gemini-shaped error body: `{"error":{"code","message","status"}}`.
#[must_use]
pub fn gemini_error_payload(code: u16, status: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "error": {
            "code": code,
            "message": message,
            "status": status,
        }
    })
}

impl axum::response::IntoResponse for BridgeError {
    fn into_response(self) -> axum::response::Response {
        use axum::response::IntoResponse;
        let status = self.http_status();
        let body = gemini_error_payload(status.as_u16(), self.gemini_status(), &self.to_string());
        (status, axum::Json(body)).into_response()
    }
}
