use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant serializes to `{"ok": false, "error": "<message>"}` — the
/// frontend displays the message verbatim, so messages are written for end
/// users, not operators.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Missing or unparseable static resource (rubric, credential).
    #[error("{0}")]
    Configuration(String),

    /// The rubric yielded no usable response shape.
    #[error("{0}")]
    Schema(String),

    /// The generation service call itself failed (transport, non-2xx).
    #[error("{0}")]
    Upstream(String),

    /// The generation service answered, but not with the JSON we asked for.
    #[error("{0}")]
    UpstreamFormat(String),

    /// A template tag could not be resolved against the answer set.
    #[error("{0}")]
    Render(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Schema(msg) => {
                tracing::error!("Schema error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::UpstreamFormat(msg) => {
                tracing::error!("Upstream format error: {msg}");
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "ok": false,
            "error": message
        }));

        (status, body).into_response()
    }
}
