use axum::extract::rejection::QueryRejection;
use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use domain::VideoId;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failures surfaced to HTTP clients
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request input
    #[error("{0}")]
    InvalidInput(String),

    /// Upstream had no data or refused the request
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

/// Resolve the `video_id` query parameter shared by all video endpoints
pub fn require_video_id(raw: Option<&str>) -> Result<VideoId, ApiError> {
    let raw = raw
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("video_id parameter is required".to_string()))?;
    VideoId::resolve(raw)
        .ok_or_else(|| ApiError::InvalidInput("Invalid YouTube video ID or URL".to_string()))
}

/// Response for a handler that panicked
pub fn panic_response() -> Response {
    ApiError::Internal("Internal server error".to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn maps_each_kind_to_status_and_error_body() {
        let cases = [
            (ApiError::InvalidInput("bad".into()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (ApiError::Internal("oops".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            let message = err.to_string();
            let response = err.into_response();
            assert_eq!(response.status(), status);
            assert_eq!(body_json(response).await, json!({ "error": message }));
        }
    }

    #[test]
    fn video_id_is_required() {
        let err = require_video_id(None).unwrap_err();
        assert_eq!(err.to_string(), "video_id parameter is required");
        let err = require_video_id(Some("")).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn video_id_must_resolve() {
        let err = require_video_id(Some("not-a-valid-ref")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid YouTube video ID or URL");
        let id = require_video_id(Some("https://youtu.be/dQw4w9WgXcQ")).unwrap();
        assert_eq!(id.as_str(), "dQw4w9WgXcQ");
    }

    #[tokio::test]
    async fn panic_response_is_generic() {
        let response = panic_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({"error": "Internal server error"}));
    }
}
