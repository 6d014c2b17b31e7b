use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors returned by HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Multipart(#[from] MultipartError),

    #[error("{0}")]
    MultipartRejected(#[from] MultipartRejection),

    #[error(transparent)]
    Classification(#[from] foodlens_core::Error),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request_error"),
            AppError::Multipart(err) => (err.status(), "invalid_request_error"),
            AppError::MultipartRejected(rejection) => (rejection.status(), "invalid_request_error"),
            AppError::Classification(err) if err.is_client_error() => {
                (StatusCode::BAD_REQUEST, "invalid_image_error")
            }
            AppError::Classification(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "server_error")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        let message = match &self {
            AppError::Multipart(err) => err.body_text(),
            AppError::MultipartRejected(rejection) => rejection.body_text(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", message);
        } else {
            tracing::warn!("Rejected request: {}", message);
        }
        metrics::counter!("foodlens_errors_total", "type" => kind).increment(1);

        let body = json!({
            "error": {
                "message": message,
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}
