use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use encoder::EmbedError;
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

/// Transport-level error type. Every failure response carries a
/// `{"detail": ...}` JSON body; the status code reflects retryability
/// (503 retryable, 400 fix-the-request, 500 ambiguous).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error("Not found")]
    NotFound,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Embed(EmbedError::NotReady) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Embed(EmbedError::EmptyBatch) | ApiError::Embed(EmbedError::BatchTooLarge) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Embed(EmbedError::Encoding(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}
