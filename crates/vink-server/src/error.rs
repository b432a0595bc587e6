use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use vink_store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Missing, expired, and already-consumed records all map here so the
    /// response never reveals which of the three it was.
    #[error("Vanish not found")]
    NotFound,

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Upload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::PayloadTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, self.to_string())
            }
            ServerError::UploadFailed(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Upload failed".to_string())
            }
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::Store(_) | ServerError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
