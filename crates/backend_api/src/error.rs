use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rates_client::RetrievalError;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Rate retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Retrieval(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
