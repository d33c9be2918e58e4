use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum GateError {
    #[error("invalid or missing API key")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("database session error: {0}")]
    Connection(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for GateError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = match &self {
            GateError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            GateError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            GateError::Connection(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONNECTION_ERROR"),
            GateError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        let body = ApiErrorResponse {
            error: ApiErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
