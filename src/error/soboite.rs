use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error as ThisError;

use super::FetchError;

#[derive(Debug, ThisError)]
pub enum SoboiteError {
    #[error("Restaurant not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Ractor error: {0}")]
    RactorError(String),
}

impl IntoResponse for SoboiteError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            SoboiteError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                ApiErrorObject {
                    code: "NOT_FOUND".to_string(),
                    message: format!("No restaurant with id {id}."),
                    details: None,
                },
            ),

            SoboiteError::Fetch(FetchError::Unavailable) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiErrorObject {
                    code: "BACKEND_UNAVAILABLE".to_string(),
                    message: FetchError::Unavailable.to_string(),
                    details: None,
                },
            ),

            SoboiteError::Fetch(FetchError::Backend {
                status,
                code,
                message,
            }) => (
                StatusCode::BAD_GATEWAY,
                ApiErrorObject {
                    code: "UPSTREAM_ERROR".to_string(),
                    message,
                    details: Some(serde_json::json!({
                        "status": status.as_u16(),
                        "code": code,
                    })),
                },
            ),

            SoboiteError::Fetch(e) => (
                StatusCode::BAD_GATEWAY,
                ApiErrorObject {
                    code: "UPSTREAM_ERROR".to_string(),
                    message: e.to_string(),
                    details: None,
                },
            ),

            SoboiteError::RactorError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorObject {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                    details: None,
                },
            ),
        };
        (status, Json(ApiErrorBody { inner: error_body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
