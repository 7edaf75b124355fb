use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    #[error("No tokens found for user")]
    NoTokensFound,

    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    #[error("Database error: {0}")]
    Db(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<mongodb::error::Error> for AppError {
    fn from(e: mongodb::error::Error) -> Self {
        AppError::Db(e.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            AppError::Validation(s) => (StatusCode::BAD_REQUEST, s.as_str()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "not found"),
            AppError::NoTokensFound => (StatusCode::NOT_FOUND, "no connected store"),
            AppError::TokenRefreshFailed(_) => (StatusCode::BAD_GATEWAY, "token refresh failed"),
            AppError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database error"),
            AppError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream error"),
            AppError::Internal(s) => (StatusCode::INTERNAL_SERVER_ERROR, s.as_str()),
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}
