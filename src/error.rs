use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

use crate::middleware::logging::to_response;

/// Everything a handler or the auth layer can fail with. Rendered to clients
/// as `{"error": <message>}`; the full value travels to the logging middleware
/// as a response extension.
#[derive(Error, Clone, Debug)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{message}: {detail}")]
    Validation {
        message: &'static str,
        detail: String,
    },
    #[error("{0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The part of the error that is safe to show to a client.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Unauthorized".into(),
            ApiError::Validation { message, .. } => (*message).into(),
            ApiError::NotFound(message) => message.clone(),
            ApiError::Database(_) => "Internal server error".into(),
        }
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        ApiError::Database(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.public_message() }));
        to_response((self.status_code(), body), Err(self))
    }
}
