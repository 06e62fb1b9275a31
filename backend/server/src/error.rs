use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bank::BankError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<BankError> for AppError {
    fn from(e: BankError) -> Self {
        match e {
            BankError::NotFound(_) => AppError::NotFound(e.to_string()),
            BankError::Unavailable | BankError::Duplicate(_) => AppError::Conflict(e.to_string()),
            BankError::OwnPost => AppError::BadRequest(e.to_string()),
            BankError::Invalid(reason) => AppError::BadRequest(reason),
            BankError::Forbidden(_) => AppError::Forbidden(e.to_string()),
            BankError::Sqlite(_) | BankError::Task(_) => AppError::InternalError(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload { .. } | AppError::BadRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let detail = match &self {
            AppError::InternalError(_) => {
                error!("{self}");
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
