//! Error type for the user service and its JSON envelope
//!
//! Every failure reaches the client as
//! `{"error": {"message": ...}, "status": <code>}`. Internal faults are logged
//! and replaced by a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::repositories::{StoreError, UniqueField};

pub const USERNAME_TAKEN: &str = "Username already in use";
pub const EMAIL_TAKEN: &str = "Email already in use";

/// Custom error type for the user service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Field-level problems reported together
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    /// A single malformed input
    #[error("{0}")]
    BadRequest(String),

    #[error("No token Supplied")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    /// Login rejected
    #[error("{0}")]
    InvalidCredentials(String),

    /// Role, ownership or account state forbids the operation
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Uniqueness clash
    #[error("{0}")]
    Conflict(String),

    /// Anything the client should not see the details of
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) | ApiError::MissingToken => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidToken | ApiError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(UniqueField::Username) => {
                ApiError::Conflict(USERNAME_TAKEN.to_string())
            }
            StoreError::UniqueViolation(UniqueField::Email) => {
                ApiError::Conflict(EMAIL_TAKEN.to_string())
            }
            other => ApiError::Internal(other.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Validation(messages) => ErrorMessage::Many(messages),
            ApiError::Internal(source) => {
                error!(error = ?source, "request failed with an internal error");
                ErrorMessage::One("Internal server error".to_string())
            }
            other => ErrorMessage::One(other.to_string()),
        };

        let body = Json(json!({
            "error": { "message": message },
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for user service results
pub type ApiResult<T> = Result<T, ApiError>;
