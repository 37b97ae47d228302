//! Error types shared by every operation and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::notify::DeliveryError;

/// Why a session token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("token signature is invalid")]
    Invalid,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed or missing required claims")]
    Malformed,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("already exists: {0}")]
    DuplicateConflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("authentication failed")]
    AuthenticationFailure,

    #[error(transparent)]
    Token(#[from] AuthError),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("notification delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Translate a storage error, keeping constraint violations as domain outcomes.
    pub fn from_db(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(db) = &err {
            match db.code().as_deref() {
                Some("23505") => return AppError::DuplicateConflict(what.to_string()),
                Some("23503") => return AppError::NotFound("user".into()),
                _ => {}
            }
        }
        AppError::Internal(anyhow::Error::new(err).context(format!("storage error on {what}")))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::DuplicateConflict(_) => {
                (StatusCode::CONFLICT, "duplicate", Some(self.to_string()))
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", Some(self.to_string())),
            AppError::AuthenticationFailure => {
                (StatusCode::UNAUTHORIZED, "authentication_failed", Some(self.to_string()))
            }
            AppError::Token(kind) => {
                let code = match kind {
                    AuthError::Invalid => "token_invalid",
                    AuthError::Expired => "token_expired",
                    AuthError::Malformed => "token_malformed",
                };
                (StatusCode::UNAUTHORIZED, code, None)
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", Some(msg.clone()))
            }
            AppError::Delivery(err) => {
                tracing::error!(error = %err, "notification delivery failed");
                (StatusCode::BAD_GATEWAY, "delivery_failed", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}
