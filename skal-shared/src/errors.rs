use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Account/auth errors
/// - E2xxx: Social graph, content and engagement errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    BadRequest,
    StoreError,

    // Auth (E1xxx)
    InvalidCredentials,
    EmailAlreadyExists,
    UsernameTaken,
    EmailNotVerified,
    TokenExpired,
    TokenInvalid,
    PasswordTooWeak,
    UserBanned,

    // Social (E2xxx)
    UserNotFound,
    PostNotFound,
    CommentNotFound,
    InvalidLikeTarget,
    CannotFollowSelf,
    UsernameChangeTooSoon,
    InvalidPage,
    InvalidPageSize,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::BadRequest => "E0006",
            Self::StoreError => "E0007",

            // Auth
            Self::InvalidCredentials => "E1001",
            Self::EmailAlreadyExists => "E1002",
            Self::UsernameTaken => "E1003",
            Self::EmailNotVerified => "E1004",
            Self::TokenExpired => "E1005",
            Self::TokenInvalid => "E1006",
            Self::PasswordTooWeak => "E1007",
            Self::UserBanned => "E1008",

            // Social
            Self::UserNotFound => "E2001",
            Self::PostNotFound => "E2002",
            Self::CommentNotFound => "E2003",
            Self::InvalidLikeTarget => "E2004",
            Self::CannotFollowSelf => "E2005",
            Self::UsernameChangeTooSoon => "E2006",
            Self::InvalidPage => "E2007",
            Self::InvalidPageSize => "E2008",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::StoreError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::BadRequest | Self::PasswordTooWeak
            | Self::InvalidLikeTarget | Self::InvalidPage | Self::InvalidPageSize => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound | Self::UserNotFound | Self::PostNotFound | Self::CommentNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::Unauthorized | Self::InvalidCredentials | Self::EmailNotVerified
            | Self::TokenExpired | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::UserBanned | Self::CannotFollowSelf => StatusCode::FORBIDDEN,
            Self::EmailAlreadyExists | Self::UsernameTaken | Self::UsernameChangeTooSoon => {
                StatusCode::CONFLICT
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    /// Persistence-layer failure; surfaced to the request layer, never
    /// retried here.
    #[error("store error: {0}")]
    Store(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message } => {
                (code.status_code(), ApiErrorResponse::new(code.code(), message))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Store(err) => {
                tracing::error!(error = %err, "store error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0007", "store error"),
                    ),
                }
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique() {
        let all = [
            ErrorCode::InternalError,
            ErrorCode::ValidationError,
            ErrorCode::NotFound,
            ErrorCode::Unauthorized,
            ErrorCode::Forbidden,
            ErrorCode::BadRequest,
            ErrorCode::StoreError,
            ErrorCode::InvalidCredentials,
            ErrorCode::EmailAlreadyExists,
            ErrorCode::UsernameTaken,
            ErrorCode::EmailNotVerified,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::PasswordTooWeak,
            ErrorCode::UserBanned,
            ErrorCode::UserNotFound,
            ErrorCode::PostNotFound,
            ErrorCode::CommentNotFound,
            ErrorCode::InvalidLikeTarget,
            ErrorCode::CannotFollowSelf,
            ErrorCode::UsernameChangeTooSoon,
            ErrorCode::InvalidPage,
            ErrorCode::InvalidPageSize,
        ];
        let mut codes: Vec<&str> = all.iter().map(|c| c.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn pagination_errors_are_bad_requests() {
        assert_eq!(ErrorCode::InvalidPage.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidPageSize.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidLikeTarget.status_code(), StatusCode::BAD_REQUEST);
    }
}
