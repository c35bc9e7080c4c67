use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Error response returned to clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: &'static str,
    /// Human-readable error message
    pub message: String,
}

/// Every way a session lookup can end without a user.
///
/// The `Display` output is the message reported in `SessionResult::Error`,
/// so callers matching on those strings keep working.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication tokens not found")]
    TokensNotFound,

    #[error("JWT verification failed")]
    VerificationFailed,

    /// Refresh rejected by the auth provider; carries its message verbatim.
    #[error("{0}")]
    Provider(String),

    #[error("No user data available after refreshing session")]
    MissingRefreshedUser,
}

impl AuthError {
    fn code(&self) -> &'static str {
        match self {
            AuthError::TokensNotFound => "tokens_not_found",
            AuthError::VerificationFailed => "verification_failed",
            AuthError::Provider(_) => "refresh_failed",
            AuthError::MissingRefreshedUser => "missing_refreshed_user",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let error_response = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
        };

        (StatusCode::UNAUTHORIZED, axum::Json(error_response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
